use crate::models::RiskMap;

/// Upper bound (exclusive) of the low-risk band.
pub const LOW_RISK_BAND: f64 = 0.3;
/// Upper bound (exclusive) of the moderate-risk band.
pub const MODERATE_RISK_BAND: f64 = 0.7;

pub const NO_RISK_MESSAGE: &str =
    "No significant health risks detected. If you feel unwell, consult a healthcare professional.";
pub const LOW_RISK_MESSAGE: &str =
    "Your symptoms suggest a low risk. Stay hydrated and monitor your health.";
pub const MODERATE_RISK_MESSAGE: &str = "Some symptoms may indicate a moderate risk. \
     Please consider consulting a healthcare provider if you feel worse.";
pub const ELEVATED_RISK_MESSAGE: &str = "Some symptoms may indicate a higher risk. \
     Please remain calm and seek medical advice if you feel unwell.";
pub const UNASSESSABLE_MESSAGE: &str = "Unable to assess risk. Please try again later.";

/// Turns a risk map into one calm, non-alarmist sentence pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageComposer;

impl MessageComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, risk: &RiskMap) -> &'static str {
        if risk.is_empty() {
            return NO_RISK_MESSAGE;
        }
        if risk.values().any(|v| !v.is_finite()) {
            tracing::warn!("Risk map contains non-finite values");
            return UNASSESSABLE_MESSAGE;
        }

        let max_risk = risk.values().copied().fold(f64::NEG_INFINITY, f64::max);
        if max_risk < LOW_RISK_BAND {
            LOW_RISK_MESSAGE
        } else if max_risk < MODERATE_RISK_BAND {
            MODERATE_RISK_MESSAGE
        } else {
            ELEVATED_RISK_MESSAGE
        }
    }
}
