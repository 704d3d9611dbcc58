use crate::models::{RiskMap, SymptomSet};

use super::messages::LOW_RISK_BAND;

struct TipRule {
    symptom: &'static str,
    tip: &'static str,
}

/// Symptom-keyed tips, emitted in this order.
const TIP_RULES: &[TipRule] = &[
    TipRule {
        symptom: "fever",
        tip: "Stay hydrated and rest as much as possible.",
    },
    TipRule {
        symptom: "cough",
        tip: "Use a humidifier and avoid irritants like smoke.",
    },
    TipRule {
        symptom: "headache",
        tip: "Try to rest in a quiet, dark room and stay hydrated.",
    },
    TipRule {
        symptom: "nausea",
        tip: "Eat small, bland meals and sip clear fluids slowly.",
    },
    TipRule {
        symptom: "fatigue",
        tip: "Keep a regular sleep routine and pace your daily activities.",
    },
    TipRule {
        symptom: "sore throat",
        tip: "Warm fluids like tea with honey can soothe your throat.",
    },
    TipRule {
        symptom: "shortness of breath",
        tip: "Take things slowly, sit upright, and rest between activities.",
    },
];

pub const GENERIC_TIP: &str =
    "Maintain a balanced diet, exercise regularly, and practice mindfulness.";
pub const SYMPTOM_DIARY_TIP: &str =
    "Keep a short daily note of how you feel to share with a healthcare provider.";

#[derive(Debug, Default, Clone, Copy)]
pub struct LifestyleAdvisor;

impl LifestyleAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// Tips for the given symptoms. Never empty.
    ///
    /// Without a matching symptom rule exactly one generic tip is returned;
    /// which one depends on whether any disease risk reaches the low band.
    pub fn recommend(&self, symptoms: &SymptomSet, risk: &RiskMap) -> Vec<String> {
        let tips: Vec<String> = TIP_RULES
            .iter()
            .filter(|rule| symptoms.contains(rule.symptom))
            .map(|rule| rule.tip.to_string())
            .collect();
        if !tips.is_empty() {
            return tips;
        }

        let elevated = risk.values().any(|v| v.is_finite() && *v >= LOW_RISK_BAND);
        let generic = if elevated { SYMPTOM_DIARY_TIP } else { GENERIC_TIP };
        vec![generic.to_string()]
    }
}
