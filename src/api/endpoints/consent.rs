use axum::Json;
use serde::Serialize;

pub const CONSENT_POLICY: &str = "Calmora is an AI health companion. It does not provide medical advice, \
diagnosis, or treatment. All information is for informational purposes only. Always consult a \
qualified healthcare provider for medical concerns. By using this service, you acknowledge and \
accept this policy.";

#[derive(Serialize)]
pub struct ConsentResponse {
    pub policy: &'static str,
}

/// `GET /api/v1/consent`
pub async fn policy() -> Json<ConsentResponse> {
    Json(ConsentResponse {
        policy: CONSENT_POLICY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::safety::scan_language;

    #[test]
    fn policy_disclaims_diagnosis_calmly() {
        assert!(CONSENT_POLICY.contains("does not provide medical advice"));
        assert!(scan_language(CONSENT_POLICY).is_empty());
    }
}
