use serde::{Deserialize, Deserializer, Serialize};

/// Evidence handed to the verification service for a single claim.
///
/// Coordinates are opaque strings; nothing in this crate parses them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEvidence {
    pub farm_location: String,
    pub claimant_location: String,
    pub insured_area: String,
    pub damage_description: String,
    /// `data:<mime>;base64,<payload>`, passed through unexamined.
    pub photo_reference: Option<String>,
}

/// Location facts produced by the geofence and presence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionFacts {
    pub is_within_insured_area: bool,
    pub is_claimant_present: bool,
}

/// The authoritative outcome of a claim verification.
///
/// Also the schema the language model must answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDecision {
    pub is_within_insured_area: bool,
    pub is_claimant_present: bool,
    pub is_approved: bool,
    #[serde(
        default,
        deserialize_with = "reason_if_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub review_reason: Option<String>,
}

/// A missing key means no reason; an explicit `null` is a type error.
fn reason_if_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    String::deserialize(deserializer).map(Some)
}

impl ClaimDecision {
    pub fn facts(&self) -> DecisionFacts {
        DecisionFacts {
            is_within_insured_area: self.is_within_insured_area,
            is_claimant_present: self.is_claimant_present,
        }
    }

    /// True when the deterministic fields of `other` match this decision.
    pub fn agrees_with(&self, other: &ClaimDecision) -> bool {
        self.facts() == other.facts() && self.is_approved == other.is_approved
    }
}

/// A photo as received from the caller, before any encoding.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A claim form after validation.
#[derive(Debug, Clone)]
pub struct ClaimSubmission {
    pub name: String,
    pub crop_type: String,
    pub damage_description: String,
    pub photo: Option<PhotoUpload>,
}

/// Tagged result returned to the form caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ClaimDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok(decision: ClaimDecision) -> Self {
        Self {
            success: true,
            data: Some(decision),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_serializes_camel_case_without_absent_reason() {
        let decision = ClaimDecision {
            is_within_insured_area: true,
            is_claimant_present: true,
            is_approved: true,
            review_reason: None,
        };

        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "isWithinInsuredArea": true,
                "isClaimantPresent": true,
                "isApproved": true
            })
        );
    }

    #[test]
    fn test_decision_rejects_null_reason() {
        let parsed = serde_json::from_str::<ClaimDecision>(
            r#"{"isWithinInsuredArea": true, "isClaimantPresent": true, "isApproved": true, "reviewReason": null}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_failed_response_has_no_data() {
        let response = ActionResponse::failed("Invalid form data.");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "success": false, "error": "Invalid form data." })
        );
    }
}
