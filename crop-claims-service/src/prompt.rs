use crate::models::{ClaimDecision, ClaimEvidence};

pub const DEFAULT_CLAIM_PROMPT: &str = r#"You are an AI assistant that verifies crop insurance claims based on location data and damage descriptions.

You will evaluate whether the farm is within the insured area and whether the claimant was present in the insured zone during the damage.

Based on this information, you will determine if the claim is automatically approved or if it should be flagged for review.

Farm Location: {{farmLocation}}
Claimant Location: {{claimantLocation}}
Insured Area: {{insuredArea}}
Damage Description: {{damageDescription}}

Location verification results:
- Within insured area: {{isWithinInsuredArea}}
- Claimant present: {{isClaimantPresent}}
- Approved: {{isApproved}}
- Review reason: {{reviewReason}}

{{photoNote}}

Output your assessment in JSON format. Include reviewReason if the claim is not approved.
Respond with ONLY this JSON (no explanation, no additional text):
{
  "isWithinInsuredArea": true,
  "isClaimantPresent": true,
  "isApproved": true,
  "reviewReason": "only when not approved"
}
"#;

const PHOTO_ATTACHED_NOTE: &str = "Consider the attached photo of the damaged crop.";
const NO_PHOTO_NOTE: &str = "No photo was provided.";

/// Prompt text plus the optional image that travels with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationPrompt {
    pub text: String,
    /// Data URI of the claim photo.
    pub media: Option<String>,
}

/// Claim verification prompt, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_CLAIM_PROMPT)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub async fn from_file(path: &str) -> anyhow::Result<Self> {
        let template = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read prompt template {}: {}", path, e))?;
        Ok(Self::new(template))
    }

    pub fn render(&self, evidence: &ClaimEvidence, decision: &ClaimDecision) -> VerificationPrompt {
        let photo_note = if evidence.photo_reference.is_some() {
            PHOTO_ATTACHED_NOTE
        } else {
            NO_PHOTO_NOTE
        };

        let text = self
            .template
            .replace("{{farmLocation}}", &evidence.farm_location)
            .replace("{{claimantLocation}}", &evidence.claimant_location)
            .replace("{{insuredArea}}", &evidence.insured_area)
            .replace("{{damageDescription}}", &evidence.damage_description)
            .replace(
                "{{isWithinInsuredArea}}",
                &decision.is_within_insured_area.to_string(),
            )
            .replace(
                "{{isClaimantPresent}}",
                &decision.is_claimant_present.to_string(),
            )
            .replace("{{isApproved}}", &decision.is_approved.to_string())
            .replace(
                "{{reviewReason}}",
                decision.review_reason.as_deref().unwrap_or("none"),
            )
            .replace("{{photoNote}}", photo_note);

        VerificationPrompt {
            text,
            media: evidence.photo_reference.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(photo: Option<&str>) -> ClaimEvidence {
        ClaimEvidence {
            farm_location: "12.9716, 77.5946".to_string(),
            claimant_location: "12.9720, 77.5950".to_string(),
            insured_area: "12.97, 77.59".to_string(),
            damage_description: "Hail flattened the wheat in the north field".to_string(),
            photo_reference: photo.map(str::to_string),
        }
    }

    fn flagged() -> ClaimDecision {
        ClaimDecision {
            is_within_insured_area: true,
            is_claimant_present: false,
            is_approved: false,
            review_reason: Some("Claimant was not present in the insured zone during the damage.".into()),
        }
    }

    #[test]
    fn test_default_template_fills_every_placeholder() {
        let prompt = PromptTemplate::default().render(&evidence(None), &flagged());

        assert!(!prompt.text.contains("{{"));
        assert!(prompt.text.contains("Farm Location: 12.9716, 77.5946"));
        assert!(prompt.text.contains("Claimant Location: 12.9720, 77.5950"));
        assert!(prompt.text.contains("Insured Area: 12.97, 77.59"));
        assert!(prompt.text.contains("Hail flattened the wheat"));
        assert!(prompt.text.contains("Claimant present: false"));
        assert!(prompt.text.contains("Approved: false"));
        assert!(prompt.text.contains("Review reason: Claimant was not present"));
        assert!(prompt.text.contains(NO_PHOTO_NOTE));
        assert_eq!(prompt.media, None);
    }

    #[test]
    fn test_photo_travels_as_media() {
        let uri = "data:image/png;base64,iVBORw0KGgo=";
        let prompt = PromptTemplate::default().render(&evidence(Some(uri)), &flagged());

        assert_eq!(prompt.media.as_deref(), Some(uri));
        assert!(prompt.text.contains(PHOTO_ATTACHED_NOTE));
        assert!(!prompt.text.contains(uri));
    }

    #[test]
    fn test_custom_template() {
        let template = PromptTemplate::new("{{cropless}} {{isApproved}}/{{reviewReason}}");
        let approved = ClaimDecision {
            is_within_insured_area: true,
            is_claimant_present: true,
            is_approved: true,
            review_reason: None,
        };

        let prompt = template.render(&evidence(None), &approved);
        assert_eq!(prompt.text, "{{cropless}} true/none");
    }
}
