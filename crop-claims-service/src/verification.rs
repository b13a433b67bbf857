use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::checks::{GeofenceChecker, PresenceChecker};
use crate::config::LocationDefaults;
use crate::error::{CheckError, ClaimError, ModelError};
use crate::evaluator::{CheckOutcome, evaluate_outcomes};
use crate::llm::DecisionModel;
use crate::models::{ActionResponse, ClaimDecision, ClaimEvidence};
use crate::prompt::PromptTemplate;
use crate::submission::{RawClaimForm, to_data_uri};

/// Runs location checks, evaluates the claim and has the model restate it.
///
/// The returned decision is always the deterministic one; the model answer
/// is schema-checked and compared, never adopted.
#[derive(Clone)]
pub struct ClaimVerificationService {
    geofence: Arc<dyn GeofenceChecker>,
    presence: Arc<dyn PresenceChecker>,
    model: Arc<dyn DecisionModel>,
    prompt: Arc<PromptTemplate>,
    locations: LocationDefaults,
    model_timeout: Duration,
}

impl ClaimVerificationService {
    pub fn new(
        geofence: Arc<dyn GeofenceChecker>,
        presence: Arc<dyn PresenceChecker>,
        model: Arc<dyn DecisionModel>,
        prompt: PromptTemplate,
        locations: LocationDefaults,
        model_timeout: Duration,
    ) -> Self {
        Self {
            geofence,
            presence,
            model,
            prompt: Arc::new(prompt),
            locations,
            model_timeout,
        }
    }

    pub async fn verify(&self, evidence: &ClaimEvidence) -> Result<ClaimDecision, ClaimError> {
        let area = check_outcome(
            "geofence",
            self.geofence
                .check_within_area(&evidence.farm_location, &evidence.insured_area)
                .await,
        );
        let presence = check_outcome(
            "presence",
            self.presence
                .check_presence(&evidence.claimant_location, &evidence.insured_area)
                .await,
        );

        let decision = evaluate_outcomes(area, presence);
        info!(
            is_within_insured_area = decision.is_within_insured_area,
            is_claimant_present = decision.is_claimant_present,
            claim_approved = decision.is_approved,
            "Provisional claim decision computed"
        );

        let prompt = self.prompt.render(evidence, &decision);
        let restated = tokio::time::timeout(self.model_timeout, self.model.render(&prompt))
            .await
            .map_err(|_| ModelError::Timeout(self.model_timeout.as_secs()))??;

        if !restated.agrees_with(&decision) {
            warn!(
                model_approved = restated.is_approved,
                claim_approved = decision.is_approved,
                "LLM restatement disagrees with computed decision, keeping computed decision"
            );
        }

        Ok(decision)
    }

    /// Validates the raw form, builds the evidence and verifies it.
    pub async fn process_submission(&self, form: RawClaimForm) -> Result<ClaimDecision, ClaimError> {
        let submission = form.validate()?;
        let photo_reference = submission.photo.as_ref().map(to_data_uri).transpose()?;

        info!(
            crop_type = %submission.crop_type,
            has_photo = photo_reference.is_some(),
            "Claim submission accepted"
        );

        let evidence = ClaimEvidence {
            farm_location: self.locations.farm_location.clone(),
            claimant_location: self.locations.claimant_location.clone(),
            insured_area: self.locations.insured_area.clone(),
            damage_description: submission.damage_description,
            photo_reference,
        };

        self.verify(&evidence).await
    }

    /// Service boundary: every outcome becomes a tagged response.
    pub async fn submit(&self, form: RawClaimForm) -> ActionResponse {
        into_response(self.process_submission(form).await)
    }
}

pub fn into_response(result: Result<ClaimDecision, ClaimError>) -> ActionResponse {
    match result {
        Ok(decision) => ActionResponse::ok(decision),
        Err(e) => {
            match &e {
                ClaimError::Verification(_) => error!(error = %e, "AI verification failed"),
                _ => warn!(error = %e, "Claim submission rejected"),
            }
            ActionResponse::failed(e.user_message())
        }
    }
}

fn check_outcome(check: &str, result: Result<bool, CheckError>) -> CheckOutcome {
    match result {
        Ok(passed) => CheckOutcome::Confirmed(passed),
        Err(e) => {
            error!(check, error = %e, "Location check failed, treating as not verified");
            CheckOutcome::Unavailable
        }
    }
}
