//! Deterministic approval rules.
//!
//! The area check always wins over the presence check when both fail.

use crate::models::{ClaimDecision, DecisionFacts};

pub const OUTSIDE_INSURED_AREA_REASON: &str = "Farm location is not within the insured area.";
pub const CLAIMANT_ABSENT_REASON: &str =
    "Claimant was not present in the insured zone during the damage.";
pub const AREA_UNVERIFIED_REASON: &str =
    "Farm location could not be verified against the insured area.";
pub const PRESENCE_UNVERIFIED_REASON: &str = "Claimant presence could not be verified.";

/// Result of a single location check, including collaborator outages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Confirmed(bool),
    Unavailable,
}

impl CheckOutcome {
    /// Outages count as a failed check.
    pub fn passed(self) -> bool {
        matches!(self, CheckOutcome::Confirmed(true))
    }
}

/// Computes the claim decision from the location facts.
pub fn evaluate(facts: DecisionFacts) -> ClaimDecision {
    let review_reason = if !facts.is_within_insured_area {
        Some(OUTSIDE_INSURED_AREA_REASON)
    } else if !facts.is_claimant_present {
        Some(CLAIMANT_ABSENT_REASON)
    } else {
        None
    };

    ClaimDecision {
        is_within_insured_area: facts.is_within_insured_area,
        is_claimant_present: facts.is_claimant_present,
        is_approved: review_reason.is_none(),
        review_reason: review_reason.map(str::to_string),
    }
}

/// Like [`evaluate`], but an unavailable check fails closed with its own reason.
pub fn evaluate_outcomes(area: CheckOutcome, presence: CheckOutcome) -> ClaimDecision {
    let mut decision = evaluate(DecisionFacts {
        is_within_insured_area: area.passed(),
        is_claimant_present: presence.passed(),
    });

    if area == CheckOutcome::Unavailable {
        decision.review_reason = Some(AREA_UNVERIFIED_REASON.to_string());
    } else if area.passed() && presence == CheckOutcome::Unavailable {
        decision.review_reason = Some(PRESENCE_UNVERIFIED_REASON.to_string());
    }

    decision
}
