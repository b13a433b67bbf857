//! Location collaborators: geofence and claimant presence.
//!
//! Both are stubs that confirm every location until a network-insight
//! provider is wired in.

use async_trait::async_trait;
use tracing::debug;

use crate::error::CheckError;

#[async_trait]
pub trait GeofenceChecker: Send + Sync {
    /// Whether `farm_location` lies inside `insured_area`.
    async fn check_within_area(
        &self,
        farm_location: &str,
        insured_area: &str,
    ) -> Result<bool, CheckError>;
}

#[async_trait]
pub trait PresenceChecker: Send + Sync {
    /// Whether the claimant was inside `insured_area` when the damage happened.
    async fn check_presence(
        &self,
        claimant_location: &str,
        insured_area: &str,
    ) -> Result<bool, CheckError>;
}

pub struct StubGeofenceChecker;

#[async_trait]
impl GeofenceChecker for StubGeofenceChecker {
    async fn check_within_area(
        &self,
        farm_location: &str,
        insured_area: &str,
    ) -> Result<bool, CheckError> {
        debug!(farm_location, insured_area, "stub geofence check");
        Ok(true)
    }
}

pub struct StubPresenceChecker;

#[async_trait]
impl PresenceChecker for StubPresenceChecker {
    async fn check_presence(
        &self,
        claimant_location: &str,
        insured_area: &str,
    ) -> Result<bool, CheckError> {
        debug!(claimant_location, insured_area, "stub presence check");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stubs_confirm_any_location() {
        assert!(
            StubGeofenceChecker
                .check_within_area("0, 0", "12.9716, 77.5946")
                .await
                .unwrap()
        );
        assert!(
            StubPresenceChecker
                .check_presence("", "")
                .await
                .unwrap()
        );
    }
}
