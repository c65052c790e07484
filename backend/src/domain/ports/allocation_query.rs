//! Driving port for allocation reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, LiveOrganView, OrganDonation, OrganRequest, OrganType};

/// Aggregate counts exposed by the statistics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub participants: u64,
    pub requests: u64,
    pub donations: u64,
    pub matched: u64,
    pub completed: u64,
}

/// Driving port for allocation read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AllocationQuery: Send + Sync {
    /// Fetch an organ request by id.
    async fn get_request(&self, request_id: Uuid) -> Result<OrganRequest, Error>;

    /// Fetch an organ donation by id.
    async fn get_donation(&self, donation_id: Uuid) -> Result<OrganDonation, Error>;

    /// List pending requests for an organ type, most urgent first.
    async fn list_pending_requests(&self, organ: OrganType)
    -> Result<Vec<OrganRequest>, Error>;

    /// List donations currently available for matching.
    async fn list_live_organs(&self) -> Result<Vec<LiveOrganView>, Error>;

    /// Aggregate registry counts.
    async fn registry_stats(&self) -> Result<RegistryStats, Error>;
}

/// Fixture query implementation for tests that do not exercise allocation
/// reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAllocationQuery;

#[async_trait]
impl AllocationQuery for FixtureAllocationQuery {
    async fn get_request(&self, request_id: Uuid) -> Result<OrganRequest, Error> {
        Err(Error::not_found(format!(
            "organ request {request_id} not found"
        )))
    }

    async fn get_donation(&self, donation_id: Uuid) -> Result<OrganDonation, Error> {
        Err(Error::not_found(format!(
            "organ donation {donation_id} not found"
        )))
    }

    async fn list_pending_requests(
        &self,
        _organ: OrganType,
    ) -> Result<Vec<OrganRequest>, Error> {
        Ok(Vec::new())
    }

    async fn list_live_organs(&self) -> Result<Vec<LiveOrganView>, Error> {
        Ok(Vec::new())
    }

    async fn registry_stats(&self) -> Result<RegistryStats, Error> {
        Ok(RegistryStats::default())
    }
}
