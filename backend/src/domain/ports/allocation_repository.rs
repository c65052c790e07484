//! Port for organ request and donation persistence.
//!
//! Requests and donations share one port because matching and completion
//! must update both aggregates in a single storage transaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{OrganDonation, OrganRequest, OrganType};

use super::define_port_error;

define_port_error! {
    /// Errors raised by allocation repository adapters.
    pub enum AllocationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "allocation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "allocation repository query failed: {message}",
    }
}

/// Aggregate counts over the allocation tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationCounts {
    pub requests: u64,
    pub donations: u64,
    pub matched: u64,
    pub completed: u64,
}

/// Port for writing and reading organ requests and donations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AllocationRepository: Send + Sync {
    /// Persist an organ request, inserting or updating by id.
    async fn save_request(&self, request: &OrganRequest)
    -> Result<(), AllocationRepositoryError>;

    /// Find an organ request by id.
    async fn find_request(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<OrganRequest>, AllocationRepositoryError>;

    /// List pending requests for an organ type, most urgent first and oldest
    /// first within equal urgency.
    async fn list_pending_requests(
        &self,
        organ: OrganType,
    ) -> Result<Vec<OrganRequest>, AllocationRepositoryError>;

    /// Persist an organ donation, inserting or updating by id.
    async fn save_donation(
        &self,
        donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError>;

    /// Find an organ donation by id.
    async fn find_donation(
        &self,
        donation_id: &Uuid,
    ) -> Result<Option<OrganDonation>, AllocationRepositoryError>;

    /// List donations currently available for matching.
    async fn list_available_donations(
        &self,
    ) -> Result<Vec<OrganDonation>, AllocationRepositoryError>;

    /// Persist a matched request and donation pair atomically. Either both
    /// rows reflect the match afterwards or neither does.
    async fn save_match(
        &self,
        request: &OrganRequest,
        donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError>;

    /// Persist a completed transplant pair atomically.
    async fn save_completion(
        &self,
        request: &OrganRequest,
        donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError>;

    /// Aggregate counts for registry statistics.
    async fn stats(&self) -> Result<AllocationCounts, AllocationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise allocation
/// persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAllocationRepository;

#[async_trait]
impl AllocationRepository for FixtureAllocationRepository {
    async fn save_request(
        &self,
        _request: &OrganRequest,
    ) -> Result<(), AllocationRepositoryError> {
        Ok(())
    }

    async fn find_request(
        &self,
        _request_id: &Uuid,
    ) -> Result<Option<OrganRequest>, AllocationRepositoryError> {
        Ok(None)
    }

    async fn list_pending_requests(
        &self,
        _organ: OrganType,
    ) -> Result<Vec<OrganRequest>, AllocationRepositoryError> {
        Ok(Vec::new())
    }

    async fn save_donation(
        &self,
        _donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError> {
        Ok(())
    }

    async fn find_donation(
        &self,
        _donation_id: &Uuid,
    ) -> Result<Option<OrganDonation>, AllocationRepositoryError> {
        Ok(None)
    }

    async fn list_available_donations(
        &self,
    ) -> Result<Vec<OrganDonation>, AllocationRepositoryError> {
        Ok(Vec::new())
    }

    async fn save_match(
        &self,
        _request: &OrganRequest,
        _donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError> {
        Ok(())
    }

    async fn save_completion(
        &self,
        _request: &OrganRequest,
        _donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError> {
        Ok(())
    }

    async fn stats(&self) -> Result<AllocationCounts, AllocationRepositoryError> {
        Ok(AllocationCounts::default())
    }
}
