//! Driving port for audit ledger reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, LedgerEntry};

/// Driving port for reading the audit ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Read ledger entries referencing a request, oldest first.
    async fn entries_for_request(&self, request_id: Uuid) -> Result<Vec<LedgerEntry>, Error>;

    /// Read ledger entries referencing a donation, oldest first.
    async fn entries_for_donation(&self, donation_id: Uuid) -> Result<Vec<LedgerEntry>, Error>;
}

/// Fixture query implementation for tests that do not exercise the ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLedgerQuery;

#[async_trait]
impl LedgerQuery for FixtureLedgerQuery {
    async fn entries_for_request(&self, _request_id: Uuid) -> Result<Vec<LedgerEntry>, Error> {
        Ok(Vec::new())
    }

    async fn entries_for_donation(&self, _donation_id: Uuid) -> Result<Vec<LedgerEntry>, Error> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_lists_return_empty() {
        let query = FixtureLedgerQuery;
        assert!(
            query
                .entries_for_request(Uuid::new_v4())
                .await
                .expect("fixture list succeeds")
                .is_empty()
        );
        assert!(
            query
                .entries_for_donation(Uuid::new_v4())
                .await
                .expect("fixture list succeeds")
                .is_empty()
        );
    }
}
