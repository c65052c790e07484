//! HTTP inbound adapter exposing REST endpoints.

pub mod donations;
pub mod error;
pub mod health;
pub mod ledger;
pub mod matching;
pub mod participants;
pub mod registry;
pub mod requests;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
