//! Collaborator seams: the road-address lookup and the building registry hub.
//!
//! Implementations live outside the core (`jeonyu-client` for the real HTTP
//! services, in-memory fakes in tests).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::registry::{AddressCandidate, LotKey, RegistryItem, RegistryOperation};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Upstream answered with a non-success HTTP status or result code.
    #[error("upstream returned {code}: {message}")]
    Status { code: String, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Free text → address candidates.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<AddressCandidate>, LookupError>;
}

/// One registry hub operation for one lot.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn fetch(
        &self,
        operation: RegistryOperation,
        lot: &LotKey,
    ) -> Result<Vec<RegistryItem>, LookupError>;
}

#[async_trait]
impl<T: AddressLookup + ?Sized> AddressLookup for std::sync::Arc<T> {
    async fn search(&self, query: &str) -> Result<Vec<AddressCandidate>, LookupError> {
        (**self).search(query).await
    }
}

#[async_trait]
impl<T: RegistryLookup + ?Sized> RegistryLookup for std::sync::Arc<T> {
    async fn fetch(
        &self,
        operation: RegistryOperation,
        lot: &LotKey,
    ) -> Result<Vec<RegistryItem>, LookupError> {
        (**self).fetch(operation, lot).await
    }
}
