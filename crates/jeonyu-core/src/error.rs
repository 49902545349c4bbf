use thiserror::Error;

use crate::lookup::LookupError;
use crate::registry::{LotKey, RegistryOperation};

/// Terminal failures of one resolution request. Nothing here is retried.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid {field}: {reason}")]
    InputInvalid { field: &'static str, reason: String },

    #[error("address not found for {query:?}: {reason}")]
    AddressNotFound { query: String, reason: String },

    #[error("address lookup failed: {0}")]
    AddressLookup(#[source] LookupError),

    #[error("registry operation {operation} failed: {source}")]
    RegistryUnavailable {
        operation: RegistryOperation,
        #[source]
        source: LookupError,
    },

    #[error("no floor-outline records for lot {lot}")]
    NoFloorData { lot: LotKey },
}

impl ResolveError {
    pub(crate) fn input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InputInvalid {
            field,
            reason: reason.into(),
        }
    }

    /// HTTP-equivalent status for response assembly.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InputInvalid { .. } => 400,
            Self::AddressNotFound { .. } | Self::NoFloorData { .. } => 404,
            Self::AddressLookup(LookupError::Timeout(_))
            | Self::RegistryUnavailable {
                source: LookupError::Timeout(_),
                ..
            } => 504,
            Self::AddressLookup(_) | Self::RegistryUnavailable { .. } => 502,
        }
    }

    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputInvalid { .. } => "input-invalid",
            Self::AddressNotFound { .. } => "address-not-found",
            Self::AddressLookup(_) => "address-lookup-failed",
            Self::RegistryUnavailable { .. } => "registry-unavailable",
            Self::NoFloorData { .. } => "no-floor-data",
        }
    }
}
