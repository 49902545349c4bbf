//! Resolver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::CandidatePolicy;
use crate::floors::FloorOrder;
use crate::unit_key::SubUnitPolicy;

/// Default per-call deadline for collaborator calls.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
/// Default cap on unit-label samples in a not-found result.
pub const DEFAULT_SAMPLE_LIMIT: usize = 50;

/// Policies applied uniformly across one [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub sub_unit_policy: SubUnitPolicy,
    pub floor_order: FloorOrder,
    pub candidate_policy: CandidatePolicy,
    /// Deadline for each address or registry call. Exceeding it fails the request.
    #[serde(with = "duration_secs")]
    pub call_timeout: Duration,
    pub sample_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            sub_unit_policy: SubUnitPolicy::default(),
            floor_order: FloorOrder::default(),
            candidate_policy: CandidatePolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
