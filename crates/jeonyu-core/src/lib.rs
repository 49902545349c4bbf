//! Core of Jeonyu: resolve a building address to the exclusive area (전유면적)
//! of one floor or unit from building-registry listings.

pub mod address;
pub mod area;
pub mod config;
pub mod error;
pub mod floors;
pub mod lookup;
pub mod measure;
pub mod registry;
pub mod service;
pub mod unit_key;
pub mod units;

pub use address::CandidatePolicy;
pub use area::{AreaMatch, AreaMiss, AreaResult, AreaSource, AreaWarning, MatchKind, resolve_area};
pub use config::ResolverConfig;
pub use error::ResolveError;
pub use floors::{FloorDescriptor, FloorOrder, FloorPick, FloorType};
pub use lookup::{AddressLookup, LookupError, RegistryLookup};
pub use measure::{Measurement, SQUARE_METERS_PER_PYEONG};
pub use registry::{
    AddressCandidate, LotKey, RegistryItem, RegistryListings, RegistryOperation, ResolvedAddress,
};
pub use service::{FloorAndUnits, FloorsOnly, Resolver};
pub use unit_key::{SubUnitPolicy, UnitKey};
pub use units::{UnitEntry, UnitListing};
