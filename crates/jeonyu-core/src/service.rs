//! Request-level orchestration: address → floors → units → area.
//!
//! Every collaborator call runs under [`ResolverConfig::call_timeout`]. The
//! three registry listings are independent reads and are fetched concurrently
//! when an operation needs more than one of them.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::address::resolve_candidate;
use crate::area::{AreaResult, resolve_area};
use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::floors::{
    FloorDescriptor, FloorPick, collect_floors, items_for_floor, pick_representative,
};
use crate::lookup::{AddressLookup, LookupError, RegistryLookup};
use crate::registry::{
    LotKey, RegistryItem, RegistryListings, RegistryOperation, ResolvedAddress,
};
use crate::unit_key::UnitKey;
use crate::units::{UnitListing, list_units_on_floor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorsOnly {
    pub floors: Vec<FloorDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorAndUnits {
    pub floors: Vec<FloorDescriptor>,
    pub floor: FloorDescriptor,
    /// Every floor-outline segment of the floor; several per floor is normal.
    pub floor_items: Vec<RegistryItem>,
    pub pick: Option<FloorPick>,
    pub units: UnitListing,
}

/// Stateless resolver over an address lookup and a registry lookup.
pub struct Resolver<A, R> {
    address: A,
    registry: R,
    config: ResolverConfig,
}

impl<A: AddressLookup, R: RegistryLookup> Resolver<A, R> {
    pub fn new(address: A, registry: R, config: ResolverConfig) -> Self {
        Self {
            address,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Free-text address → lot key and display addresses.
    #[instrument(skip(self))]
    pub async fn resolve_address(
        &self,
        address_text: &str,
    ) -> Result<ResolvedAddress, ResolveError> {
        let query = address_text.trim();
        if query.is_empty() {
            return Err(ResolveError::input("address", "address is required"));
        }

        let candidates = deadline(self.config.call_timeout, self.address.search(query))
            .await
            .map_err(ResolveError::AddressLookup)?;
        debug!(count = candidates.len(), "address candidates");

        let resolved = resolve_candidate(query, &candidates, self.config.candidate_policy)?;
        info!(lot = %resolved.lot, road = %resolved.road_address_text, "address resolved");
        Ok(resolved)
    }

    /// Floors present in the building.
    pub async fn resolve_floors_only(&self, lot: &LotKey) -> Result<FloorsOnly, ResolveError> {
        let outline = self.fetch(RegistryOperation::FloorOutline, lot).await?;
        let floors = self.floors_of(lot, &outline)?;
        Ok(FloorsOnly { floors })
    }

    /// Floor segments, representative segment and unit list of one floor.
    pub async fn resolve_floor_and_units(
        &self,
        lot: &LotKey,
        floor: FloorDescriptor,
    ) -> Result<FloorAndUnits, ResolveError> {
        let listings = self.fetch_listings(lot).await?;
        let floors = self.floors_of(lot, &listings.floor_outline)?;

        let floor_items = items_for_floor(&listings.floor_outline, floor);
        let pick = pick_representative(&floor_items).cloned().map(FloorPick::new);
        let units = list_units_on_floor(&listings, floor, self.config.sub_unit_policy);
        info!(
            %floor,
            segments = floor_items.len(),
            units = units.units.len(),
            "floor resolved"
        );

        Ok(FloorAndUnits {
            floors,
            floor,
            floor_items,
            pick,
            units,
        })
    }

    /// Exclusive area of one unit.
    pub async fn resolve_unit_area(
        &self,
        lot: &LotKey,
        floor: FloorDescriptor,
        unit_label: &str,
    ) -> Result<AreaResult, ResolveError> {
        if UnitKey::parse(unit_label, self.config.sub_unit_policy).is_empty() {
            return Err(ResolveError::input(
                "unit",
                format!("{unit_label:?} contains no unit number"),
            ));
        }
        let listings = self.fetch_listings(lot).await?;
        self.floors_of(lot, &listings.floor_outline)?;
        Ok(resolve_area(&listings, floor, unit_label, &self.config))
    }

    fn floors_of(
        &self,
        lot: &LotKey,
        outline: &[RegistryItem],
    ) -> Result<Vec<FloorDescriptor>, ResolveError> {
        if outline.is_empty() {
            return Err(ResolveError::NoFloorData { lot: lot.clone() });
        }
        Ok(collect_floors(outline, self.config.floor_order))
    }

    async fn fetch_listings(&self, lot: &LotKey) -> Result<RegistryListings, ResolveError> {
        let (floor_outline, unit_exposure, exclusive_shared) = tokio::try_join!(
            self.fetch(RegistryOperation::FloorOutline, lot),
            self.fetch(RegistryOperation::UnitExposure, lot),
            self.fetch(RegistryOperation::ExclusiveShared, lot),
        )?;
        Ok(RegistryListings {
            floor_outline,
            unit_exposure,
            exclusive_shared,
        })
    }

    #[instrument(skip(self, lot), fields(lot = %lot))]
    async fn fetch(
        &self,
        operation: RegistryOperation,
        lot: &LotKey,
    ) -> Result<Vec<RegistryItem>, ResolveError> {
        let items = deadline(self.config.call_timeout, self.registry.fetch(operation, lot))
            .await
            .map_err(|source| ResolveError::RegistryUnavailable { operation, source })?;
        debug!(count = items.len(), "registry items fetched");
        Ok(items)
    }
}

async fn deadline<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, LookupError>>,
) -> Result<T, LookupError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| LookupError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::area::{AreaSource, AreaWarning};
    use crate::floors::FloorType;
    use crate::registry::AddressCandidate;

    struct FakeAddress(Vec<AddressCandidate>);

    #[async_trait]
    impl AddressLookup for FakeAddress {
        async fn search(&self, _query: &str) -> Result<Vec<AddressCandidate>, LookupError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct FakeRegistry {
        listings: HashMap<RegistryOperation, Vec<RegistryItem>>,
        failing: Option<RegistryOperation>,
        stall: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegistryLookup for FakeRegistry {
        async fn fetch(
            &self,
            operation: RegistryOperation,
            _lot: &LotKey,
        ) -> Result<Vec<RegistryItem>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.stall {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.failing == Some(operation) {
                return Err(LookupError::Status {
                    code: "30".into(),
                    message: "SERVICE_KEY_IS_NOT_REGISTERED_ERROR".into(),
                });
            }
            Ok(self.listings.get(&operation).cloned().unwrap_or_default())
        }
    }

    fn lot() -> LotKey {
        LotKey::new("1168010100", 737, 0).unwrap()
    }

    fn floor(n: u32) -> FloorDescriptor {
        FloorDescriptor::new(FloorType::Above, n).unwrap()
    }

    fn item(flr: &str, ho: &str, code: &str, usage: &str, area: &str) -> RegistryItem {
        RegistryItem {
            floor_number: flr.into(),
            floor_type_label: "지상".into(),
            unit_label: ho.into(),
            area_classification_code: code.into(),
            usage_text: usage.into(),
            area: area.into(),
            ..Default::default()
        }
    }

    fn resolver(registry: FakeRegistry) -> Resolver<FakeAddress, FakeRegistry> {
        let address = FakeAddress(vec![AddressCandidate {
            administrative_code: "1168010100".into(),
            main_lot_number: 737,
            sub_lot_number: 0,
            road_address_text: "서울특별시 강남구 테헤란로 152".into(),
            lot_address_text: "서울특별시 강남구 역삼동 737".into(),
        }]);
        Resolver::new(address, registry, ResolverConfig::default())
    }

    fn registry(entries: Vec<(RegistryOperation, Vec<RegistryItem>)>) -> FakeRegistry {
        FakeRegistry {
            listings: entries.into_iter().collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn floor_pick_for_single_office_segment() {
        let r = resolver(registry(vec![(
            RegistryOperation::FloorOutline,
            vec![item("5", "", "", "업무시설", "120.50")],
        )]));

        let result = r.resolve_floor_and_units(&lot(), floor(5)).await.unwrap();
        let pick = result.pick.unwrap();
        let m = pick.measurement.unwrap();
        assert_eq!(m.area_m2, 120.5);
        assert_eq!(m.area_pyeong, 36.45);
        assert_eq!(result.floors, [floor(5)]);
        assert!(result.units.units.is_empty());
        assert!(result.units.note.is_some());
    }

    #[tokio::test]
    async fn unit_area_stage_a() {
        let r = resolver(registry(vec![
            (
                RegistryOperation::FloorOutline,
                vec![item("12", "", "", "업무시설", "900")],
            ),
            (
                RegistryOperation::ExclusiveShared,
                vec![item("12", "1209호", "1", "", "84.99")],
            ),
        ]));

        let AreaResult::Found(m) = r.resolve_unit_area(&lot(), floor(12), "1209").await.unwrap()
        else {
            panic!("expected a match");
        };
        assert_eq!(m.source, AreaSource::PubuseExclusive);
        assert_eq!(m.measurement.area_m2, 84.99);
    }

    #[tokio::test]
    async fn unit_area_floor_level_fallback() {
        let r = resolver(registry(vec![
            (
                RegistryOperation::FloorOutline,
                vec![item("12", "", "1", "업무시설", "200.0")],
            ),
            (
                RegistryOperation::ExclusiveShared,
                vec![item("12", "1209호", "1", "", "84.99")],
            ),
        ]));

        let AreaResult::Found(m) = r.resolve_unit_area(&lot(), floor(12), "1210").await.unwrap()
        else {
            panic!("expected a fallback match");
        };
        assert_eq!(m.source, AreaSource::FloorExclusiveFallback);
        assert_eq!(m.measurement.area_m2, 200.0);
        assert_eq!(m.warning, Some(AreaWarning::FloorLevelSubstitute));
    }

    #[tokio::test]
    async fn empty_address_lookup_is_address_not_found() {
        let r = Resolver::new(
            FakeAddress(Vec::new()),
            FakeRegistry::default(),
            ResolverConfig::default(),
        );
        let err = r.resolve_address("존재하지않는주소").await.unwrap_err();
        assert!(matches!(err, ResolveError::AddressNotFound { .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn blank_address_is_input_invalid() {
        let r = resolver(FakeRegistry::default());
        let err = r.resolve_address("   ").await.unwrap_err();
        assert!(matches!(err, ResolveError::InputInvalid { field: "address", .. }));
    }

    #[tokio::test]
    async fn resolve_address_builds_lot_key() {
        let r = resolver(FakeRegistry::default());
        let resolved = r.resolve_address("테헤란로 152").await.unwrap();
        assert_eq!(resolved.lot, lot());
        assert_eq!(resolved.lot_address_text, "서울특별시 강남구 역삼동 737");
    }

    #[tokio::test]
    async fn empty_floor_outline_is_no_floor_data() {
        let r = resolver(FakeRegistry::default());
        let err = r.resolve_floors_only(&lot()).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoFloorData { .. }));

        let err = r.resolve_floor_and_units(&lot(), floor(3)).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoFloorData { .. }));
    }

    #[tokio::test]
    async fn floors_only_fetches_one_listing() {
        let r = resolver(registry(vec![(
            RegistryOperation::FloorOutline,
            vec![
                item("2", "", "", "업무시설", "100"),
                item("1", "", "", "근린생활시설", "100"),
                item("2", "", "", "계단실", "10"),
            ],
        )]));
        let result = r.resolve_floors_only(&lot()).await.unwrap();
        assert_eq!(result.floors, [floor(1), floor(2)]);
        assert_eq!(r.registry.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn registry_error_is_surfaced() {
        let mut reg = registry(vec![(
            RegistryOperation::FloorOutline,
            vec![item("12", "", "", "업무시설", "900")],
        )]);
        reg.failing = Some(RegistryOperation::UnitExposure);
        let r = resolver(reg);

        let err = r.resolve_unit_area(&lot(), floor(12), "1209").await.unwrap_err();
        match err {
            ResolveError::RegistryUnavailable { operation, source } => {
                assert_eq!(operation, RegistryOperation::UnitExposure);
                assert!(matches!(source, LookupError::Status { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unit_without_digits_is_input_invalid() {
        let r = resolver(FakeRegistry::default());
        let err = r.resolve_unit_area(&lot(), floor(1), "관리실").await.unwrap_err();
        assert!(matches!(err, ResolveError::InputInvalid { field: "unit", .. }));
        assert_eq!(r.registry.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_registry_times_out() {
        let reg = FakeRegistry {
            stall: true,
            ..Default::default()
        };
        let r = Resolver::new(
            FakeAddress(Vec::new()),
            reg,
            ResolverConfig {
                call_timeout: Duration::from_secs(2),
                ..Default::default()
            },
        );
        let err = r.resolve_floors_only(&lot()).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::RegistryUnavailable {
                source: LookupError::Timeout(_),
                ..
            }
        ));
        assert_eq!(err.status_code(), 504);
    }
}
