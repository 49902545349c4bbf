//! UnitCatalog: the real unit labels on one floor.
//!
//! Labels are gathered from every listing because the registries are
//! maintained independently; a unit may appear in only one of them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::floors::FloorDescriptor;
use crate::measure::round2;
use crate::registry::RegistryListings;
use crate::unit_key::{SubUnitPolicy, UnitKey};

/// One unit on a floor, aggregated across listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub unit_key: UnitKey,
    /// Raw labels as the registries wrote them, first-seen order.
    pub label_variants: Vec<String>,
    pub has_exclusive_entry: bool,
    pub exclusive_area_m2: f64,
    pub shared_area_m2: f64,
}

impl UnitEntry {
    fn new(unit_key: UnitKey) -> Self {
        Self {
            unit_key,
            label_variants: Vec::new(),
            has_exclusive_entry: false,
            exclusive_area_m2: 0.0,
            shared_area_m2: 0.0,
        }
    }

    /// Label to show for this unit.
    pub fn display_label(&self) -> &str {
        self.label_variants
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.unit_key.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitListing {
    pub units: Vec<UnitEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// List the units on `floor`, ordered by unit number.
pub fn list_units_on_floor(
    listings: &RegistryListings,
    floor: FloorDescriptor,
    policy: SubUnitPolicy,
) -> UnitListing {
    let mut index: HashMap<UnitKey, usize> = HashMap::new();
    let mut units: Vec<UnitEntry> = Vec::new();

    let from_exclusive_shared = listings.exclusive_shared.iter().map(|it| (it, true));
    let from_others = listings
        .unit_exposure
        .iter()
        .chain(&listings.floor_outline)
        .map(|it| (it, false));

    for (item, area_listing) in from_exclusive_shared.chain(from_others) {
        if !item.is_on(floor) {
            continue;
        }
        let key = item.unit_key(policy);
        if key.is_empty() {
            continue;
        }

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            units.push(UnitEntry::new(key));
            units.len() - 1
        });
        let entry = &mut units[slot];

        let label = item.unit_label.trim();
        if !entry.label_variants.iter().any(|l| l == label) {
            entry.label_variants.push(label.to_string());
        }
        if item.is_exclusive() {
            entry.has_exclusive_entry = true;
        }
        if area_listing && let Some(area) = item.area_m2() {
            if item.is_exclusive() {
                entry.exclusive_area_m2 += area;
            } else if item.is_shared() {
                entry.shared_area_m2 += area;
            }
        }
    }

    for entry in &mut units {
        entry.exclusive_area_m2 = round2(entry.exclusive_area_m2);
        entry.shared_area_m2 = round2(entry.shared_area_m2);
    }

    units.sort_by(|a, b| {
        a.unit_key
            .numeric_cmp(&b.unit_key)
            .then_with(|| a.display_label().cmp(b.display_label()))
            .then_with(|| a.unit_key.as_str().cmp(b.unit_key.as_str()))
    });

    let note = units.is_empty().then(|| {
        format!("no unit-level records on floor {floor} in any registry listing")
    });
    UnitListing { units, note }
}
