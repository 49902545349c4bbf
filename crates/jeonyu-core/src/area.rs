//! AreaResolver: the ordered cascade that turns (floor, unit label) into an
//! exclusive area.
//!
//! Each stage is a pure function over the fetched listings returning either a
//! hit or a [`Fallthrough`] reason. The resolver runs them in order, stops at
//! the first hit, and records every attempt so callers can see why an answer
//! (or a miss) came out the way it did.
//!
//! | stage | listing | match | source |
//! |---|---|---|---|
//! | A | exclusive/shared | exact key, 전유 flag | `pubuse-exclusive` |
//! | B | unit, then floor outline | exact key | `expos-direct` |
//! | C | all | base unit of a suffixed request, then sub-unit of the request | A or B |
//! | D | exclusive/shared, then floor outline | 전유 entry without unit digits | `floor-exclusive-fallback` |

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::floors::FloorDescriptor;
use crate::measure::Measurement;
use crate::registry::{RegistryItem, RegistryListings};
use crate::unit_key::{SubUnitPolicy, UnitKey};

/// Where the returned area came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaSource {
    PubuseExclusive,
    ExposDirect,
    FloorExclusiveFallback,
}

/// How the matched record's unit label related to the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    Exact,
    /// The record is the base unit of a suffixed request ("1209-2" → "1209").
    LeadingDigits,
    /// The record is a sub-unit of the request ("1209" → "1209-1").
    SubUnitPrefix,
    FloorLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaWarning {
    /// The value is a floor-wide exclusive area, not a unit-specific figure.
    FloorLevelSubstitute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    PubuseExclusive,
    ExposDirect,
    LooseMatch,
    FloorExclusiveFallback,
}

/// Why a stage produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum Fallthrough {
    /// No record on the floor carries a matching unit key.
    NoMatchingRecord,
    /// Matching records exist but none is flagged 전유.
    NotExclusive,
    /// Matching records exist but none has a positive area.
    NoPositiveArea,
    /// A loose rule matched several distinct units.
    Ambiguous { candidates: Vec<UnitKey> },
    /// A unit-level record matches, so this stage does not apply.
    UnitMatchExists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAttempt {
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: Fallthrough,
}

/// The registry record the area was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRecord {
    pub unit_label: String,
    pub unit_key: UnitKey,
    pub floor_number: String,
    pub building_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_pk: Option<String>,
}

impl MatchedRecord {
    fn of(item: &RegistryItem, policy: SubUnitPolicy) -> Self {
        Self {
            unit_label: item.unit_label.trim().to_string(),
            unit_key: item.unit_key(policy),
            floor_number: item.floor_number.clone(),
            building_name: item.building_name.clone(),
            registry_pk: item.registry_pk.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaMatch {
    #[serde(flatten)]
    pub measurement: Measurement,
    pub source: AreaSource,
    pub match_kind: MatchKind,
    pub matched: MatchedRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<AreaWarning>,
    pub attempts: Vec<StageAttempt>,
}

/// Cascade exhausted. Carries what was searched for and what the floor holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaMiss {
    pub want_key: UnitKey,
    pub unit_label_samples: Vec<String>,
    pub attempts: Vec<StageAttempt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum AreaResult {
    Found(AreaMatch),
    NotFound(AreaMiss),
}

impl AreaResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Inputs shared by every stage.
struct Query<'a> {
    listings: &'a RegistryListings,
    floor: FloorDescriptor,
    want: UnitKey,
    policy: SubUnitPolicy,
}

impl<'a> Query<'a> {
    fn on_floor<'b>(
        &self,
        items: impl IntoIterator<Item = &'b RegistryItem>,
    ) -> impl Iterator<Item = &'b RegistryItem> {
        let floor = self.floor;
        items.into_iter().filter(move |it| it.is_on(floor))
    }

    fn secondary(&self) -> impl Iterator<Item = &'a RegistryItem> {
        self.listings
            .unit_exposure
            .iter()
            .chain(&self.listings.floor_outline)
    }

    fn key(&self, item: &RegistryItem) -> UnitKey {
        item.unit_key(self.policy)
    }

    fn any_exact_match(&self) -> bool {
        self.on_floor(self.listings.all())
            .any(|it| self.want.matches(&self.key(it)))
    }

    fn any_unit_match(&self) -> bool {
        self.on_floor(self.listings.all())
            .any(|it| self.want.matches_digits(&self.key(it)))
    }
}

struct Hit<'a> {
    item: &'a RegistryItem,
    area: f64,
    source: AreaSource,
    match_kind: MatchKind,
}

type Strategy = for<'a> fn(&Query<'a>) -> Result<Hit<'a>, Fallthrough>;

const CASCADE: &[(Stage, Strategy)] = &[
    (Stage::PubuseExclusive, pubuse_exclusive),
    (Stage::ExposDirect, expos_direct),
    (Stage::LooseMatch, loose_match),
    (Stage::FloorExclusiveFallback, floor_exclusive_fallback),
];

/// Resolve the exclusive area of `want_label` on `floor`.
///
/// Deterministic: identical listings and inputs give an identical result.
pub fn resolve_area(
    listings: &RegistryListings,
    floor: FloorDescriptor,
    want_label: &str,
    config: &ResolverConfig,
) -> AreaResult {
    let query = Query {
        listings,
        floor,
        want: UnitKey::parse(want_label, config.sub_unit_policy),
        policy: config.sub_unit_policy,
    };
    let mut attempts = Vec::new();

    if !query.want.is_empty() {
        for &(stage, strategy) in CASCADE {
            match strategy(&query) {
                Ok(hit) => {
                    let result = found(&query, hit, attempts);
                    return AreaResult::Found(result);
                }
                Err(outcome) => {
                    debug!(?stage, ?outcome, want = %query.want, "cascade stage fell through");
                    attempts.push(StageAttempt { stage, outcome });
                }
            }
        }
    }

    let unit_label_samples = listings.unit_label_samples(floor, config.sample_limit);
    info!(
        floor = %floor,
        want = %query.want,
        samples = unit_label_samples.len(),
        "unit area not found"
    );
    AreaResult::NotFound(AreaMiss {
        want_key: query.want,
        unit_label_samples,
        attempts,
    })
}

fn found(query: &Query<'_>, hit: Hit<'_>, attempts: Vec<StageAttempt>) -> AreaMatch {
    let warning = (hit.source == AreaSource::FloorExclusiveFallback)
        .then_some(AreaWarning::FloorLevelSubstitute);
    let matched = MatchedRecord::of(hit.item, query.policy);

    if warning.is_some() {
        warn!(
            floor = %query.floor,
            want = %query.want,
            area = hit.area,
            "no unit-level record, returning floor-level exclusive area"
        );
    } else {
        info!(
            floor = %query.floor,
            want = %query.want,
            matched = %matched.unit_label,
            source = ?hit.source,
            match_kind = ?hit.match_kind,
            area = hit.area,
            "unit area resolved"
        );
    }

    AreaMatch {
        measurement: Measurement::from_square_meters(hit.area),
        source: hit.source,
        match_kind: hit.match_kind,
        matched,
        warning,
        attempts,
    }
}

// ── Area extraction ──

/// First exclusive entry with a positive area among `candidates`.
fn exclusive_area<'a>(
    candidates: &[&'a RegistryItem],
    match_kind: MatchKind,
) -> Result<Hit<'a>, Fallthrough> {
    if candidates.is_empty() {
        return Err(Fallthrough::NoMatchingRecord);
    }
    let exclusive: Vec<&RegistryItem> = candidates
        .iter()
        .copied()
        .filter(|it| it.is_exclusive())
        .collect();
    if exclusive.is_empty() {
        return Err(Fallthrough::NotExclusive);
    }
    exclusive
        .into_iter()
        .find_map(|item| {
            item.area_m2().map(|area| Hit {
                item,
                area,
                source: AreaSource::PubuseExclusive,
                match_kind,
            })
        })
        .ok_or(Fallthrough::NoPositiveArea)
}

/// First entry with a positive area among `candidates`.
fn direct_area<'a>(
    candidates: &[&'a RegistryItem],
    match_kind: MatchKind,
) -> Result<Hit<'a>, Fallthrough> {
    if candidates.is_empty() {
        return Err(Fallthrough::NoMatchingRecord);
    }
    candidates
        .iter()
        .find_map(|&item| {
            item.area_m2().map(|area| Hit {
                item,
                area,
                source: AreaSource::ExposDirect,
                match_kind,
            })
        })
        .ok_or(Fallthrough::NoPositiveArea)
}

// ── Stages ──

fn pubuse_exclusive<'a>(q: &Query<'a>) -> Result<Hit<'a>, Fallthrough> {
    let candidates: Vec<&RegistryItem> = q
        .on_floor(&q.listings.exclusive_shared)
        .filter(|it| q.want.matches(&q.key(it)))
        .collect();
    exclusive_area(&candidates, MatchKind::Exact)
}

fn expos_direct<'a>(q: &Query<'a>) -> Result<Hit<'a>, Fallthrough> {
    let candidates: Vec<&RegistryItem> = q
        .on_floor(q.secondary())
        .filter(|it| q.want.matches(&q.key(it)))
        .collect();
    direct_area(&candidates, MatchKind::Exact)
}

fn loose_match<'a>(q: &Query<'a>) -> Result<Hit<'a>, Fallthrough> {
    if q.any_exact_match() {
        return Err(Fallthrough::UnitMatchExists);
    }

    // (i) the record is the base unit of a suffixed request: "1209-2" → "1209";
    // (ii) the record is a sub-unit of the request: "1209" → "1209-1".
    let rules: [(MatchKind, fn(&UnitKey, &UnitKey) -> bool); 2] = [
        (MatchKind::LeadingDigits, |want: &UnitKey, key: &UnitKey| key.is_parent_of(want)),
        (MatchKind::SubUnitPrefix, |want: &UnitKey, key: &UnitKey| want.is_parent_of(key)),
    ];

    for (match_kind, rule) in rules {
        let mut keys: Vec<UnitKey> = Vec::new();
        for item in q.on_floor(q.listings.all()) {
            let key = q.key(item);
            if rule(&q.want, &key) && !keys.contains(&key) {
                keys.push(key);
            }
        }

        match keys.len() {
            0 => continue,
            1 => {}
            _ => {
                keys.sort_by(|a, b| a.numeric_cmp(b));
                return Err(Fallthrough::Ambiguous { candidates: keys });
            }
        }

        let target = &keys[0];
        let primary: Vec<&RegistryItem> = q
            .on_floor(&q.listings.exclusive_shared)
            .filter(|it| q.key(it) == *target)
            .collect();
        let primary_miss = match exclusive_area(&primary, match_kind) {
            Ok(hit) => return Ok(hit),
            Err(reason) => reason,
        };

        let secondary: Vec<&RegistryItem> = q
            .on_floor(q.secondary())
            .filter(|it| q.key(it) == *target)
            .collect();
        return match direct_area(&secondary, match_kind) {
            Err(Fallthrough::NoMatchingRecord) => Err(primary_miss),
            other => other,
        };
    }

    Err(Fallthrough::NoMatchingRecord)
}

fn floor_exclusive_fallback<'a>(q: &Query<'a>) -> Result<Hit<'a>, Fallthrough> {
    if q.any_unit_match() {
        return Err(Fallthrough::UnitMatchExists);
    }

    let floor_wide: Vec<&RegistryItem> = q
        .on_floor(
            q.listings
                .exclusive_shared
                .iter()
                .chain(&q.listings.floor_outline),
        )
        .filter(|it| q.key(it).is_empty())
        .collect();

    let mut hit = exclusive_area(&floor_wide, MatchKind::FloorLevel)?;
    hit.source = AreaSource::FloorExclusiveFallback;
    Ok(hit)
}
