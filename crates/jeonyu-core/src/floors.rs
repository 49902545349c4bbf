//! FloorCatalog: real floors of a building and the representative record per floor.
//!
//! Floor-outline data legitimately carries several purpose-tagged segments per
//! floor (an office segment, a corridor segment, a shared stairwell). The
//! representative pick prefers the primary usable space over ancillary space.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::measure::Measurement;
use crate::registry::RegistryItem;

/// Subtracted from the score of shared/common segments.
pub const SHARED_USAGE_PENALTY: f64 = 100_000.0;
/// Added to the score of business/office segments.
pub const OFFICE_USAGE_BONUS: f64 = 50_000.0;

const SHARED_USAGE_TERMS: &[&str] = &["공용", "공유"];
const OFFICE_USAGE_TERMS: &[&str] = &["업무", "사무소"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloorType {
    /// 지하
    Below,
    /// 지상
    Above,
}

/// A physical floor: above-ground 12 or below-ground 2 (B2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorDescriptor {
    pub floor_type: FloorType,
    pub number: u32,
}

impl FloorDescriptor {
    /// Floor 0 does not exist in the registry.
    pub fn new(floor_type: FloorType, number: u32) -> Option<Self> {
        (number > 0).then_some(Self { floor_type, number })
    }

    /// Parse user input: "12", "12층", "지상12", "12F", "B2", "지하2층", "-2".
    pub fn parse_input(input: &str) -> Option<Self> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let below = compact.starts_with('-')
            || compact.starts_with(['B', 'b'])
            || compact.contains("지하");
        let floor_type = if below {
            FloorType::Below
        } else {
            FloorType::Above
        };
        Self::new(floor_type, leading_number(&compact)?)
    }

    /// Signed level: B2 = -2, 1 = 1.
    pub fn level(&self) -> i64 {
        match self.floor_type {
            FloorType::Below => -i64::from(self.number),
            FloorType::Above => i64::from(self.number),
        }
    }
}

impl fmt::Display for FloorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.floor_type {
            FloorType::Below => write!(f, "B{}", self.number),
            FloorType::Above => write!(f, "{}", self.number),
        }
    }
}

/// Where below-ground floors go in a floor listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloorOrder {
    /// B3, B2, B1, 1, 2, 3
    #[default]
    BelowFirst,
    /// 1, 2, 3, B1, B2, B3
    AboveFirst,
}

impl FloorOrder {
    pub fn compare(self, a: &FloorDescriptor, b: &FloorDescriptor) -> Ordering {
        match self {
            Self::BelowFirst => a.level().cmp(&b.level()),
            Self::AboveFirst => {
                let rank = |f: &FloorDescriptor| match f.floor_type {
                    FloorType::Above => 0,
                    FloorType::Below => 1,
                };
                rank(a).cmp(&rank(b)).then(a.number.cmp(&b.number))
            }
        }
    }
}

/// First run of ASCII digits as a number: "3", "지상3", "3층", "03" → 3.
pub(crate) fn leading_number(raw: &str) -> Option<u32> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let digits: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Deduplicated, ordered floors present in a floor-outline listing.
pub fn collect_floors(items: &[RegistryItem], order: FloorOrder) -> Vec<FloorDescriptor> {
    let mut floors: Vec<FloorDescriptor> = items.iter().filter_map(RegistryItem::floor).collect();
    floors.sort_by(|a, b| order.compare(a, b));
    floors.dedup();
    floors
}

/// All items on the given floor, in listing order.
pub fn items_for_floor(items: &[RegistryItem], floor: FloorDescriptor) -> Vec<RegistryItem> {
    items.iter().filter(|it| it.is_on(floor)).cloned().collect()
}

/// Usage-based ranking of one floor-outline segment.
///
/// Compared field by field, so a non-shared segment with a positive area
/// always outranks a shared one whatever the magnitudes involved.
#[derive(Debug, Clone, Copy, PartialEq)]
struct UsageScore {
    has_area: bool,
    not_shared: bool,
    office: bool,
    score: f64,
    area: f64,
}

impl UsageScore {
    fn of(item: &RegistryItem) -> Self {
        let usage = item.usage();
        let area = item.area_m2().unwrap_or(0.0);
        let shared = SHARED_USAGE_TERMS.iter().any(|t| usage.contains(t));
        let office = OFFICE_USAGE_TERMS.iter().any(|t| usage.contains(t));

        let mut score = area;
        if shared {
            score -= SHARED_USAGE_PENALTY;
        }
        if office {
            score += OFFICE_USAGE_BONUS;
        }

        Self {
            has_area: area > 0.0,
            not_shared: !shared,
            office,
            score,
            area,
        }
    }

    fn rank(&self, other: &Self) -> Ordering {
        self.has_area
            .cmp(&other.has_area)
            .then(self.not_shared.cmp(&other.not_shared))
            .then(self.office.cmp(&other.office))
            .then(self.score.total_cmp(&other.score))
            .then(self.area.total_cmp(&other.area))
    }
}

/// Pick the "headline" record of a floor. Earlier items win exact ties.
pub fn pick_representative(items: &[RegistryItem]) -> Option<&RegistryItem> {
    let mut best: Option<(&RegistryItem, UsageScore)> = None;
    for item in items {
        let score = UsageScore::of(item);
        match &best {
            Some((_, top)) if score.rank(top) != Ordering::Greater => {}
            _ => best = Some((item, score)),
        }
    }
    best.map(|(item, _)| item)
}

/// Representative record of a floor with its converted area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPick {
    pub item: RegistryItem,
    #[serde(flatten)]
    pub measurement: Option<Measurement>,
}

impl FloorPick {
    pub fn new(item: RegistryItem) -> Self {
        let measurement = item.area_m2().map(Measurement::from_square_meters);
        Self { item, measurement }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(n: u32) -> FloorDescriptor {
        FloorDescriptor::new(FloorType::Above, n).unwrap()
    }

    fn basement(n: u32) -> FloorDescriptor {
        FloorDescriptor::new(FloorType::Below, n).unwrap()
    }

    fn segment(flr: &str, usage: &str, area: &str) -> RegistryItem {
        RegistryItem {
            floor_number: flr.into(),
            floor_type_label: "지상".into(),
            usage_text: usage.into(),
            area: area.into(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_floor_input() {
        assert_eq!(FloorDescriptor::parse_input("12"), Some(floor(12)));
        assert_eq!(FloorDescriptor::parse_input("12층"), Some(floor(12)));
        assert_eq!(FloorDescriptor::parse_input("지상 12층"), Some(floor(12)));
        assert_eq!(FloorDescriptor::parse_input("08"), Some(floor(8)));
        assert_eq!(FloorDescriptor::parse_input("B2"), Some(basement(2)));
        assert_eq!(FloorDescriptor::parse_input("지하2층"), Some(basement(2)));
        assert_eq!(FloorDescriptor::parse_input("-1"), Some(basement(1)));
        assert_eq!(FloorDescriptor::parse_input("0"), None);
        assert_eq!(FloorDescriptor::parse_input("옥상"), None);
        assert_eq!(FloorDescriptor::parse_input(""), None);
    }

    #[test]
    fn floors_are_deduplicated_and_ordered() {
        let mut items = vec![
            segment("3", "업무시설", "100"),
            segment("1", "근린생활시설", "80"),
            segment("3층", "계단실", "10"),
            segment("지상2", "업무시설", "100"),
        ];
        items.push(RegistryItem {
            floor_number: "1".into(),
            floor_type_label: "지하".into(),
            ..Default::default()
        });
        items.push(RegistryItem {
            floor_number: "2".into(),
            floor_type_label: "지하".into(),
            ..Default::default()
        });

        let below_first = collect_floors(&items, FloorOrder::BelowFirst);
        let labels: Vec<String> = below_first.iter().map(|f| f.to_string()).collect();
        assert_eq!(labels, ["B2", "B1", "1", "2", "3"]);

        let above_first = collect_floors(&items, FloorOrder::AboveFirst);
        let labels: Vec<String> = above_first.iter().map(|f| f.to_string()).collect();
        assert_eq!(labels, ["1", "2", "3", "B1", "B2"]);
    }

    #[test]
    fn items_for_floor_keeps_listing_order() {
        let items = vec![
            segment("5", "업무시설", "120.50"),
            segment("6", "업무시설", "130"),
            segment("5", "복도", "20"),
        ];
        let on_five = items_for_floor(&items, floor(5));
        assert_eq!(on_five.len(), 2);
        assert_eq!(on_five[1].usage_text, "복도");
        assert!(items_for_floor(&items, basement(5)).is_empty());
    }

    #[test]
    fn office_beats_larger_non_office() {
        let items = vec![
            segment("5", "근린생활시설", "300"),
            segment("5", "업무시설", "120"),
        ];
        let pick = pick_representative(&items).unwrap();
        assert_eq!(pick.usage_text, "업무시설");
    }

    #[test]
    fn shared_never_beats_positive_non_shared() {
        let items = vec![
            segment("5", "공용부분(업무시설)", "900000"),
            segment("5", "계단실", "4.2"),
        ];
        let pick = pick_representative(&items).unwrap();
        assert_eq!(pick.usage_text, "계단실");
    }

    #[test]
    fn shared_item_wins_when_it_is_the_only_one_with_area() {
        let items = vec![segment("5", "복도", "0"), segment("5", "공용", "55")];
        assert_eq!(pick_representative(&items).unwrap().usage_text, "공용");
    }

    #[test]
    fn ties_keep_larger_area_then_first() {
        let items = vec![
            segment("5", "업무시설", "100"),
            segment("5", "업무시설", "150"),
            segment("5", "사무소", "150"),
        ];
        let pick = pick_representative(&items).unwrap();
        assert_eq!(pick.usage_text, "업무시설");
        assert_eq!(pick.area, "150");
    }

    #[test]
    fn empty_floor_has_no_pick() {
        assert!(pick_representative(&[]).is_none());
    }

    #[test]
    fn floor_pick_converts_area() {
        let pick = FloorPick::new(segment("5", "업무시설", "120.50"));
        let m = pick.measurement.unwrap();
        assert_eq!(m.area_m2, 120.5);
        assert_eq!(m.area_pyeong, 36.45);
    }
}
