//! Shared address and building-registry record types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::floors::{FloorDescriptor, FloorType};
use crate::measure::parse_area;
use crate::unit_key::{SubUnitPolicy, UnitKey};

/// One candidate returned by the road-address lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCandidate {
    /// 10 digits: 5-digit district (시군구) + 5-digit legal-dong (법정동).
    pub administrative_code: String,
    pub main_lot_number: u32,
    pub sub_lot_number: u32,
    pub road_address_text: String,
    pub lot_address_text: String,
}

/// Registry-mandated parcel identifier used for every registry query of one request.
///
/// Fields are private so a key can only come from [`LotKey::new`], which
/// enforces the fixed widths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LotKey {
    district_code: String,
    dong_code: String,
    main_lot: String,
    sub_lot: String,
}

impl LotKey {
    /// Build a lot key from a 10-digit administrative code and lot numbers.
    ///
    /// Returns `None` unless the code is exactly ten ASCII digits or when a
    /// lot number does not fit the 4-digit registry field.
    pub fn new(administrative_code: &str, main_lot: u32, sub_lot: u32) -> Option<Self> {
        let code = administrative_code.trim();
        if code.len() != 10 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if main_lot > 9999 || sub_lot > 9999 {
            return None;
        }
        Some(Self {
            district_code: code[..5].to_string(),
            dong_code: code[5..].to_string(),
            main_lot: format!("{main_lot:04}"),
            sub_lot: format!("{sub_lot:04}"),
        })
    }

    /// `sigunguCd`
    pub fn district_code(&self) -> &str {
        &self.district_code
    }

    /// `bjdongCd`
    pub fn dong_code(&self) -> &str {
        &self.dong_code
    }

    /// `bun`
    pub fn main_lot(&self) -> &str {
        &self.main_lot
    }

    /// `ji`
    pub fn sub_lot(&self) -> &str {
        &self.sub_lot
    }
}

impl fmt::Display for LotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}-{}",
            self.district_code, self.dong_code, self.main_lot, self.sub_lot
        )
    }
}

/// Outcome of address resolution: the lot key plus display addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub lot: LotKey,
    pub road_address_text: String,
    pub lot_address_text: String,
}

/// Building registry hub operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryOperation {
    /// 층별개요
    FloorOutline,
    /// 전유부
    UnitExposure,
    /// 전유공용면적
    ExclusiveShared,
}

impl RegistryOperation {
    /// Operation path segment on the registry hub.
    pub fn name(self) -> &'static str {
        match self {
            Self::FloorOutline => "getBrFlrOulnInfo",
            Self::UnitExposure => "getBrExposInfo",
            Self::ExclusiveShared => "getBrExposPubuseAreaInfo",
        }
    }
}

impl fmt::Display for RegistryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One registry `<item>`, already typed at the parse boundary.
///
/// All fields hold the registry's raw text; missing tags are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryItem {
    /// `flrNo`
    pub floor_number: String,
    /// `flrNoNm`, e.g. "지하1층"
    pub floor_number_label: String,
    /// `flrGbCdNm`, e.g. "지상" / "지하"
    pub floor_type_label: String,
    /// `mainPurpsCdNm`
    pub usage_text: String,
    /// `etcPurps`
    pub usage_detail_text: String,
    /// `hoNm`
    pub unit_label: String,
    /// `dongNm`
    pub building_name: String,
    /// `exposPubuseGbCd`: "1" exclusive, "2" shared
    pub area_classification_code: String,
    /// `exposPubuseGbCdNm`
    pub area_classification_label: String,
    pub area: String,
    /// `mgmBldrgstPk`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_pk: Option<String>,
}

impl RegistryItem {
    /// Floor this item belongs to, if its floor fields carry a positive number.
    pub fn floor(&self) -> Option<FloorDescriptor> {
        let number = crate::floors::leading_number(&self.floor_number)
            .or_else(|| crate::floors::leading_number(&self.floor_number_label))?;
        let floor_type = if self.floor_type_label.contains("지하")
            || self.floor_number_label.contains("지하")
        {
            FloorType::Below
        } else {
            FloorType::Above
        };
        FloorDescriptor::new(floor_type, number)
    }

    pub fn is_on(&self, floor: FloorDescriptor) -> bool {
        self.floor() == Some(floor)
    }

    /// Positive area in m², or `None` when absent or unparsable.
    pub fn area_m2(&self) -> Option<f64> {
        parse_area(&self.area)
    }

    /// Whether this is an exclusive (전유) rather than shared (공용) entry.
    pub fn is_exclusive(&self) -> bool {
        self.area_classification_code.trim() == "1"
            || self.area_classification_label.contains("전유")
    }

    /// Whether this is a shared (공용) area entry.
    pub fn is_shared(&self) -> bool {
        self.area_classification_code.trim() == "2"
            || self.area_classification_label.contains("공용")
    }

    pub fn unit_key(&self, policy: SubUnitPolicy) -> UnitKey {
        UnitKey::parse(&self.unit_label, policy)
    }

    /// Usage text used for representative scoring.
    pub fn usage(&self) -> String {
        format!("{} {}", self.usage_text, self.usage_detail_text)
            .trim()
            .to_string()
    }
}

/// The three registry listings fetched for one lot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryListings {
    pub floor_outline: Vec<RegistryItem>,
    pub unit_exposure: Vec<RegistryItem>,
    pub exclusive_shared: Vec<RegistryItem>,
}

impl RegistryListings {
    /// Every item of every listing, exclusive/shared first.
    pub fn all(&self) -> impl Iterator<Item = &RegistryItem> {
        self.exclusive_shared
            .iter()
            .chain(&self.unit_exposure)
            .chain(&self.floor_outline)
    }

    /// Distinct raw unit labels seen on a floor, first-seen order, at most `limit`.
    pub fn unit_label_samples(&self, floor: FloorDescriptor, limit: usize) -> Vec<String> {
        let mut samples: Vec<String> = Vec::new();
        for item in self.all().filter(|it| it.is_on(floor)) {
            let label = item.unit_label.trim();
            if label.is_empty() || samples.iter().any(|s| s == label) {
                continue;
            }
            if samples.len() == limit {
                break;
            }
            samples.push(label.to_string());
        }
        samples
    }
}
