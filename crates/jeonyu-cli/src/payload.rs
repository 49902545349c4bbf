//! JSON payloads written to stdout.
//!
//! Every payload carries `ok`, the build stamp and a generation time; the
//! rest is flattened in from the mode-specific body.

use jeonyu_core::{
    AreaMatch, AreaMiss, FloorDescriptor, FloorPick, FloorType, LotKey, RegistryItem,
    ResolveError, ResolvedAddress, UnitEntry,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    pub build: &'static str,
    pub generated_at: String,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(ok: bool, build: &'static str, body: T) -> Self {
        Self {
            ok,
            build,
            generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            body,
        }
    }
}

/// Registry query parameters derived from the address.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Keys {
    pub sigungu_cd: String,
    pub bjdong_cd: String,
    pub bun: String,
    pub ji: String,
}

impl From<&LotKey> for Keys {
    fn from(lot: &LotKey) -> Self {
        Self {
            sigungu_cd: lot.district_code().to_string(),
            bjdong_cd: lot.dong_code().to_string(),
            bun: lot.main_lot().to_string(),
            ji: lot.sub_lot().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddressPart {
    pub input: String,
    pub road: String,
    pub jibun: String,
    pub keys: Keys,
}

impl AddressPart {
    pub fn new(input: &str, resolved: &ResolvedAddress) -> Self {
        Self {
            input: input.trim().to_string(),
            road: resolved.road_address_text.clone(),
            jibun: resolved.lot_address_text.clone(),
            keys: Keys::from(&resolved.lot),
        }
    }
}

/// A floor as shown to callers: "B2", "12".
#[derive(Debug, Serialize)]
pub struct FloorLabel {
    pub label: String,
    #[serde(flatten)]
    pub floor: FloorDescriptor,
}

impl From<FloorDescriptor> for FloorLabel {
    fn from(floor: FloorDescriptor) -> Self {
        Self {
            label: floor.to_string(),
            floor,
        }
    }
}

/// Highest above-ground floor number, if any.
pub fn max_floor(floors: &[FloorDescriptor]) -> Option<u32> {
    floors
        .iter()
        .filter(|f| f.floor_type == FloorType::Above)
        .map(|f| f.number)
        .max()
}

#[derive(Debug, Serialize)]
pub struct FloorList {
    pub mode: &'static str,
    #[serde(flatten)]
    pub address: AddressPart,
    pub floors: Vec<FloorLabel>,
    pub max_floor: Option<u32>,
}

impl FloorList {
    pub fn new(address: AddressPart, floors: Vec<FloorDescriptor>) -> Self {
        Self {
            mode: "floor-list",
            address,
            max_floor: max_floor(&floors),
            floors: floors.into_iter().map(FloorLabel::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FloorDetail {
    pub mode: &'static str,
    #[serde(flatten)]
    pub address: AddressPart,
    pub floors: Vec<FloorLabel>,
    pub max_floor: Option<u32>,
    pub floor: FloorLabel,
    pub floor_items: Vec<RegistryItem>,
    pub floor_pick: Option<FloorPick>,
    pub units: Vec<UnitEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UnitArea {
    pub mode: &'static str,
    #[serde(flatten)]
    pub address: AddressPart,
    pub floor: FloorLabel,
    pub unit: String,
    #[serde(flatten)]
    pub area: AreaMatch,
}

#[derive(Debug, Serialize)]
pub struct UnitAreaMissing {
    pub mode: &'static str,
    pub status: u16,
    pub message: String,
    #[serde(flatten)]
    pub address: AddressPart,
    pub floor: FloorLabel,
    pub unit: String,
    #[serde(flatten)]
    pub miss: AreaMiss,
}

#[derive(Debug, Serialize)]
pub struct Failure {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub message: String,
}

impl Failure {
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ResolveError>() {
            Some(resolve) => Self {
                status: resolve.status_code(),
                kind: Some(resolve.kind()),
                message: resolve.to_string(),
            },
            None => Self {
                status: 500,
                kind: None,
                message: format!("{err:#}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use jeonyu_core::{AreaResult, ResolverConfig, RegistryListings, resolve_area};
    use serde_json::Value;

    use super::*;

    fn resolved() -> ResolvedAddress {
        ResolvedAddress {
            lot: LotKey::new("1168010100", 737, 0).unwrap(),
            road_address_text: "서울특별시 강남구 테헤란로 152".into(),
            lot_address_text: "서울특별시 강남구 역삼동 737".into(),
        }
    }

    fn above(n: u32) -> FloorDescriptor {
        FloorDescriptor::new(FloorType::Above, n).unwrap()
    }

    #[test]
    fn floor_list_payload() {
        let floors = vec![
            FloorDescriptor::new(FloorType::Below, 1).unwrap(),
            above(1),
            above(12),
        ];
        let body = FloorList::new(AddressPart::new(" 테헤란로 152 ", &resolved()), floors);
        let json = serde_json::to_value(Envelope::new(true, "test", body)).unwrap();

        assert_eq!(json["ok"], Value::Bool(true));
        assert_eq!(json["build"], "test");
        assert_eq!(json["mode"], "floor-list");
        assert_eq!(json["input"], "테헤란로 152");
        assert_eq!(json["keys"]["sigunguCd"], "11680");
        assert_eq!(json["keys"]["bjdongCd"], "10100");
        assert_eq!(json["keys"]["bun"], "0737");
        assert_eq!(json["keys"]["ji"], "0000");
        assert_eq!(json["max_floor"], 12);
        assert_eq!(json["floors"][0]["label"], "B1");
        assert!(json["generated_at"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn max_floor_ignores_basements() {
        assert_eq!(max_floor(&[FloorDescriptor::new(FloorType::Below, 3).unwrap()]), None);
        assert_eq!(max_floor(&[above(2), above(7)]), Some(7));
    }

    #[test]
    fn unit_area_payload_flattens_measurement() {
        let listings = RegistryListings {
            exclusive_shared: vec![RegistryItem {
                floor_number: "12".into(),
                unit_label: "1209호".into(),
                area_classification_code: "1".into(),
                area: "84.99".into(),
                ..RegistryItem::default()
            }],
            ..RegistryListings::default()
        };
        let AreaResult::Found(area) =
            resolve_area(&listings, above(12), "1209호", &ResolverConfig::default())
        else {
            panic!("expected a match");
        };
        let body = UnitArea {
            mode: "unit-area",
            address: AddressPart::new("테헤란로 152", &resolved()),
            floor: above(12).into(),
            unit: "1209호".into(),
            area,
        };
        let json = serde_json::to_value(Envelope::new(true, "test", body)).unwrap();
        assert_eq!(json["area_m2"], 84.99);
        assert_eq!(json["area_pyeong"], 25.71);
        assert_eq!(json["source"], "pubuse-exclusive");
        assert_eq!(json["match_kind"], "exact");
        assert_eq!(json["matched"]["unit_key"], "1209");
        assert!(json.get("warning").is_none());
    }

    #[test]
    fn failure_from_resolve_error() {
        let err = anyhow::Error::new(ResolveError::InputInvalid {
            field: "floor",
            reason: "no floor number".into(),
        });
        let failure = Failure::from_error(&err);
        assert_eq!(failure.status, 400);
        assert_eq!(failure.kind, Some("input-invalid"));

        let other = Failure::from_error(&anyhow::anyhow!("JUSO_KEY is not set"));
        assert_eq!(other.status, 500);
        assert_eq!(other.kind, None);
    }
}
