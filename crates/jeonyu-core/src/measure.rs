//! Area parsing and m² / pyeong conversion.

use serde::{Deserialize, Serialize};

/// Square meters per pyeong.
pub const SQUARE_METERS_PER_PYEONG: f64 = 3.305785;

/// Parse a registry area string.
///
/// Zero, negative, and non-finite values are treated as absent: the registry
/// uses `0` for "not recorded", never for a real zero-area unit.
pub fn parse_area(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Round half-up to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// An area in both units, each rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub area_m2: f64,
    pub area_pyeong: f64,
}

impl Measurement {
    pub fn from_square_meters(area_m2: f64) -> Self {
        Self {
            area_m2: round2(area_m2),
            area_pyeong: round2(area_m2 / SQUARE_METERS_PER_PYEONG),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings() {
        assert_eq!(parse_area("84.99"), Some(84.99));
        assert_eq!(parse_area(" 120.50 "), Some(120.5));
    }

    #[test]
    fn zero_and_garbage_are_absent() {
        assert_eq!(parse_area("0"), None);
        assert_eq!(parse_area("0.00"), None);
        assert_eq!(parse_area("-3"), None);
        assert_eq!(parse_area(""), None);
        assert_eq!(parse_area("NaN"), None);
        assert_eq!(parse_area("inf"), None);
        assert_eq!(parse_area("12㎡"), None);
    }

    #[test]
    fn converts_to_pyeong() {
        let m = Measurement::from_square_meters(120.5);
        assert_eq!(m.area_m2, 120.5);
        assert_eq!(m.area_pyeong, 36.45);

        let m = Measurement::from_square_meters(84.99);
        assert_eq!(m.area_pyeong, 25.71);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round2(36.4512), 36.45);
        assert_eq!(round2(1.125), 1.13);
        assert_eq!(round2(10.0), 10.0);
    }
}
