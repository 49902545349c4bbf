//! Unit-label normalisation for registry `hoNm` values.
//!
//! The exclusive/shared listing, the unit listing and the floor outline are
//! maintained independently and label the same unit in different ways:
//! "1209호", "1209", " 1209 ", "제1209호", "1209-1호". Every comparison between
//! a requested unit and a registry record goes through [`UnitKey::parse`] so the
//! three sources and the user's input agree on one canonical key.
//!
//! # Rule
//!
//! 1. Drop all whitespace.
//! 2. Find the first run of ASCII digits.
//! 3. Under [`SubUnitPolicy::Preserve`], keep a directly following `-` plus digit
//!    run ("1209-1"). Under [`SubUnitPolicy::Discard`], stop at the first run.
//! 4. Everything else (the `호` glyph, building prefixes, letters) is dropped.
//!
//! A label without digits yields the empty key, which never matches anything.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the sub-unit suffix ("-1" in "1209-1호") is part of the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubUnitPolicy {
    /// "1209-1호" → "1209-1"
    #[default]
    Preserve,
    /// "1209-1호" → "1209"
    Discard,
}

/// Normalised unit identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitKey(String);

impl UnitKey {
    /// Normalise a raw unit label.
    pub fn parse(raw: &str, policy: SubUnitPolicy) -> Self {
        let compact: Vec<char> = raw.chars().filter(|c| !c.is_whitespace()).collect();

        let Some(start) = compact.iter().position(|c| c.is_ascii_digit()) else {
            return Self::default();
        };

        let mut key = String::new();
        let mut i = start;
        while i < compact.len() && compact[i].is_ascii_digit() {
            key.push(compact[i]);
            i += 1;
        }

        if policy == SubUnitPolicy::Preserve
            && i + 1 < compact.len()
            && compact[i] == '-'
            && compact[i + 1].is_ascii_digit()
        {
            key.push('-');
            i += 1;
            while i < compact.len() && compact[i].is_ascii_digit() {
                key.push(compact[i]);
                i += 1;
            }
        }

        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading digit run, without any sub-unit suffix.
    pub fn digits(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }

    /// Sub-unit suffix digits, if the key carries one.
    pub fn sub_unit(&self) -> Option<&str> {
        self.0.split_once('-').map(|(_, sub)| sub)
    }

    /// Numeric value of the leading digit run, for ordering.
    ///
    /// Saturates on absurdly long runs rather than failing.
    pub fn number(&self) -> u64 {
        self.digits().parse().unwrap_or(u64::MAX)
    }

    /// Exact match. The empty key matches nothing, not even itself.
    pub fn matches(&self, other: &UnitKey) -> bool {
        !self.is_empty() && self.0 == other.0
    }

    /// Same leading digit run where at most one side carries a sub-unit
    /// suffix: "1209" ~ "1209-1", but "1209-1" and "1209-2" are different units.
    pub fn matches_digits(&self, other: &UnitKey) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.digits() == other.digits()
            && (self.sub_unit().is_none() || other.sub_unit().is_none())
    }

    /// `other` is a sub-unit of `self`: "1209" → "1209-1".
    pub fn is_parent_of(&self, other: &UnitKey) -> bool {
        !self.is_empty()
            && other
                .0
                .strip_prefix(self.0.as_str())
                .is_some_and(|rest| rest.starts_with('-'))
    }

    /// Ordering used for unit listings: numeric value first, then the suffix.
    pub fn numeric_cmp(&self, other: &UnitKey) -> Ordering {
        self.number()
            .cmp(&other.number())
            .then_with(|| sub_unit_number(self).cmp(&sub_unit_number(other)))
    }
}

fn sub_unit_number(key: &UnitKey) -> Option<u64> {
    key.sub_unit().map(|s| s.parse().unwrap_or(u64::MAX))
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
