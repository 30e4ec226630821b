//! Symbolic-key catalogs shared with the directory server.
//!
//! # Responsibility
//! - Map server enum keys to display labels and back.
//! - Keep pickers, filters and payload builders on the key vocabulary.
//!
//! # Invariants
//! - Wire payloads carry keys, never display labels.
//! - Unknown prayer-unit keys coming back from the server are preserved;
//!   unknown blood-group keys degrade to "not set".

use serde::{Deserialize, Serialize};

/// Blood groups keyed the way the directory server stores them.
///
/// Serializes with the wire keys so session state and payload builders stay
/// on one vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BloodGroup {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

/// All blood groups in picker order.
pub const ALL_BLOOD_GROUPS: [BloodGroup; 8] = [
    BloodGroup::APositive,
    BloodGroup::ANegative,
    BloodGroup::BPositive,
    BloodGroup::BNegative,
    BloodGroup::AbPositive,
    BloodGroup::AbNegative,
    BloodGroup::OPositive,
    BloodGroup::ONegative,
];

/// Returns the wire key for one blood group.
pub fn blood_group_key(value: BloodGroup) -> &'static str {
    match value {
        BloodGroup::APositive => "A_POSITIVE",
        BloodGroup::ANegative => "A_NEGATIVE",
        BloodGroup::BPositive => "B_POSITIVE",
        BloodGroup::BNegative => "B_NEGATIVE",
        BloodGroup::AbPositive => "AB_POSITIVE",
        BloodGroup::AbNegative => "AB_NEGATIVE",
        BloodGroup::OPositive => "O_POSITIVE",
        BloodGroup::ONegative => "O_NEGATIVE",
    }
}

/// Returns the picker label for one blood group.
pub fn blood_group_label(value: BloodGroup) -> &'static str {
    match value {
        BloodGroup::APositive => "A+",
        BloodGroup::ANegative => "A-",
        BloodGroup::BPositive => "B+",
        BloodGroup::BNegative => "B-",
        BloodGroup::AbPositive => "AB+",
        BloodGroup::AbNegative => "AB-",
        BloodGroup::OPositive => "O+",
        BloodGroup::ONegative => "O-",
    }
}

/// Parses one wire key into the catalog; `None` for anything unknown.
pub fn parse_blood_group(value: &str) -> Option<BloodGroup> {
    match value {
        "A_POSITIVE" => Some(BloodGroup::APositive),
        "A_NEGATIVE" => Some(BloodGroup::ANegative),
        "B_POSITIVE" => Some(BloodGroup::BPositive),
        "B_NEGATIVE" => Some(BloodGroup::BNegative),
        "AB_POSITIVE" => Some(BloodGroup::AbPositive),
        "AB_NEGATIVE" => Some(BloodGroup::AbNegative),
        "O_POSITIVE" => Some(BloodGroup::OPositive),
        "O_NEGATIVE" => Some(BloodGroup::ONegative),
        _ => None,
    }
}

/// Prayer-unit catalog as `(key, label)` pairs, in picker order.
///
/// The server owns this vocabulary; the catalog here mirrors the deployment
/// configuration and may trail it, which is why lookups fall back to the raw
/// key instead of failing.
pub const PRAYER_UNITS: &[(&str, &str)] = &[
    ("ST_THOMAS", "St. Thomas"),
    ("ST_MARYS", "St. Mary's"),
    ("ST_JOSEPH", "St. Joseph"),
    ("ST_GEORGE", "St. George"),
    ("ST_ANTONY", "St. Antony"),
    ("ST_SEBASTIAN", "St. Sebastian"),
    ("HOLY_FAMILY", "Holy Family"),
    ("LITTLE_FLOWER", "Little Flower"),
];

/// Returns the display label for one prayer-unit key.
///
/// Unknown keys come back unchanged so records ahead of the local catalog
/// still render.
pub fn prayer_unit_label(key: &str) -> &str {
    PRAYER_UNITS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Returns the catalog key for one display label.
pub fn prayer_unit_key_for_label(label: &str) -> Option<&'static str> {
    PRAYER_UNITS
        .iter()
        .find(|(_, candidate)| *candidate == label)
        .map(|(key, _)| *key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_group_keys_round_trip() {
        for group in ALL_BLOOD_GROUPS {
            assert_eq!(parse_blood_group(blood_group_key(group)), Some(group));
        }
        assert_eq!(parse_blood_group("C_POSITIVE"), None);
    }

    #[test]
    fn blood_group_labels_are_short_forms() {
        assert_eq!(blood_group_label(BloodGroup::AbNegative), "AB-");
        assert_eq!(blood_group_label(BloodGroup::OPositive), "O+");
    }

    #[test]
    fn blood_group_serde_matches_wire_keys() {
        for group in ALL_BLOOD_GROUPS {
            let value = serde_json::to_value(group).expect("serialize");
            assert_eq!(value, blood_group_key(group));
        }
    }

    #[test]
    fn prayer_unit_label_falls_back_to_raw_key() {
        assert_eq!(prayer_unit_label("ST_THOMAS"), "St. Thomas");
        assert_eq!(prayer_unit_label("NEW_UNIT_2031"), "NEW_UNIT_2031");
    }

    #[test]
    fn prayer_unit_key_resolves_from_label() {
        assert_eq!(prayer_unit_key_for_label("Holy Family"), Some("HOLY_FAMILY"));
        assert_eq!(prayer_unit_key_for_label("No Such Unit"), None);
    }
}
