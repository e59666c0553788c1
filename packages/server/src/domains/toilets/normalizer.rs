//! Field normalization for upstream rows.
//!
//! Different page batches of the registry name the same column differently
//! (`CONTS_NAME` vs `FNAME`, `COORD_Y` vs `Y_WGS84`, ...). Each canonical field
//! probes its alias list in order and takes the first non-blank value. Absence
//! is data, not failure: unmatched fields come out empty and the aggregator's
//! acceptability filter decides what survives.

use std::collections::HashMap;

use super::models::{RawRow, Toilet};

pub const ID_ALIASES: &[&str] = &["OBJECTID", "ID", "POI_ID", "TOILET_ID", "MGIS_ID"];
pub const NAME_ALIASES: &[&str] = &["CONTS_NAME", "FNAME", "TOILET_NM", "NAME", "NM"];
pub const ADDRESS_ALIASES: &[&str] = &["ADDR_NEW", "ADDR_OLD", "ADR", "ADDR", "ADDRESS"];
pub const LATITUDE_ALIASES: &[&str] = &["COORD_Y", "Y_WGS84", "LAT", "Y"];
pub const LONGITUDE_ALIASES: &[&str] = &["COORD_X", "X_WGS84", "LNG", "X"];
pub const AREA_ALIASES: &[&str] = &["GU_NAME"];
pub const PHONE_ALIASES: &[&str] = &["TEL_NO"];
pub const OPEN_TYPE_ALIASES: &[&str] = &["VALUE_01"];
pub const OPEN_TIME_ALIASES: &[&str] = &["VALUE_02"];
pub const GENDER_POLICY_ALIASES: &[&str] = &["VALUE_04"];
pub const SAFETY_INFO_ALIASES: &[&str] = &["VALUE_07"];
pub const PLACE_TYPE_ALIASES: &[&str] = &["VALUE_08"];
pub const MANAGER_ALIASES: &[&str] = &["VALUE_09"];

/// Case-insensitive view over a raw row.
struct RowLookup<'a> {
    by_key: HashMap<String, &'a str>,
}

impl<'a> RowLookup<'a> {
    fn new(row: &'a RawRow) -> Self {
        let mut by_key: HashMap<String, &'a str> = HashMap::with_capacity(row.len());
        for (key, value) in row {
            let slot = by_key.entry(key.to_uppercase()).or_insert(value.as_str());
            // Keys differing only in case: prefer the one with content.
            if slot.trim().is_empty() {
                *slot = value.as_str();
            }
        }
        Self { by_key }
    }

    /// First alias with a non-blank value, trimmed; empty if none.
    fn pick(&self, aliases: &[&str]) -> String {
        aliases
            .iter()
            .filter_map(|alias| self.by_key.get(&alias.to_uppercase()))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

/// Map one raw row onto the canonical record shape.
pub fn normalize(row: &RawRow) -> Toilet {
    let row = RowLookup::new(row);

    Toilet {
        id: row.pick(ID_ALIASES),
        name: row.pick(NAME_ALIASES),
        address: row.pick(ADDRESS_ALIASES),
        latitude: row.pick(LATITUDE_ALIASES),
        longitude: row.pick(LONGITUDE_ALIASES),
        area: row.pick(AREA_ALIASES),
        phone: row.pick(PHONE_ALIASES),
        open_type: row.pick(OPEN_TYPE_ALIASES),
        open_time: row.pick(OPEN_TIME_ALIASES),
        gender_policy: row.pick(GENDER_POLICY_ALIASES),
        safety_info: row.pick(SAFETY_INFO_ALIASES),
        place_type: row.pick(PLACE_TYPE_ALIASES),
        manager: row.pick(MANAGER_ALIASES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn primary_alias_wins_over_fallback() {
        let toilet = normalize(&row(&[
            ("FNAME", "fallback name"),
            ("CONTS_NAME", "primary name"),
            ("ADDR_OLD", "old address"),
            ("ADDR_NEW", "new address"),
        ]));

        assert_eq!(toilet.name, "primary name");
        assert_eq!(toilet.address, "new address");
    }

    #[test]
    fn fallback_alias_matches_case_insensitively_and_is_trimmed() {
        let toilet = normalize(&row(&[
            ("toilet_nm", "  을지로입구역  "),
            ("Y_wgs84", " 37.5660 "),
            ("x_WGS84", "126.9826"),
        ]));

        assert_eq!(toilet.name, "을지로입구역");
        assert_eq!(toilet.latitude, "37.5660");
        assert_eq!(toilet.longitude, "126.9826");
    }

    #[test]
    fn blank_primary_falls_through_to_next_alias() {
        let toilet = normalize(&row(&[("OBJECTID", "   "), ("POI_ID", "P-7")]));
        assert_eq!(toilet.id, "P-7");
    }

    #[test]
    fn coordinates_keep_their_textual_precision() {
        let toilet = normalize(&row(&[
            ("COORD_Y", "37.566295000000"),
            ("COORD_X", "126.977945"),
        ]));

        assert_eq!(toilet.latitude, "37.566295000000");
        assert_eq!(toilet.longitude, "126.977945");
    }

    #[test]
    fn unknown_schema_yields_empty_fields() {
        let toilet = normalize(&row(&[("SOMETHING_ELSE", "value")]));

        assert_eq!(toilet, Toilet::default());
        assert!(!toilet.is_acceptable());
    }

    #[test]
    fn optional_attributes_are_mapped() {
        let toilet = normalize(&row(&[
            ("GU_NAME", "중구"),
            ("TEL_NO", "02-120"),
            ("VALUE_01", "개방"),
            ("VALUE_02", "24시간"),
            ("VALUE_04", "남녀분리"),
            ("VALUE_07", "비상벨"),
            ("VALUE_08", "지하철역"),
            ("VALUE_09", "서울교통공사"),
        ]));

        assert_eq!(toilet.area, "중구");
        assert_eq!(toilet.phone, "02-120");
        assert_eq!(toilet.open_type, "개방");
        assert_eq!(toilet.open_time, "24시간");
        assert_eq!(toilet.gender_policy, "남녀분리");
        assert_eq!(toilet.safety_info, "비상벨");
        assert_eq!(toilet.place_type, "지하철역");
        assert_eq!(toilet.manager, "서울교통공사");
    }
}
