//! FILENAME: core/engine/src/alias.rs
//! PURPOSE: Canonical field names for incoming rows.
//! CONTEXT: The backend serves the same attribute under human-readable
//! headings ("Site Name") and machine keys (site_name) depending on the
//! endpoint. Rows are rewritten once when they enter the RowStore so every
//! downstream consumer sees a single schema.

use crate::row::Row;
use std::borrow::Cow;
use std::collections::HashMap;

/// Source spellings and the canonical key they map to.
const SUBSTATION_ALIASES: &[(&str, &str)] = &[
    ("Site Name", "site_name"),
    ("siteName", "site_name"),
    ("Site Type", "site_type"),
    ("Site Voltage", "site_voltage"),
    ("siteVoltage", "site_voltage"),
    ("Site Classification", "site_classification"),
    ("Site Functional Location", "site_functional_location"),
    ("Generation Headroom Mw", "generation_headroom_mw"),
    ("generation_headroom", "generation_headroom_mw"),
    ("generationHeadroom", "generation_headroom_mw"),
    ("Generation Capacity", "generation_capacity"),
    ("Licence Area", "licence_area"),
    ("licenceArea", "licence_area"),
    ("Spatial Coordinates", "spatial_coordinates"),
    ("County", "county"),
    ("Postcode", "postcode"),
    ("Local Authority", "local_authority"),
    ("Bulk Supply Point", "bulk_supply_point"),
    ("Max Demand Summer", "max_demand_summer"),
    ("Max Demand Winter", "max_demand_winter"),
    ("Installed Capacity MVA", "installed_capacity"),
    ("Power Transformer Count", "power_transformer_count"),
    ("Assessment Date", "assessment_date"),
    ("Date Commissioned", "date_commissioned"),
    ("What3Words", "what3words"),
    ("Latitude", "latitude"),
    ("lat", "latitude"),
    ("Longitude", "longitude"),
    ("lng", "longitude"),
    ("lon", "longitude"),
    // map-data endpoint spellings
    ("available_power", "generation_headroom_mw"),
    ("voltage_level", "site_voltage"),
    ("network_operator", "licence_area"),
];

/// Maps source field names to canonical ones (case-insensitive lookup).
#[derive(Debug, Clone)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// An empty table: every name is already canonical.
    pub fn identity() -> Self {
        AliasTable {
            aliases: HashMap::new(),
        }
    }

    /// The alias set for the substation/transformer datasets.
    pub fn substation() -> Self {
        let mut table = Self::identity();
        for (source, canonical) in SUBSTATION_ALIASES {
            table.insert(source, canonical);
        }
        table
    }

    pub fn insert(&mut self, source: &str, canonical: &str) {
        self.aliases
            .insert(source.trim().to_lowercase(), canonical.to_string());
    }

    pub fn with_alias(mut self, source: &str, canonical: &str) -> Self {
        self.insert(source, canonical);
        self
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Returns the canonical spelling of `name`; unknown names pass through.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> Cow<'a, str> {
        match self.aliases.get(&name.trim().to_lowercase()) {
            Some(canonical) => Cow::Borrowed(canonical.as_str()),
            None => Cow::Borrowed(name),
        }
    }

    /// Rewrites a row's field names. When two source keys collapse onto the
    /// same canonical name the first non-null value wins.
    pub fn canonicalize_row(&self, row: Row) -> Row {
        if self.aliases.is_empty() {
            return row;
        }

        let mut out = Row::with_capacity(row.len());
        for (name, value) in row {
            let canonical = self.canonical_name(&name).into_owned();
            match out.get(&canonical) {
                Some(existing) if !existing.is_null() => {}
                _ => {
                    out.insert(canonical, value);
                }
            }
        }
        out
    }

    pub fn canonicalize(&self, rows: Vec<Row>) -> Vec<Row> {
        rows.into_iter()
            .map(|row| self.canonicalize_row(row))
            .collect()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::substation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn test_canonical_name_is_case_insensitive() {
        let table = AliasTable::substation();
        assert_eq!(table.canonical_name("Site Name"), "site_name");
        assert_eq!(table.canonical_name("site name"), "site_name");
        assert_eq!(table.canonical_name("LAT"), "latitude");
        assert_eq!(table.canonical_name("Unmapped Field"), "Unmapped Field");
    }

    #[test]
    fn test_first_non_null_value_wins() {
        let table = AliasTable::substation();
        let row = Row::new()
            .with("Site Name", FieldValue::Null)
            .with("site_name", "Alpha")
            .with("siteName", "Beta");

        let row = table.canonicalize_row(row);
        assert_eq!(row.len(), 1);
        assert_eq!(row.display("site_name"), "Alpha");
    }

    #[test]
    fn test_identity_table_leaves_rows_alone() {
        let row = Row::new().with("Site Name", "Alpha");
        let out = AliasTable::identity().canonicalize_row(row.clone());
        assert_eq!(out, row);
    }
}
