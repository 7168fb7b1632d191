//! Canonical equipment schema, header alias resolution, and completeness checks.
//!
//! Uploaded files arrive with arbitrary header spellings (`Machine`,
//! `Flow Rate`, `TEMP`). This module owns the fixed alias table that maps
//! those spellings onto the five [`CanonicalField`]s and the two steps that
//! run over it:
//!
//! - [`resolve_columns()`] builds a partial [`ColumnMapping`] from raw headers.
//! - [`ColumnMapping::validate()`] turns a complete mapping into
//!   [`ResolvedColumns`] or fails with [`IngestError::SchemaIncomplete`].
//!
//! Headers are compared in normalized form: trimmed, lowercased, and with
//! every space replaced by `_`. When more than one header satisfies the same
//! field, the first one in column order wins.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    EquipmentName,
    Type,
    Flowrate,
    Pressure,
    Temperature,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::EquipmentName,
        CanonicalField::Type,
        CanonicalField::Flowrate,
        CanonicalField::Pressure,
        CanonicalField::Temperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::EquipmentName => "equipment_name",
            CanonicalField::Type => "type",
            CanonicalField::Flowrate => "flowrate",
            CanonicalField::Pressure => "pressure",
            CanonicalField::Temperature => "temperature",
        }
    }

    /// Accepted header spellings, already in normalized form.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::EquipmentName => &["equipment_name", "equip_name", "machine", "device"],
            CanonicalField::Type => &["type", "category", "equip_type"],
            CanonicalField::Flowrate => &["flowrate", "flow_rate", "flow"],
            CanonicalField::Pressure => &["pressure", "press"],
            CanonicalField::Temperature => &["temperature", "temp", "temp_c"],
        }
    }

    fn position(&self) -> usize {
        *self as usize
    }

    /// Returns the field whose alias set contains `normalized`, if any.
    pub fn for_alias(normalized: &str) -> Option<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.aliases().contains(&normalized))
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_header(value);
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| anyhow!("Unknown canonical field '{value}'"))
    }
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// The raw column chosen to satisfy a canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    pub index: usize,
    pub header: String,
}

/// Partial mapping from canonical fields to the raw columns that satisfy them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    slots: [Option<MappedColumn>; 5],
    found: Vec<String>,
}

impl ColumnMapping {
    pub fn get(&self, field: CanonicalField) -> Option<&MappedColumn> {
        self.slots[field.position()].as_ref()
    }

    pub fn is_mapped(&self, field: CanonicalField) -> bool {
        self.get(field).is_some()
    }

    pub fn mapped_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| self.is_mapped(*field))
            .collect()
    }

    pub fn missing_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| !self.is_mapped(*field))
            .collect()
    }

    /// Normalized headers of the table this mapping was resolved from.
    pub fn found_headers(&self) -> &[String] {
        &self.found
    }

    pub fn validate(&self) -> Result<ResolvedColumns, IngestError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(IngestError::SchemaIncomplete {
                missing: missing.iter().map(|f| f.as_str().to_string()).collect(),
                found: self.found.clone(),
            });
        }
        let mut indices = [0usize; 5];
        let mut headers: [String; 5] = Default::default();
        for field in CanonicalField::ALL {
            if let Some(column) = self.get(field) {
                indices[field.position()] = column.index;
                headers[field.position()] = column.header.clone();
            }
        }
        Ok(ResolvedColumns { indices, headers })
    }
}

/// A mapping that covers every canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    indices: [usize; 5],
    headers: [String; 5],
}

impl ResolvedColumns {
    pub fn index_of(&self, field: CanonicalField) -> usize {
        self.indices[field.position()]
    }

    pub fn header_of(&self, field: CanonicalField) -> &str {
        &self.headers[field.position()]
    }
}

pub fn resolve_columns(headers: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping {
        found: headers.iter().map(|h| normalize_header(h)).collect(),
        ..ColumnMapping::default()
    };
    for (index, normalized) in mapping.found.iter().enumerate() {
        let Some(field) = CanonicalField::for_alias(normalized) else {
            continue;
        };
        let slot = &mut mapping.slots[field.position()];
        if slot.is_none() {
            *slot = Some(MappedColumn {
                index,
                header: headers[index].clone(),
            });
        }
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn normalize_header_trims_lowercases_and_underscores() {
        assert_eq!(normalize_header("  Flow Rate "), "flow_rate");
        assert_eq!(normalize_header("FLOWRATE"), "flowrate");
        assert_eq!(normalize_header("Temp C"), "temp_c");
    }

    #[test]
    fn alias_sets_are_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for field in CanonicalField::ALL {
            for alias in field.aliases() {
                assert!(seen.insert(*alias), "alias '{alias}' listed twice");
                assert_eq!(normalize_header(alias), *alias);
            }
        }
    }

    #[test]
    fn resolve_prefers_first_matching_column() {
        let mapping = resolve_columns(&headers(&[
            "Flow", "Machine", "Flow Rate", "Category", "Press", "Temp",
        ]));
        let flow = mapping.get(CanonicalField::Flowrate).expect("flowrate");
        assert_eq!(flow.index, 0);
        assert_eq!(flow.header, "Flow");
        assert!(mapping.missing_fields().is_empty());
    }

    #[test]
    fn unknown_spellings_stay_unmapped() {
        let mapping = resolve_columns(&headers(&["FlowRate m3", "equipment-name"]));
        assert!(mapping.mapped_fields().is_empty());
        assert_eq!(mapping.found_headers(), &["flowrate_m3", "equipment-name"]);
    }

    #[test]
    fn validate_reports_missing_fields_in_canonical_order() {
        let mapping = resolve_columns(&headers(&["Device", "Flow"]));
        match mapping.validate() {
            Err(IngestError::SchemaIncomplete { missing, found }) => {
                assert_eq!(missing, vec!["type", "pressure", "temperature"]);
                assert_eq!(found, vec!["device", "flow"]);
            }
            other => panic!("expected SchemaIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn canonical_field_parses_from_display_name() {
        assert_eq!(
            "Equipment Name".parse::<CanonicalField>().unwrap(),
            CanonicalField::EquipmentName
        );
        assert!("flow".parse::<CanonicalField>().is_err());
    }
}
