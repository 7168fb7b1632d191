//! Projection of a raw upload onto the canonical equipment columns.

use serde::{Deserialize, Serialize};

use crate::{
    io_utils::RawTable,
    schema::{CanonicalField, ResolvedColumns},
};

/// One equipment row keyed by canonical field names. Cells keep their raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub equipment_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub flowrate: String,
    pub pressure: String,
    pub temperature: String,
}

impl CanonicalRow {
    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::EquipmentName => &self.equipment_name,
            CanonicalField::Type => &self.kind,
            CanonicalField::Flowrate => &self.flowrate,
            CanonicalField::Pressure => &self.pressure,
            CanonicalField::Temperature => &self.temperature,
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        CanonicalField::ALL
            .iter()
            .map(|field| self.get(*field).to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalTable {
    rows: Vec<CanonicalRow>,
}

impl CanonicalTable {
    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `limit` rows in original order.
    pub fn head(&self, limit: usize) -> Vec<CanonicalRow> {
        self.rows.iter().take(limit).cloned().collect()
    }
}

impl FromIterator<CanonicalRow> for CanonicalTable {
    fn from_iter<I: IntoIterator<Item = CanonicalRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Keeps exactly the five resolved columns; every row survives, in order.
pub fn normalize_rows(raw: &RawTable, columns: &ResolvedColumns) -> CanonicalTable {
    let cell =
        |row: usize, field: CanonicalField| raw.cell(row, columns.index_of(field)).to_string();
    (0..raw.row_count())
        .map(|row| CanonicalRow {
            equipment_name: cell(row, CanonicalField::EquipmentName),
            kind: cell(row, CanonicalField::Type),
            flowrate: cell(row, CanonicalField::Flowrate),
            pressure: cell(row, CanonicalField::Pressure),
            temperature: cell(row, CanonicalField::Temperature),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::resolve_columns;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn drops_unmapped_columns_and_keeps_row_order() {
        let raw = RawTable::new(
            strings(&["Notes", "Temp", "Press", "Flow", "Category", "Device"]),
            vec![
                strings(&["x", "20", "5", "10", "Pump", "P1"]),
                strings(&["y", "n/a", "", "abc", "Valve", "V1"]),
            ],
        );
        let columns = resolve_columns(&raw.headers).validate().expect("complete");
        let table = normalize_rows(&raw, &columns);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].to_cells(), strings(&["P1", "Pump", "10", "5", "20"]));
        assert_eq!(table.rows()[1].flowrate, "abc");
        assert_eq!(table.rows()[1].pressure, "");
    }

    #[test]
    fn serializes_with_canonical_keys() {
        let row = CanonicalRow {
            equipment_name: "P1".into(),
            kind: "Pump".into(),
            flowrate: "1".into(),
            pressure: "2".into(),
            temperature: "3".into(),
        };
        let json = serde_json::to_value(&row).expect("json");
        assert_eq!(json["type"], "Pump");
        assert_eq!(json["equipment_name"], "P1");
    }
}
