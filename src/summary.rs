//! Summary statistics over a canonical equipment table.
//!
//! [`summarize()`] produces the record count, the mean of each metric
//! column and the distribution of equipment types. Metric cells that do not
//! parse as finite numbers are left out of that column's mean; a column with
//! no usable cells (including an empty table) averages to `0.0`. Values are
//! never rounded here.

use std::{collections::HashMap, fmt};

use itertools::Itertools;
use log::debug;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{normalize::CanonicalTable, schema::CanonicalField};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_records: usize,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}

impl Summary {
    pub fn average(&self, field: CanonicalField) -> Option<f64> {
        match field {
            CanonicalField::Flowrate => Some(self.avg_flowrate),
            CanonicalField::Pressure => Some(self.avg_pressure),
            CanonicalField::Temperature => Some(self.avg_temperature),
            CanonicalField::EquipmentName | CanonicalField::Type => None,
        }
    }
}

/// Equipment type counts, most frequent first; ties keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDistribution(Vec<(String, usize)>);

impl TypeDistribution {
    pub fn entries(&self) -> &[(String, usize)] {
        &self.0
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TypeDistribution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TypeDistribution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = TypeDistribution;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of equipment type to count")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, count)) = access.next_entry::<String, usize>()? {
                    entries.push((label, count));
                }
                Ok(TypeDistribution(entries))
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}

#[derive(Debug, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
    skipped: usize,
}

impl MeanAccumulator {
    fn observe(&mut self, raw: &str) {
        match parse_metric(raw) {
            Some(value) => {
                self.sum += value;
                self.count += 1;
            }
            None => self.skipped += 1,
        }
    }

    fn mean(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Default)]
struct FrequencyAccumulator {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl FrequencyAccumulator {
    fn observe(&mut self, label: &str) {
        match self.counts.get_mut(label) {
            Some(count) => *count += 1,
            None => {
                self.order.push(label.to_string());
                self.counts.insert(label.to_string(), 1);
            }
        }
    }

    fn finish(self) -> TypeDistribution {
        let FrequencyAccumulator { order, counts } = self;
        // Stable sort keeps first-seen order among equal counts.
        let entries = order
            .into_iter()
            .map(|label| {
                let count = counts.get(&label).copied().unwrap_or_default();
                (label, count)
            })
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .collect();
        TypeDistribution(entries)
    }
}

/// Parses a metric cell; empty, non-numeric and non-finite text yields `None`.
pub fn parse_metric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn summarize(table: &CanonicalTable) -> Summary {
    let mut flowrate = MeanAccumulator::default();
    let mut pressure = MeanAccumulator::default();
    let mut temperature = MeanAccumulator::default();
    let mut types = FrequencyAccumulator::default();

    for row in table.rows() {
        flowrate.observe(&row.flowrate);
        pressure.observe(&row.pressure);
        temperature.observe(&row.temperature);
        types.observe(&row.kind);
    }

    for (field, acc) in [
        (CanonicalField::Flowrate, &flowrate),
        (CanonicalField::Pressure, &pressure),
        (CanonicalField::Temperature, &temperature),
    ] {
        if acc.skipped > 0 {
            debug!(
                "Excluded {} non-numeric '{}' value(s) from the mean",
                acc.skipped,
                field
            );
        }
    }

    Summary {
        total_records: table.len(),
        avg_flowrate: flowrate.mean(),
        avg_pressure: pressure.mean(),
        avg_temperature: temperature.mean(),
        type_distribution: types.finish(),
    }
}
