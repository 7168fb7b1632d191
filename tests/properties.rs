use proptest::prelude::*;

use equipment_analyzer::{
    ingest,
    io_utils::RawTable,
    record::{PERSISTED_SAMPLE_ROWS, RESPONSE_SAMPLE_ROWS},
    schema::normalize_header,
};

fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (-500.0f64..500.0).prop_map(|v| format!("{v:.3}")),
        "[a-z]{0,4}",
        Just(String::new()),
    ]
}

fn row_strategy() -> impl Strategy<Value = Vec<String>> {
    (
        "[A-Z][a-z]{0,5}",
        prop_oneof![Just("Pump"), Just("Valve"), Just("Reactor"), Just("")],
        cell_strategy(),
        cell_strategy(),
        cell_strategy(),
    )
        .prop_map(|(name, kind, flow, press, temp)| vec![name, kind.to_string(), flow, press, temp])
}

fn raw_table(rows: Vec<Vec<String>>) -> RawTable {
    let headers = ["Device", "Category", "Flow Rate", "Press", "TEMP"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    RawTable::new(headers, rows)
}

proptest! {
    #[test]
    fn distribution_counts_every_row(rows in proptest::collection::vec(row_strategy(), 0..160)) {
        let count = rows.len();
        let outcome = ingest(&raw_table(rows), "prop.csv").expect("ingest");
        let summary = outcome.summary();
        prop_assert_eq!(summary.total_records, count);
        prop_assert_eq!(summary.type_distribution.total(), count);
        let counts: Vec<usize> = summary.type_distribution.entries().iter().map(|(_, c)| *c).collect();
        prop_assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
        prop_assert!(summary.avg_flowrate.is_finite());
        prop_assert!(summary.avg_pressure.is_finite());
        prop_assert!(summary.avg_temperature.is_finite());
    }

    #[test]
    fn samples_are_ordered_prefixes(rows in proptest::collection::vec(row_strategy(), 0..160)) {
        let names: Vec<String> = rows.iter().map(|r| r[0].clone()).collect();
        let outcome = ingest(&raw_table(rows), "prop.csv").expect("ingest");
        let persisted = &outcome.record.sample_rows;
        prop_assert_eq!(persisted.len(), names.len().min(PERSISTED_SAMPLE_ROWS));
        prop_assert_eq!(outcome.rows.len(), names.len().min(RESPONSE_SAMPLE_ROWS));
        for (row, name) in persisted.iter().zip(&names) {
            prop_assert_eq!(&row.equipment_name, name);
        }
        prop_assert_eq!(outcome.rows.as_slice(), &persisted[..outcome.rows.len()]);
    }

    #[test]
    fn header_normalization_is_idempotent(raw in "[ A-Za-z_]{0,16}") {
        let once = normalize_header(&raw);
        prop_assert_eq!(normalize_header(&once), once.clone());
        prop_assert!(!once.contains(' '));
    }
}
