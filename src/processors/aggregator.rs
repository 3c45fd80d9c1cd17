use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{FieldRecord, FieldValue, ResultTable, TableRow};

/// Collects per-station records and densifies them into a `ResultTable`.
///
/// Records are buffered until `finalize` because a column discovered at a
/// late station still needs a cell in every earlier row. The field set only
/// grows: re-ingesting a station replaces its record but keeps the names the
/// old record contributed.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    records: BTreeMap<u32, FieldRecord>,
    fields: BTreeSet<String>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one station's record. Returns the record it replaced, if any.
    pub fn ingest(&mut self, station_id: u32, record: FieldRecord) -> Option<FieldRecord> {
        for name in record.field_names() {
            if !self.fields.contains(name) {
                self.fields.insert(name.to_string());
            }
        }
        self.records.insert(station_id, record)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn station_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build the dense table. Does not consume buffered state, so calling it
    /// twice without further ingestion gives identical tables.
    pub fn finalize(&self) -> ResultTable {
        let columns: Vec<String> = self.fields.iter().cloned().collect();
        let entries: Vec<(u32, &FieldRecord)> =
            self.records.iter().map(|(id, record)| (*id, record)).collect();

        let rows: Vec<TableRow> = entries
            .par_iter()
            .map(|(station_id, record)| TableRow {
                station_id: *station_id,
                values: columns
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(FieldValue::ZERO))
                    .collect(),
            })
            .collect();

        ResultTable::new(columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(pairs: &[(&str, i64)]) -> FieldRecord {
        pairs
            .iter()
            .map(|(name, votes)| (*name, FieldValue::Int(*votes)))
            .collect()
    }

    #[test]
    fn test_dense_table_fills_missing_cells_with_zero() {
        let mut aggregator = Aggregator::new();
        aggregator.ingest(1, record(&[("Bob", 3)]));
        aggregator.ingest(2, record(&[("Alice", 5), ("Carol", 1)]));
        aggregator.ingest(3, FieldRecord::new());

        let table = aggregator.finalize();

        assert_eq!(table.columns(), &["Alice", "Bob", "Carol"]);
        assert_eq!(table.row_count(), 3);
        for row in table.rows() {
            assert_eq!(row.values.len(), 3);
        }
        assert_eq!(table.value(1, "Alice"), Some(&FieldValue::ZERO));
        assert_eq!(table.value(1, "Bob"), Some(&FieldValue::Int(3)));
        assert_eq!(table.value(2, "Carol"), Some(&FieldValue::Int(1)));
        assert!(table.row(3).unwrap().is_all_zero());
    }

    #[test]
    fn test_rows_are_sorted_regardless_of_ingestion_order() {
        let mut aggregator = Aggregator::new();
        for id in [9, 2, 7, 4, 1] {
            aggregator.ingest(id, record(&[("Alice", id as i64)]));
        }

        let table = aggregator.finalize();
        assert_eq!(table.station_ids(), vec![1, 2, 4, 7, 9]);
        assert_eq!(table.value(7, "Alice"), Some(&FieldValue::Int(7)));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut aggregator = Aggregator::new();
        aggregator.ingest(5, record(&[("Alice", 1)]));
        aggregator.ingest(6, record(&[("Bob", 2)]));

        assert_eq!(aggregator.finalize(), aggregator.finalize());
        assert_eq!(aggregator.station_count(), 2);
    }

    #[test]
    fn test_duplicate_ingestion_last_write_wins() {
        let mut aggregator = Aggregator::new();
        assert!(aggregator.ingest(5, record(&[("Alice", 1)])).is_none());
        let previous = aggregator.ingest(5, record(&[("Bob", 2)]));

        assert_eq!(previous, Some(record(&[("Alice", 1)])));

        let table = aggregator.finalize();
        assert_eq!(table.row_count(), 1);
        // Field set never shrinks.
        assert_eq!(table.columns(), &["Alice", "Bob"]);
        assert_eq!(table.value(5, "Alice"), Some(&FieldValue::ZERO));
        assert_eq!(table.value(5, "Bob"), Some(&FieldValue::Int(2)));
    }

    #[test]
    fn test_empty_aggregator() {
        let aggregator = Aggregator::new();
        let table = aggregator.finalize();

        assert!(aggregator.is_empty());
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_field_set_grows_monotonically() {
        let mut aggregator = Aggregator::new();
        let mut previous = 0;
        for (id, names) in [(1, vec!["B"]), (2, vec![]), (3, vec!["A", "B"]), (4, vec!["C"])] {
            let record: FieldRecord = names.into_iter().map(|n| (n, FieldValue::Int(1))).collect();
            aggregator.ingest(id, record);
            assert!(aggregator.field_count() >= previous);
            previous = aggregator.field_count();
        }
        assert_eq!(aggregator.field_names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }
}
