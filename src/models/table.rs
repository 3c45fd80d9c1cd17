use serde::Serialize;

use crate::models::FieldValue;
use crate::utils::constants::INDEX_COLUMN;

/// One dense row: a value for every column of the owning table, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub station_id: u32,
    pub values: Vec<FieldValue>,
}

impl TableRow {
    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(FieldValue::is_zero)
    }
}

/// Dense stations × fields table.
///
/// Rows are strictly ascending by station id and columns are sorted
/// lexicographically. Built by `Aggregator::finalize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ResultTable {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<TableRow>) -> Self {
        debug_assert!(rows.iter().all(|r| r.values.len() == columns.len()));
        debug_assert!(rows.windows(2).all(|w| w[0].station_id < w[1].station_id));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Export header: the station id column followed by the field columns.
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(INDEX_COLUMN)
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    pub fn station_ids(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.station_id).collect()
    }

    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.columns.binary_search_by(|c| c.as_str().cmp(field)).ok()
    }

    pub fn row(&self, station_id: u32) -> Option<&TableRow> {
        self.rows
            .binary_search_by_key(&station_id, |r| r.station_id)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn value(&self, station_id: u32, field: &str) -> Option<&FieldValue> {
        let column = self.column_index(field)?;
        self.row(station_id).map(|row| &row.values[column])
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, field: &str) -> Option<Vec<&FieldValue>> {
        let column = self.column_index(field)?;
        Some(self.rows.iter().map(|row| &row.values[column]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ResultTable {
        ResultTable::new(
            vec!["Alice".to_string(), "Bob".to_string()],
            vec![
                TableRow {
                    station_id: 2,
                    values: vec![FieldValue::Int(10), FieldValue::Int(4)],
                },
                TableRow {
                    station_id: 3,
                    values: vec![FieldValue::ZERO, FieldValue::ZERO],
                },
            ],
        )
    }

    #[test]
    fn test_header_starts_with_index_column() {
        let table = sample_table();
        assert_eq!(table.header(), vec!["polling_station_id", "Alice", "Bob"]);
    }

    #[test]
    fn test_lookup_by_station_and_field() {
        let table = sample_table();

        assert_eq!(table.value(2, "Bob"), Some(&FieldValue::Int(4)));
        assert_eq!(table.value(3, "Alice"), Some(&FieldValue::ZERO));
        assert_eq!(table.value(9, "Alice"), None);
        assert_eq!(table.value(2, "Carol"), None);
        assert!(table.row(3).unwrap().is_all_zero());
        assert!(!table.row(2).unwrap().is_all_zero());
    }

    #[test]
    fn test_column_values() {
        let table = sample_table();
        let alice = table.column("Alice").unwrap();
        assert_eq!(alice, vec![&FieldValue::Int(10), &FieldValue::ZERO]);
    }
}
