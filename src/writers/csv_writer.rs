use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, ScrapeError};
use crate::models::{ResultTable, TableRow};
use crate::parsers::coerce_text;
use crate::utils::constants::INDEX_COLUMN;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

/// Shape of an exported file without loading every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFileInfo {
    pub rows: usize,
    pub columns: usize,
    pub file_size: u64,
}

impl CsvFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Stations: {}\nFields: {}\nFile size: {:.1} KB",
            self.rows,
            self.columns,
            self.file_size as f64 / 1024.0
        )
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the table to `path`, creating missing parent directories.
    pub fn write_table(&self, table: &ResultTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        self.write_to(table, BufWriter::new(file))?;

        tracing::info!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "wrote CSV"
        );
        Ok(())
    }

    /// Header is the index column followed by the sorted field names.
    pub fn write_to<W: Write>(&self, table: &ResultTable, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(table.header())?;

        for row in table.rows() {
            let mut cells = Vec::with_capacity(row.values.len() + 1);
            cells.push(row.station_id.to_string());
            cells.extend(row.values.iter().map(|value| value.to_string()));
            csv_writer.write_record(&cells)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// The whole export as bytes, for callers that stream it elsewhere.
    pub fn to_csv_bytes(&self, table: &ResultTable) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(table, &mut buffer)?;
        Ok(buffer)
    }

    /// Load an exported table back. Cells are coerced the same way parsed text is.
    pub fn read_table(&self, path: &Path) -> Result<ResultTable> {
        let file = File::open(path)?;
        self.read_from(file)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<ResultTable> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        match headers.get(0) {
            Some(first) if first == INDEX_COLUMN => {}
            other => {
                return Err(ScrapeError::InvalidFormat(format!(
                    "expected first column '{}', found {:?}",
                    INDEX_COLUMN, other
                )))
            }
        }

        let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        if !columns.windows(2).all(|w| w[0] < w[1]) {
            return Err(ScrapeError::InvalidFormat(
                "field columns must be unique and sorted".to_string(),
            ));
        }

        let mut rows = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let station_id: u32 = record
                .get(0)
                .unwrap_or_default()
                .trim()
                .parse()
                .map_err(|_| {
                    ScrapeError::InvalidFormat(format!(
                        "invalid station id {:?}",
                        record.get(0).unwrap_or_default()
                    ))
                })?;

            let values = (1..=columns.len())
                .map(|i| coerce_text(record.get(i).unwrap_or_default()))
                .collect();
            rows.push(TableRow { station_id, values });
        }

        rows.sort_by_key(|row| row.station_id);
        if let Some(pair) = rows.windows(2).find(|w| w[0].station_id == w[1].station_id) {
            return Err(ScrapeError::InvalidFormat(format!(
                "duplicate station id {}",
                pair[0].station_id
            )));
        }
        Ok(ResultTable::new(columns, rows))
    }

    pub fn get_file_info(&self, path: &Path) -> Result<CsvFileInfo> {
        let file_size = fs::metadata(path)?.len();
        let mut csv_reader = csv::Reader::from_path(path)?;

        let columns = csv_reader.headers()?.len().saturating_sub(1);
        let mut rows = 0;
        for result in csv_reader.records() {
            result?;
            rows += 1;
        }

        Ok(CsvFileInfo {
            rows,
            columns,
            file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldRecord, FieldValue};
    use crate::processors::Aggregator;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_table() -> ResultTable {
        let mut aggregator = Aggregator::new();
        let first: FieldRecord = vec![("Alice", FieldValue::Int(10))].into_iter().collect();
        let second: FieldRecord = vec![
            ("Bob", FieldValue::Int(4)),
            ("Turnout", FieldValue::Float(62.5)),
        ]
        .into_iter()
        .collect();
        aggregator.ingest(3, FieldRecord::new());
        aggregator.ingest(2, first);
        aggregator.ingest(4, second);
        aggregator.finalize()
    }

    #[test]
    fn test_csv_layout() {
        let bytes = CsvWriter::new().to_csv_bytes(&sample_table()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "polling_station_id,Alice,Bob,Turnout\n\
             2,10,0,0\n\
             3,0,0,0\n\
             4,0,4,62.5\n"
        );
    }

    #[test]
    fn test_write_table_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("out.csv");

        let writer = CsvWriter::new();
        writer.write_table(&sample_table(), &path).unwrap();

        let info = writer.get_file_info(&path).unwrap();
        assert_eq!(info.rows, 3);
        assert_eq!(info.columns, 3);
        assert!(info.file_size > 0);
        assert!(info.summary().starts_with("Stations: 3\nFields: 3"));
    }

    #[test]
    fn test_read_table_restores_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let writer = CsvWriter::new();
        let table = sample_table();
        writer.write_table(&table, &path).unwrap();

        let restored = writer.read_table(&path).unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn test_read_rejects_foreign_csv() {
        let result = CsvWriter::new().read_from("id,Alice\n1,2\n".as_bytes());
        assert!(matches!(result, Err(ScrapeError::InvalidFormat(_))));

        let result = CsvWriter::new().read_from("polling_station_id,Bob,Alice\n1,2,3\n".as_bytes());
        assert!(matches!(result, Err(ScrapeError::InvalidFormat(_))));

        let result = CsvWriter::new().read_from("polling_station_id,Alice\n1,2\n1,3\n".as_bytes());
        assert!(matches!(result, Err(ScrapeError::InvalidFormat(_))));
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let table = Aggregator::new().finalize();
        let bytes = CsvWriter::new().to_csv_bytes(&table).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "polling_station_id\n");
    }
}
