use std::path::Path;

use crate::error::{Result, ScrapeError};
use crate::models::{FieldValue, ResultTable, TableRow};
use crate::writers::CsvWriter;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTotal {
    pub name: String,
    /// Sum of numeric cells.
    pub total: f64,
    pub non_zero_rows: usize,
    pub text_cells: usize,
}

#[derive(Debug)]
pub struct TableStatistics {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Rows where every cell is zero, i.e. stations that produced no data.
    pub empty_rows: usize,
    pub station_range: Option<(u32, u32)>,
    pub column_totals: Vec<ColumnTotal>,
    pub columns: Vec<String>,
    pub sample: Vec<TableRow>,
}

impl TableStatistics {
    pub fn data_percentage(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        ((self.total_rows - self.empty_rows) as f64 / self.total_rows as f64) * 100.0
    }

    /// Columns ordered by descending total.
    pub fn ranked_columns(&self) -> Vec<&ColumnTotal> {
        let mut ranked: Vec<&ColumnTotal> = self.column_totals.iter().collect();
        ranked.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        ranked
    }

    pub fn summary(&self) -> String {
        let range = match self.station_range {
            Some((first, last)) => format!("{} to {}", first, last),
            None => "none".to_string(),
        };

        format!(
            "Stations: {} rows (IDs {})\n\
            Columns: {} fields\n\
            Stations with data: {} ({:.1}%)\n\
            Stations without data: {}",
            self.total_rows,
            range,
            self.total_columns,
            self.total_rows - self.empty_rows,
            self.data_percentage(),
            self.empty_rows
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut output = self.summary();

        if !self.column_totals.is_empty() {
            output.push_str("\n\nColumn totals:");
            for column in self.ranked_columns() {
                output.push_str(&format!(
                    "\n- {}: {} ({} stations)",
                    column.name,
                    format_total(column.total),
                    column.non_zero_rows
                ));
                if column.text_cells > 0 {
                    output.push_str(&format!(", {} text cells", column.text_cells));
                }
            }
        }

        if !self.sample.is_empty() {
            output.push_str(&format!("\n\nSample ({} rows):", self.sample.len()));
            for row in &self.sample {
                let cells: Vec<String> = self
                    .columns
                    .iter()
                    .zip(&row.values)
                    .filter(|(_, value)| !value.is_zero())
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                let cells = if cells.is_empty() {
                    "no data".to_string()
                } else {
                    cells.join(", ")
                };
                output.push_str(&format!("\n  {}: {}", row.station_id, cells));
            }
        }

        output
    }
}

fn format_total(total: f64) -> String {
    if total.fract() == 0.0 && total.abs() < 1e15 {
        format!("{}", total as i64)
    } else {
        format!("{:.2}", total)
    }
}

pub struct TableAnalyzer {
    sample_size: usize,
}

impl TableAnalyzer {
    pub fn new() -> Self {
        Self { sample_size: 0 }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn analyze_csv(&self, path: &Path) -> Result<TableStatistics> {
        let table = CsvWriter::new().read_table(path)?;

        if table.is_empty() {
            return Err(ScrapeError::InvalidFormat(format!(
                "no station rows in {}",
                path.display()
            )));
        }

        Ok(self.analyze_table(&table))
    }

    pub fn analyze_table(&self, table: &ResultTable) -> TableStatistics {
        let mut column_totals: Vec<ColumnTotal> = table
            .columns()
            .iter()
            .map(|name| ColumnTotal {
                name: name.clone(),
                total: 0.0,
                non_zero_rows: 0,
                text_cells: 0,
            })
            .collect();

        let mut empty_rows = 0;
        for row in table.rows() {
            if row.is_all_zero() {
                empty_rows += 1;
            }

            for (column, value) in column_totals.iter_mut().zip(&row.values) {
                match value {
                    FieldValue::Text(_) => column.text_cells += 1,
                    other => {
                        let number = other.as_f64().unwrap_or_default();
                        column.total += number;
                        if number != 0.0 {
                            column.non_zero_rows += 1;
                        }
                    }
                }
            }
        }

        let ids = table.station_ids();
        let station_range = ids.first().copied().zip(ids.last().copied());

        TableStatistics {
            total_rows: table.row_count(),
            total_columns: table.column_count(),
            empty_rows,
            station_range,
            column_totals,
            columns: table.columns().to_vec(),
            sample: table.rows().iter().take(self.sample_size).cloned().collect(),
        }
    }
}

impl Default for TableAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
