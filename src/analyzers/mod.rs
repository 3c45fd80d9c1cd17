pub mod table_analyzer;

pub use table_analyzer::{ColumnTotal, TableAnalyzer, TableStatistics};
