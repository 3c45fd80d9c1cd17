use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;

/// Default export path: output/polling-stations-{YYMMDD}.csv
pub fn generate_default_csv_filename() -> PathBuf {
    csv_filename_for(Local::now().date_naive())
}

pub fn csv_filename_for(date: NaiveDate) -> PathBuf {
    let filename = format!(
        "polling-stations-{:02}{:02}{:02}.csv",
        date.year() % 100,
        date.month(),
        date.day()
    );
    PathBuf::from("output").join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_csv_filename() {
        let filename = generate_default_csv_filename();
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));
        assert!(filename_str.ends_with(".csv"));

        let parts: Vec<&str> = filename_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[1].starts_with("polling-stations-"));
    }

    #[test]
    fn test_filename_for_date() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        assert_eq!(
            csv_filename_for(date),
            PathBuf::from("output/polling-stations-251103.csv")
        );
    }
}
