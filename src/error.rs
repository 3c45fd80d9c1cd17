use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid station range: start_id {start_id} is greater than end_id {end_id}")]
    InvalidRange { start_id: u32, end_id: u32 },

    #[error("Invalid URL template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
