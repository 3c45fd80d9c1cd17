use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use validator::Validate;

use crate::error::{Result, ScrapeError};

/// Which remote endpoint a scrape targets. Selects both the URL template and
/// the payload shape the parser expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointKind {
    /// Per-candidate vote counts for a polling station.
    #[default]
    #[value(name = "candidates")]
    CandidateResults,
    /// Ballot and turnout statistics for a polling station.
    BasicInfo,
}

impl EndpointKind {
    /// Lowercase substrings that identify a wrapper key around the payload.
    pub fn wrapper_markers(&self) -> &'static [&'static str] {
        match self {
            EndpointKind::CandidateResults => &["results", "candidates"],
            EndpointKind::BasicInfo => &["basicinfo", "results"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::CandidateResults => "candidates",
            EndpointKind::BasicInfo => "basic-info",
        }
    }

    /// Human-readable note used when a station yields no fields.
    pub fn empty_note(&self) -> &'static str {
        match self {
            EndpointKind::CandidateResults => {
                "no candidates parsed (HTTP error, empty payload, or parse failure)"
            }
            EndpointKind::BasicInfo => {
                "no fields parsed (HTTP error, empty payload, or parse failure)"
            }
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scrape invocation: an inclusive station range against one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScrapeRequest {
    #[validate(range(min = 1))]
    pub start_id: u32,

    #[validate(range(min = 1))]
    pub end_id: u32,

    pub result_key: String,

    pub endpoint: EndpointKind,
}

impl ScrapeRequest {
    pub fn new(start_id: u32, end_id: u32, result_key: impl Into<String>, endpoint: EndpointKind) -> Self {
        Self {
            start_id,
            end_id,
            result_key: result_key.into(),
            endpoint,
        }
    }

    /// Checks the preconditions that must hold before any request goes out.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if self.start_id > self.end_id {
            return Err(ScrapeError::InvalidRange {
                start_id: self.start_id,
                end_id: self.end_id,
            });
        }

        Ok(())
    }

    pub fn station_ids(&self) -> RangeInclusive<u32> {
        self.start_id..=self.end_id
    }

    pub fn total(&self) -> usize {
        if self.start_id > self.end_id {
            0
        } else {
            (self.end_id - self.start_id) as usize + 1
        }
    }
}
