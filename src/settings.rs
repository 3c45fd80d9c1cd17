//! Layered runtime settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `IZBORI__SECTION__KEY` environment variables. Command-line
//! flags are applied on top by the binary.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::error::Result;
use crate::fetchers::EndpointTemplate;
use crate::models::EndpointKind;
use crate::utils::constants::{
    BASIC_INFO_TEMPLATE, CANDIDATE_RESULTS_TEMPLATE, DEFAULT_CONFIG_FILE, DEFAULT_RESULT_KEY,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ENV_PREFIX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct HttpSettings {
    #[validate(range(min = 1, max = 600))]
    pub timeout_secs: u64,

    #[validate(length(min = 1))]
    pub user_agent: String,
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSettings {
    pub candidate_results: String,
    pub basic_info: String,
}

impl EndpointSettings {
    pub fn template_for(&self, kind: EndpointKind) -> Result<EndpointTemplate> {
        match kind {
            EndpointKind::CandidateResults => EndpointTemplate::new(self.candidate_results.as_str()),
            EndpointKind::BasicInfo => EndpointTemplate::new(self.basic_info.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScrapeSettings {
    #[validate(length(min = 1))]
    pub result_key: String,

    #[validate(range(min = 1, max = 512))]
    pub max_workers: usize,

    pub ordered_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub http: HttpSettings,
    pub endpoints: EndpointSettings,
    pub scrape: ScrapeSettings,
}

impl Settings {
    /// Load settings. An explicit `path` must exist; otherwise `izbori.toml`
    /// in the working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            path,
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::new(&path.to_string_lossy(), FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let settings: Settings = Self::defaults()?
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        settings.check()?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = Config::builder()
            .set_default("http.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("http.user_agent", DEFAULT_USER_AGENT)?
            .set_default("endpoints.candidate_results", CANDIDATE_RESULTS_TEMPLATE)?
            .set_default("endpoints.basic_info", BASIC_INFO_TEMPLATE)?
            .set_default("scrape.result_key", DEFAULT_RESULT_KEY)?
            .set_default("scrape.max_workers", num_cpus::get() as i64)?
            .set_default("scrape.ordered_progress", false)?;
        Ok(builder)
    }

    /// Validate every section and both URL templates.
    pub fn check(&self) -> Result<()> {
        self.http.validate()?;
        self.scrape.validate()?;
        self.endpoints.template_for(EndpointKind::CandidateResults)?;
        self.endpoints.template_for(EndpointKind::BasicInfo)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http: HttpSettings {
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            endpoints: EndpointSettings {
                candidate_results: CANDIDATE_RESULTS_TEMPLATE.to_string(),
                basic_info: BASIC_INFO_TEMPLATE.to_string(),
            },
            scrape: ScrapeSettings {
                result_key: DEFAULT_RESULT_KEY.to_string(),
                max_workers: num_cpus::get(),
                ordered_progress: false,
            },
        }
    }
}
