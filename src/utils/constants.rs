/// Export column holding the station id
pub const INDEX_COLUMN: &str = "polling_station_id";

/// Default remote snapshot
pub const DEFAULT_RESULT_KEY: &str = "WebResult_2022GENP1_2025_11_19_14_41_56";

/// URL template placeholders
pub const RESULT_KEY_PLACEHOLDER: &str = "{result_key}";
pub const STATION_ID_PLACEHOLDER: &str = "{station_id}";

/// Default endpoint templates
pub const CANDIDATE_RESULTS_TEMPLATE: &str =
    "https://www.izbori.ba/api_2018/race5_pollingstationscandidatesresult/%22{result_key}%22/{station_id}/4";
pub const BASIC_INFO_TEMPLATE: &str =
    "https://www.izbori.ba/api_2018/race5_pollingstationbasicinfo/%22{result_key}%22/{station_id}";

/// XML element names
pub const XML_CANDIDATE_ITEM: &str = "Race5_PollingStationsCandidatesResult";
pub const XML_CANDIDATE_NAME: &str = "Name";
pub const XML_CANDIDATE_VOTES: &str = "TotalVotes";

/// JSON keys tried for candidate items, in order
pub const JSON_NAME_KEYS: &[&str] = &["name", "Name"];
pub const JSON_VOTES_KEYS: &[&str] = &["totalVotes", "TotalVotes", "totalvotes"];

/// HTTP defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("izbori-scraper/", env!("CARGO_PKG_VERSION"));

/// Display limits
pub const RAW_DISPLAY_LIMIT: usize = 4000;

/// Settings
pub const DEFAULT_CONFIG_FILE: &str = "izbori.toml";
pub const ENV_PREFIX: &str = "IZBORI";
