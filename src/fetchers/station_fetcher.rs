use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::fetchers::EndpointTemplate;
use crate::utils::constants::DEFAULT_USER_AGENT;

/// Result of a single station request.
///
/// Transport failures are not errors: they come back with `succeeded = false`
/// and an empty `raw`, which parses to an empty record like any other bad payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub station_id: u32,
    pub raw: String,
    pub succeeded: bool,
    /// HTTP status, when a response was received at all.
    pub status: Option<u16>,
}

impl FetchOutcome {
    pub fn success(station_id: u32, status: u16, raw: String) -> Self {
        Self {
            station_id,
            raw,
            succeeded: true,
            status: Some(status),
        }
    }

    pub fn failure(station_id: u32, status: Option<u16>) -> Self {
        Self {
            station_id,
            raw: String::new(),
            succeeded: false,
            status,
        }
    }
}

/// Anything that can produce the raw payload for a station.
pub trait StationSource {
    fn fetch(&self, station_id: u32) -> impl Future<Output = FetchOutcome>;
}

/// HTTP client shared by every request of a scrape.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Fetches one station at a time from a templated endpoint. One attempt, no retry.
#[derive(Debug, Clone)]
pub struct StationFetcher {
    client: reqwest::Client,
    template: EndpointTemplate,
    result_key: String,
}

impl StationFetcher {
    pub fn new(template: EndpointTemplate, result_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = build_client(timeout, DEFAULT_USER_AGENT)?;
        Ok(Self::with_client(client, template, result_key))
    }

    pub fn with_client(
        client: reqwest::Client,
        template: EndpointTemplate,
        result_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            template,
            result_key: result_key.into(),
        }
    }

    pub fn url_for(&self, station_id: u32) -> String {
        self.template.render(&self.result_key, station_id)
    }

    pub async fn fetch_station(&self, station_id: u32) -> FetchOutcome {
        let url = self.url_for(station_id);
        tracing::debug!(station_id, %url, "fetching station");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(station_id, error = %e, "request failed");
                return FetchOutcome::failure(station_id, None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(station_id, status = status.as_u16(), "non-success HTTP status");
            return FetchOutcome::failure(station_id, Some(status.as_u16()));
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);

        match response.bytes().await {
            Ok(bytes) => {
                let raw = decode_body(&bytes, charset.as_deref());
                FetchOutcome::success(station_id, status.as_u16(), raw)
            }
            Err(e) => {
                tracing::debug!(station_id, error = %e, "failed to read response body");
                FetchOutcome::failure(station_id, Some(status.as_u16()))
            }
        }
    }
}

impl StationSource for StationFetcher {
    fn fetch(&self, station_id: u32) -> impl Future<Output = FetchOutcome> {
        self.fetch_station(station_id)
    }
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

/// Decode a body using the declared charset; a BOM overrides it, UTF-8 is the fallback.
pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = used.name(), "body contained malformed sequences");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("application/xml; charset=windows-1250"),
            Some("windows-1250".to_string())
        );
        assert_eq!(
            charset_from_content_type("text/xml;Charset=\"UTF-8\""),
            Some("UTF-8".to_string())
        );
        assert_eq!(charset_from_content_type("application/json"), None);
    }

    #[test]
    fn test_decode_body_with_declared_charset() {
        // "Šćepan" in windows-1250
        let bytes = [0x8A, 0xE6, 0x65, 0x70, 0x61, 0x6E];
        assert_eq!(decode_body(&bytes, Some("windows-1250")), "Šćepan");
    }

    #[test]
    fn test_decode_body_strips_bom_and_defaults_to_utf8() {
        let bytes = b"\xEF\xBB\xBF<Root/>";
        assert_eq!(decode_body(bytes, None), "<Root/>");
        assert_eq!(decode_body(b"<Root/>", Some("no-such-charset")), "<Root/>");
    }

    #[test]
    fn test_failure_outcome_has_empty_body() {
        let outcome = FetchOutcome::failure(3, Some(500));
        assert!(!outcome.succeeded);
        assert!(outcome.raw.is_empty());
        assert_eq!(outcome.status, Some(500));
    }

    #[test]
    fn test_url_for_station() {
        let template = EndpointTemplate::new("http://localhost/{result_key}/{station_id}/4").unwrap();
        let fetcher = StationFetcher::new(template, "key", Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.url_for(12), "http://localhost/key/12/4");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_station_failures_log_below_warn() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let template = EndpointTemplate::new(format!("http://{}/{{result_key}}/{{station_id}}", addr)).unwrap();
        let fetcher = StationFetcher::new(template, "key", Duration::from_secs(1)).unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let outcome = fetcher.fetch_station(7).await;
        assert!(!outcome.succeeded);

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("request failed"));
        assert!(!text.contains("WARN"));
    }
}
