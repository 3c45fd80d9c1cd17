use crate::error::{Result, ScrapeError};
use crate::models::EndpointKind;
use crate::utils::constants::{
    BASIC_INFO_TEMPLATE, CANDIDATE_RESULTS_TEMPLATE, RESULT_KEY_PLACEHOLDER,
    STATION_ID_PLACEHOLDER,
};

/// URL template with `{result_key}` and `{station_id}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    template: String,
}

impl EndpointTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();

        if !template.contains(STATION_ID_PLACEHOLDER) {
            return Err(ScrapeError::InvalidTemplate {
                template,
                reason: format!("missing {} placeholder", STATION_ID_PLACEHOLDER),
            });
        }

        if !(template.starts_with("http://") || template.starts_with("https://")) {
            return Err(ScrapeError::InvalidTemplate {
                template,
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }

        Ok(Self { template })
    }

    /// Built-in template for an endpoint kind.
    pub fn default_for(kind: EndpointKind) -> Self {
        let template = match kind {
            EndpointKind::CandidateResults => CANDIDATE_RESULTS_TEMPLATE,
            EndpointKind::BasicInfo => BASIC_INFO_TEMPLATE,
        };
        Self {
            template: template.to_string(),
        }
    }

    /// Single left-to-right pass; substituted text is not rescanned.
    pub fn render(&self, result_key: &str, station_id: u32) -> String {
        let mut url = String::with_capacity(self.template.len() + result_key.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            url.push_str(&rest[..open]);
            let tail = &rest[open..];
            if let Some(after) = tail.strip_prefix(STATION_ID_PLACEHOLDER) {
                url.push_str(&station_id.to_string());
                rest = after;
            } else if let Some(after) = tail.strip_prefix(RESULT_KEY_PLACEHOLDER) {
                url.push_str(result_key);
                rest = after;
            } else {
                url.push('{');
                rest = &tail[1..];
            }
        }
        url.push_str(rest);
        url
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}
