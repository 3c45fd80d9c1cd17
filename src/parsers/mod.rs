//! Response parsing: raw payload text to a `FieldRecord`.
//!
//! Payloads are sniffed rather than trusted: JSON is attempted first and XML
//! is the fallback when JSON yields nothing. Every failure degrades to an
//! empty record, never to an error.

pub mod coercion;
pub mod json_parser;
pub mod xml_parser;

pub use coercion::{coerce_count, coerce_text};
pub use json_parser::parse_json;
pub use xml_parser::parse_xml;

use crate::models::{EndpointKind, FieldRecord};

/// Parse one station's raw response. First non-empty strategy wins.
pub fn parse_response(raw: &str, kind: EndpointKind) -> FieldRecord {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return FieldRecord::new();
    }

    parse_json(trimmed, kind)
        .or_else(|| parse_xml(trimmed, kind))
        .unwrap_or_default()
}

/// Parser bound to one endpoint shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    kind: EndpointKind,
}

impl ResponseParser {
    pub fn new(kind: EndpointKind) -> Self {
        Self { kind }
    }

    pub fn parse(&self, raw: &str) -> FieldRecord {
        parse_response(raw, self.kind)
    }
}
