use serde_json::{Map, Value};

use crate::models::{EndpointKind, FieldRecord, FieldValue};
use crate::parsers::coercion::{coerce_count, coerce_text};
use crate::utils::constants::{JSON_NAME_KEYS, JSON_VOTES_KEYS};

/// Parse a JSON payload for the given endpoint shape.
///
/// Returns `None` when the text is not JSON-shaped, fails to parse, or yields
/// no fields, so the caller can fall back to XML.
pub fn parse_json(text: &str, kind: EndpointKind) -> Option<FieldRecord> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return None;
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(e) => {
            tracing::trace!(error = %e, "payload is not valid JSON");
            return None;
        }
    };

    let record = match kind {
        EndpointKind::CandidateResults => candidate_record(&value, kind),
        EndpointKind::BasicInfo => basic_info_record(&value, kind),
    };

    if record.is_empty() {
        None
    } else {
        Some(record)
    }
}

/// First key whose lowercase form contains one of the markers and whose value
/// is a container. Best-effort: the remote service is not consistent about
/// wrapper names.
fn find_wrapper<'a>(map: &'a Map<String, Value>, markers: &[&str]) -> Option<&'a Value> {
    map.iter()
        .find(|(key, value)| {
            let lower = key.to_lowercase();
            (value.is_array() || value.is_object())
                && markers.iter().any(|marker| lower.contains(marker))
        })
        .map(|(_, value)| value)
}

fn lookup<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| item.get(*key))
}

fn candidate_items<'a>(value: &'a Value, kind: EndpointKind) -> Vec<&'a Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match find_wrapper(map, kind.wrapper_markers()) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(inner) => vec![inner],
            None => vec![value],
        },
        _ => Vec::new(),
    }
}

fn candidate_record(value: &Value, kind: EndpointKind) -> FieldRecord {
    let mut record = FieldRecord::new();

    for item in candidate_items(value, kind) {
        let Some(item) = item.as_object() else {
            continue;
        };

        let name = match lookup(item, JSON_NAME_KEYS).and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => name.trim(),
            _ => continue,
        };

        let votes = lookup(item, JSON_VOTES_KEYS).map(json_count).unwrap_or(0);
        record.insert(name, FieldValue::Int(votes));
    }

    record
}

fn json_count(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(|f| FieldValue::from_number(f).as_i64()))
            .unwrap_or(0),
        Value::String(s) => coerce_count(s),
        _ => 0,
    }
}

fn basic_info_object<'a>(value: &'a Value, kind: EndpointKind) -> Option<&'a Map<String, Value>> {
    let target = match value {
        Value::Object(map) => find_wrapper(map, kind.wrapper_markers()).unwrap_or(value),
        other => other,
    };

    match target {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.iter().find_map(Value::as_object),
        _ => None,
    }
}

fn basic_info_record(value: &Value, kind: EndpointKind) -> FieldRecord {
    basic_info_object(value, kind)
        .map(|map| {
            map.iter()
                .map(|(key, value)| (key.as_str(), json_field_value(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn json_field_value(value: &Value) -> FieldValue {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(v) => FieldValue::Int(v),
            None => n.as_f64().map(FieldValue::from_number).unwrap_or(FieldValue::ZERO),
        },
        Value::String(s) => coerce_text(s),
        Value::Null => FieldValue::ZERO,
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        nested => FieldValue::Text(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: EndpointKind = EndpointKind::CandidateResults;
    const BASIC_INFO: EndpointKind = EndpointKind::BasicInfo;

    #[test]
    fn test_candidate_list() {
        let payload = r#"[
            {"name": "Alice", "totalVotes": "10"},
            {"Name": "Bob", "TotalVotes": 4},
            {"name": "Carol"},
            {"name": "Dave", "totalVotes": "n/a"},
            {"totalVotes": 99}
        ]"#;

        let record = parse_json(payload, CANDIDATES).unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("Alice"), Some(&FieldValue::Int(10)));
        assert_eq!(record.get("Bob"), Some(&FieldValue::Int(4)));
        assert_eq!(record.get("Carol"), Some(&FieldValue::ZERO));
        assert_eq!(record.get("Dave"), Some(&FieldValue::ZERO));
    }

    #[test]
    fn test_candidate_wrapper_is_unwrapped() {
        let payload = r#"{"Race5_PollingStationsCandidatesResults": [
            {"name": "Alice", "totalVotes": 3},
            {"name": "Alice", "totalVotes": 5}
        ]}"#;

        let record = parse_json(payload, CANDIDATES).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("Alice"), Some(&FieldValue::Int(5)));
    }

    #[test]
    fn test_single_candidate_object() {
        let record = parse_json(r#"{"name": "Alice", "totalVotes": 12.0}"#, CANDIDATES).unwrap();
        assert_eq!(record.get("Alice"), Some(&FieldValue::Int(12)));
    }

    #[test]
    fn test_blank_names_are_skipped() {
        assert!(parse_json(r#"[{"name": "  ", "totalVotes": 3}]"#, CANDIDATES).is_none());
        assert!(parse_json(r#"[1, "two", null]"#, CANDIDATES).is_none());
    }

    #[test]
    fn test_malformed_json_returns_none() {
        assert!(parse_json(r#"[{"name": "Alice", "totalVotes": 1"#, CANDIDATES).is_none());
        assert!(parse_json("{", BASIC_INFO).is_none());
        assert!(parse_json("<Root/>", CANDIDATES).is_none());
        assert!(parse_json("", CANDIDATES).is_none());
    }

    #[test]
    fn test_basic_info_object() {
        let payload = r#"{"Voters": 1500, "Turnout": 62.5, "Municipality": "Centar",
                          "Invalid": "12", "Blank": "", "Missing": null, "Counted": true}"#;

        let record = parse_json(payload, BASIC_INFO).unwrap();

        assert_eq!(record.get("Voters"), Some(&FieldValue::Int(1500)));
        assert_eq!(record.get("Turnout"), Some(&FieldValue::Float(62.5)));
        assert_eq!(record.get("Municipality"), Some(&FieldValue::Text("Centar".to_string())));
        assert_eq!(record.get("Invalid"), Some(&FieldValue::Int(12)));
        assert_eq!(record.get("Blank"), Some(&FieldValue::ZERO));
        assert_eq!(record.get("Missing"), Some(&FieldValue::ZERO));
        assert_eq!(record.get("Counted"), Some(&FieldValue::Text("true".to_string())));
    }

    #[test]
    fn test_basic_info_wrapper_and_list() {
        let wrapped = r#"{"PollingStationBasicInfo": {"Voters": 900, "Turnout": 41.0}}"#;
        let record = parse_json(wrapped, BASIC_INFO).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("Turnout"), Some(&FieldValue::Int(41)));

        let listed = r#"[{"Voters": 900}]"#;
        let record = parse_json(listed, BASIC_INFO).unwrap();
        assert_eq!(record.get("Voters"), Some(&FieldValue::Int(900)));
    }

    #[test]
    fn test_scalar_wrapper_key_is_not_unwrapped() {
        let record = parse_json(r#"{"Results": 3, "Voters": 10}"#, BASIC_INFO).unwrap();
        assert_eq!(record.get("Results"), Some(&FieldValue::Int(3)));
        assert_eq!(record.get("Voters"), Some(&FieldValue::Int(10)));
    }
}
