use roxmltree::{Document, Node, ParsingOptions};

use crate::models::{EndpointKind, FieldRecord, FieldValue};
use crate::parsers::coercion::{coerce_count, coerce_text};
use crate::utils::constants::{XML_CANDIDATE_ITEM, XML_CANDIDATE_NAME, XML_CANDIDATE_VOTES};

/// How element names are compared against the expected local names.
#[derive(Debug, Clone, Copy)]
enum NameMatch<'a> {
    /// Local name plus the exact namespace of the document root.
    Namespaced(Option<&'a str>),
    /// Local name only, whatever namespace the element is in.
    LocalOnly,
}

impl NameMatch<'_> {
    fn matches(&self, node: &Node, local: &str) -> bool {
        if !node.is_element() || node.tag_name().name() != local {
            return false;
        }
        match self {
            NameMatch::Namespaced(namespace) => node.tag_name().namespace() == *namespace,
            NameMatch::LocalOnly => true,
        }
    }
}

/// Parse an XML payload for the given endpoint shape.
///
/// Malformed documents and documents without usable items yield `None`.
pub fn parse_xml(text: &str, kind: EndpointKind) -> Option<FieldRecord> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = match Document::parse_with_options(trimmed, options) {
        Ok(document) => document,
        Err(e) => {
            tracing::trace!(error = %e, "payload is not well-formed XML");
            return None;
        }
    };

    let root = document.root_element();
    let record = match kind {
        EndpointKind::CandidateResults => candidate_record(root),
        EndpointKind::BasicInfo => basic_info_record(root),
    };

    if record.is_empty() {
        None
    } else {
        Some(record)
    }
}

fn candidate_record(root: Node) -> FieldRecord {
    let namespaced = collect_candidates(root, NameMatch::Namespaced(root.tag_name().namespace()));
    if !namespaced.is_empty() {
        return namespaced;
    }

    // Some documents declare a namespace on the root that the items don't share.
    collect_candidates(root, NameMatch::LocalOnly)
}

fn collect_candidates(root: Node, name_match: NameMatch) -> FieldRecord {
    let mut record = FieldRecord::new();

    for item in root
        .children()
        .filter(|node| name_match.matches(node, XML_CANDIDATE_ITEM))
    {
        let name = child_text(item, XML_CANDIDATE_NAME, name_match).unwrap_or_default();
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        let votes = child_text(item, XML_CANDIDATE_VOTES, name_match)
            .map(|text| coerce_count(&text))
            .unwrap_or(0);

        record.insert(name, FieldValue::Int(votes));
    }

    record
}

fn child_text(item: Node, local: &str, name_match: NameMatch) -> Option<String> {
    item.children()
        .find(|node| name_match.matches(node, local))
        .map(element_text)
}

/// Concatenated direct text children; comments and processing instructions are skipped.
fn element_text(node: Node) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|child| child.text())
        .collect()
}

fn basic_info_record(root: Node) -> FieldRecord {
    root.children()
        .filter(Node::is_element)
        .map(|node| {
            let value = coerce_text(&element_text(node));
            (node.tag_name().name(), value)
        })
        .collect()
}
