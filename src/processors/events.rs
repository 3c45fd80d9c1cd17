use crossbeam::channel::Sender;
use serde::Serialize;

use crate::models::{EndpointKind, FieldRecord};

/// Emitted once per processed station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    /// 1-based position in the processing order.
    pub index: usize,
    pub total: usize,
    pub station_id: u32,
    pub record: FieldRecord,
    /// Untruncated response body; empty when the fetch failed.
    pub raw_response: String,
    pub fetched: bool,
}

impl ProgressEvent {
    /// `index/total | ID n: details` line for scrape logs.
    pub fn log_line(&self, kind: EndpointKind) -> String {
        let details = if self.record.is_empty() {
            kind.empty_note().to_string()
        } else {
            self.record.describe()
        };
        format!(
            "{}/{} | ID {}: {}",
            self.index, self.total, self.station_id, details
        )
    }
}

/// Observer for scrape progress. Consumers use events for display only.
pub trait ProgressSink {
    fn on_station(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent),
{
    fn on_station(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Forwards events into a channel so another thread can consume them.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn on_station(&self, event: &ProgressEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!(station_id = event.station_id, "progress receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn event(record: FieldRecord) -> ProgressEvent {
        ProgressEvent {
            index: 2,
            total: 4,
            station_id: 17,
            record,
            raw_response: String::new(),
            fetched: true,
        }
    }

    #[test]
    fn test_log_line() {
        let record: FieldRecord = vec![("Alice", FieldValue::Int(10))].into_iter().collect();
        assert_eq!(
            event(record).log_line(EndpointKind::CandidateResults),
            "2/4 | ID 17: Alice=10"
        );
        assert!(event(FieldRecord::new())
            .log_line(EndpointKind::CandidateResults)
            .ends_with("no candidates parsed (HTTP error, empty payload, or parse failure)"));
    }

    #[test]
    fn test_channel_sink_forwards_events() {
        let (tx, rx) = crossbeam::channel::unbounded();
        let sink = ChannelSink::new(tx);

        sink.on_station(&event(FieldRecord::new()));
        let received = rx.try_recv().unwrap();
        assert_eq!(received.station_id, 17);

        drop(rx);
        // A dropped receiver must not panic the producer.
        sink.on_station(&event(FieldRecord::new()));
    }
}
