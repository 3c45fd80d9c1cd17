use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::fetchers::StationSource;
use crate::models::{ResultTable, ScrapeRequest};
use crate::parsers::ResponseParser;
use crate::processors::{Aggregator, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScrapeState {
    Idle,
    Running,
    Finished,
}

/// Counters for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrapeStats {
    pub total: usize,
    pub fetched: usize,
    pub failed: usize,
    pub with_data: usize,
    pub empty: usize,
    pub elapsed: Duration,
}

impl ScrapeStats {
    pub fn summary(&self) -> String {
        format!(
            "{} stations: {} fetched, {} failed, {} with data, {} empty in {:.2}s",
            self.total,
            self.fetched,
            self.failed,
            self.with_data,
            self.empty,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Drives fetch, parse and ingest for every station of a request.
///
/// Up to `max_workers` stations are in flight at once. Results are drained by
/// a single consumer, so the aggregator never needs locking.
pub struct ScrapeOrchestrator<S> {
    source: S,
    max_workers: usize,
    ordered_progress: bool,
    state: ScrapeState,
    stats: ScrapeStats,
}

impl<S: StationSource> ScrapeOrchestrator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_workers: num_cpus::get(),
            ordered_progress: false,
            state: ScrapeState::Idle,
            stats: ScrapeStats::default(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Report progress in station order instead of completion order.
    pub fn with_ordered_progress(mut self, ordered: bool) -> Self {
        self.ordered_progress = ordered;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn state(&self) -> ScrapeState {
        self.state
    }

    pub fn stats(&self) -> &ScrapeStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scrape every station in the request and return the dense table.
    ///
    /// Fails only when the request itself is invalid; nothing is fetched in
    /// that case. Per-station failures become all-zero rows.
    pub async fn run(
        &mut self,
        request: &ScrapeRequest,
        sink: Option<&dyn ProgressSink>,
    ) -> Result<ResultTable> {
        request.check()?;

        let started = Instant::now();
        let total = request.total();
        let kind = request.endpoint;
        let parser = ResponseParser::new(kind);

        self.state = ScrapeState::Running;
        tracing::info!(
            start_id = request.start_id,
            end_id = request.end_id,
            endpoint = %kind,
            workers = self.max_workers,
            "starting scrape"
        );

        let source = &self.source;
        let tasks = stream::iter(request.station_ids()).map(move |station_id| async move {
            let outcome = source.fetch(station_id).await;
            let record = parser.parse(&outcome.raw);
            (outcome, record)
        });

        let mut results = if self.ordered_progress {
            tasks.buffered(self.max_workers).boxed_local()
        } else {
            tasks.buffer_unordered(self.max_workers).boxed_local()
        };

        let mut aggregator = Aggregator::new();
        let mut stats = ScrapeStats {
            total,
            ..ScrapeStats::default()
        };
        let mut index = 0;

        while let Some((outcome, record)) = results.next().await {
            index += 1;

            if outcome.succeeded {
                stats.fetched += 1;
            } else {
                stats.failed += 1;
            }
            if record.is_empty() {
                stats.empty += 1;
                tracing::debug!(station_id = outcome.station_id, "{}", kind.empty_note());
            } else {
                stats.with_data += 1;
            }

            aggregator.ingest(outcome.station_id, record.clone());

            if let Some(sink) = sink {
                sink.on_station(&ProgressEvent {
                    index,
                    total,
                    station_id: outcome.station_id,
                    record,
                    raw_response: outcome.raw,
                    fetched: outcome.succeeded,
                });
            }
        }

        stats.elapsed = started.elapsed();
        let table = aggregator.finalize();

        tracing::info!(failed = stats.failed, "{}", stats.summary());
        tracing::info!(
            rows = table.row_count(),
            columns = table.column_count(),
            "aggregation complete"
        );

        self.stats = stats;
        self.state = ScrapeState::Finished;
        Ok(table)
    }
}
