pub mod aggregator;
pub mod events;
pub mod scrape_orchestrator;

pub use aggregator::Aggregator;
pub use events::{ChannelSink, ProgressEvent, ProgressSink};
pub use scrape_orchestrator::{ScrapeOrchestrator, ScrapeState, ScrapeStats};
