pub mod endpoint;
pub mod station_fetcher;

pub use endpoint::EndpointTemplate;
pub use station_fetcher::{build_client, decode_body, FetchOutcome, StationFetcher, StationSource};
