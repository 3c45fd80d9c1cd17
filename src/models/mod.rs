pub mod record;
pub mod request;
pub mod table;

pub use record::{FieldRecord, FieldValue};
pub use request::{EndpointKind, ScrapeRequest};
pub use table::{ResultTable, TableRow};
