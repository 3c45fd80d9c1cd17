pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use filename::{csv_filename_for, generate_default_csv_filename};
pub use logging::init_logging;
pub use progress::{truncate_for_display, ProgressReporter};
