use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use crate::error::Result;

/// Install the global fmt subscriber. `INFO` by default, `DEBUG` when verbose.
///
/// Logs go to stderr so they never mix with command output on stdout; with a
/// log file they are written there without ANSI colours. Calling it twice is
/// harmless: the second subscriber is ignored.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("scrape.log");

        init_logging(true, Some(&path)).unwrap();
        assert!(path.exists());

        // Second install is ignored rather than panicking.
        init_logging(false, None).unwrap();
    }
}
