use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::models::EndpointKind;
use crate::processors::{ProgressEvent, ProgressSink};
use crate::utils::constants::RAW_DISPLAY_LIMIT;

pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    silent: bool,
    station_log: Option<StationLog>,
}

/// What to print for each station besides advancing the bar.
#[derive(Debug, Clone, Copy)]
struct StationLog {
    kind: EndpointKind,
    show_raw: bool,
}

impl ProgressReporter {
    pub fn new(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            return Self::silent();
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
            silent: false,
            station_log: None,
        }
    }

    fn silent() -> Self {
        Self {
            progress_bar: None,
            silent: true,
            station_log: None,
        }
    }

    /// Print one line per station, plus the raw payload when `show_raw` is set.
    pub fn with_station_log(mut self, kind: EndpointKind, show_raw: bool) -> Self {
        self.station_log = Some(StationLog { kind, show_raw });
        self
    }

    fn update(&self, current: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(current);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn println(&self, message: &str) {
        if !self.silent {
            if let Some(ref pb) = self.progress_bar {
                pb.println(message);
            } else {
                println!("{}", message);
            }
        }
    }
}

impl ProgressSink for ProgressReporter {
    fn on_station(&self, event: &ProgressEvent) {
        self.update(event.index as u64);
        self.set_message(&format!("Processing ID {}", event.station_id));

        if let Some(log) = self.station_log {
            self.println(&event.log_line(log.kind));
            if log.show_raw && !event.raw_response.is_empty() {
                self.println(&truncate_for_display(&event.raw_response, RAW_DISPLAY_LIMIT));
            }
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish();
        }
    }
}

/// Cut `text` to at most `limit` characters, marking the cut.
pub fn truncate_for_display(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => format!(
            "{}... [truncated, {} characters total]",
            &text[..byte_index],
            text.chars().count()
        ),
        None => text.to_string(),
    }
}
