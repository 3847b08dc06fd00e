//! Request and run summary logging.
//!
//! Lines are free-form and human-readable. Each write opens the log file in
//! append mode and closes it again, so no handle is held between requests.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use log::{info, warn};

/// Destination of request and summary log lines.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    file: Option<PathBuf>,
    show: bool,
}

impl RunLog {
    /// Creates a run log.
    ///
    /// # Arguments
    ///
    /// * `file` - Append lines to this file (`None` keeps no file)
    /// * `show` - Emit lines through the logger at info level
    pub fn new(file: Option<PathBuf>, show: bool) -> Self {
        Self { file, show }
    }

    /// A run log that drops every line.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Log file, if lines are kept.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Records one line.
    ///
    /// A failure to write the log file is reported as a warning and does not
    /// interrupt the run.
    pub fn write(&self, line: &str) {
        if self.show {
            info!("{}", line);
        }
        if let Some(path) = &self.file {
            if let Err(e) = append_line(path, line) {
                warn!("Failed to append to log file {}: {}", path.display(), e);
            }
        }
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}

/// Local date and time in the log line format (`%x %X`).
pub fn timestamp() -> String {
    Local::now().format("%x %X").to_string()
}

/// Formats a duration as `H hours, M minutes and S seconds`, rounded to the second.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs_f64().round() as u64;
    let hours = total / 3600;
    let minutes = total / 60 % 60;
    let seconds = total % 60;
    format!(
        "{} hours, {} minutes and {} seconds",
        hours, minutes, seconds
    )
}
