//! Append-only run log for batch statement exports.
//!
//! Each processed file gets one JSON-lines entry with a timestamp, a status
//! and a free-form message; `finish()` appends a human-readable summary so
//! the log file can be read without tooling.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

/// Outcome of one file in a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Accepted,
    Rejected,
    Skipped,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Accepted => "accepted",
            FileStatus::Rejected => "rejected",
            FileStatus::Skipped => "skipped",
            FileStatus::Error => "error",
        }
    }
}

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String,
    status: FileStatus,
    file: String,
    message: &'a str,
}

/// Per-status counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.accepted + self.rejected + self.skipped + self.errors
    }
}

/// Log writer for one batch run. Single writer, entries appended in order.
pub struct RunLog {
    path: PathBuf,
    file: File,
    counts: RunSummary,
}

impl RunLog {
    /// Creates `batch_export_<label>_<timestamp>.log` inside `dir`.
    pub fn create(dir: &Path, label: &str) -> io::Result<RunLog> {
        fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("batch_export_{label}_{stamp}.log"));
        let mut file = File::create(&path)?;
        writeln!(file, "# fatura batch export log")?;
        writeln!(
            file,
            "# started: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file, "# format: {label}")?;
        Ok(RunLog {
            path,
            file,
            counts: RunSummary::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry and updates the counts.
    pub fn record(&mut self, status: FileStatus, file: &Path, message: &str) -> io::Result<()> {
        match status {
            FileStatus::Accepted => self.counts.accepted += 1,
            FileStatus::Rejected => self.counts.rejected += 1,
            FileStatus::Skipped => self.counts.skipped += 1,
            FileStatus::Error => self.counts.errors += 1,
        }

        let entry = LogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            status,
            file: file.display().to_string(),
            message,
        };
        let line = serde_json::to_string(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(self.file, "{line}")
    }

    pub fn summary(&self) -> RunSummary {
        self.counts
    }

    /// Writes the human-readable footer and returns the final counts.
    pub fn finish(mut self) -> io::Result<RunSummary> {
        writeln!(self.file, "# finished: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(self.file, "# total: {}", self.counts.total())?;
        writeln!(self.file, "#   accepted: {}", self.counts.accepted)?;
        writeln!(self.file, "#   rejected: {}", self.counts.rejected)?;
        writeln!(self.file, "#   skipped:  {}", self.counts.skipped)?;
        writeln!(self.file, "#   errors:   {}", self.counts.errors)?;
        Ok(self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_summary_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RunLog::create(dir.path(), "ynab").unwrap();

        log.record(FileStatus::Accepted, Path::new("a.pdf"), "exported")
            .unwrap();
        log.record(FileStatus::Accepted, Path::new("b.pdf"), "exported")
            .unwrap();
        log.record(FileStatus::Skipped, Path::new("c.pdf"), "output exists")
            .unwrap();
        log.record(FileStatus::Error, Path::new("d.pdf"), "wrong password")
            .unwrap();

        let summary = log.summary();
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_entries_are_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path;
        {
            let mut log = RunLog::create(dir.path(), "csv").unwrap();
            log.record(FileStatus::Rejected, Path::new("x.csv"), "user rejected")
                .unwrap();
            path = log.path().to_path_buf();
            log.finish().unwrap();
        }

        let contents = fs::read_to_string(path).unwrap();
        let entry_line = contents
            .lines()
            .find(|l| !l.starts_with('#'))
            .expect("one entry line");
        let parsed: serde_json::Value = serde_json::from_str(entry_line).unwrap();
        assert_eq!(parsed["status"], "rejected");
        assert_eq!(parsed["file"], "x.csv");
    }

    #[test]
    fn test_finish_writes_footer() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::create(dir.path(), "json").unwrap();
        let path = log.path().to_path_buf();
        let summary = log.finish().unwrap();
        assert_eq!(summary.total(), 0);

        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("# total: 0"));
    }
}
