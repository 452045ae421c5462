//! Append-only CSV log of visualization requests.
//!
//! One row per served visualization (demo view or live run). Rows are never
//! updated or deleted; the file only grows. Appends go through an in-process
//! mutex held for the whole open/write cycle so concurrent request handlers
//! cannot interleave partial rows or race the header write.
//!
//! Rows are hand-formatted CSV, matching the one consumer (a spreadsheet).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;
use thiserror::Error;

use crate::model::{PlotType, ReductionAlgo, SimilarityType};

/// How the dataset reached us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMethod {
    /// One of the bundled sample datasets.
    Sample,
    /// A user-uploaded table.
    Upload,
}

impl UploadMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sample => "sample",
            Self::Upload => "upload",
        }
    }
}

/// One immutable log row.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
    pub upload_method: UploadMethod,
    pub dataset_length: u64,
    pub with_target: bool,
    /// Measured plotting time in seconds (demo: embed time; live: engine time).
    pub plotting_time_secs: f64,
    pub sim_type: SimilarityType,
    pub algorithm: ReductionAlgo,
    pub plot_type: PlotType,
    pub remove_outliers: Option<bool>,
    pub random_state: Option<u64>,
}

impl LogRecord {
    /// Build a row stamped with the current local date and time.
    #[allow(clippy::too_many_arguments)]
    pub fn now(
        upload_method: UploadMethod,
        dataset_length: u64,
        with_target: bool,
        plotting_time_secs: f64,
        sim_type: SimilarityType,
        algorithm: ReductionAlgo,
        plot_type: PlotType,
        remove_outliers: Option<bool>,
        random_state: Option<u64>,
    ) -> Self {
        let now = Local::now();
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            upload_method,
            dataset_length,
            with_target,
            plotting_time_secs,
            sim_type,
            algorithm,
            plot_type,
            remove_outliers,
            random_state,
        }
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "date,time,upload_method,dataset_length,with_target,plotting_time_secs,sim_type,algorithm,plot_type,remove_outliers,random_state"
    }

    /// Format as one CSV row. All fields are comma-free by construction.
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{},{},{:.3},{},{},{},{},{}",
            self.date,
            self.time,
            self.upload_method.name(),
            self.dataset_length,
            self.with_target,
            self.plotting_time_secs,
            self.sim_type.name(),
            self.algorithm.token(),
            self.plot_type.name(),
            opt_str(self.remove_outliers),
            opt_str(self.random_state),
        )
    }
}

fn opt_str<T: std::fmt::Display>(v: Option<T>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Errors from appending to the log file.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append to log file {}: {source}", .path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only log store backed by a single CSV file.
pub struct WebLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl WebLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, creating the file (and its header) on first use.
    ///
    /// The mutex is held across the whole open/write cycle, so within one
    /// process appends cannot be lost or interleaved.
    pub fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        let _guard = self.lock.lock();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LogError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogError::Append { path: self.path.clone(), source: e })?;

        let is_new = file
            .metadata()
            .map(|m| m.len() == 0)
            .unwrap_or(false);

        let mut buf = String::new();
        if is_new {
            buf.push_str(LogRecord::csv_header());
            buf.push('\n');
        }
        buf.push_str(&record.to_csv());
        buf.push('\n');

        file.write_all(buf.as_bytes())
            .map_err(|e| LogError::Append { path: self.path.clone(), source: e })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> LogRecord {
        LogRecord {
            date: "2024-05-01".into(),
            time: "12:30:00".into(),
            upload_method: UploadMethod::Sample,
            dataset_length: 2039,
            with_target: true,
            plotting_time_secs: 0.125,
            sim_type: SimilarityType::Tailored,
            algorithm: ReductionAlgo::Tsne,
            plot_type: PlotType::Scatter,
            remove_outliers: None,
            random_state: None,
        }
    }

    #[test]
    fn test_csv_row_shape() {
        let row = sample_record().to_csv();
        assert_eq!(
            row,
            "2024-05-01,12:30:00,sample,2039,true,0.125,tailored,tsne,scatter,,"
        );
        assert_eq!(
            row.matches(',').count(),
            LogRecord::csv_header().matches(',').count()
        );
    }

    #[test]
    fn test_upload_row_carries_options() {
        let mut rec = sample_record();
        rec.upload_method = UploadMethod::Upload;
        rec.remove_outliers = Some(true);
        rec.random_state = Some(42);
        let row = rec.to_csv();
        assert!(row.ends_with(",true,42"), "row: {}", row);
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("web_app_logs.csv");
        let log = WebLog::new(&path);

        log.append(&sample_record()).unwrap();
        log.append(&sample_record()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], LogRecord::csv_header());
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn test_file_only_grows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web_app_logs.csv");
        let log = WebLog::new(&path);

        let mut prev = 0u64;
        for _ in 0..5 {
            log.append(&sample_record()).unwrap();
            let len = std::fs::metadata(&path).unwrap().len();
            assert!(len > prev);
            prev = len;
        }
    }

    #[test]
    fn test_now_stamps_date_and_time() {
        let rec = LogRecord::now(
            UploadMethod::Upload,
            10,
            false,
            1.0,
            SimilarityType::Structural,
            ReductionAlgo::Pca,
            PlotType::Hex,
            Some(false),
            Some(7),
        );
        assert_eq!(rec.date.len(), 10);
        assert_eq!(rec.time.len(), 8);
    }
}
