//! Command-line interface for the chemical space dashboard.
//!
//! Parameters are organized into categories:
//!
//! ## Visualization Parameters
//! - `--dataset`: Sample dataset backing the demo path
//! - `--similarity`: Similarity definition (tailored requires a target)
//! - `--algorithm`: Dimensionality reduction algorithm
//! - `--plot`: Plot rendering style
//! - `--samples`: Dataset size for the estimate report
//!
//! ## Paths
//! - `--demo-dir`: Directory of precomputed demo plots
//! - `--log-file`: Append-only CSV request log
//!
//! ## Modes
//! - default: one-shot estimate report for the chosen configuration
//! - `--table`: CSV table of estimates across every configuration
//! - `--serve`: interactive dashboard on `--port`
//!
//! All enumeration-valued flags are validated strictly; an unrecognized
//! value is an error, not a silent fallback.

use clap::Parser;

use crate::model::{PlotType, ReductionAlgo, SampleDataset, SimilarityType};

#[derive(Parser, Debug)]
#[command(name = "chemspace")]
#[command(author, version, about = "Chemical space visualization dashboard with runtime estimation")]
pub struct Cli {
    // =========================================================================
    // Visualization Parameters
    // =========================================================================

    /// Sample dataset: bbbp or aqsoldb
    #[arg(long, default_value = "bbbp", help_heading = "Visualization Parameters")]
    pub dataset: String,

    /// Similarity type: tailored or structural
    #[arg(long, default_value = "tailored", help_heading = "Visualization Parameters")]
    pub similarity: String,

    /// Reduction algorithm: t-sne, pca, or umap
    #[arg(long, default_value = "t-sne", help_heading = "Visualization Parameters")]
    pub algorithm: String,

    /// Plot type: scatter or hex
    #[arg(long, default_value = "scatter", help_heading = "Visualization Parameters")]
    pub plot: String,

    /// Dataset size for the estimate report (defaults to the sample dataset's size)
    #[arg(long, help_heading = "Visualization Parameters")]
    pub samples: Option<u64>,

    // =========================================================================
    // Paths
    // =========================================================================

    /// Directory containing the precomputed demo plots
    #[arg(long, default_value = "demos", help_heading = "Paths")]
    pub demo_dir: String,

    /// Append-only CSV request log
    #[arg(long, default_value = "logs/web_app_logs.csv", help_heading = "Paths")]
    pub log_file: String,

    // =========================================================================
    // Modes
    // =========================================================================

    /// Serve the interactive dashboard
    #[arg(long, default_value = "false", help_heading = "Modes")]
    pub serve: bool,

    /// Dashboard port
    #[arg(long, default_value = "8600", help_heading = "Modes")]
    pub port: u16,

    /// Print a CSV table of estimates across all configurations
    #[arg(long, default_value = "false", help_heading = "Modes")]
    pub table: bool,

    /// Sample counts for the estimate table (comma-separated)
    #[arg(long, default_value = "500,1000,2039,5000,9982,20000", help_heading = "Modes")]
    pub table_samples: String,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Validated visualization parameters.
#[derive(Debug, Clone, Copy)]
pub struct PlotParams {
    pub dataset: SampleDataset,
    pub similarity: SimilarityType,
    pub algorithm: ReductionAlgo,
    pub plot: PlotType,
}

impl Cli {
    /// Validate the enumeration-valued flags.
    pub fn to_params(&self) -> Result<PlotParams, String> {
        let dataset = SampleDataset::from_str(&self.dataset)
            .ok_or_else(|| format!("unknown dataset '{}' (expected bbbp or aqsoldb)", self.dataset))?;
        let similarity = SimilarityType::from_str(&self.similarity).ok_or_else(|| {
            format!(
                "unknown similarity type '{}' (expected tailored or structural)",
                self.similarity
            )
        })?;
        let algorithm = ReductionAlgo::from_str(&self.algorithm).ok_or_else(|| {
            format!("unknown algorithm '{}' (expected t-sne, pca, or umap)", self.algorithm)
        })?;
        let plot = PlotType::from_str(&self.plot)
            .ok_or_else(|| format!("unknown plot type '{}' (expected scatter or hex)", self.plot))?;

        Ok(PlotParams { dataset, similarity, algorithm, plot })
    }

    /// Dataset size used by the estimate report.
    pub fn report_samples(&self, params: &PlotParams) -> u64 {
        self.samples.unwrap_or_else(|| params.dataset.sample_len())
    }

    /// Parse the estimate-table sample counts.
    pub fn parse_table_samples(&self) -> Vec<u64> {
        self.table_samples
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }
}

/// Format a duration in whole seconds as a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs >= 3600 {
        format!("{:.1} h", secs as f64 / 3600.0)
    } else if secs >= 60 {
        format!("{:.1} min", secs as f64 / 60.0)
    } else {
        format!("{} s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["chemspace"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_defaults_validate() {
        let params = cli(&[]).to_params().unwrap();
        assert_eq!(params.dataset, SampleDataset::Bbbp);
        assert_eq!(params.similarity, SimilarityType::Tailored);
        assert_eq!(params.algorithm, ReductionAlgo::Tsne);
        assert_eq!(params.plot, PlotType::Scatter);
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let err = cli(&["--algorithm", "isomap"]).to_params().unwrap_err();
        assert!(err.contains("isomap"), "err: {}", err);
    }

    #[test]
    fn test_report_samples_defaults_to_dataset_length() {
        let args = cli(&["--dataset", "aqsoldb"]);
        let params = args.to_params().unwrap();
        assert_eq!(args.report_samples(&params), 9982);

        let args = cli(&["--samples", "1234"]);
        let params = args.to_params().unwrap();
        assert_eq!(args.report_samples(&params), 1234);
    }

    #[test]
    fn test_parse_table_samples() {
        let args = cli(&["--table-samples", "100, 200,bogus,300"]);
        assert_eq!(args.parse_table_samples(), vec![100, 200, 300]);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45 s");
        assert_eq!(format_duration(90), "1.5 min");
        assert_eq!(format_duration(7200), "2.0 h");
    }
}
