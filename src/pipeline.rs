//! Live visualization path.
//!
//! Orchestrates one uploaded-dataset request: validate the parameter
//! combination, predict the runtime, hand the dataset to the external
//! plotting engine, measure the real duration, and append a log row.
//! The heavy lifting (similarity computation, dimensionality reduction,
//! rendering) happens entirely behind [`PlotEngine`]; this module never
//! looks inside a SMILES string.

use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::assets::download_data_uri;
use crate::model::{estimate_seconds, PlotType, ReductionAlgo, SimilarityType};
use crate::weblog::{LogRecord, UploadMethod, WebLog};

/// One uploaded-dataset visualization request.
///
/// SMILES strings are opaque identifiers here; `target` is empty when the
/// user selected no target column.
#[derive(Debug, Clone)]
pub struct PlotRequest {
    pub smiles: Vec<String>,
    pub target: Vec<f64>,
    pub sim_type: SimilarityType,
    pub algo: ReductionAlgo,
    pub plot_type: PlotType,
    pub remove_outliers: bool,
    pub random_state: Option<u64>,
}

/// Failure inside the external plotting engine.
#[derive(Debug, Error)]
#[error("plotting engine failure: {0}")]
pub struct PlotError(pub String);

/// External plotting collaborator.
///
/// Implementations wrap whatever actually computes the projection and
/// renders it; the pipeline only needs the two calls below.
pub trait PlotEngine {
    /// Engine-specific plot handle.
    type Plot;

    fn compute_plot(&self, req: &PlotRequest) -> Result<Self::Plot, PlotError>;

    fn render_html(&self, plot: &Self::Plot) -> String;
}

/// Errors surfaced to the user for a live request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Tailored similarity needs a numeric target; caught before the
    /// estimator or the engine run, and before any log row is written.
    #[error("select a target column to use tailored similarity")]
    MissingTarget,

    #[error(transparent)]
    Engine(#[from] PlotError),
}

/// Result of a completed live request.
#[derive(Debug, Clone)]
pub struct LiveOutcome {
    /// Predicted runtime shown to the user while the engine works.
    pub eta_seconds: u64,
    /// Rendered interactive plot, ready for embedding.
    pub html: String,
    /// `data:` URI for the download button.
    pub download_uri: String,
    /// Measured engine time in seconds.
    pub plotting_time_secs: f64,
}

/// Run one live visualization request end to end.
///
/// A log append failure is reported but does not fail a request whose plot
/// was already computed.
pub fn run_live<E: PlotEngine>(
    engine: &E,
    log: &WebLog,
    req: &PlotRequest,
) -> Result<LiveOutcome, RequestError> {
    if req.sim_type == SimilarityType::Tailored && req.target.is_empty() {
        return Err(RequestError::MissingTarget);
    }

    let n_samples = req.smiles.len() as u64;
    let eta_seconds = estimate_seconds(n_samples, req.sim_type, req.algo);
    info!(
        n_samples,
        similarity = req.sim_type.name(),
        algorithm = req.algo.name(),
        eta_seconds,
        "starting live plot"
    );

    let started = Instant::now();
    let plot = engine.compute_plot(req)?;
    let html = engine.render_html(&plot);
    let plotting_time_secs = started.elapsed().as_secs_f64();

    let record = LogRecord::now(
        UploadMethod::Upload,
        n_samples,
        !req.target.is_empty(),
        plotting_time_secs,
        req.sim_type,
        req.algo,
        req.plot_type,
        Some(req.remove_outliers),
        req.random_state,
    );
    if let Err(e) = log.append(&record) {
        warn!("failed to append request log: {}", e);
    }

    let download_uri = download_data_uri(&html);
    Ok(LiveOutcome {
        eta_seconds,
        html,
        download_uri,
        plotting_time_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Counting stand-in for the real engine.
    struct MockEngine {
        calls: Cell<usize>,
    }

    impl MockEngine {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl PlotEngine for MockEngine {
        type Plot = String;

        fn compute_plot(&self, req: &PlotRequest) -> Result<String, PlotError> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("<div>{} molecules</div>", req.smiles.len()))
        }

        fn render_html(&self, plot: &String) -> String {
            plot.clone()
        }
    }

    fn request(sim: SimilarityType, target: Vec<f64>) -> PlotRequest {
        PlotRequest {
            smiles: vec!["CCO".into(), "c1ccccc1".into()],
            target,
            sim_type: sim,
            algo: ReductionAlgo::Pca,
            plot_type: PlotType::Scatter,
            remove_outliers: false,
            random_state: Some(42),
        }
    }

    #[test]
    fn test_tailored_without_target_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let log = WebLog::new(dir.path().join("web_app_logs.csv"));
        let engine = MockEngine::new();

        let err = run_live(&engine, &log, &request(SimilarityType::Tailored, vec![]))
            .unwrap_err();

        assert!(matches!(err, RequestError::MissingTarget));
        assert_eq!(engine.calls.get(), 0, "engine must not run");
        assert!(!log.path().exists(), "no log row may be written");
    }

    #[test]
    fn test_structural_without_target_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let log = WebLog::new(dir.path().join("web_app_logs.csv"));
        let engine = MockEngine::new();

        let outcome = run_live(&engine, &log, &request(SimilarityType::Structural, vec![]))
            .unwrap();

        assert_eq!(engine.calls.get(), 1);
        assert_eq!(outcome.html, "<div>2 molecules</div>");
        assert!(outcome.download_uri.starts_with("data:file/html;base64,"));
    }

    #[test]
    fn test_successful_request_appends_log_row() {
        let dir = tempfile::tempdir().unwrap();
        let log = WebLog::new(dir.path().join("web_app_logs.csv"));
        let engine = MockEngine::new();

        run_live(&engine, &log, &request(SimilarityType::Tailored, vec![1.0, 2.0])).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2, "header plus one row");
        assert!(lines[1].contains(",upload,2,true,"), "row: {}", lines[1]);
    }

    #[test]
    fn test_engine_failure_propagates_without_log_row() {
        struct FailingEngine;
        impl PlotEngine for FailingEngine {
            type Plot = ();
            fn compute_plot(&self, _: &PlotRequest) -> Result<(), PlotError> {
                Err(PlotError("reduction failed".into()))
            }
            fn render_html(&self, _: &()) -> String {
                String::new()
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let log = WebLog::new(dir.path().join("web_app_logs.csv"));

        let err = run_live(&FailingEngine, &log, &request(SimilarityType::Structural, vec![]))
            .unwrap_err();

        assert!(matches!(err, RequestError::Engine(_)));
        assert!(!log.path().exists());
    }

    #[test]
    fn test_eta_matches_estimator() {
        let dir = tempfile::tempdir().unwrap();
        let log = WebLog::new(dir.path().join("web_app_logs.csv"));
        let engine = MockEngine::new();

        let outcome = run_live(&engine, &log, &request(SimilarityType::Structural, vec![]))
            .unwrap();

        assert_eq!(
            outcome.eta_seconds,
            estimate_seconds(2, SimilarityType::Structural, ReductionAlgo::Pca)
        );
    }
}
