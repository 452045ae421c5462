//! Core parameter model and runtime estimation for chemical space plots.
//!
//! Every user-facing choice is a closed enumeration: similarity type,
//! dimensionality reduction algorithm, plot type, and sample dataset.
//! The estimator predicts how long the external plotting pipeline will take
//! for a given dataset size and configuration, using quadratic curves fitted
//! offline against measured wall-clock runs (pairwise-similarity-based
//! dimensionality reduction scales post-linearly with dataset size, so a
//! quadratic per configuration captures the shape without instrumenting the
//! live run).
//!
//! # Purity
//!
//! Everything in this module is a pure function over small value types.
//! There is no shared state and no allocation; callers may use these from
//! any number of request handlers without synchronization.

/// Definition of molecular similarity feeding the reduction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimilarityType {
    /// Target-aware similarity; requires a numeric target column.
    Tailored,
    /// Structure-only similarity.
    Structural,
}

impl SimilarityType {
    pub const ALL: [SimilarityType; 2] = [Self::Tailored, Self::Structural];

    /// Parse from string, case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tailored" => Some(Self::Tailored),
            "structural" => Some(Self::Structural),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tailored => "tailored",
            Self::Structural => "structural",
        }
    }
}

/// Dimensionality reduction algorithm applied by the external pipeline.
///
/// The enumeration is closed: an unrecognized string fails to parse and is
/// rejected by the caller, rather than silently falling through to UMAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionAlgo {
    Tsne,
    Pca,
    Umap,
}

impl ReductionAlgo {
    pub const ALL: [ReductionAlgo; 3] = [Self::Tsne, Self::Pca, Self::Umap];

    /// Parse from string, case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "t-sne" | "tsne" => Some(Self::Tsne),
            "pca" => Some(Self::Pca),
            "umap" => Some(Self::Umap),
            _ => None,
        }
    }

    /// Display name as shown in the UI.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tsne => "t-SNE",
            Self::Pca => "PCA",
            Self::Umap => "UMAP",
        }
    }

    /// Stable lowercase token used in query strings and CSV output.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Tsne => "tsne",
            Self::Pca => "pca",
            Self::Umap => "umap",
        }
    }
}

/// How the 2D projection is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotType {
    Scatter,
    Hex,
}

impl PlotType {
    pub const ALL: [PlotType; 2] = [Self::Scatter, Self::Hex];

    /// Parse from string, case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scatter" => Some(Self::Scatter),
            "hex" => Some(Self::Hex),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Scatter => "scatter",
            Self::Hex => "hex",
        }
    }
}

/// Bundled sample datasets served on the demo path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleDataset {
    /// Blood-Brain Barrier Penetration (Martins et al., 2012).
    Bbbp,
    /// Aqueous Solubility (Sorkun et al., 2019).
    AqSolDb,
}

impl SampleDataset {
    pub const ALL: [SampleDataset; 2] = [Self::Bbbp, Self::AqSolDb];

    /// Parse from string, case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bbbp" => Some(Self::Bbbp),
            "aqsoldb" => Some(Self::AqSolDb),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bbbp => "BBBP",
            Self::AqSolDb => "AqSolDB",
        }
    }

    /// Stable lowercase token used in query strings.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Bbbp => "bbbp",
            Self::AqSolDb => "aqsoldb",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Bbbp => "Blood-Brain Barrier Penetration",
            Self::AqSolDb => "Aqueous Solubility",
        }
    }

    /// Number of molecules in the bundled dataset.
    pub fn sample_len(&self) -> u64 {
        match self {
            Self::Bbbp => 2039,
            Self::AqSolDb => 9982,
        }
    }
}

/// One fitted runtime curve: `quadratic * n^2 + linear * n + intercept`,
/// in seconds for `n` molecules.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeCoefficients {
    pub quadratic: f64,
    pub linear: f64,
    pub intercept: f64,
}

/// Fitted coefficients for every (similarity, algorithm) configuration.
///
/// Obtained by quadratic regression against measured run durations of the
/// plotting pipeline, one curve per configuration. The table is total over
/// both enumerations; adding a variant without extending this match is a
/// compile error.
#[inline]
pub fn runtime_coefficients(sim: SimilarityType, algo: ReductionAlgo) -> RuntimeCoefficients {
    use ReductionAlgo::*;
    use SimilarityType::*;
    match (sim, algo) {
        (Tailored, Pca) => RuntimeCoefficients {
            quadratic: 9.47299622e-08,
            linear: 2.90093365e-03,
            intercept: 4.19205131,
        },
        (Tailored, Tsne) => RuntimeCoefficients {
            quadratic: 3.31581244e-07,
            linear: 6.10031290e-03,
            intercept: 5.16853254,
        },
        (Tailored, Umap) => RuntimeCoefficients {
            quadratic: 9.51843773e-08,
            linear: 3.51897483e-03,
            intercept: 7.53709917,
        },
        (Structural, Pca) => RuntimeCoefficients {
            quadratic: 1.63232808e-08,
            linear: 1.40949297e-03,
            intercept: 0.61769033,
        },
        (Structural, Tsne) => RuntimeCoefficients {
            quadratic: 3.79038881e-06,
            linear: 1.33859978e-03,
            intercept: 7.28995309,
        },
        (Structural, Umap) => RuntimeCoefficients {
            quadratic: 2.87861709e-08,
            linear: 1.89154853e-03,
            intercept: 3.65305908,
        },
    }
}

/// Predicted plotting time in whole seconds for `n_samples` molecules.
///
/// Evaluates the fitted quadratic in f64 and truncates toward zero. All
/// supplied coefficients are positive, so the result is non-negative and
/// monotonically non-decreasing in `n_samples`. There is no upper bound on
/// `n_samples`; the prediction just grows quadratically.
///
/// INVARIANT: pure and total, no error path.
#[inline]
pub fn estimate_seconds(n_samples: u64, sim: SimilarityType, algo: ReductionAlgo) -> u64 {
    let c = runtime_coefficients(sim, algo);
    let n = n_samples as f64;
    (n * n * c.quadratic + n * c.linear + c.intercept) as u64
}
