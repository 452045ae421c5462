//! Precomputed demo plot resolution and loading.
//!
//! The demo path never invokes the real plotting pipeline. Instead, every
//! combination of (dataset, similarity, algorithm, plot type) maps to one of
//! 24 precomputed interactive plots, rendered once offline and stored as
//! standalone HTML. The mapping is a flat literal table so completeness is
//! checkable at a glance; there is no fallback branch and no naming-pattern
//! inference.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

use crate::model::{PlotType, ReductionAlgo, SampleDataset, SimilarityType};

/// Filename offered when downloading an embedded plot.
pub const DOWNLOAD_FILENAME: &str = "interactive_plot.html";

/// Composite key for one precomputed demo plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DemoKey {
    pub dataset: SampleDataset,
    pub similarity: SimilarityType,
    pub algo: ReductionAlgo,
    pub plot: PlotType,
}

/// All 24 precomputed demo plots, written out in full.
///
/// Identifier scheme (inherited from the offline render batch):
/// `<DATASET>_<t|s>_<s|p|u>_<s|h>.html` for tailored/structural,
/// t-SNE/PCA/UMAP, scatter/hex. The table is the source of truth; the
/// naming scheme is a convention of the render batch, not something the
/// resolver relies on.
pub const DEMO_ASSETS: [(DemoKey, &str); 24] = {
    use PlotType::*;
    use ReductionAlgo::*;
    use SampleDataset::*;
    use SimilarityType::*;
    [
        (DemoKey { dataset: Bbbp, similarity: Tailored, algo: Tsne, plot: Scatter }, "BBBP_t_s_s.html"),
        (DemoKey { dataset: Bbbp, similarity: Tailored, algo: Tsne, plot: Hex }, "BBBP_t_s_h.html"),
        (DemoKey { dataset: Bbbp, similarity: Tailored, algo: Pca, plot: Scatter }, "BBBP_t_p_s.html"),
        (DemoKey { dataset: Bbbp, similarity: Tailored, algo: Pca, plot: Hex }, "BBBP_t_p_h.html"),
        (DemoKey { dataset: Bbbp, similarity: Tailored, algo: Umap, plot: Scatter }, "BBBP_t_u_s.html"),
        (DemoKey { dataset: Bbbp, similarity: Tailored, algo: Umap, plot: Hex }, "BBBP_t_u_h.html"),
        (DemoKey { dataset: Bbbp, similarity: Structural, algo: Tsne, plot: Scatter }, "BBBP_s_s_s.html"),
        (DemoKey { dataset: Bbbp, similarity: Structural, algo: Tsne, plot: Hex }, "BBBP_s_s_h.html"),
        (DemoKey { dataset: Bbbp, similarity: Structural, algo: Pca, plot: Scatter }, "BBBP_s_p_s.html"),
        (DemoKey { dataset: Bbbp, similarity: Structural, algo: Pca, plot: Hex }, "BBBP_s_p_h.html"),
        (DemoKey { dataset: Bbbp, similarity: Structural, algo: Umap, plot: Scatter }, "BBBP_s_u_s.html"),
        (DemoKey { dataset: Bbbp, similarity: Structural, algo: Umap, plot: Hex }, "BBBP_s_u_h.html"),
        (DemoKey { dataset: AqSolDb, similarity: Tailored, algo: Tsne, plot: Scatter }, "AQSOLDB_t_s_s.html"),
        (DemoKey { dataset: AqSolDb, similarity: Tailored, algo: Tsne, plot: Hex }, "AQSOLDB_t_s_h.html"),
        (DemoKey { dataset: AqSolDb, similarity: Tailored, algo: Pca, plot: Scatter }, "AQSOLDB_t_p_s.html"),
        (DemoKey { dataset: AqSolDb, similarity: Tailored, algo: Pca, plot: Hex }, "AQSOLDB_t_p_h.html"),
        (DemoKey { dataset: AqSolDb, similarity: Tailored, algo: Umap, plot: Scatter }, "AQSOLDB_t_u_s.html"),
        (DemoKey { dataset: AqSolDb, similarity: Tailored, algo: Umap, plot: Hex }, "AQSOLDB_t_u_h.html"),
        (DemoKey { dataset: AqSolDb, similarity: Structural, algo: Tsne, plot: Scatter }, "AQSOLDB_s_s_s.html"),
        (DemoKey { dataset: AqSolDb, similarity: Structural, algo: Tsne, plot: Hex }, "AQSOLDB_s_s_h.html"),
        (DemoKey { dataset: AqSolDb, similarity: Structural, algo: Pca, plot: Scatter }, "AQSOLDB_s_p_s.html"),
        (DemoKey { dataset: AqSolDb, similarity: Structural, algo: Pca, plot: Hex }, "AQSOLDB_s_p_h.html"),
        (DemoKey { dataset: AqSolDb, similarity: Structural, algo: Umap, plot: Scatter }, "AQSOLDB_s_u_s.html"),
        (DemoKey { dataset: AqSolDb, similarity: Structural, algo: Umap, plot: Hex }, "AQSOLDB_s_u_h.html"),
    ]
};

/// Resolve a parameter combination to its precomputed plot identifier.
///
/// Total over the closed enumerations by construction: every combination is
/// present in [`DEMO_ASSETS`]. A miss can only mean the table was edited out
/// of sync with an enum and is a configuration error, so it panics rather
/// than surfacing as a recoverable runtime condition.
pub fn resolve_demo(key: DemoKey) -> &'static str {
    DEMO_ASSETS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, asset)| *asset)
        .unwrap_or_else(|| panic!("demo asset table has no entry for {:?}", key))
}

/// Errors from loading precomputed plot files.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The resolved asset file does not exist in the demo directory.
    #[error("demo plot not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other filesystem failure while reading the asset.
    #[error("failed to read demo plot {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Store of precomputed plot HTML files on disk.
///
/// The files themselves are generated artifacts produced by an offline
/// render batch; this store only reads them.
#[derive(Debug, Clone)]
pub struct DemoStore {
    root: PathBuf,
}

impl DemoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the full HTML content of a resolved demo asset.
    pub fn load(&self, asset: &str) -> Result<String, DemoError> {
        let path = self.root.join(asset);
        fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DemoError::NotFound(path)
            } else {
                DemoError::Io { path, source: e }
            }
        })
    }
}

/// Build the `data:` URI used by the dashboard's download button.
///
/// The anchor downloads the embedded plot under a fixed filename so a saved
/// demo plot and a saved live plot look the same to the user.
pub fn download_data_uri(html: &str) -> String {
    format!("data:file/html;base64,{}", BASE64.encode(html.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_keys() -> Vec<DemoKey> {
        let mut keys = Vec::new();
        for dataset in SampleDataset::ALL {
            for similarity in SimilarityType::ALL {
                for algo in ReductionAlgo::ALL {
                    for plot in PlotType::ALL {
                        keys.push(DemoKey { dataset, similarity, algo, plot });
                    }
                }
            }
        }
        keys
    }

    #[test]
    fn test_table_is_total_and_distinct() {
        let keys = all_keys();
        assert_eq!(keys.len(), 24);
        assert_eq!(DEMO_ASSETS.len(), 24);

        let mut seen = HashSet::new();
        for key in keys {
            let asset = resolve_demo(key);
            assert!(!asset.is_empty(), "empty asset for {:?}", key);
            assert!(seen.insert(asset), "duplicate asset {} for {:?}", asset, key);
        }
    }

    #[test]
    fn test_resolve_bbbp_structural_pca_hex() {
        let asset = resolve_demo(DemoKey {
            dataset: SampleDataset::Bbbp,
            similarity: SimilarityType::Structural,
            algo: ReductionAlgo::Pca,
            plot: PlotType::Hex,
        });
        assert_eq!(asset, "BBBP_s_p_h.html");
    }

    #[test]
    fn test_resolve_aqsoldb_tailored_umap_scatter() {
        let asset = resolve_demo(DemoKey {
            dataset: SampleDataset::AqSolDb,
            similarity: SimilarityType::Tailored,
            algo: ReductionAlgo::Umap,
            plot: PlotType::Scatter,
        });
        assert_eq!(asset, "AQSOLDB_t_u_s.html");
    }

    #[test]
    fn test_store_loads_existing_asset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("BBBP_t_s_s.html"), "<html>demo</html>").unwrap();

        let store = DemoStore::new(dir.path());
        let html = store.load("BBBP_t_s_s.html").unwrap();
        assert_eq!(html, "<html>demo</html>");
    }

    #[test]
    fn test_store_missing_asset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DemoStore::new(dir.path());
        match store.load("BBBP_t_s_s.html") {
            Err(DemoError::NotFound(path)) => {
                assert!(path.ends_with("BBBP_t_s_s.html"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_download_uri_shape() {
        let uri = download_data_uri("<html></html>");
        assert!(uri.starts_with("data:file/html;base64,"));
        assert!(uri.ends_with(&BASE64.encode("<html></html>")));
    }
}
