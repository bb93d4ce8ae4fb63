//! Directory layout and pacing for a batch run.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};

use super::DatasetCatalogue;

/// Queries directory relative to the project root.
pub const DEFAULT_QUERIES_DIR: &str = "scripts/overpass";
/// Output directory relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "data";
/// Default pause between successive datasets.
pub const DEFAULT_PACING: Duration = Duration::from_millis(800);

/// Configuration for [`super::run_batch`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use cevennes_data::batch::BatchConfig;
///
/// let config = BatchConfig::new("/srv/cevennes").with_pacing(Duration::ZERO);
/// assert_eq!(config.queries_dir.as_str(), "/srv/cevennes/scripts/overpass");
/// assert_eq!(config.output_dir.as_str(), "/srv/cevennes/data");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory holding `<key>.ql` query documents.
    pub queries_dir: Utf8PathBuf,
    /// Directory receiving GeoJSON files.
    pub output_dir: Utf8PathBuf,
    /// Pause between successive datasets.
    pub pacing: Duration,
    /// Datasets to process.
    pub catalogue: DatasetCatalogue,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            queries_dir: Utf8PathBuf::from(DEFAULT_QUERIES_DIR),
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            pacing: DEFAULT_PACING,
            catalogue: DatasetCatalogue::default(),
        }
    }
}

impl BatchConfig {
    /// Default layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Utf8Path>) -> Self {
        let root = root.as_ref();
        Self {
            queries_dir: root.join(DEFAULT_QUERIES_DIR),
            output_dir: root.join(DEFAULT_OUTPUT_DIR),
            ..Self::default()
        }
    }

    /// Override the queries directory.
    #[must_use]
    pub fn with_queries_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.queries_dir = dir.into();
        self
    }

    /// Override the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Override the pause between datasets.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Replace the dataset catalogue.
    #[must_use]
    pub fn with_catalogue(mut self, catalogue: DatasetCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_layout_is_relative_to_working_directory() {
        let config = BatchConfig::default();

        assert_eq!(config.queries_dir, Utf8PathBuf::from("scripts/overpass"));
        assert_eq!(config.output_dir, Utf8PathBuf::from("data"));
        assert_eq!(config.pacing, Duration::from_millis(800));
        assert_eq!(config.catalogue.len(), 14);
    }

    #[rstest]
    fn overrides_replace_directories() {
        let config = BatchConfig::new("/project")
            .with_queries_dir("/elsewhere/queries")
            .with_output_dir("/elsewhere/out");

        assert_eq!(config.queries_dir.as_str(), "/elsewhere/queries");
        assert_eq!(config.output_dir.as_str(), "/elsewhere/out");
    }
}
