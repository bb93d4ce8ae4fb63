//! Datasets processed by a batch run and their output files.

use std::collections::HashSet;

use thiserror::Error;

const TRAILS_KEY: &str = "gr";
const TRAILS_OUTPUT: &str = "sentiers_gr.geojson";

/// Point-of-interest dataset keys in processing order.
pub const POI_KEYS: [&str; 13] = [
    "villes",
    "villages",
    "towns",
    "hameaux",
    "offices_tourisme",
    "cols_sommets",
    "cascades",
    "panoramas",
    "sites_historiques",
    "sites_naturels",
    "lieux_insolites",
    "activites",
    "commerces",
];

/// One query document and the file its result is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    key: String,
    output: String,
}

impl Dataset {
    /// Dataset read from `<key>.ql` and written to `output`.
    #[must_use]
    pub fn new(key: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            output: output.into(),
        }
    }

    /// Point-of-interest dataset written to `poi_<key>.geojson`.
    #[must_use]
    pub fn poi(key: impl Into<String>) -> Self {
        let key = key.into();
        let output = format!("poi_{key}.geojson");
        Self { key, output }
    }

    /// Dataset key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Output file name.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Query file name, `<key>.ql`.
    #[must_use]
    pub fn query_file(&self) -> String {
        format!("{}.ql", self.key)
    }
}

/// Two datasets share a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dataset key {key:?} is listed more than once")]
pub struct CatalogueError {
    /// The repeated key.
    pub key: String,
}

/// The trails dataset followed by an ordered list of POI datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCatalogue {
    trails: Dataset,
    pois: Vec<Dataset>,
}

impl DatasetCatalogue {
    /// Build a catalogue, rejecting duplicate keys.
    ///
    /// # Errors
    /// Returns [`CatalogueError`] naming the first repeated key.
    pub fn new(
        trails: Dataset,
        pois: impl IntoIterator<Item = Dataset>,
    ) -> Result<Self, CatalogueError> {
        let catalogue = Self {
            trails,
            pois: pois.into_iter().collect(),
        };
        let mut seen = HashSet::new();
        if let Some(repeated) = catalogue.iter().find(|dataset| !seen.insert(dataset.key())) {
            return Err(CatalogueError {
                key: repeated.key().to_owned(),
            });
        }
        Ok(catalogue)
    }

    /// The trails dataset.
    #[must_use]
    pub const fn trails(&self) -> &Dataset {
        &self.trails
    }

    /// POI datasets in processing order.
    #[must_use]
    pub fn pois(&self) -> &[Dataset] {
        &self.pois
    }

    /// All datasets, trails first.
    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        std::iter::once(&self.trails).chain(self.pois.iter())
    }

    /// Number of datasets including the trails.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pois.len() + 1
    }

    /// Always false: a catalogue holds at least the trails dataset.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl Default for DatasetCatalogue {
    fn default() -> Self {
        Self {
            trails: Dataset::new(TRAILS_KEY, TRAILS_OUTPUT),
            pois: POI_KEYS.iter().map(|&key| Dataset::poi(key)).collect(),
        }
    }
}
