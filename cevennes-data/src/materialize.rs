//! Writing fetch outcomes to GeoJSON files.

use camino::{Utf8Path, Utf8PathBuf};
use cevennes_core::{FeatureCollection, to_feature_collection};
use log::{info, warn};
use thiserror::Error;

use crate::overpass::FetchOutcome;

/// Terminal state of one dataset after a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetStatus {
    /// No query document was found; nothing was written.
    Skipped,
    /// The fetch succeeded and `features` features were written.
    Written {
        /// Number of features in the written collection.
        features: usize,
    },
    /// Every endpoint failed and an empty collection was written.
    WrittenEmpty {
        /// Description of the last failure.
        reason: String,
    },
    /// A local fault stopped this dataset; its output may be missing.
    Failed {
        /// The fault and its causes.
        reason: String,
    },
}

/// Failure to persist a feature collection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MaterializeError {
    /// The output directory could not be created.
    #[error("failed to create output directory {path}")]
    CreateDir {
        /// Output directory.
        path: Utf8PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The collection could not be serialised.
    #[error("failed to serialise {path}")]
    Serialise {
        /// Target file.
        path: Utf8PathBuf,
        /// JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The file could not be written.
    #[error("failed to write {path}")]
    Write {
        /// Target file.
        path: Utf8PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Write `outcome` to `<output_dir>/<file_name>`.
///
/// A successful fetch is converted to GeoJSON and logged as `✓ <file_name>`.
/// An unavailable fetch is written as an empty collection and logged as a
/// warning `⚠ <file_name> vide (<reason>)`. Either way the file exists
/// afterwards.
///
/// # Errors
/// Returns [`MaterializeError`] only for local failures: creating the
/// directory, serialising or writing the file.
pub fn materialize(
    outcome: FetchOutcome,
    output_dir: &Utf8Path,
    file_name: &str,
) -> Result<DatasetStatus, MaterializeError> {
    let (collection, status) = match outcome {
        Ok(response) => {
            if let Some(remark) = &response.remark {
                warn!("{file_name}: Overpass remark: {remark}");
            }
            let collection = to_feature_collection(&response);
            let features = collection.len();
            (collection, DatasetStatus::Written { features })
        }
        Err(unavailable) => (
            FeatureCollection::empty(),
            DatasetStatus::WrittenEmpty {
                reason: unavailable.to_string(),
            },
        ),
    };

    write_collection(&collection, output_dir, file_name)?;

    match &status {
        DatasetStatus::Written { .. } => info!("✓ {file_name}"),
        DatasetStatus::WrittenEmpty { reason } => warn!("⚠ {file_name} vide ({reason})"),
        DatasetStatus::Skipped | DatasetStatus::Failed { .. } => {}
    }
    Ok(status)
}

fn write_collection(
    collection: &FeatureCollection,
    output_dir: &Utf8Path,
    file_name: &str,
) -> Result<(), MaterializeError> {
    cevennes_fs::ensure_dir(output_dir).map_err(|source| MaterializeError::CreateDir {
        path: output_dir.to_owned(),
        source,
    })?;
    let path = output_dir.join(file_name);
    let json = collection
        .to_pretty_json()
        .map_err(|source| MaterializeError::Serialise {
            path: path.clone(),
            source,
        })?;
    cevennes_fs::write_file(&path, &json).map_err(|source| MaterializeError::Write { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overpass::{AttemptError, OverpassUnavailable, RequestMethod};
    use cevennes_core::OverpassResponse;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn output() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp path");
        (dir, path)
    }

    fn read_json(path: &Utf8Path) -> Value {
        let text = fs::read_to_string(path).expect("output should exist");
        serde_json::from_str(&text).expect("output should be JSON")
    }

    fn unavailable() -> OverpassUnavailable {
        OverpassUnavailable {
            attempts: 8,
            last_error: Some(AttemptError::Status {
                endpoint: "http://mirror.test/api/interpreter".to_owned(),
                method: RequestMethod::Post,
                status: 500,
            }),
        }
    }

    #[rstest]
    fn success_writes_converted_features(output: (TempDir, Utf8PathBuf)) {
        let (_guard, dir) = output;
        let response = OverpassResponse::from_slice(
            br#"{"elements":[{"type":"node","id":1,"lat":44.12,"lon":3.58,"tags":{"name":"Mende"}}]}"#,
        )
        .expect("valid response");

        let status = materialize(Ok(response), &dir, "poi_villes.geojson").expect("write succeeds");

        assert_eq!(status, DatasetStatus::Written { features: 1 });
        let written = read_json(&dir.join("poi_villes.geojson"));
        assert_eq!(written["type"], "FeatureCollection");
        assert_eq!(written["features"][0]["properties"]["tags"]["name"], "Mende");
    }

    #[rstest]
    fn failure_writes_empty_collection(output: (TempDir, Utf8PathBuf)) {
        let (_guard, dir) = output;

        let status =
            materialize(Err(unavailable()), &dir, "poi_cascades.geojson").expect("write succeeds");

        assert!(matches!(
            status,
            DatasetStatus::WrittenEmpty { ref reason } if reason.contains("HTTP 500")
        ));
        assert_eq!(
            read_json(&dir.join("poi_cascades.geojson")),
            json!({"type": "FeatureCollection", "features": []})
        );
    }

    #[rstest]
    fn output_is_indented_with_literal_unicode(output: (TempDir, Utf8PathBuf)) {
        let (_guard, dir) = output;
        let response = OverpassResponse::from_slice(
            r#"{"elements":[{"type":"node","id":2,"lat":44.3,"lon":3.6,"tags":{"name":"Florac-Trois-Rivières"}}]}"#
                .as_bytes(),
        )
        .expect("valid response");

        materialize(Ok(response), &dir, "poi_villages.geojson").expect("write succeeds");

        let text = fs::read_to_string(dir.join("poi_villages.geojson")).expect("output exists");
        assert!(text.contains("Florac-Trois-Rivières"));
        assert!(text.starts_with("{\n  \"type\": \"FeatureCollection\""));
    }

    #[rstest]
    fn creates_missing_output_directory(output: (TempDir, Utf8PathBuf)) {
        let (_guard, dir) = output;
        let nested = dir.join("data");

        materialize(Err(unavailable()), &nested, "sentiers_gr.geojson").expect("write succeeds");

        assert!(nested.join("sentiers_gr.geojson").is_file());
    }
}
