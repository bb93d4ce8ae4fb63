//! Loading query documents from the queries directory.

use camino::{Utf8Path, Utf8PathBuf};
use cevennes_core::{QueryDocument, QueryDocumentError};
use log::info;
use thiserror::Error;

/// Failure to load a query document that exists on disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryReadError {
    /// The file could not be read.
    #[error("failed to read query {path}")]
    Io {
        /// Path of the query file.
        path: Utf8PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid UTF-8.
    #[error("query {path} is not valid UTF-8")]
    Encoding {
        /// Path of the query file.
        path: Utf8PathBuf,
        /// Decoding error.
        #[source]
        source: QueryDocumentError,
    },
}

/// Read and normalise `<queries_dir>/<file_name>`.
///
/// Returns `Ok(None)` and logs a skip when the file is absent or is not a
/// regular file.
///
/// # Errors
/// Returns [`QueryReadError`] for I/O failures other than absence and for
/// contents that are not UTF-8.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use cevennes_data::read_query;
///
/// if let Some(query) = read_query(Utf8Path::new("scripts/overpass"), "gr.ql")? {
///     print!("{query}");
/// }
/// # Ok::<(), cevennes_data::QueryReadError>(())
/// ```
pub fn read_query(
    queries_dir: &Utf8Path,
    file_name: &str,
) -> Result<Option<QueryDocument>, QueryReadError> {
    let path = queries_dir.join(file_name);
    let Some(bytes) =
        cevennes_fs::read_regular_file(&path).map_err(|source| QueryReadError::Io {
            path: path.clone(),
            source,
        })?
    else {
        info!("⏭ Requête absente: {file_name}");
        return Ok(None);
    };
    QueryDocument::from_bytes(&bytes)
        .map(Some)
        .map_err(|source| QueryReadError::Encoding { path, source })
}
