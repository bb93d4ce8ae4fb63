//! Normalised Overpass QL query text.

use std::fmt;

use thiserror::Error;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Errors returned by [`QueryDocument::from_bytes`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryDocumentError {
    /// The file was not valid UTF-8.
    #[error("query text is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Query text ready to be sent to an Overpass interpreter.
///
/// The text is normalised so the request payload is byte-identical however
/// the source file was authored: a leading byte-order mark is dropped, every
/// carriage return is removed, surrounding whitespace is trimmed and exactly
/// one trailing newline is appended.
///
/// # Examples
/// ```
/// use cevennes_core::QueryDocument;
///
/// let query = QueryDocument::from_bytes(b"\xEF\xBB\xBF[out:json];\r\nnode(1);\r\nout;\r\n\r\n")?;
/// assert_eq!(query.as_str(), "[out:json];\nnode(1);\nout;\n");
/// # Ok::<(), cevennes_core::QueryDocumentError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocument(String);

impl QueryDocument {
    /// Normalise raw file bytes into a query document.
    ///
    /// # Errors
    ///
    /// Returns [`QueryDocumentError::InvalidUtf8`] when `bytes` is not UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, QueryDocumentError> {
        let text = String::from_utf8(bytes.to_vec())?;
        Ok(Self::normalise(&text))
    }

    /// Normalise already decoded query text.
    #[must_use]
    pub fn normalise(text: &str) -> Self {
        let without_bom = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        let unix: String = without_bom.chars().filter(|ch| *ch != '\r').collect();
        let mut query = String::with_capacity(unix.len() + 1);
        query.push_str(unix.trim());
        query.push('\n');
        Self(query)
    }

    /// Borrow the normalised text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for QueryDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
