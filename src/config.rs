//! Configuration for reading SAMI exports and writing MARCXML.
//!
//! Configuration is plain data passed in by the caller; nothing is read from
//! the environment. Both types deserialize with `serde`, so a caller can load
//! them from JSON or TOML.

use crate::sami::{is_deletion_export, Dialect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How a record element is written in MARCXML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XmlStyle {
    /// A bare `<marc:record>`, for use inside a `marc:collection`
    #[default]
    Plain,
    /// `<marc:record>` carrying its own `xsi:schemaLocation`
    Namespaced,
}

impl fmt::Display for XmlStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Namespaced => write!(f, "namespaced"),
        }
    }
}

/// Options for [`SamiReader`](crate::SamiReader).
///
/// # Examples
///
/// ```
/// use sami2marc::{Dialect, ReaderConfig};
///
/// let config = ReaderConfig::for_path("2020_export_WORK_dels.xml");
/// assert_eq!(config.dialect, Dialect::Xml);
/// assert!(config.deleted);
///
/// let config = ReaderConfig::default()
///     .with_dialect(Dialect::Authorities)
///     .with_tidy(true);
/// assert!(config.tidy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Source dialect
    pub dialect: Dialect,
    /// Normalize legacy dates and back-fill a missing 001 (authority records)
    pub tidy: bool,
    /// The stream is a deletion export
    pub deleted: bool,
}

impl ReaderConfig {
    /// Configuration implied by a file path: dialect from the extension,
    /// deletion flag from a `_dels` file name.
    #[must_use]
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        ReaderConfig {
            dialect: Dialect::from_path(path),
            tidy: false,
            deleted: is_deletion_export(path),
        }
    }

    /// Set the dialect
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set tidy mode
    #[must_use]
    pub fn with_tidy(mut self, tidy: bool) -> Self {
        self.tidy = tidy;
        self
    }

    /// Mark the stream as a deletion export
    #[must_use]
    pub fn with_deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.dialect, Dialect::Text);
        assert!(!config.tidy);
        assert!(!config.deleted);
        assert_eq!(XmlStyle::default(), XmlStyle::Plain);
    }

    #[test]
    fn test_for_path() {
        let config = ReaderConfig::for_path("/exports/items.prn");
        assert_eq!(config.dialect, Dialect::Prn);
        assert!(!config.deleted);
    }

    #[test]
    fn test_builder_methods() {
        let config = ReaderConfig::for_path("x.xml")
            .with_dialect(Dialect::Authorities)
            .with_tidy(true)
            .with_deleted(true);
        assert_eq!(config.dialect, Dialect::Authorities);
        assert!(config.tidy && config.deleted);
    }

    #[test]
    fn test_style_display() {
        assert_eq!(XmlStyle::Namespaced.to_string(), "namespaced");
    }
}
