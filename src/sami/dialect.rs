//! The four SAMI export dialects and their record boundary rules.

use crate::error::{MarcError, Result};
use crate::sami::{extract, SamiRecord};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Marker line between records in plain text exports.
pub const DOCUMENT_BOUNDARY: &str = "*** DOCUMENT BOUNDARY ***";

/// Lines carrying a schema-instance namespace declaration are never record content.
const NAMESPACE_DECLARATION: &str = "xmlns:xsi";

const PRN_BOUNDARIES: [&str; 6] = [
    "<?xml version",
    "<title>",
    "<report>",
    "</report>",
    "<dateFormat>",
    "<catalog>",
];

const XML_BOUNDARIES: [&str; 7] = [
    r#"<record xmlns="http://www.loc.gov/mods/v3">"#,
    "<record xmlns:rdf=",
    "<?xml version",
    "<OAI-PMH",
    "</OAI-PMH>",
    "<ListRecords>",
    "</ListRecords>",
];

/// Extra boundaries in deletion exports, whose records carry bare `<record>` wrappers.
const XML_DELETED_BOUNDARIES: [&str; 4] = [
    "<record>",
    r#"xmlns="http://www.openarchives.org/OAI/2.0/""#,
    r#"xsi:schemaLocation="http://www.openarchives.org/OAI/2.0/"#,
    r#"http://www.openarchives.org/OAI/2.0/OAI- PMH.xsd""#,
];

const EXPORT_SUFFIXES: [&str; 6] = [
    "export_ALL",
    "export_DOCRECITEM",
    "export_MLRECITEM",
    "export_PUBLPROD",
    "export_WORK",
    "export_WRSECITEM",
];

lazy_static! {
    static ref PRN_DATE_CREATED: Regex =
        Regex::new(r"^<dateCreated>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}</dateCreated>$").unwrap();
}

/// A SAMI export dialect.
///
/// Each dialect decides where records start in the line stream and which
/// lines before a record are noise; [`Dialect::extract`] then turns a chunk
/// into a [`SamiRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
    /// Tab-delimited authority dumps ending each record with `.end`
    #[serde(rename = "authorities")]
    Authorities,
    /// Plain tagged text separated by `*** DOCUMENT BOUNDARY ***`
    #[default]
    #[serde(rename = "txt")]
    Text,
    /// Legacy `.prn` report XML with `marcEntry` and holdings elements
    #[serde(rename = "prn")]
    Prn,
    /// MARCXML-like `controlfield`/`datafield` markup
    #[serde(rename = "xml")]
    Xml,
}

impl Dialect {
    /// All dialects, in the order their names are listed in help text.
    pub const ALL: [Dialect; 4] = [
        Dialect::Authorities,
        Dialect::Text,
        Dialect::Prn,
        Dialect::Xml,
    ];

    /// Dialect implied by a file path: `.xml` and `.prn` by extension,
    /// anything else plain text. Authority dumps must be chosen explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// use sami2marc::Dialect;
    ///
    /// assert_eq!(Dialect::from_path("export_WORK.xml"), Dialect::Xml);
    /// assert_eq!(Dialect::from_path("items.PRN"), Dialect::Prn);
    /// assert_eq!(Dialect::from_path("export_ALL"), Dialect::Text);
    /// ```
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match extension(path.as_ref()).as_deref() {
            Some("xml") => Dialect::Xml,
            Some("prn") => Dialect::Prn,
            _ => Dialect::Text,
        }
    }

    /// The name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Dialect::Authorities => "authorities",
            Dialect::Text => "txt",
            Dialect::Prn => "prn",
            Dialect::Xml => "xml",
        }
    }

    /// True if `line` starts a new record (and so ends the current one).
    ///
    /// `deleted` switches on the extra boundaries found in XML deletion exports.
    #[must_use]
    pub fn is_boundary(self, line: &str, deleted: bool) -> bool {
        match self {
            Dialect::Authorities => line.starts_with(".end") || line.trim().is_empty(),
            Dialect::Text => line.contains(DOCUMENT_BOUNDARY),
            Dialect::Prn => {
                PRN_BOUNDARIES.iter().any(|b| line.contains(b))
                    || PRN_DATE_CREATED.is_match(line.trim())
            },
            Dialect::Xml => {
                XML_BOUNDARIES.iter().any(|b| line.contains(b))
                    || (deleted && XML_DELETED_BOUNDARIES.iter().any(|b| line.contains(b)))
            },
        }
    }

    /// True if `line` should be dropped while looking for the start of a record.
    #[must_use]
    pub fn is_preamble(self, line: &str) -> bool {
        if line.contains(NAMESPACE_DECLARATION) {
            return true;
        }
        match self {
            Dialect::Authorities => {
                line.trim().is_empty() || line.starts_with('.') || line.starts_with('$')
            },
            Dialect::Text | Dialect::Prn | Dialect::Xml => false,
        }
    }

    /// Build a record from one chunk of this dialect.
    #[must_use]
    pub fn extract(self, chunk: String, tidy: bool) -> SamiRecord {
        match self {
            Dialect::Authorities => extract::authority(chunk, tidy),
            Dialect::Text => extract::text(chunk),
            Dialect::Prn => extract::prn(chunk),
            Dialect::Xml => extract::xml(chunk),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = MarcError;

    fn from_str(s: &str) -> Result<Self> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| {
                MarcError::ConfigError(format!("The reader type {s} is not supported"))
            })
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// True if the path names a deletion export (`_dels` in the file name).
#[must_use]
pub fn is_deletion_export(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains("_dels"))
}

/// True if the path looks like a SAMI export file worth converting.
///
/// # Examples
///
/// ```
/// use sami2marc::sami::is_sami_export;
///
/// assert!(is_sami_export("2020-01-01_export_WORK"));
/// assert!(is_sami_export("holdings.prn"));
/// assert!(!is_sami_export("notes.txt"));
/// ```
#[must_use]
pub fn is_sami_export(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if matches!(extension(path).as_deref(), Some("xml" | "prn")) {
        return true;
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| EXPORT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
}
