//! A record extracted from one SAMI chunk, with its provenance.

use crate::marcxml::clean_text;
use crate::record::Record;
use serde::Serialize;
use thiserror::Error;

/// Marker of a deletion record in XML exports.
const DELETED_HEADER: &str = r#"<header status="deleted">"#;

/// A non-fatal problem met while extracting a record.
///
/// The record is still produced; [`SamiRecord::is_bad`] reports that it has issues.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExtractionIssue {
    /// The authority header line has fewer than nine attributes.
    #[error("Authority header has {found} of 9 attributes")]
    MissingHeaderAttributes {
        /// Number of attributes present
        found: usize,
    },

    /// A header date is neither `NEVER` nor `dd/mm/YYYY`.
    #[error("Error parsing {attribute} date '{value}'")]
    InvalidDate {
        /// `created` or `modified`
        attribute: &'static str,
        /// The unparsed value, which is kept as is
        value: String,
    },

    /// No 001 was present and none could be built from the source id.
    #[error("Failed to add 001")]
    MissingIdentifier,

    /// An element could not be read from XML-tagged input.
    #[error("Malformed XML: {0}")]
    MalformedXml(String),
}

/// Attributes from the first line of an authority record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorityHeader {
    /// Source system id
    pub source_id: String,
    /// Record format
    pub format: String,
    /// Record level
    pub level: String,
    /// Creation date (`YYYYmmdd` after tidying)
    pub created: String,
    /// Creating user
    pub created_by: String,
    /// Modification date (`YYYYmmdd` after tidying)
    pub modified: String,
    /// Modifying user
    pub modified_by: String,
    /// Cataloging status
    pub cataloged: String,
    /// Source of the record
    pub source: String,
}

/// A record built from one SAMI chunk.
#[derive(Debug, Clone, Serialize)]
pub struct SamiRecord {
    pub(crate) record: Record,
    raw: String,
    deleted: bool,
    pub(crate) authority: Option<AuthorityHeader>,
    issues: Vec<ExtractionIssue>,
}

impl SamiRecord {
    /// Start an empty record for `raw`.
    pub(crate) fn new(raw: String) -> Self {
        SamiRecord {
            record: Record::default(),
            deleted: raw.contains(DELETED_HEADER),
            raw,
            authority: None,
            issues: Vec::new(),
        }
    }

    pub(crate) fn add_issue(&mut self, issue: ExtractionIssue) {
        tracing::warn!(%issue, "record extraction issue");
        self.issues.push(issue);
    }

    /// The extracted MARC record
    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Take the MARC record, dropping the SAMI context
    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// The raw chunk this record was built from
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True for deletion records (`<header status="deleted">`)
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Header attributes, for authority records
    #[must_use]
    pub fn authority(&self) -> Option<&AuthorityHeader> {
        self.authority.as_ref()
    }

    /// Problems met during extraction
    #[must_use]
    pub fn issues(&self) -> &[ExtractionIssue] {
        &self.issues
    }

    /// True if any extraction problem was recorded
    #[must_use]
    pub fn is_bad(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Record identifier: the 001 without its `CKEY` prefix, or else the
    /// `<identifier>` element of the raw chunk.
    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        if let Some(value) = self.record.control_value("001") {
            return Some(clean_text(value.replace("CKEY", "").trim()));
        }
        element_text(&self.raw, "identifier").map(|id| clean_text(id.trim()))
    }

    /// The `<datestamp>` element of the raw chunk, or `[NO DATESTAMP]`.
    #[must_use]
    pub fn datestamp(&self) -> String {
        element_text(&self.raw, "datestamp")
            .map_or_else(|| "[NO DATESTAMP]".to_string(), |d| d.trim().to_string())
    }
}

/// Text of the first `<name>…</name>` element in `haystack`.
pub(crate) fn element_text<'a>(haystack: &'a str, name: &str) -> Option<&'a str> {
    elements(haystack, name).next()
}

/// Text of every `<name>…</name>` element in `haystack`, in order.
///
/// Each element ends at the first closing tag after its opening tag.
pub(crate) fn elements<'a>(haystack: &'a str, name: &str) -> impl Iterator<Item = &'a str> + 'a {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let mut rest = haystack;
    std::iter::from_fn(move || {
        let start = rest.find(&open)? + open.len();
        let len = rest[start..].find(&close)?;
        let text = &rest[start..start + len];
        rest = &rest[start + len + close.len()..];
        Some(text)
    })
}
