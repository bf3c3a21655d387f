//! Output format selection and the shared reader/writer traits.
//!
//! | Format | Writer | Description |
//! |--------|--------|-------------|
//! | ISO 2709 | [`MarcWriter`](crate::MarcWriter) | Binary interchange records |
//! | MARCXML | [`MarcXmlWriter`](crate::MarcXmlWriter) | `marc:collection` document |

mod traits;

pub use traits::{FormatReader, FormatReaderExt, FormatWriter, RecordIterator};

/// Output formats a converted record can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// ISO 2709 binary MARC (`.mrc`, `.marc`)
    Iso2709,
    /// MARCXML (`.xml`)
    MarcXml,
}

impl Format {
    /// Detect format from file extension.
    ///
    /// # Example
    ///
    /// ```
    /// use sami2marc::formats::Format;
    ///
    /// assert_eq!(Format::from_extension("mrc"), Some(Format::Iso2709));
    /// assert_eq!(Format::from_extension("XML"), Some(Format::MarcXml));
    /// assert_eq!(Format::from_extension("prn"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mrc" | "marc" => Some(Self::Iso2709),
            "xml" => Some(Self::MarcXml),
            _ => None,
        }
    }

    /// Canonical file extension
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Iso2709 => "mrc",
            Self::MarcXml => "xml",
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Iso2709 => "ISO 2709",
            Self::MarcXml => "MARCXML",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
