//! MARCXML output.
//!
//! Records are written as `marc:`-prefixed MARCXML fragments, one element
//! per line and indented with tabs. The fragments are meant to sit inside
//! [`COLLECTION_HEADER`] and [`COLLECTION_FOOTER`], which [`MarcXmlWriter`]
//! adds automatically, or inside an OAI-style `<record>` envelope built by
//! [`sami_record_to_envelope`].
//!
//! The leader written is the one the binary encoder would produce, so XML and
//! binary output of the same record agree.
//!
//! # Examples
//!
//! ```
//! use sami2marc::{marcxml, Field, Record, XmlStyle};
//!
//! let mut record = Record::default();
//! record.add_ordered_field(Field::builder("245", '1', '0').unwrap().subfield('a', "Fish & chips").build());
//!
//! let xml = marcxml::record_to_xml(&record, XmlStyle::Plain).unwrap();
//! assert!(xml.contains(r#"<marc:datafield tag="245" ind1="1" ind2="0">"#));
//! assert!(xml.contains(r#"<marc:subfield code="a">Fish &amp; chips</marc:subfield>"#));
//! ```

use crate::config::XmlStyle;
use crate::error::{MarcError, Result};
use crate::formats::FormatWriter;
use crate::iso2709;
use crate::leader::Leader;
use crate::record::{FieldData, Record};
use crate::sami::SamiRecord;
use quick_xml::escape::unescape;
use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::io::Write;

/// Opening of a `marc:collection` document.
pub const COLLECTION_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" ?>"#,
    "\n",
    r#"<marc:collection xmlns:marc="http://www.loc.gov/MARC21/slim" "#,
    r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
    r#"xsi:schemaLocation="http://www.loc.gov/MARC21/slim http://www.loc.gov/standards/marcxml/schema/MARC21slim.xsd">"#,
);

/// Closing of a `marc:collection` document.
pub const COLLECTION_FOOTER: &str = "\n</marc:collection>";

const SCHEMA_LOCATION: &str =
    "http://www.loc.gov/MARC21/slim http://www.loc.gov/standards/marcxml/schema/MARC21slim.xsd";

/// Opening tag of the per-record envelope.
const ENVELOPE_RECORD: &str = concat!(
    "\n<record ",
    r#"xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" "#,
    r#"xmlns:marc="http://www.loc.gov/MARC21/slim" "#,
    r#"xmlns:bl="http://www.bl.uk/schemas/digitalobject/entities#" "#,
    r#"xmlns:blit="http://bl.uk/namespaces/blit">"#,
);

/// Make text safe for element content.
///
/// Entities are resolved one at a time so already-escaped input is not
/// escaped twice: the XML and HTML5 named entities and numeric character
/// references are decoded, and anything else starting with `&` is kept as
/// written. Control characters (U+0000-U+001F, U+007F-U+009F) are removed,
/// then `& < > " '` are escaped.
///
/// # Examples
///
/// ```
/// use sami2marc::marcxml::clean_text;
///
/// assert_eq!(clean_text("Tom &amp; Jerry <1940>"), "Tom &amp; Jerry &lt;1940&gt;");
/// assert_eq!(clean_text("Caf&eacute; & bar"), "Caf\u{e9} &amp; bar");
/// assert_eq!(clean_text("bell\u{7}"), "bell");
/// ```
#[must_use]
pub fn clean_text(s: &str) -> String {
    let unescaped = unescape_entities(s);
    let stripped: String = unescaped.chars().filter(|c| !c.is_control()).collect();
    escape_xml(&stripped)
}

/// Decode each `&name;` that names a known entity, leaving the rest literal.
pub(crate) fn unescape_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        // `unescape` on a single `&...;` reference: HTML5 names, XML names and
        // character references resolve, anything else is an error.
        let resolved = rest[1..].find(';').and_then(|end| {
            let reference = &rest[..end + 2];
            unescape(reference).ok().map(|text| (text, reference.len()))
        });
        match resolved {
            Some((text, consumed)) => {
                out.push_str(&text);
                rest = &rest[consumed..];
            },
            None => {
                out.push('&');
                rest = &rest[1..];
            },
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render one `<marc:record>` element.
///
/// The output starts with a newline and is indented for a place directly
/// inside a collection or `<metadata>` element.
///
/// # Errors
///
/// Returns [`MarcError::RecordWritingError`] if the record does not fit the
/// binary layout, since its leader could not be computed.
pub fn record_to_xml(record: &Record, style: XmlStyle) -> Result<String> {
    let leader = iso2709::encoded_leader(record)?;

    let mut xml = String::new();
    write_record_xml(&mut xml, record, &leader, style).map_err(|e| {
        MarcError::RecordWritingError(format!("Failed to format MARCXML record: {e}"))
    })?;
    Ok(xml)
}

fn write_record_xml(
    xml: &mut String,
    record: &Record,
    leader: &Leader,
    style: XmlStyle,
) -> fmt::Result {
    match style {
        XmlStyle::Plain => xml.push_str("\n\t<marc:record>"),
        XmlStyle::Namespaced => {
            write!(xml, "\n\t<marc:record xsi:schemaLocation=\"{SCHEMA_LOCATION}\">")?;
        },
    }
    write!(
        xml,
        "\n\t\t<marc:leader>{}</marc:leader>",
        escape_xml(leader.as_str())
    )?;

    for field in record.fields() {
        let tag = escape_xml(field.tag());
        match field.content() {
            FieldData::Control(value) => {
                write!(
                    xml,
                    "\n\t\t<marc:controlfield tag=\"{tag}\">{}</marc:controlfield>",
                    clean_text(value)
                )?;
            },
            FieldData::Data {
                indicator1,
                indicator2,
                subfields,
            } => {
                write!(
                    xml,
                    "\n\t\t<marc:datafield tag=\"{tag}\" ind1=\"{}\" ind2=\"{}\">",
                    escape_xml(&indicator1.to_string()),
                    escape_xml(&indicator2.to_string())
                )?;
                for subfield in subfields {
                    write!(
                        xml,
                        "\n\t\t\t<marc:subfield code=\"{}\">{}</marc:subfield>",
                        escape_xml(&subfield.code.to_string()),
                        clean_text(subfield.value.trim())
                    )?;
                }
                xml.push_str("\n\t\t</marc:datafield>");
            },
        }
    }

    xml.push_str("\n\t</marc:record>");
    Ok(())
}

/// Wrap a SAMI record in a `<record>` envelope with a `<header>`.
///
/// Deleted records get `<header status="deleted">` with an identifier and a
/// datestamp and no `<metadata>`; all others get the identifier and the
/// namespaced record inside `<metadata>`.
///
/// # Errors
///
/// Fails in the same cases as [`record_to_xml`].
pub fn sami_record_to_envelope(sami: &SamiRecord) -> Result<String> {
    let mut xml = String::from(ENVELOPE_RECORD);
    if sami.is_deleted() {
        write_deleted_header(&mut xml, sami).map_err(|e| {
            MarcError::RecordWritingError(format!("Failed to format record header: {e}"))
        })?;
        xml.push_str("</record>");
        return Ok(xml);
    }

    xml.push_str("\n<header>\n<identifier>");
    xml.push_str(&clean_text(&sami.identifier().unwrap_or_default()));
    xml.push_str("</identifier>\n</header>\n<metadata>");
    xml.push_str(&record_to_xml(sami.record(), XmlStyle::Namespaced)?);
    xml.push_str("\n</metadata>\n</record>");
    Ok(xml)
}

fn write_deleted_header(xml: &mut String, sami: &SamiRecord) -> fmt::Result {
    write!(
        xml,
        "\n<header status=\"deleted\">\n<identifier>{}</identifier>\n<datestamp>{}</datestamp>\n</header>\n",
        clean_text(&sami.identifier().unwrap_or_default()),
        clean_text(&sami.datestamp())
    )
}

/// Writes records as a `marc:collection` document.
///
/// The collection header is written before the first record (or on
/// [`finish`](Self::finish) if there were none) and the footer on `finish`.
#[derive(Debug)]
pub struct MarcXmlWriter<W: Write> {
    writer: W,
    style: XmlStyle,
    started: bool,
    finished: bool,
    records_written: usize,
}

impl<W: Write> MarcXmlWriter<W> {
    /// Create a writer using [`XmlStyle::Plain`] records.
    pub fn new(writer: W) -> Self {
        Self::with_style(writer, XmlStyle::Plain)
    }

    /// Create a writer with a given record style.
    pub fn with_style(writer: W, style: XmlStyle) -> Self {
        MarcXmlWriter {
            writer,
            style,
            started: false,
            finished: false,
            records_written: 0,
        }
    }

    fn start(&mut self) -> Result<()> {
        if !self.started {
            self.writer.write_all(COLLECTION_HEADER.as_bytes())?;
            self.started = true;
        }
        Ok(())
    }

    /// Write one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished, the record does not fit
    /// the binary layout, or writing fails.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarcError::RecordWritingError(
                "Cannot write to a finished writer".to_string(),
            ));
        }
        let xml = record_to_xml(record, self.style)?;
        self.start()?;
        self.writer.write_all(xml.as_bytes())?;
        self.records_written += 1;
        Ok(())
    }

    /// Write the collection footer and flush. Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.start()?;
        self.writer.write_all(COLLECTION_FOOTER.as_bytes())?;
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Number of records written so far
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

impl<W: Write + std::fmt::Debug> FormatWriter for MarcXmlWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        MarcXmlWriter::write_record(self, record)
    }

    fn finish(&mut self) -> Result<()> {
        MarcXmlWriter::finish(self)
    }

    fn records_written(&self) -> Option<usize> {
        Some(self.records_written)
    }
}
