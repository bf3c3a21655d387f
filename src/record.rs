//! MARC record structures and the field ordering policy.
//!
//! This module provides the core record types:
//! - [`Record`] — a leader plus an ordered list of fields
//! - [`Field`] — a control field or a data field, decided by its tag
//! - [`Subfield`] — a coded data element within a data field
//!
//! # Examples
//!
//! ```
//! use sami2marc::{Field, Record};
//!
//! let mut record = Record::default();
//! record.add_ordered_field(Field::control("001", "CKEY123").unwrap());
//!
//! let title = Field::builder("245", '1', '0')
//!     .unwrap()
//!     .subfield('a', "A title")
//!     .build();
//! record.add_ordered_field(title);
//!
//! assert_eq!(record.control_value("001"), Some("CKEY123"));
//! assert_eq!(record.get_field("245").and_then(|f| f.get_subfield('a')), Some("A title"));
//! ```

use crate::error::{MarcError, Result};
use crate::leader::Leader;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Tags that hold control data despite not being numeric.
pub const NAMED_CONTROL_TAGS: [&str; 3] = ["DB ", "SYS", "LDR"];

/// Normalize a tag to exactly three characters.
///
/// Shorter tags are left-padded with spaces; longer tags keep their first three characters.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    let truncated: String = tag.chars().take(3).collect();
    format!("{truncated:>3}")
}

/// True for tags made only of ASCII digits.
#[must_use]
pub fn is_numeric_tag(tag: &str) -> bool {
    !tag.is_empty() && tag.bytes().all(|b| b.is_ascii_digit())
}

/// True for the named, non-numeric control tags.
#[must_use]
pub fn is_named_control_tag(tag: &str) -> bool {
    NAMED_CONTROL_TAGS.contains(&tag)
}

/// True if a field with this (normalized) tag is a control field.
///
/// Control tags are `000`-`009` and the [`NAMED_CONTROL_TAGS`].
#[must_use]
pub fn is_control_tag(tag: &str) -> bool {
    (tag.len() == 3 && is_numeric_tag(tag) && tag < "010") || is_named_control_tag(tag)
}

fn numeric_value(tag: &str) -> u32 {
    tag.bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b.wrapping_sub(b'0')))
}

/// A subfield within a data field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Subfield {
    /// Create a subfield
    #[must_use]
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Subfield {
            code,
            value: value.into(),
        }
    }
}

/// Content of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldData {
    /// A raw value with no indicators or subfields.
    Control(String),
    /// Two indicators and an ordered list of subfields.
    Data {
        /// First indicator
        indicator1: char,
        /// Second indicator
        indicator2: char,
        /// Subfields, in insertion order
        subfields: SmallVec<[Subfield; 4]>,
    },
}

/// A field in a MARC record.
///
/// Whether a field is a control field is fixed by its tag; the constructors
/// refuse combinations that would break that rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    tag: String,
    data: FieldData,
}

impl Field {
    /// Create a control field.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidField`] if `tag` is not a control tag.
    pub fn control(tag: impl AsRef<str>, value: impl Into<String>) -> Result<Self> {
        let tag = normalize_tag(tag.as_ref());
        if !is_control_tag(&tag) {
            return Err(MarcError::InvalidField(format!(
                "Tag '{tag}' is not a control field tag"
            )));
        }
        Ok(Self::control_unchecked(tag, value.into()))
    }

    /// Create an empty data field.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidField`] if `tag` is a control tag.
    pub fn data(tag: impl AsRef<str>, indicator1: char, indicator2: char) -> Result<Self> {
        let tag = normalize_tag(tag.as_ref());
        if is_control_tag(&tag) {
            return Err(MarcError::InvalidField(format!(
                "Tag '{tag}' is a control field tag"
            )));
        }
        Ok(Self::data_unchecked(tag, indicator1, indicator2, SmallVec::new()))
    }

    /// Create a builder for constructing data fields fluently
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidField`] if `tag` is a control tag.
    pub fn builder(tag: impl AsRef<str>, indicator1: char, indicator2: char) -> Result<FieldBuilder> {
        Ok(FieldBuilder {
            field: Self::data(tag, indicator1, indicator2)?,
        })
    }

    /// Callers must have checked `is_control_tag` on the normalized tag.
    pub(crate) fn control_unchecked(tag: String, value: String) -> Self {
        Field {
            tag,
            data: FieldData::Control(value),
        }
    }

    /// Callers must have checked `!is_control_tag` on the normalized tag.
    pub(crate) fn data_unchecked(
        tag: String,
        indicator1: char,
        indicator2: char,
        subfields: SmallVec<[Subfield; 4]>,
    ) -> Self {
        Field {
            tag,
            data: FieldData::Data {
                indicator1,
                indicator2,
                subfields,
            },
        }
    }

    /// The three-character tag
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The field content
    #[must_use]
    pub fn content(&self) -> &FieldData {
        &self.data
    }

    /// True for control fields
    #[must_use]
    pub fn is_control_field(&self) -> bool {
        matches!(self.data, FieldData::Control(_))
    }

    /// The raw value of a control field
    #[must_use]
    pub fn control_value(&self) -> Option<&str> {
        match &self.data {
            FieldData::Control(value) => Some(value),
            FieldData::Data { .. } => None,
        }
    }

    /// Both indicators of a data field
    #[must_use]
    pub fn indicators(&self) -> Option<(char, char)> {
        match &self.data {
            FieldData::Control(_) => None,
            FieldData::Data {
                indicator1,
                indicator2,
                ..
            } => Some((*indicator1, *indicator2)),
        }
    }

    /// All subfields; empty for control fields
    #[must_use]
    pub fn subfields(&self) -> &[Subfield] {
        match &self.data {
            FieldData::Control(_) => &[],
            FieldData::Data { subfields, .. } => subfields,
        }
    }

    /// Append a subfield.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidField`] for control fields.
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) -> Result<()> {
        match &mut self.data {
            FieldData::Control(_) => Err(MarcError::InvalidField(format!(
                "Control field {} cannot hold subfields",
                self.tag
            ))),
            FieldData::Data { subfields, .. } => {
                subfields.push(Subfield::new(code, value));
                Ok(())
            },
        }
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields()
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Get all values for a subfield code
    #[must_use]
    pub fn get_subfield_values(&self, code: char) -> Vec<&str> {
        self.subfields()
            .iter()
            .filter(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
            .collect()
    }
}

/// Mnemonic line format: `=245  10 $aTitle`, blanks shown as `#`.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "={}  ", self.tag)?;
        match &self.data {
            FieldData::Control(value) => f.write_str(&value.replace(' ', "#")),
            FieldData::Data {
                indicator1,
                indicator2,
                subfields,
            } => {
                for indicator in [indicator1, indicator2] {
                    let shown = if *indicator == ' ' { '#' } else { *indicator };
                    write!(f, "{shown}")?;
                }
                f.write_str(" ")?;
                for subfield in subfields {
                    write!(f, "${}{}", subfield.code, subfield.value)?;
                }
                Ok(())
            },
        }
    }
}

/// Builder for data fields
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield
    #[must_use]
    pub fn subfield(mut self, code: char, value: impl Into<String>) -> Self {
        if let FieldData::Data { subfields, .. } = &mut self.field.data {
            subfields.push(Subfield::new(code, value));
        }
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}

/// A MARC record
///
/// Fields are kept in a single list whose order is the order used when the
/// record is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Record {
    /// Record leader (24 bytes)
    pub leader: Leader,
    fields: Vec<Field>,
}

impl Record {
    /// Create an empty record with the given leader
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            fields: Vec::new(),
        }
    }

    /// Append a field at the end, whatever its tag.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Insert a field following the ingest ordering policy.
    ///
    /// Non-numeric tags are appended. A numeric tag is placed by scanning the
    /// existing fields from the front while tracking the last numeric tag seen
    /// (named control tags do not update it). The field goes in front of the
    /// first non-numeric, non-control field, or in front of the first field at
    /// which the tracked tag exceeds its own; otherwise it is appended.
    ///
    /// This is a single scan, not a sort: a record whose existing fields are
    /// out of order can keep them that way.
    pub fn add_ordered_field(&mut self, field: Field) {
        if self.fields.is_empty() || !is_numeric_tag(field.tag()) {
            self.fields.push(field);
            return;
        }

        let tag = numeric_value(field.tag());
        let mut last_tag = 0;
        let mut position = None;
        for (i, existing) in self.fields.iter().enumerate() {
            let named = is_named_control_tag(existing.tag());
            if !named && !is_numeric_tag(existing.tag()) {
                position = Some(i);
                break;
            }
            if !named {
                last_tag = numeric_value(existing.tag());
            }
            if last_tag > tag {
                position = Some(i);
                break;
            }
        }

        match position {
            Some(i) => self.fields.insert(i, field),
            None => self.fields.push(field),
        }
    }

    /// All fields in stored order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields matching a specific tag
    pub fn fields_by_tag<'a, 'b>(&'a self, tag: &'b str) -> impl Iterator<Item = &'a Field> + 'b
    where
        'a: 'b,
    {
        self.fields.iter().filter(move |f| f.tag() == tag)
    }

    /// Get all fields with a given tag
    #[must_use]
    pub fn get_fields(&self, tag: &str) -> Vec<&Field> {
        self.fields_by_tag(tag).collect()
    }

    /// Get first field with a given tag
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.fields_by_tag(tag).next()
    }

    /// True if at least one field has the tag
    #[must_use]
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.get_field(tag).is_some()
    }

    /// Value of the first control field with the tag
    #[must_use]
    pub fn control_value(&self, tag: &str) -> Option<&str> {
        self.fields_by_tag(tag).find_map(Field::control_value)
    }
}

/// Mnemonic rendering: `=LDR  ` with the leader as it would be encoded,
/// then one line per field.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let leader = crate::iso2709::encoded_leader(self).unwrap_or(self.leader);
        writeln!(f, "=LDR  {leader}")?;
        for field in &self.fields {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_field(tag: &str) -> Field {
        Field::data(tag, ' ', ' ').unwrap()
    }

    fn tags(record: &Record) -> Vec<&str> {
        record.fields().iter().map(Field::tag).collect()
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("1"), "  1");
        assert_eq!(normalize_tag("DB"), " DB");
        assert_eq!(normalize_tag("245"), "245");
        assert_eq!(normalize_tag("2450"), "245");
    }

    #[test]
    fn test_control_classification() {
        for tag in ["000", "001", "005", "008", "009", "DB ", "SYS", "LDR"] {
            assert!(is_control_tag(tag), "{tag} should be a control tag");
        }
        for tag in ["010", "245", "999", "FMT", " DB", "  1"] {
            assert!(!is_control_tag(tag), "{tag} should be a data tag");
        }
    }

    #[test]
    fn test_constructors_enforce_kind() {
        assert!(Field::control("245", "x").is_err());
        assert!(Field::data("001", ' ', ' ').is_err());
        assert!(Field::data("SYS", ' ', ' ').is_err());
        assert!(Field::control("SYS", "000123").unwrap().is_control_field());
    }

    #[test]
    fn test_field_subfields() {
        let field = Field::builder("245", '1', '0')
            .unwrap()
            .subfield('a', "Title")
            .subfield('c', "Author")
            .subfield('a', "Title continued")
            .build();

        assert_eq!(field.indicators(), Some(('1', '0')));
        assert_eq!(field.get_subfield('a'), Some("Title"));
        assert_eq!(field.get_subfield_values('a'), vec!["Title", "Title continued"]);
        assert_eq!(field.get_subfield('z'), None);
    }

    #[test]
    fn test_control_field_rejects_subfields() {
        let mut field = Field::control("008", "200101").unwrap();
        assert!(field.add_subfield('a', "x").is_err());
        assert!(field.subfields().is_empty());
        assert_eq!(field.indicators(), None);
    }

    #[test]
    fn test_field_display() {
        let field = Field::builder("245", ' ', '0')
            .unwrap()
            .subfield('a', "Title")
            .build();
        assert_eq!(field.to_string(), "=245  #0 $aTitle");

        let field = Field::builder("100", '1', ' ')
            .unwrap()
            .subfield('a', "Smith, John,")
            .subfield('d', "1900-")
            .build();
        assert_eq!(field.to_string(), "=100  1# $aSmith, John,$d1900-");

        let control = Field::control("008", "2001 eng").unwrap();
        assert_eq!(control.to_string(), "=008  2001#eng");
    }

    #[test]
    fn test_ordered_insert_ascending() {
        let mut record = Record::default();
        for tag in ["245", "100", "650", "020"] {
            record.add_ordered_field(data_field(tag));
        }
        assert_eq!(tags(&record), vec!["020", "100", "245", "650"]);
    }

    #[test]
    fn test_ordered_insert_before_non_numeric() {
        let mut record = Record::default();
        record.add_ordered_field(data_field("245"));
        record.add_ordered_field(data_field("FMT"));
        record.add_ordered_field(data_field("500"));
        assert_eq!(tags(&record), vec!["245", "500", "FMT"]);
    }

    #[test]
    fn test_ordered_insert_skips_named_control_tags() {
        let mut record = Record::default();
        record.add_ordered_field(Field::control("SYS", "000000123").unwrap());
        record.add_ordered_field(data_field("245"));
        record.add_ordered_field(data_field("100"));
        assert_eq!(tags(&record), vec!["SYS", "100", "245"]);
    }

    #[test]
    fn test_ordered_insert_non_numeric_first_field() {
        let mut record = Record::default();
        record.add_ordered_field(data_field("FMT"));
        record.add_ordered_field(data_field("100"));
        assert_eq!(tags(&record), vec!["100", "FMT"]);
    }

    #[test]
    fn test_ordered_insert_is_a_scan_not_a_sort() {
        // Fields appended unconditionally can leave the record unsorted; the
        // scan then stops at the first larger tag it meets.
        let mut record = Record::default();
        record.add_field(data_field("500"));
        record.add_field(data_field("100"));
        record.add_ordered_field(data_field("300"));
        assert_eq!(tags(&record), vec!["300", "500", "100"]);

        record.add_ordered_field(data_field("600"));
        assert_eq!(tags(&record), vec!["300", "500", "100", "600"]);
    }

    #[test]
    fn test_ordered_insert_equal_tags_keep_arrival_order() {
        let mut record = Record::default();
        for value in ["one", "two", "three"] {
            let field = Field::builder("650", ' ', '0')
                .unwrap()
                .subfield('a', value)
                .build();
            record.add_ordered_field(field);
        }
        let values: Vec<_> = record
            .fields_by_tag("650")
            .filter_map(|f| f.get_subfield('a'))
            .collect();
        assert_eq!(values, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_record_queries() {
        let mut record = Record::default();
        record.add_ordered_field(Field::control("001", "CKEY42").unwrap());
        record.add_ordered_field(data_field("650"));
        record.add_ordered_field(data_field("650"));

        assert!(record.contains_tag("650"));
        assert!(!record.contains_tag("245"));
        assert_eq!(record.get_fields("650").len(), 2);
        assert_eq!(record.control_value("001"), Some("CKEY42"));
        assert_eq!(record.control_value("650"), None);
        assert_eq!(record.len(), 3);
    }
}
