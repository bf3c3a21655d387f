//! ISO 2709 binary record codec.
//!
//! A binary record is laid out as:
//!
//! ```text
//! leader (24) | directory (12 per field) 0x1E | field data ... 0x1D
//! ```
//!
//! Each directory entry is a 3-byte tag, a 4-digit field length (terminator
//! included) and a 5-digit offset into the field data. Control fields are a raw
//! value followed by 0x1E; data fields are two indicator bytes, then
//! `0x1F code value` per subfield, then 0x1E.
//!
//! [`decode`] and [`encode`] are inverses of each other for any record whose
//! values contain none of the three separator bytes, except that decoding
//! always sets the leader's character coding to `'a'` and encoding always
//! recomputes the record length and base address.

use crate::error::{MarcError, Result};
use crate::leader::{Leader, LEADER_LENGTH};
use crate::record::{is_control_tag, normalize_tag, Field, Record, Subfield};
use smallvec::SmallVec;

pub(crate) const FIELD_TERMINATOR: u8 = 0x1E;
pub(crate) const SUBFIELD_DELIMITER: u8 = 0x1F;
pub(crate) const RECORD_TERMINATOR: u8 = 0x1D;

const DIRECTORY_ENTRY_LENGTH: usize = 12;
const MAX_FIELD_LENGTH: usize = 9_999;
const MAX_OFFSET: usize = 99_999;

/// Decode one binary record.
///
/// Trailing bytes after the record are ignored as long as the directory
/// entries stay inside the buffer.
///
/// # Errors
///
/// - [`MarcError::LeaderError`] if fewer than 24 bytes are given
/// - [`MarcError::BaseAddressError`] if the base address is not a positive number
/// - [`MarcError::BaseAddressLengthError`] if the base address is past the data
/// - [`MarcError::DirectoryError`] if the directory is not made of 12-byte
///   entries with numeric lengths and offsets
/// - [`MarcError::FieldsError`] if an entry points outside the data or the
///   record has no fields
///
/// # Examples
///
/// ```
/// use sami2marc::{iso2709, Field, Record};
///
/// let mut record = Record::default();
/// record.add_ordered_field(Field::control("001", "42").unwrap());
/// let bytes = iso2709::encode(&record).unwrap();
///
/// let decoded = iso2709::decode(&bytes).unwrap();
/// assert_eq!(decoded.control_value("001"), Some("42"));
/// ```
pub fn decode(bytes: &[u8]) -> Result<Record> {
    let leader = Leader::from_bytes(bytes)?;

    let base_address = match leader.base_address() {
        Some(base) if base > 0 => base,
        _ => {
            return Err(MarcError::BaseAddressError(format!(
                "'{}' is not a positive base address",
                &leader.as_str()[12..17]
            )))
        },
    };
    if base_address >= bytes.len() {
        return Err(MarcError::BaseAddressLengthError {
            base_address,
            record_length: bytes.len(),
        });
    }

    // The byte before the base address is the directory terminator.
    let directory = bytes
        .get(LEADER_LENGTH..base_address - 1)
        .unwrap_or_default();
    if directory.len() % DIRECTORY_ENTRY_LENGTH != 0 {
        return Err(MarcError::DirectoryError(format!(
            "Directory length {} is not a multiple of {DIRECTORY_ENTRY_LENGTH}",
            directory.len()
        )));
    }

    let mut record = Record::new(leader.with_unicode_coding());
    for entry in directory.chunks_exact(DIRECTORY_ENTRY_LENGTH) {
        let tag = normalize_tag(&String::from_utf8_lossy(&entry[0..3]));
        let length = parse_number(&entry[3..7], &tag)?;
        let offset = parse_number(&entry[7..12], &tag)?;

        let start = base_address + offset;
        let end = start + length.saturating_sub(1);
        let content = bytes.get(start..end).ok_or_else(|| {
            MarcError::FieldsError(format!(
                "Field {tag} at {start}..{end} lies outside the {} byte record",
                bytes.len()
            ))
        })?;

        record.add_field(decode_field(tag, content));
    }

    if record.is_empty() {
        return Err(MarcError::FieldsError(
            "Record contains no fields".to_string(),
        ));
    }
    Ok(record)
}

fn parse_number(bytes: &[u8], tag: &str) -> Result<usize> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| {
            MarcError::DirectoryError(format!(
                "Entry for {tag} has non-numeric value '{}'",
                String::from_utf8_lossy(bytes)
            ))
        })
}

fn decode_field(tag: String, content: &[u8]) -> Field {
    if is_control_tag(&tag) {
        let value = String::from_utf8_lossy(content).into_owned();
        return Field::control_unchecked(tag, value);
    }

    let mut segments = split_subfields(content);
    let mut indicators = segments
        .next()
        .map(|first| String::from_utf8_lossy(first).into_owned())
        .unwrap_or_default();
    indicators.push_str("  ");
    let mut chars = indicators.chars();
    let indicator1 = chars.next().unwrap_or(' ');
    let indicator2 = chars.next().unwrap_or(' ');

    let mut subfields = SmallVec::new();
    for segment in segments {
        let Some((&code, value)) = segment.split_first() else {
            continue;
        };
        if !code.is_ascii() {
            tracing::warn!(tag = %tag, code, "skipping subfield with non-ASCII code");
            continue;
        }
        subfields.push(Subfield::new(
            char::from(code),
            String::from_utf8_lossy(value),
        ));
    }

    Field::data_unchecked(tag, indicator1, indicator2, subfields)
}

/// Split field content on the subfield delimiter; the first item is the
/// indicator segment.
fn split_subfields(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(content);
    std::iter::from_fn(move || {
        let current = rest?;
        match memchr::memchr(SUBFIELD_DELIMITER, current) {
            Some(pos) => {
                rest = Some(&current[pos + 1..]);
                Some(&current[..pos])
            },
            None => {
                rest = None;
                Some(current)
            },
        }
    })
}

/// Directory and field data of a record, before the leader is attached.
struct Layout {
    directory: Vec<u8>,
    data: Vec<u8>,
}

impl Layout {
    fn build(record: &Record) -> Result<Self> {
        let mut directory = Vec::with_capacity(record.len() * DIRECTORY_ENTRY_LENGTH + 1);
        let mut data = Vec::new();

        for field in record.fields() {
            if field.tag().len() != 3 {
                return Err(MarcError::RecordWritingError(format!(
                    "Tag '{}' does not fit the 3-byte directory slot",
                    field.tag()
                )));
            }
            let offset = data.len();
            encode_field(field, &mut data);
            let length = data.len() - offset;

            if length > MAX_FIELD_LENGTH {
                return Err(MarcError::RecordWritingError(format!(
                    "Field {} is {length} bytes, more than {MAX_FIELD_LENGTH}",
                    field.tag()
                )));
            }
            if offset > MAX_OFFSET {
                return Err(MarcError::RecordWritingError(format!(
                    "Field {} starts at offset {offset}, beyond {MAX_OFFSET}",
                    field.tag()
                )));
            }

            directory.extend_from_slice(field.tag().as_bytes());
            directory.extend_from_slice(format!("{length:04}").as_bytes());
            directory.extend_from_slice(format!("{offset:05}").as_bytes());
        }
        directory.push(FIELD_TERMINATOR);
        data.push(RECORD_TERMINATOR);

        Ok(Layout { directory, data })
    }

    fn leader(&self, leader: Leader) -> Result<Leader> {
        let base_address = LEADER_LENGTH + self.directory.len();
        leader.with_lengths(base_address + self.data.len(), base_address)
    }
}

fn encode_field(field: &Field, out: &mut Vec<u8>) {
    let mut buf = [0u8; 4];
    match field.control_value() {
        Some(value) => out.extend_from_slice(value.as_bytes()),
        None => {
            let (indicator1, indicator2) = field.indicators().unwrap_or((' ', ' '));
            out.extend_from_slice(indicator1.encode_utf8(&mut buf).as_bytes());
            out.extend_from_slice(indicator2.encode_utf8(&mut buf).as_bytes());
            for subfield in field.subfields() {
                out.push(SUBFIELD_DELIMITER);
                out.extend_from_slice(subfield.code.encode_utf8(&mut buf).as_bytes());
                out.extend_from_slice(subfield.value.as_bytes());
            }
        },
    }
    out.push(FIELD_TERMINATOR);
}

/// Encode a record to its binary form.
///
/// Fields are written in stored order. Leader positions 0-4 and 12-16 are
/// recomputed; every other leader byte is written as stored.
///
/// # Errors
///
/// Returns [`MarcError::RecordWritingError`] if a tag is not three bytes, a
/// field is longer than 9999 bytes, or an offset or the record length does
/// not fit in five digits.
pub fn encode(record: &Record) -> Result<Vec<u8>> {
    let layout = Layout::build(record)?;
    let leader = layout.leader(record.leader)?;

    let mut out =
        Vec::with_capacity(LEADER_LENGTH + layout.directory.len() + layout.data.len());
    out.extend_from_slice(leader.as_bytes());
    out.extend_from_slice(&layout.directory);
    out.extend_from_slice(&layout.data);
    Ok(out)
}

/// The leader [`encode`] would write for this record.
///
/// # Errors
///
/// Fails in the same cases as [`encode`].
pub fn encoded_leader(record: &Record) -> Result<Leader> {
    Layout::build(record)?.leader(record.leader)
}
