//! Reading binary MARC records from byte streams.
//!
//! [`MarcReader`] frames consecutive ISO 2709 records using the 5-digit
//! record length at the start of each one and hands every frame to
//! [`iso2709::decode`](crate::iso2709::decode).
//!
//! # Examples
//!
//! ```no_run
//! use sami2marc::MarcReader;
//! use std::fs::File;
//!
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{}", record.control_value("001").unwrap_or("[no 001]"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{MarcError, Result};
use crate::formats::FormatReader;
use crate::iso2709;
use crate::leader::LEADER_LENGTH;
use crate::record::Record;
use std::io::Read;

const LENGTH_PREFIX: usize = 5;

/// Reader for a stream of concatenated binary records.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    reader: R,
    records_read: usize,
}

impl<R: Read> MarcReader<R> {
    /// Create a new reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use sami2marc::MarcReader;
    /// use std::io::Cursor;
    ///
    /// let reader = MarcReader::new(Cursor::new(Vec::new()));
    /// ```
    pub fn new(reader: R) -> Self {
        MarcReader {
            reader,
            records_read: 0,
        }
    }

    /// Read a single record.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between records.
    ///
    /// # Errors
    ///
    /// - [`MarcError::RecordLengthError`] if the length prefix is short, not
    ///   numeric, or promises more bytes than the stream holds
    /// - any error from [`iso2709::decode`]
    /// - [`MarcError::IoError`] if reading fails
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let mut prefix = [0u8; LENGTH_PREFIX];
        let got = read_up_to(&mut self.reader, &mut prefix)?;
        if got == 0 {
            return Ok(None);
        }
        if got < LENGTH_PREFIX {
            return Err(MarcError::RecordLengthError(format!(
                "stream ended after {got} bytes of the length prefix"
            )));
        }

        let length = std::str::from_utf8(&prefix)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| {
                MarcError::RecordLengthError(format!(
                    "'{}' is not a record length",
                    String::from_utf8_lossy(&prefix)
                ))
            })?;
        if length < LEADER_LENGTH {
            return Err(MarcError::RecordLengthError(format!(
                "record length {length} is shorter than the leader"
            )));
        }

        let mut bytes = vec![0u8; length];
        bytes[..LENGTH_PREFIX].copy_from_slice(&prefix);
        let got = read_up_to(&mut self.reader, &mut bytes[LENGTH_PREFIX..])?;
        if got < length - LENGTH_PREFIX {
            return Err(MarcError::RecordLengthError(format!(
                "record promises {length} bytes but the stream ended after {}",
                got + LENGTH_PREFIX
            )));
        }

        let record = iso2709::decode(&bytes)?;
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Number of records read so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }
}

/// Fill `buf` as far as the stream allows, returning the byte count.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {},
            Err(e) => return Err(MarcError::IoError(e)),
        }
    }
    Ok(filled)
}

impl<R: Read> Iterator for MarcReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

impl<R: Read + std::fmt::Debug> FormatReader for MarcReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        MarcReader::read_record(self)
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatReaderExt;
    use crate::record::Field;
    use std::io::Cursor;

    fn make_test_bytes(titles: &[&str]) -> Vec<u8> {
        let mut all_bytes = Vec::new();
        for title in titles {
            let mut record = Record::default();
            record.add_ordered_field(
                Field::builder("245", '1', '0')
                    .unwrap()
                    .subfield('a', *title)
                    .build(),
            );
            all_bytes.extend(iso2709::encode(&record).unwrap());
        }
        all_bytes
    }

    #[test]
    fn test_eof_returns_none() {
        let mut reader = MarcReader::new(Cursor::new(Vec::new()));
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_read_multiple_records() {
        let bytes = make_test_bytes(&["First", "Second"]);
        let mut reader = MarcReader::new(Cursor::new(bytes));

        let first = reader.read_record().unwrap().unwrap();
        assert_eq!(first.get_field("245").unwrap().get_subfield('a'), Some("First"));
        let second = reader.read_record().unwrap().unwrap();
        assert_eq!(second.get_field("245").unwrap().get_subfield('a'), Some("Second"));
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 2);
    }

    #[test]
    fn test_format_reader_iterator() {
        let bytes = make_test_bytes(&["a", "b", "c"]);
        let mut reader = MarcReader::new(Cursor::new(bytes));
        let count = reader.records().filter(Result::is_ok).count();
        assert_eq!(count, 3);
        assert_eq!(FormatReader::records_read(&reader), Some(3));
    }

    #[test]
    fn test_short_prefix() {
        let mut reader = MarcReader::new(Cursor::new(b"001".to_vec()));
        assert!(matches!(
            reader.read_record(),
            Err(MarcError::RecordLengthError(_))
        ));
    }

    #[test]
    fn test_non_numeric_prefix() {
        let mut reader = MarcReader::new(Cursor::new(b"0x123nam a2200025 i 4500".to_vec()));
        assert!(matches!(
            reader.read_record(),
            Err(MarcError::RecordLengthError(_))
        ));
    }

    #[test]
    fn test_truncated_record() {
        let mut bytes = make_test_bytes(&["Truncated"]);
        bytes.truncate(bytes.len() - 4);
        let mut reader = MarcReader::new(Cursor::new(bytes));
        assert!(matches!(
            reader.read_record(),
            Err(MarcError::RecordLengthError(_))
        ));
    }

    #[test]
    fn test_decode_error_surfaces() {
        // Valid framing, but the base address is zero
        let mut bytes = make_test_bytes(&["x"]);
        bytes[12..17].copy_from_slice(b"00000");
        let mut reader = MarcReader::new(Cursor::new(bytes));
        assert!(matches!(
            reader.read_record(),
            Err(MarcError::BaseAddressError(_))
        ));
    }
}
