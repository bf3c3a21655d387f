//! Writing MARC records to binary format.
//!
//! [`MarcWriter`] serializes [`Record`] instances with
//! [`iso2709::encode`](crate::iso2709::encode) to any destination implementing
//! [`std::io::Write`]. The concatenated output is itself a valid record stream.
//!
//! # Examples
//!
//! ```
//! use sami2marc::{Field, MarcWriter, Record};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = MarcWriter::new(&mut buffer);
//!     let mut record = Record::default();
//!     record.add_ordered_field(Field::builder("245", '1', '0')?.subfield('a', "Title").build());
//!     writer.write_record(&record)?;
//!     writer.finish()?;
//! }
//! assert_eq!(buffer.last(), Some(&0x1D));
//! # Ok(())
//! # }
//! ```

use crate::error::{MarcError, Result};
use crate::formats::FormatWriter;
use crate::iso2709;
use crate::record::Record;
use std::io::Write;

/// Writer for ISO 2709 binary MARC format.
#[derive(Debug)]
pub struct MarcWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> MarcWriter<W> {
    /// Create a new MARC writer.
    pub fn new(writer: W) -> Self {
        MarcWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }

    /// Encode and write a single record.
    ///
    /// Nothing is written when encoding fails, so the output stays a valid
    /// stream.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record does not fit the binary layout
    /// - The writer was already finished
    /// - An I/O error occurs during writing
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarcError::RecordWritingError(
                "Cannot write to a finished writer".to_string(),
            ));
        }

        let bytes = iso2709::encode(record)?;
        self.writer.write_all(&bytes)?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

impl<W: Write + std::fmt::Debug> FormatWriter for MarcWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        MarcWriter::write_record(self, record)
    }

    fn finish(&mut self) -> Result<()> {
        MarcWriter::finish(self)
    }

    fn records_written(&self) -> Option<usize> {
        Some(self.records_written)
    }
}
