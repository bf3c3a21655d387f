//! Reader and writer traits shared by every record source and sink.
//!
//! SAMI readers, the binary stream reader and both writers implement these,
//! so a conversion loop can be written once:
//!
//! ```ignore
//! use sami2marc::formats::{FormatReader, FormatWriter};
//!
//! fn convert<R: FormatReader, W: FormatWriter>(
//!     reader: &mut R,
//!     writer: &mut W,
//! ) -> sami2marc::Result<usize> {
//!     let mut count = 0;
//!     while let Some(record) = reader.read_record()? {
//!         writer.write_record(&record)?;
//!         count += 1;
//!     }
//!     writer.finish()?;
//!     Ok(count)
//! }
//! ```

use crate::error::Result;
use crate::record::Record;

/// A source of records.
///
/// Implementations return `Ok(None)` once the source is exhausted and keep
/// field and subfield order exactly as found in the source.
pub trait FormatReader: std::fmt::Debug {
    /// Read the next record from the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source contains malformed data or I/O fails.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Read all remaining records into a vector.
    ///
    /// Prefer streaming with [`read_record`](Self::read_record) for large inputs.
    ///
    /// # Errors
    ///
    /// Returns the first error met; records read before it are discarded.
    fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Number of records read so far, if tracked.
    fn records_read(&self) -> Option<usize> {
        None
    }
}

/// A sink for records.
///
/// [`finish`](Self::finish) must be called once all records are written;
/// some writers only emit their closing bytes there.
pub trait FormatWriter: std::fmt::Debug {
    /// Write a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or the output fails.
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Write several records in order.
    ///
    /// # Errors
    ///
    /// Returns the first error met.
    fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Write any trailing bytes and flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written or flushed.
    fn finish(&mut self) -> Result<()>;

    /// Number of records written so far, if tracked.
    fn records_written(&self) -> Option<usize> {
        None
    }
}

/// Iterator access for any [`FormatReader`].
pub trait FormatReaderExt: FormatReader {
    /// Iterate over the remaining records.
    fn records(&mut self) -> RecordIterator<'_, Self>
    where
        Self: Sized,
    {
        RecordIterator { reader: self }
    }
}

impl<T: FormatReader> FormatReaderExt for T {}

/// Iterator adapter created by [`FormatReaderExt::records`].
#[derive(Debug)]
pub struct RecordIterator<'a, R: FormatReader> {
    reader: &'a mut R,
}

impl<R: FormatReader> Iterator for RecordIterator<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}
