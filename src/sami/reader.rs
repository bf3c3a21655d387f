//! Streaming chunk reader for SAMI exports.
//!
//! [`ChunkReader`] splits a line stream into one raw text chunk per record
//! using the boundary rules of a [`Dialect`]. It holds at most one line of
//! look-ahead: the line that ends a chunk is kept and examined again as the
//! possible start of the next one.
//!
//! [`SamiReader`] runs the dialect's extractor over every chunk.

use crate::config::ReaderConfig;
use crate::error::{MarcError, Result};
use crate::formats::FormatReader;
use crate::record::Record;
use crate::sami::{Dialect, SamiRecord};
use encoding_rs::UTF_8;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Splits a line stream into raw record chunks.
#[derive(Debug)]
pub struct ChunkReader<R: BufRead> {
    reader: R,
    dialect: Dialect,
    deleted: bool,
    pending: Option<String>,
    at_start: bool,
    buf: Vec<u8>,
    chunks_read: usize,
}

impl<R: BufRead> ChunkReader<R> {
    /// Create a reader for `dialect`; `deleted` marks a deletion export.
    pub fn new(reader: R, dialect: Dialect, deleted: bool) -> Self {
        ChunkReader {
            reader,
            dialect,
            deleted,
            pending: None,
            at_start: true,
            buf: Vec::new(),
            chunks_read: 0,
        }
    }

    /// Next line with its `\n` (if any), decoded as UTF-8 with replacement.
    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }

        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let (decoded, _) = if self.at_start {
            self.at_start = false;
            UTF_8.decode_with_bom_removal(&self.buf)
        } else {
            UTF_8.decode_without_bom_handling(&self.buf)
        };

        let mut line = decoded.into_owned();
        if line.ends_with("\r\n") {
            line.truncate(line.len() - 2);
            line.push('\n');
        }
        Ok(Some(line))
    }

    /// Read the raw text of the next record.
    ///
    /// Boundary and preamble lines before a record are skipped. Returns
    /// `Ok(None)` at the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::IoError`] if reading fails.
    pub fn read_chunk(&mut self) -> Result<Option<String>> {
        let mut chunk = String::new();

        while let Some(line) = self.next_line()? {
            let boundary = self.dialect.is_boundary(&line, self.deleted);
            if chunk.is_empty() {
                if boundary || self.dialect.is_preamble(&line) {
                    continue;
                }
            } else if boundary {
                self.pending = Some(line);
                break;
            }
            chunk.push_str(&line);
        }

        if chunk.is_empty() {
            return Ok(None);
        }
        self.chunks_read += 1;
        tracing::debug!(
            dialect = %self.dialect,
            chunk = self.chunks_read,
            bytes = chunk.len(),
            "read record chunk"
        );
        Ok(Some(chunk))
    }

    /// Number of chunks returned so far
    #[must_use]
    pub fn chunks_read(&self) -> usize {
        self.chunks_read
    }
}

impl<R: BufRead> Iterator for ChunkReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_chunk().transpose()
    }
}

/// Reads [`SamiRecord`]s from a SAMI export.
///
/// # Examples
///
/// ```
/// use sami2marc::{Dialect, ReaderConfig, SamiReader};
///
/// let data = "*** DOCUMENT BOUNDARY ***\n.245. 10|aFirst\n\
///             *** DOCUMENT BOUNDARY ***\n.245. 10|aSecond\n";
/// let config = ReaderConfig::default().with_dialect(Dialect::Text);
/// let records: Vec<_> = SamiReader::new(data.as_bytes(), config)
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(records.len(), 2);
/// ```
#[derive(Debug)]
pub struct SamiReader<R: BufRead> {
    chunks: ChunkReader<R>,
    config: ReaderConfig,
    records_read: usize,
}

impl<R: BufRead> SamiReader<R> {
    /// Create a reader over any buffered source.
    pub fn new(reader: R, config: ReaderConfig) -> Self {
        SamiReader {
            chunks: ChunkReader::new(reader, config.dialect, config.deleted),
            config,
            records_read: 0,
        }
    }

    /// Read the next record.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::IoError`] if reading fails. Problems inside a
    /// record are reported on the record, not as errors.
    pub fn read_sami_record(&mut self) -> Result<Option<SamiRecord>> {
        let Some(chunk) = self.chunks.read_chunk()? else {
            tracing::debug!(records = self.records_read, "end of SAMI input");
            return Ok(None);
        };
        self.records_read += 1;
        Ok(Some(self.config.dialect.extract(chunk, self.config.tidy)))
    }

    /// The configuration this reader was built with
    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Number of records read so far
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }
}

impl SamiReader<BufReader<File>> {
    /// Open a file, deriving the dialect and deletion flag from its path.
    ///
    /// `dialect` overrides the dialect implied by the extension; the
    /// authority dialect can only be chosen this way.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::IoError`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, dialect: Option<Dialect>, tidy: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut config = ReaderConfig::for_path(path).with_tidy(tidy);
        if let Some(dialect) = dialect {
            config = config.with_dialect(dialect);
        }
        let file = File::open(path).map_err(MarcError::IoError)?;
        Ok(Self::new(BufReader::new(file), config))
    }
}

impl<R: BufRead> Iterator for SamiReader<R> {
    type Item = Result<SamiRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_sami_record().transpose()
    }
}

impl<R: BufRead + std::fmt::Debug> FormatReader for SamiReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        Ok(self.read_sami_record()?.map(SamiRecord::into_record))
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}
