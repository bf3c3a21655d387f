#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # sami2marc: SAMI exports to MARC 21
//!
//! Streaming conversion of SAMI library-system exports into MARC 21 records,
//! written out as ISO 2709 binary or MARCXML.
//!
//! ## Quick Start
//!
//! ### Converting a SAMI export
//!
//! ```
//! use sami2marc::{Dialect, MarcWriter, ReaderConfig, SamiReader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let export = "*** DOCUMENT BOUNDARY ***\n\
//!               FORM=MARC\n\
//!               .001. |aCKEY42\n\
//!               .245. 10|aThe title|cThe author\n";
//!
//! let config = ReaderConfig::default().with_dialect(Dialect::Text);
//! let mut output = Vec::new();
//! let mut writer = MarcWriter::new(&mut output);
//!
//! for sami in SamiReader::new(export.as_bytes(), config) {
//!     let sami = sami?;
//!     if sami.is_bad() {
//!         continue;
//!     }
//!     writer.write_record(sami.record())?;
//! }
//! writer.finish()?;
//! assert_eq!(output.last(), Some(&0x1D));
//! # Ok(())
//! # }
//! ```
//!
//! ### Building and reading binary records
//!
//! ```
//! use sami2marc::{iso2709, Field, MarcReader, Record};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut record = Record::default();
//! record.add_ordered_field(Field::control("001", "12345")?);
//! record.add_ordered_field(
//!     Field::builder("245", '1', '0')?
//!         .subfield('a', "Test Title")
//!         .build(),
//! );
//!
//! let bytes = iso2709::encode(&record)?;
//! let mut reader = MarcReader::new(bytes.as_slice());
//! let decoded = reader.read_record()?.expect("one record");
//! assert_eq!(decoded.control_value("001"), Some("12345"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`sami`] — SAMI dialects, chunking and extraction
//! - [`record`] — Core MARC record structures (`Record`, `Field`, `Subfield`)
//! - [`leader`] — MARC record leader (24-byte header)
//! - [`iso2709`] — ISO 2709 encoding and decoding of single records
//! - [`reader`] — Reading binary records from a byte stream
//! - [`writer`] — Writing binary records to a byte stream
//! - [`marcxml`] — MARCXML fragments, collections and record envelopes
//! - [`formats`] — Format traits shared by readers and writers
//! - [`config`] — Reader and XML output options
//! - [`error`] — Error types and result type

pub mod config;
pub mod error;
/// Format-agnostic reader and writer traits.
///
/// See the [`formats`] module documentation for the supported formats.
pub mod formats;
pub mod iso2709;
pub mod leader;
pub mod marcxml;
pub mod reader;
/// Core MARC record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod sami;
pub mod writer;

pub use config::{ReaderConfig, XmlStyle};
pub use error::{MarcError, Result};
pub use leader::Leader;
pub use marcxml::MarcXmlWriter;
pub use reader::MarcReader;
pub use record::{Field, FieldBuilder, FieldData, Record, Subfield};
pub use sami::{Dialect, SamiReader, SamiRecord};
pub use writer::MarcWriter;
