//! SAMI export ingest.
//!
//! SAMI exports come in four dialects (see [`Dialect`]). Reading one is a
//! two-step pipeline:
//!
//! 1. [`ChunkReader`] splits the line stream into one raw chunk per record.
//! 2. The dialect's extractor (see [`extract`]) turns each chunk into a
//!    [`SamiRecord`]: a MARC [`Record`](crate::Record) plus the chunk it came
//!    from and any extraction issues.
//!
//! [`SamiReader`] combines both steps.
//!
//! # Examples
//!
//! ```
//! use sami2marc::{Dialect, ReaderConfig, SamiReader};
//!
//! let export = "*** DOCUMENT BOUNDARY ***\n\
//!               .001. |aCKEY1001\n\
//!               .245. 10|aA title|cAn author\n";
//! let config = ReaderConfig::default().with_dialect(Dialect::Text);
//!
//! for result in SamiReader::new(export.as_bytes(), config) {
//!     let sami = result?;
//!     assert_eq!(sami.identifier().as_deref(), Some("1001"));
//!     assert!(sami.record().contains_tag("245"));
//! }
//! # Ok::<(), sami2marc::MarcError>(())
//! ```

mod dialect;
pub mod extract;
mod reader;
mod record;

pub use dialect::{is_deletion_export, is_sami_export, Dialect, DOCUMENT_BOUNDARY};
pub use reader::{ChunkReader, SamiReader};
pub use record::{AuthorityHeader, ExtractionIssue, SamiRecord};
