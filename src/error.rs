//! Error types for MARC and SAMI operations.
//!
//! This module provides the [`MarcError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! Structural problems in binary records are always returned as errors.
//! Problems found while extracting fields from SAMI text are not: they are
//! collected on the [`SamiRecord`](crate::sami::SamiRecord) so one bad record
//! never stops a conversion run.

use thiserror::Error;

/// Error type for all library operations.
#[derive(Error, Debug)]
pub enum MarcError {
    /// The 24-byte leader is missing, short, or not ASCII.
    #[error("Error reading record leader: {0}")]
    LeaderError(String),

    /// Bytes 12-16 of the leader do not hold a positive base address.
    #[error("Error locating base address of record: {0}")]
    BaseAddressError(String),

    /// The base address points at or beyond the end of the record.
    #[error("Base address exceeds size of record: base address {base_address}, record length {record_length}")]
    BaseAddressLengthError {
        /// Base address read from the leader
        base_address: usize,
        /// Number of bytes actually available
        record_length: usize,
    },

    /// The directory is not a whole number of 12-byte entries, or an entry is unreadable.
    #[error("Record directory is invalid: {0}")]
    DirectoryError(String),

    /// No usable fields could be located in the record.
    #[error("Error locating fields in record: {0}")]
    FieldsError(String),

    /// The 5-digit length prefix of a record in a binary stream is invalid.
    #[error("Invalid record length in first 5 bytes of record: {0}")]
    RecordLengthError(String),

    /// A record cannot be represented in the binary layout.
    #[error("Error writing record: {0}")]
    RecordWritingError(String),

    /// A field was built with content that its tag does not allow.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// An invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
