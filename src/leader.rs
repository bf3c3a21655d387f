//! MARC record leader handling.
//!
//! The MARC leader is a 24-byte fixed-length field at the start of every MARC record.
//! It contains metadata describing the record's structure, content type, and encoding.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type (a = language material, z = authority, etc.)
//! - Position 7: Bibliographic level (m = monograph, s = serial, etc.)
//! - Position 8: Control record type
//! - Position 9: Character coding (space = MARC-8, a = UTF-8)
//! - Position 10: Indicator count (usually 2)
//! - Position 11: Subfield code count (usually 2)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Positions 20-23: Entry map (usually "4500")
//!
//! Only the two numeric positions are ever rewritten by this crate; every other
//! byte is carried through untouched, so the leader is kept as raw bytes rather
//! than decomposed into typed fields.

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the leader in bytes.
pub const LEADER_LENGTH: usize = 24;

/// Position of the character coding scheme byte.
pub const CHARACTER_CODING_POSITION: usize = 9;

/// MARC Leader - 24 bytes at the start of every MARC record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leader([u8; LEADER_LENGTH]);

impl Default for Leader {
    /// Leader of a freshly created record: blank apart from the indicator and
    /// subfield code counts and the entry map.
    fn default() -> Self {
        Leader(*b"          22        4500")
    }
}

impl Leader {
    /// Parse a leader from the first 24 bytes of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::LeaderError`] if fewer than 24 bytes are available
    /// or the leader contains non-ASCII bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LENGTH {
            return Err(MarcError::LeaderError(format!(
                "Leader must be at least {LEADER_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }

        let mut raw = [0u8; LEADER_LENGTH];
        raw.copy_from_slice(&bytes[..LEADER_LENGTH]);
        if !raw.is_ascii() {
            return Err(MarcError::LeaderError(
                "Leader contains non-ASCII bytes".to_string(),
            ));
        }
        Ok(Leader(raw))
    }

    /// Parse a leader from a 24-character string.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::LeaderError`] if the string is not exactly 24 ASCII characters.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != LEADER_LENGTH {
            return Err(MarcError::LeaderError(format!(
                "Leader must be exactly {LEADER_LENGTH} characters, got {}",
                s.len()
            )));
        }
        Self::from_bytes(s.as_bytes())
    }

    /// The raw leader bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; LEADER_LENGTH] {
        &self.0
    }

    /// The leader as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Every constructor guarantees ASCII content.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Record status (position 5)
    #[must_use]
    pub fn record_status(&self) -> char {
        char::from(self.0[5])
    }

    /// Type of record (position 6)
    #[must_use]
    pub fn record_type(&self) -> char {
        char::from(self.0[6])
    }

    /// Bibliographic level (position 7)
    #[must_use]
    pub fn bibliographic_level(&self) -> char {
        char::from(self.0[7])
    }

    /// Character coding scheme (position 9)
    #[must_use]
    pub fn character_coding(&self) -> char {
        char::from(self.0[CHARACTER_CODING_POSITION])
    }

    /// Set a single leader position to an ASCII value.
    ///
    /// Positions 0-4 and 12-16 may be set, but are always recomputed on encode.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::LeaderError`] if the position is out of range or
    /// the value is not ASCII.
    pub fn set(&mut self, position: usize, value: char) -> Result<()> {
        if position >= LEADER_LENGTH {
            return Err(MarcError::LeaderError(format!(
                "Leader position {position} out of range"
            )));
        }
        let byte = u8::try_from(value)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                MarcError::LeaderError(format!("Leader value must be ASCII, got '{value}'"))
            })?;
        self.0[position] = byte;
        Ok(())
    }

    /// Return a copy with the character coding position set to `'a'` (UTF-8).
    #[must_use]
    pub fn with_unicode_coding(mut self) -> Self {
        self.0[CHARACTER_CODING_POSITION] = b'a';
        self
    }

    /// Record length (positions 0-4), if numeric.
    #[must_use]
    pub fn record_length(&self) -> Option<usize> {
        parse_digits(&self.0[0..5])
    }

    /// Base address of data (positions 12-16), if numeric.
    #[must_use]
    pub fn base_address(&self) -> Option<usize> {
        parse_digits(&self.0[12..17])
    }

    /// Return a copy with the record length and base address rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::RecordWritingError`] if either value needs more than 5 digits.
    pub fn with_lengths(mut self, record_length: usize, base_address: usize) -> Result<Self> {
        if record_length > 99_999 {
            return Err(MarcError::RecordWritingError(format!(
                "Record length {record_length} exceeds 99999 bytes"
            )));
        }
        if base_address > 99_999 {
            return Err(MarcError::RecordWritingError(format!(
                "Base address {base_address} exceeds 99999 bytes"
            )));
        }
        self.0[0..5].copy_from_slice(format!("{record_length:05}").as_bytes());
        self.0[12..17].copy_from_slice(format!("{base_address:05}").as_bytes());
        Ok(self)
    }
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an ASCII number, tolerating surrounding spaces.
fn parse_digits(bytes: &[u8]) -> Option<usize> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_leader() {
        let leader = Leader::default();
        assert_eq!(leader.as_str(), "          22        4500");
        assert_eq!(leader.as_str().len(), LEADER_LENGTH);
    }

    #[test]
    fn test_leader_from_bytes() {
        let leader = Leader::from_bytes(b"01234nam a2200289 a 4500extra").unwrap();
        assert_eq!(leader.as_str(), "01234nam a2200289 a 4500");
        assert_eq!(leader.record_length(), Some(1234));
        assert_eq!(leader.base_address(), Some(289));
        assert_eq!(leader.record_status(), 'n');
        assert_eq!(leader.record_type(), 'a');
        assert_eq!(leader.bibliographic_level(), 'm');
        assert_eq!(leader.character_coding(), ' ');
    }

    #[test]
    fn test_leader_too_short() {
        let result = Leader::from_bytes(b"0123456789");
        assert!(matches!(result, Err(MarcError::LeaderError(_))));
    }

    #[test]
    fn test_leader_non_ascii() {
        let mut bytes = b"01234nam a2200289 a 4500".to_vec();
        bytes[5] = 0xC3;
        assert!(matches!(
            Leader::from_bytes(&bytes),
            Err(MarcError::LeaderError(_))
        ));
    }

    #[test]
    fn test_with_lengths_preserves_other_bytes() {
        let leader = Leader::parse("99999cz  a2299999n  4500").unwrap();
        let rewritten = leader.with_lengths(312, 61).unwrap();
        assert_eq!(rewritten.as_str(), "00312cz  a2200061n  4500");
    }

    #[test]
    fn test_with_lengths_overflow() {
        let result = Leader::default().with_lengths(100_000, 24);
        assert!(matches!(result, Err(MarcError::RecordWritingError(_))));
    }

    #[test]
    fn test_unicode_coding() {
        let leader = Leader::parse("00000nam  2200000 i 4500").unwrap();
        assert_eq!(leader.with_unicode_coding().character_coding(), 'a');
    }

    #[test]
    fn test_set_position() {
        let mut leader = Leader::default();
        leader.set(6, 'z').unwrap();
        assert_eq!(leader.record_type(), 'z');
        assert!(leader.set(24, 'x').is_err());
        assert!(leader.set(5, 'é').is_err());
    }
}
