//! Normalised circular sequences with 1-based genomic coordinates
//!
//! The sequence is stored twice end-to-end so any window that crosses the
//! 3' end can be borrowed as one contiguous slice. A window never wraps more
//! than once, so windows longer than the sequence itself are refused.

use crate::error::{MitoEditError, Result};

/// Nucleotides accepted in a normalised sequence
const ALPHABET: &[u8] = b"ACGTN";

/// A whitespace-free, upper-case, logically circular DNA sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// `seq + seq`; the first half is the sequence proper
    circular: Vec<u8>,
    length: usize,
}

impl Sequence {
    /// Strip whitespace and upper-case `raw`
    pub fn normalize(raw: &str) -> Result<Self> {
        let bases: Vec<u8> = raw
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| b.to_ascii_uppercase())
            .collect();

        if bases.is_empty() {
            return Err(MitoEditError::MalformedSequence(
                "sequence is empty after removing whitespace".to_string(),
            ));
        }
        if let Some(idx) = bases.iter().position(|b| !ALPHABET.contains(b)) {
            return Err(MitoEditError::MalformedSequence(format!(
                "unexpected character '{}' at position {}",
                bases[idx] as char,
                idx + 1
            )));
        }

        let length = bases.len();
        let mut circular = Vec::with_capacity(length * 2);
        circular.extend_from_slice(&bases);
        circular.extend_from_slice(&bases);

        Ok(Sequence { circular, length })
    }

    pub fn len(&self) -> usize {
        self.length
    }

    /// Always false: normalisation rejects empty input
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The sequence proper, without the circular copy
    pub fn as_bytes(&self) -> &[u8] {
        &self.circular[..self.length]
    }

    /// The sequence followed by its first base again, so that scanning it
    /// also finds a context spanning the origin. Positions reported against
    /// this span must be passed through `wrap`.
    pub fn scan_span(&self) -> &[u8] {
        &self.circular[..self.length + 1]
    }

    /// Map any coordinate onto `[1, len]`
    pub fn wrap(&self, coord: i64) -> usize {
        let len = self.length as i64;
        ((coord - 1).rem_euclid(len) + 1) as usize
    }

    /// Base at a 1-based coordinate, resolved circularly
    pub fn base(&self, coord: i64) -> u8 {
        self.circular[self.wrap(coord) - 1]
    }

    /// `len` bases starting at 1-based coordinate `start`, wrapping past the
    /// 3' end at most once. `None` when `len` exceeds the sequence length.
    pub fn circular_slice(&self, start: i64, len: usize) -> Option<&[u8]> {
        if len > self.length {
            return None;
        }
        let offset = self.wrap(start) - 1;
        Some(&self.circular[offset..offset + len])
    }

    /// Reject a target position outside `[1, len]`
    pub fn check_position(&self, position: usize) -> Result<()> {
        if position == 0 || position > self.length {
            return Err(MitoEditError::PositionOutOfRange {
                position,
                length: self.length,
            });
        }
        Ok(())
    }
}

/// Watson-Crick complement; `N` and anything unexpected map to `N`
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        _ => b'N',
    }
}

/// Parse a single nucleotide letter given on the command line or in a request
pub fn parse_base(text: &str) -> Result<u8> {
    let trimmed = text.trim();
    match trimmed.as_bytes() {
        [b] if b"ACGT".contains(&b.to_ascii_uppercase()) => Ok(b.to_ascii_uppercase()),
        _ => Err(MitoEditError::InvalidBase(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_whitespace_and_uppercases() {
        let seq = Sequence::normalize(" acg\tT\nn c\r\n").unwrap();
        assert_eq!(seq.as_bytes(), b"ACGTNC");
        assert_eq!(seq.len(), 6);
    }

    #[test]
    fn test_normalize_rejects_empty_and_foreign_characters() {
        assert!(matches!(
            Sequence::normalize(" \n\t"),
            Err(MitoEditError::MalformedSequence(_))
        ));
        assert!(matches!(
            Sequence::normalize("ACGU"),
            Err(MitoEditError::MalformedSequence(_))
        ));
    }

    #[test]
    fn test_wrap_resolves_into_one_based_range() {
        let seq = Sequence::normalize("ACGTACGTAC").unwrap();
        assert_eq!(seq.wrap(1), 1);
        assert_eq!(seq.wrap(10), 10);
        assert_eq!(seq.wrap(11), 1);
        assert_eq!(seq.wrap(0), 10);
        assert_eq!(seq.wrap(-1), 9);
        assert_eq!(seq.wrap(-10), 10);
    }

    #[test]
    fn test_circular_slice_wraps_once() {
        let seq = Sequence::normalize("AACCGGTT").unwrap();
        assert_eq!(seq.circular_slice(7, 4).unwrap(), b"TTAA");
        assert_eq!(seq.circular_slice(-1, 4).unwrap(), b"TTAA");
        assert_eq!(seq.circular_slice(1, 8).unwrap(), b"AACCGGTT");
        assert!(seq.circular_slice(1, 9).is_none());
    }

    #[test]
    fn test_scan_span_closes_the_circle() {
        let seq = Sequence::normalize("CAAT").unwrap();
        assert_eq!(seq.scan_span(), b"CAATC");
    }

    #[test]
    fn test_check_position_bounds() {
        let seq = Sequence::normalize("ACGT").unwrap();
        assert!(seq.check_position(1).is_ok());
        assert!(seq.check_position(4).is_ok());
        assert!(matches!(
            seq.check_position(0),
            Err(MitoEditError::PositionOutOfRange { .. })
        ));
        assert!(seq.check_position(5).is_err());
    }

    #[test]
    fn test_parse_base() {
        assert_eq!(parse_base("t").unwrap(), b'T');
        assert_eq!(parse_base(" G ").unwrap(), b'G');
        assert!(parse_base("N").is_err());
        assert!(parse_base("AC").is_err());
        assert!(parse_base("").is_err());
    }
}
