//! Window generation around a target base
//!
//! A window is a fixed-size slice of the circular sequence that the editor's
//! TALE arms bind around. Each technology admits a set of target offsets,
//! counted from one end of the edited strand. Windows are always returned on
//! the forward strand; for bottom-strand targets the anchor is mirrored onto
//! the forward coordinates instead of reversing the bases.

use log::warn;
use std::fmt;

use crate::context::Strand;
use crate::sequence::Sequence;

/// End of the edited strand the target offset is counted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    FivePrime,
    ThreePrime,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::FivePrime => write!(f, "5' end"),
            Anchor::ThreePrime => write!(f, "3' end"),
        }
    }
}

/// Admissible target offsets, counted from the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetRange {
    /// 0-based `[start, size - trim)`: offset `k` puts the target `k` bases in
    SizeRelative { start: usize, trim: usize },
    /// 1-based `[start, end)` without `skip`: offset `k` is the `k`-th base
    Fixed {
        start: usize,
        end: usize,
        skip: Option<usize>,
    },
}

impl OffsetRange {
    /// Offsets valid for a window of `size` bases, ascending
    pub fn offsets(&self, size: usize) -> Vec<usize> {
        match *self {
            OffsetRange::SizeRelative { start, trim } => (start..size.saturating_sub(trim)).collect(),
            OffsetRange::Fixed { start, end, skip } => (start.max(1)..end.min(size + 1))
                .filter(|k| Some(*k) != skip)
                .collect(),
        }
    }

    /// Number of bases between the anchor end and a target at `offset`
    pub fn distance(&self, offset: usize) -> usize {
        match self {
            OffsetRange::SizeRelative { .. } => offset,
            OffsetRange::Fixed { .. } => offset - 1,
        }
    }
}

/// One candidate window, borrowed from the circular sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedWindow<'a> {
    /// 1-based genomic coordinate of the first (5', forward strand) base
    pub start: usize,
    pub bases: &'a [u8],
    /// 0-based index of the target inside `bases`
    pub target_index: usize,
    /// Target offset counted from `anchor` on the edited strand
    pub offset: usize,
    pub anchor: Anchor,
}

/// Whether `anchor` on the edited strand is the left end of the forward window
pub fn anchored_left(anchor: Anchor, strand: Strand) -> bool {
    matches!(
        (anchor, strand),
        (Anchor::FivePrime, Strand::Top) | (Anchor::ThreePrime, Strand::Bottom)
    )
}

/// Forward-strand index of the base `distance` bases in from `anchor` of the edited strand
pub fn target_index(size: usize, distance: usize, anchor: Anchor, strand: Strand) -> usize {
    if anchored_left(anchor, strand) {
        distance
    } else {
        size - 1 - distance
    }
}

/// Every window of `size` bases placing `target` at each admissible offset
pub fn generate_windows<'a>(
    seq: &'a Sequence,
    target: usize,
    size: usize,
    range: &OffsetRange,
    anchor: Anchor,
    strand: Strand,
) -> Vec<GeneratedWindow<'a>> {
    let mut windows = Vec::new();

    for offset in range.offsets(size) {
        let idx = target_index(size, range.distance(offset), anchor, strand);
        let start = target as i64 - idx as i64;

        match seq.circular_slice(start, size) {
            Some(bases) => windows.push(GeneratedWindow {
                start: seq.wrap(start),
                bases,
                target_index: idx,
                offset,
                anchor,
            }),
            None => {
                warn!(
                    "Skipping {size}bp window: longer than the {}bp sequence",
                    seq.len()
                );
                break;
            }
        }
    }

    windows
}
