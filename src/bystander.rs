//! Bystander detection and window markup
//!
//! A bystander is any base other than the target that sits in an editable
//! context inside the editor's activity span. Positions are tracked as
//! window-local indices in a `MarkedWindow` and only rendered to the
//! `[target]`/`{bystander}` text form at the output boundary.

use std::collections::BTreeSet;
use std::fmt;

use crate::context::{find_contexts, EditContext, Strand};
use crate::sequence::Sequence;
use crate::window::{anchored_left, Anchor, GeneratedWindow};

/// Part of a window scanned for bystander contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRegion {
    /// Contexts lying wholly inside `[margin, size - margin)`
    Interior { margin: usize },
    /// Edited base within `[start, end)` measured from the anchor end of the
    /// edited strand; the partner base may fall outside
    FromAnchor { start: usize, end: usize },
}

impl ScanRegion {
    /// Forward-strand half-open bounds for a window of `size` bases
    pub fn bounds(&self, size: usize, anchor: Anchor, strand: Strand) -> (usize, usize) {
        let (lo, hi) = match *self {
            ScanRegion::Interior { margin } => (margin, size.saturating_sub(margin)),
            ScanRegion::FromAnchor { start, end } => {
                if anchored_left(anchor, strand) {
                    (start, end)
                } else {
                    (size.saturating_sub(end), size.saturating_sub(start))
                }
            }
        };
        let hi = hi.min(size);
        (lo.min(hi), hi)
    }
}

/// A window with its target and bystanders identified by index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedWindow {
    pub bases: Vec<u8>,
    pub target_index: usize,
    pub bystander_indices: BTreeSet<usize>,
}

impl MarkedWindow {
    /// Target in brackets, each bystander in braces
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.bases.len() + 2 * (1 + self.bystander_indices.len()));
        for (i, &b) in self.bases.iter().enumerate() {
            let base = b as char;
            if i == self.target_index {
                out.push('[');
                out.push(base);
                out.push(']');
            } else if self.bystander_indices.contains(&i) {
                out.push('{');
                out.push(base);
                out.push('}');
            } else {
                out.push(base);
            }
        }
        out
    }

    pub fn unmarked(&self) -> String {
        String::from_utf8_lossy(&self.bases).into_owned()
    }

    pub fn bystander_count(&self) -> usize {
        self.bystander_indices.len()
    }
}

impl fmt::Display for MarkedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Result of annotating one window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub marked: MarkedWindow,
    /// Genomic positions, ascending, never containing the target
    pub bystander_positions: Vec<usize>,
    /// A base flanking the target is itself the editable base
    pub adjacent_bystander: bool,
}

/// Find and mark every bystander in `window`.
///
/// `contexts` is the full context set of the technology (both strands);
/// `edited_base` is the reference base at the target, used for the
/// flanking-base check.
pub fn annotate(
    seq: &Sequence,
    window: &GeneratedWindow,
    strand: Strand,
    contexts: &[EditContext],
    region: ScanRegion,
    edited_base: u8,
) -> Annotation {
    let size = window.bases.len();
    let (lo, hi) = region.bounds(size, window.anchor, strand);
    let (scan_lo, scan_hi) = match region {
        ScanRegion::Interior { .. } => (lo, hi),
        ScanRegion::FromAnchor { .. } => (0, size),
    };
    let scanned = &window.bases[scan_lo..scan_hi];

    let mut local: BTreeSet<usize> = contexts
        .iter()
        .flat_map(|ctx| find_contexts(scanned, ctx))
        .map(|p| scan_lo + p - 1)
        .filter(|i| (lo..hi).contains(i))
        .collect();
    local.remove(&window.target_index);

    // Flanking bases can pair with a neighbour outside the scanned span
    let t = window.target_index;
    let mut adjacent_bystander = false;
    let flanks = [t.checked_sub(1), Some(t + 1).filter(|&i| i < size)];
    for idx in flanks.into_iter().flatten() {
        if window.bases[idx] == edited_base {
            local.insert(idx);
            adjacent_bystander = true;
        }
    }

    let mut bystander_positions: Vec<usize> = local
        .iter()
        .map(|&i| seq.wrap(window.start as i64 + i as i64))
        .collect();
    bystander_positions.sort_unstable();
    bystander_positions.dedup();

    Annotation {
        marked: MarkedWindow {
            bases: window.bases.to_vec(),
            target_index: t,
            bystander_indices: local,
        },
        bystander_positions,
        adjacent_bystander,
    }
}
