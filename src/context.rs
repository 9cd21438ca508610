//! Dinucleotide editing contexts and the scanner that locates them
//!
//! A context is a two-base motif plus the index of the base inside it that
//! the editor converts. Positions reported by the scanner are 1-based
//! relative to the scanned slice and always point at the edited base.

use std::collections::BTreeSet;
use std::fmt;

/// Strand carrying the edited base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    /// Edited base read on the forward strand (C or T targets)
    Top,
    /// Edited base read on the complementary strand (G or A targets)
    Bottom,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Top => write!(f, "top"),
            Strand::Bottom => write!(f, "bottom"),
        }
    }
}

/// A two-base motif and the base inside it that gets edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditContext {
    pub pattern: [u8; 2],
    /// 0 when the 5' base is edited, 1 when the 3' base is
    pub edited_index: usize,
    /// Base the edited base becomes
    pub mutant: u8,
}

impl EditContext {
    pub const fn new(pattern: [u8; 2], edited_index: usize, mutant: u8) -> Self {
        EditContext {
            pattern,
            edited_index,
            mutant,
        }
    }

    pub fn edited_base(&self) -> u8 {
        self.pattern[self.edited_index]
    }

    /// Distance from the motif start to the edited base, 1-based
    pub fn offset(&self) -> usize {
        self.edited_index + 1
    }

    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.pattern).into_owned()
    }
}

impl fmt::Display for EditContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "5'-{}-3'", self.name())
    }
}

// DddA-derived cytosine deaminase contexts (C->T on top, G->A on bottom)
pub const TC_C: EditContext = EditContext::new(*b"TC", 1, b'T');
pub const AC_C: EditContext = EditContext::new(*b"AC", 1, b'T');
pub const CC_C: EditContext = EditContext::new(*b"CC", 1, b'T');
pub const GA_G: EditContext = EditContext::new(*b"GA", 0, b'A');
pub const GT_G: EditContext = EditContext::new(*b"GT", 0, b'A');
pub const GG_G: EditContext = EditContext::new(*b"GG", 0, b'A');

// sTALED adenine deaminase contexts (T->C on top, A->G on bottom)
pub const CT_T: EditContext = EditContext::new(*b"CT", 1, b'C');
pub const GT_T: EditContext = EditContext::new(*b"GT", 1, b'C');
pub const TG_T: EditContext = EditContext::new(*b"TG", 0, b'C');
pub const TC_T: EditContext = EditContext::new(*b"TC", 0, b'C');
pub const AC_A: EditContext = EditContext::new(*b"AC", 0, b'G');
pub const AG_A: EditContext = EditContext::new(*b"AG", 0, b'G');
pub const CA_A: EditContext = EditContext::new(*b"CA", 1, b'G');
pub const GA_A: EditContext = EditContext::new(*b"GA", 1, b'G');

/// Contexts sharing one edited base, e.g. every C-in-context for DddA11
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextFamily {
    pub reference: u8,
    pub mutant: u8,
    pub strand: Strand,
    pub contexts: &'static [EditContext],
}

pub const MOK_C: ContextFamily = ContextFamily {
    reference: b'C',
    mutant: b'T',
    strand: Strand::Top,
    contexts: &[TC_C],
};
pub const MOK_G: ContextFamily = ContextFamily {
    reference: b'G',
    mutant: b'A',
    strand: Strand::Bottom,
    contexts: &[GA_G],
};
pub const DDDA11_C: ContextFamily = ContextFamily {
    reference: b'C',
    mutant: b'T',
    strand: Strand::Top,
    contexts: &[TC_C, AC_C, CC_C],
};
pub const DDDA11_G: ContextFamily = ContextFamily {
    reference: b'G',
    mutant: b'A',
    strand: Strand::Bottom,
    contexts: &[GA_G, GT_G, GG_G],
};
pub const STALED_T: ContextFamily = ContextFamily {
    reference: b'T',
    mutant: b'C',
    strand: Strand::Top,
    contexts: &[CT_T, GT_T, TG_T, TC_T],
};
pub const STALED_A: ContextFamily = ContextFamily {
    reference: b'A',
    mutant: b'G',
    strand: Strand::Bottom,
    contexts: &[AC_A, AG_A, CA_A, GA_A],
};

/// 1-based positions of the edited base of every occurrence of `context`.
/// Occurrences may overlap: scanning resumes one base after each match start.
pub fn find_contexts(seq: &[u8], context: &EditContext) -> Vec<usize> {
    seq.windows(2)
        .enumerate()
        .filter(|(_, pair)| *pair == context.pattern.as_slice())
        .map(|(i, _)| i + context.offset())
        .collect()
}

/// Union of edited-base positions over every context of a family
pub fn family_positions(seq: &[u8], family: &ContextFamily) -> BTreeSet<usize> {
    family
        .contexts
        .iter()
        .flat_map(|ctx| find_contexts(seq, ctx))
        .collect()
}
