//! Merge windows with the TALE array-design report

use indexmap::IndexMap;
use log::info;

use crate::pipeline::Window;
use crate::tale_nt::TaleReport;

/// Left and right TALE recognition arms around a matching spacer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlankingArrays {
    pub left: String,
    pub right: String,
}

/// Lowercase spacer of a plus-strand field, if it has one
fn spacer(plus_strand: &str) -> Option<String> {
    let spacer: String = plus_strand.chars().filter(char::is_ascii_lowercase).collect();
    (!spacer.is_empty()).then_some(spacer)
}

/// Arms on either side of the lowercase run; needs at least two lowercase bases
fn flanking_arrays(plus_strand: &str) -> Option<FlankingArrays> {
    let lower: Vec<usize> = plus_strand
        .char_indices()
        .filter(|(_, c)| c.is_ascii_lowercase())
        .map(|(i, _)| i)
        .collect();
    if lower.len() < 2 {
        return None;
    }
    let (first, last) = (lower[0], lower[lower.len() - 1]);
    Some(FlankingArrays {
        left: plus_strand[..first].to_ascii_uppercase(),
        right: plus_strand[last + 1..].to_ascii_uppercase(),
    })
}

/// Flag every window whose unmarked sequence is a reported spacer and attach
/// the arms of each matching row, in report order
pub fn reconcile(windows: &mut [Window], report: &TaleReport) {
    let mut by_spacer: IndexMap<String, Vec<FlankingArrays>> = IndexMap::new();
    for plus in report.plus_strand_sequences() {
        if let Some(key) = spacer(plus) {
            by_spacer.entry(key).or_default().extend(flanking_arrays(plus));
        }
    }

    let mut matched = 0;
    for window in windows.iter_mut() {
        let key = window.unmarked_sequence().to_ascii_lowercase();
        match by_spacer.get(&key) {
            Some(arrays) => {
                window.matches_external_tool = Some(true);
                window.flanking_arrays = arrays.clone();
                matched += 1;
            }
            None => {
                window.matches_external_tool = Some(false);
                window.flanking_arrays.clear();
            }
        }
    }
    info!("{matched} of {} windows match a TALE-NT spacer", windows.len());
}
