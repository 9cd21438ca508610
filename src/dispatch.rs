//! Pipeline selection from the requested substitution

use log::{info, warn};

use crate::config::{DispatchMode, EngineConfig};
use crate::error::{MitoEditError, Result};
use crate::pipeline::{PipelineKind, PipelineResult};
use crate::sequence::Sequence;

/// Pipelines able to perform `reference -> mutant`
pub fn select(reference: u8, mutant: u8, mode: DispatchMode) -> Result<Vec<PipelineKind>> {
    match (reference.to_ascii_uppercase(), mutant.to_ascii_uppercase()) {
        (b'C', b'T') | (b'G', b'A') => Ok(match mode {
            DispatchMode::Legacy => vec![
                PipelineKind::Mok2020G1397,
                PipelineKind::Mok2020G1333,
                PipelineKind::Mok2022DddA11,
            ],
            DispatchMode::Library => vec![PipelineKind::Mok2020Unified],
        }),
        (b'A', b'G') | (b'T', b'C') => Ok(vec![PipelineKind::ChoSTALED]),
        (r, m) => Err(MitoEditError::NoPipeline {
            reference: r as char,
            mutant: m as char,
        }),
    }
}

/// Run `kinds` in order and concatenate their windows.
///
/// A pipeline that cannot edit the target is skipped as long as another
/// one can; the analysis only fails when none of them can.
pub fn run_pipelines(
    kinds: &[PipelineKind],
    seq: &Sequence,
    target: usize,
    config: &EngineConfig,
) -> Result<PipelineResult> {
    let mut combined = PipelineResult::default();
    let mut skipped = Vec::new();

    for kind in kinds {
        match kind.run(seq, target, config) {
            Ok(result) => {
                info!("{kind}: {} windows", result.windows.len());
                combined.merge(result);
            }
            Err(MitoEditError::UnEditableBase { .. }) if kinds.len() > 1 => {
                warn!("{kind}: base at position {target} is not in an editable context, skipping");
                skipped.push(kind.name());
            }
            Err(e) => return Err(e),
        }
    }

    if skipped.len() == kinds.len() && !kinds.is_empty() {
        return Err(MitoEditError::UnEditableBase {
            position: target,
            base: seq.base(target as i64) as char,
            pipeline: skipped.join(", "),
        });
    }
    Ok(combined)
}

/// Select pipelines for the base at `target` becoming `mutant` and run them
pub fn dispatch(seq: &Sequence, target: usize, mutant: u8, config: &EngineConfig) -> Result<PipelineResult> {
    seq.check_position(target)?;
    let reference = seq.base(target as i64);
    let kinds = select(reference, mutant, config.mode)?;
    info!(
        "{}>{} at position {target}: running {}",
        reference as char,
        mutant as char,
        kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
    );
    run_pipelines(&kinds, seq, target, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_supported_pairs() {
        assert_eq!(select(b'C', b'T', DispatchMode::Library).unwrap(), vec![PipelineKind::Mok2020Unified]);
        assert_eq!(select(b'g', b'a', DispatchMode::Legacy).unwrap().len(), 3);
        assert_eq!(select(b'A', b'G', DispatchMode::Legacy).unwrap(), vec![PipelineKind::ChoSTALED]);
        assert_eq!(select(b'T', b'C', DispatchMode::Library).unwrap(), vec![PipelineKind::ChoSTALED]);
    }

    #[test]
    fn test_select_rejects_other_pairs() {
        for (r, m) in [(b'C', b'G'), (b'A', b'T'), (b'T', b'T'), (b'N', b'A')] {
            assert!(matches!(
                select(r, m, DispatchMode::Library),
                Err(MitoEditError::NoPipeline { .. })
            ));
        }
    }

    #[test]
    fn test_legacy_skips_pipelines_that_cannot_edit() {
        // AC is only a DddA11 context
        let seq = Sequence::normalize(&format!("{}AC{}", "A".repeat(30), "A".repeat(30))).unwrap();
        let result = dispatch(&seq, 32, b'T', &EngineConfig::legacy()).unwrap();
        assert!(!result.windows.is_empty());
        assert!(result.windows.iter().all(|w| w.pipeline == "Mok2022_G1397_DddA11"));
    }

    #[test]
    fn test_all_pipelines_failing_is_an_error() {
        let seq = Sequence::normalize(&"A".repeat(40)).unwrap();
        let err = dispatch(&seq, 20, b'G', &EngineConfig::legacy()).unwrap_err();
        match err {
            MitoEditError::UnEditableBase { position, pipeline, .. } => {
                assert_eq!(position, 20);
                assert_eq!(pipeline, "Cho_G1397_sTALEDs");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_position_out_of_range() {
        let seq = Sequence::normalize("ATCG").unwrap();
        assert!(matches!(
            dispatch(&seq, 5, b'T', &EngineConfig::default()),
            Err(MitoEditError::PositionOutOfRange { .. })
        ));
    }
}
