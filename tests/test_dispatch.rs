/// Pipeline selection across every substitution and both dispatch modes
use mitoedit::dispatch::select;
use mitoedit::{DispatchMode, MitoEditError, PipelineKind};
use pretty_assertions::assert_eq;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

#[test]
fn test_dispatch_is_total() {
    let supported = [(b'C', b'T'), (b'G', b'A'), (b'A', b'G'), (b'T', b'C')];
    for mode in [DispatchMode::Legacy, DispatchMode::Library] {
        for r in BASES {
            for m in BASES {
                let selected = select(r, m, mode);
                if supported.contains(&(r, m)) {
                    let kinds = selected.unwrap();
                    assert!(!kinds.is_empty());
                    assert!(kinds.iter().all(|k| k.supports(r, m)), "{r} {m} {kinds:?}");
                } else {
                    assert!(
                        matches!(selected, Err(MitoEditError::NoPipeline { .. })),
                        "{}>{} should have no pipeline",
                        r as char,
                        m as char
                    );
                }
            }
        }
    }
}

#[test]
fn test_mode_chooses_mok_variants() {
    assert_eq!(
        select(b'C', b'T', DispatchMode::Legacy).unwrap(),
        vec![
            PipelineKind::Mok2020G1397,
            PipelineKind::Mok2020G1333,
            PipelineKind::Mok2022DddA11
        ]
    );
    assert_eq!(
        select(b'G', b'A', DispatchMode::Library).unwrap(),
        vec![PipelineKind::Mok2020Unified]
    );
}

#[test]
fn test_pipeline_names_are_stable() {
    let names: Vec<&str> = PipelineKind::ALL.iter().map(|k| k.name()).collect();
    assert_eq!(
        names,
        vec![
            "Mok2020_G1397",
            "Mok2020_G1333",
            "Mok2022_G1397_DddA11",
            "Cho_G1397_sTALEDs",
            "Mok2020_Unified"
        ]
    );
}
