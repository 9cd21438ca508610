//! Editing pipelines: one parameter table per base-editor technology
//!
//! Every technology runs the same scan / generate / annotate loop and only
//! differs in its context families, the admissible target offsets, the end
//! the offset is counted from and the span searched for bystanders.

use log::{debug, info};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::bystander::{annotate, MarkedWindow, ScanRegion};
use crate::config::EngineConfig;
use crate::context::{
    find_contexts, ContextFamily, EditContext, Strand, DDDA11_C, DDDA11_G, MOK_C, MOK_G, STALED_A,
    STALED_T,
};
use crate::error::{MitoEditError, Result};
use crate::reconcile::FlankingArrays;
use crate::sequence::Sequence;
use crate::window::{generate_windows, Anchor, OffsetRange};

/// Bases taken on each side of the target for the tool's FASTA payload.
/// The target lands at base 31, the tool's default cut position.
pub const ADJACENT_FLANK: usize = 30;

/// The base-editor technologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Mok2020G1397,
    Mok2020G1333,
    Mok2022DddA11,
    ChoSTALED,
    Mok2020Unified,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 5] = [
        PipelineKind::Mok2020G1397,
        PipelineKind::Mok2020G1333,
        PipelineKind::Mok2022DddA11,
        PipelineKind::ChoSTALED,
        PipelineKind::Mok2020Unified,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineKind::Mok2020G1397 => "Mok2020_G1397",
            PipelineKind::Mok2020G1333 => "Mok2020_G1333",
            PipelineKind::Mok2022DddA11 => "Mok2022_G1397_DddA11",
            PipelineKind::ChoSTALED => "Cho_G1397_sTALEDs",
            PipelineKind::Mok2020Unified => "Mok2020_Unified",
        }
    }

    /// Window-generation strategies run by this pipeline
    pub fn strategies(&self) -> &'static [Strategy] {
        match self {
            PipelineKind::Mok2020G1397 => &[G1397],
            PipelineKind::Mok2020G1333 => &[G1333],
            PipelineKind::Mok2022DddA11 => &[DDDA11],
            PipelineKind::ChoSTALED => &[STALED],
            PipelineKind::Mok2020Unified => &UNIFIED,
        }
    }

    /// Context families edited by this pipeline, top strand first
    pub fn families(&self) -> [ContextFamily; 2] {
        self.strategies()[0].families
    }

    /// Contexts in which `edited_base` can be converted; empty when never
    pub fn context_set(&self, edited_base: u8) -> &'static [EditContext] {
        self.families()
            .iter()
            .find(|f| f.reference == edited_base)
            .map(|f| f.contexts)
            .unwrap_or(&[])
    }

    /// Whether the pipeline performs `reference -> mutant`
    pub fn supports(&self, reference: u8, mutant: u8) -> bool {
        self.families()
            .iter()
            .any(|f| f.reference == reference && f.mutant == mutant)
    }

    /// Run every strategy and concatenate their windows
    pub fn run(&self, seq: &Sequence, target: usize, config: &EngineConfig) -> Result<PipelineResult> {
        let mut result = PipelineResult::default();
        for strategy in self.strategies() {
            let part = strategy.process(seq, target, config).map_err(|e| match e {
                MitoEditError::UnEditableBase { position, base, .. } => MitoEditError::UnEditableBase {
                    position,
                    base,
                    pipeline: self.name().to_string(),
                },
                other => other,
            })?;
            result.merge(part);
        }
        Ok(result)
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PipelineKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "mok2020g1397" | "g1397" => Ok(PipelineKind::Mok2020G1397),
            "mok2020g1333" | "g1333" => Ok(PipelineKind::Mok2020G1333),
            "mok2022g1397ddda11" | "mok2022ddda11" | "ddda11" => Ok(PipelineKind::Mok2022DddA11),
            "chog1397staleds" | "chostaleds" | "chostaled" | "staled" => Ok(PipelineKind::ChoSTALED),
            "mok2020unified" | "unified" => Ok(PipelineKind::Mok2020Unified),
            _ => Err(format!(
                "Unknown pipeline '{s}'. Valid pipelines: {}",
                PipelineKind::ALL.map(|k| k.name()).join(", ")
            )),
        }
    }
}

/// Parameters of one window-generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    /// Pipeline label carried by every window this strategy emits
    pub label: &'static str,
    pub families: [ContextFamily; 2],
    pub offsets: OffsetRange,
    /// Ends of the edited strand the target offset is counted from
    pub anchors: &'static [Anchor],
    pub region: ScanRegion,
}

const G1397: Strategy = Strategy {
    label: "Mok2020_G1397",
    families: [MOK_C, MOK_G],
    offsets: OffsetRange::SizeRelative { start: 4, trim: 3 },
    anchors: &[Anchor::ThreePrime],
    region: ScanRegion::Interior { margin: 3 },
};

const G1333: Strategy = Strategy {
    label: "Mok2020_G1333",
    families: [MOK_C, MOK_G],
    offsets: OffsetRange::SizeRelative { start: 3, trim: 2 },
    anchors: &[Anchor::FivePrime],
    region: ScanRegion::Interior { margin: 2 },
};

const DDDA11: Strategy = Strategy {
    label: "Mok2022_G1397_DddA11",
    families: [DDDA11_C, DDDA11_G],
    offsets: OffsetRange::SizeRelative { start: 4, trim: 3 },
    anchors: &[Anchor::ThreePrime],
    region: ScanRegion::Interior { margin: 3 },
};

// Activation domain on the left TALE reads from the 5' end, on the right TALE from the 3' end
const STALED: Strategy = Strategy {
    label: "Cho_G1397_sTALEDs",
    families: [STALED_T, STALED_A],
    offsets: OffsetRange::Fixed {
        start: 5,
        end: 14,
        skip: Some(13),
    },
    anchors: &[Anchor::FivePrime, Anchor::ThreePrime],
    region: ScanRegion::FromAnchor { start: 4, end: 12 },
};

const UNIFIED: [Strategy; 3] = [
    Strategy {
        label: "Mok2020_Unified_G1397",
        families: [DDDA11_C, DDDA11_G],
        ..G1397
    },
    Strategy {
        label: "Mok2020_Unified_G1333",
        families: [DDDA11_C, DDDA11_G],
        ..G1333
    },
    Strategy {
        label: "Mok2020_Unified_DddA11",
        ..DDDA11
    },
];

impl Strategy {
    /// Admissible target offsets for a window of `size` bases
    pub fn position_range(&self, size: usize) -> Vec<usize> {
        self.offsets.offsets(size)
    }

    /// Contexts of both strands, searched for bystanders
    pub fn contexts(&self) -> Vec<EditContext> {
        self.families
            .iter()
            .flat_map(|f| f.contexts.iter().copied())
            .collect()
    }

    /// Family and context that make `target` editable, if any
    pub fn locate(&self, seq: &Sequence, target: usize) -> Option<(ContextFamily, EditContext)> {
        let span = seq.scan_span();
        self.families.iter().find_map(|family| {
            family
                .contexts
                .iter()
                .find(|ctx| {
                    find_contexts(span, ctx)
                        .into_iter()
                        .any(|p| seq.wrap(p as i64) == target)
                })
                .map(|ctx| (*family, *ctx))
        })
    }

    /// Enumerate and annotate every window for `target`
    pub fn process(&self, seq: &Sequence, target: usize, config: &EngineConfig) -> Result<PipelineResult> {
        let (family, context) =
            self.locate(seq, target)
                .ok_or_else(|| MitoEditError::UnEditableBase {
                    position: target,
                    base: seq.base(target as i64) as char,
                    pipeline: self.label.to_string(),
                })?;
        info!(
            "[{}] base at position {target} is in a {context} context ({} strand)",
            self.label, family.strand
        );

        let sizes: Vec<usize> = config
            .window_sizes
            .clone()
            .filter(|&size| size <= seq.len())
            .collect();
        if sizes.is_empty() {
            return Err(MitoEditError::MalformedSequence(format!(
                "{}bp sequence is shorter than the smallest {}bp window",
                seq.len(),
                config.window_sizes.start()
            )));
        }

        let contexts = self.contexts();
        let mut windows = Vec::new();

        for size in sizes {
            for &anchor in self.anchors {
                for generated in generate_windows(seq, target, size, &self.offsets, anchor, family.strand) {
                    let annotation = annotate(
                        seq,
                        &generated,
                        family.strand,
                        &contexts,
                        self.region,
                        family.reference,
                    );
                    debug!(
                        "[{}] {size}bp window at {} ({} from the {anchor}): {} bystanders",
                        self.label,
                        generated.start,
                        generated.offset,
                        annotation.marked.bystander_count()
                    );

                    windows.push(Window {
                        pipeline: self.label.to_string(),
                        strand: family.strand,
                        anchor,
                        target_position: target,
                        reference_base: family.reference as char,
                        mutant_base: family.mutant as char,
                        size,
                        start: generated.start,
                        target_offset: generated.offset,
                        marked: annotation.marked,
                        bystander_positions: annotation.bystander_positions,
                        adjacent_bystander: annotation.adjacent_bystander,
                        matches_external_tool: None,
                        flanking_arrays: Vec::new(),
                    });
                }
            }
        }

        info!("[{}] generated {} windows", self.label, windows.len());
        Ok(PipelineResult {
            adjacent_bases: adjacent_context(seq, target),
            windows,
        })
    }
}

/// One candidate editing window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub pipeline: String,
    /// Strand carrying the edited base
    pub strand: Strand,
    pub anchor: Anchor,
    pub target_position: usize,
    pub reference_base: char,
    pub mutant_base: char,
    pub size: usize,
    /// 1-based genomic coordinate of the window's first forward-strand base
    pub start: usize,
    /// Target offset counted from `anchor` on the edited strand
    pub target_offset: usize,
    pub marked: MarkedWindow,
    pub bystander_positions: Vec<usize>,
    pub adjacent_bystander: bool,
    /// `None` until reconciled with the array-design report
    pub matches_external_tool: Option<bool>,
    pub flanking_arrays: Vec<FlankingArrays>,
}

impl Window {
    pub fn marked_sequence(&self) -> String {
        self.marked.render()
    }

    pub fn unmarked_sequence(&self) -> String {
        self.marked.unmarked()
    }

    pub fn target_location(&self) -> String {
        format!("Position {} from the {}", self.target_offset, self.anchor)
    }

    pub fn bystander_count(&self) -> usize {
        self.marked.bystander_count()
    }
}

/// Windows of one analysis plus the context sent to the array-design tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineResult {
    pub adjacent_bases: String,
    pub windows: Vec<Window>,
}

impl PipelineResult {
    /// Union of bystander positions over all windows
    pub fn bystander_positions(&self) -> BTreeSet<usize> {
        self.windows
            .iter()
            .flat_map(|w| w.bystander_positions.iter().copied())
            .collect()
    }

    pub fn merge(&mut self, other: PipelineResult) {
        if self.adjacent_bases.is_empty() {
            self.adjacent_bases = other.adjacent_bases;
        }
        self.windows.extend(other.windows);
    }
}

/// Up to `ADJACENT_FLANK` bases either side of the target, wrapping circularly
pub fn adjacent_context(seq: &Sequence, target: usize) -> String {
    let span = (2 * ADJACENT_FLANK + 1).min(seq.len());
    let before = ADJACENT_FLANK.min((span - 1) / 2);
    seq.circular_slice(target as i64 - before as i64, span)
        .map(|bases| String::from_utf8_lossy(bases).into_owned())
        .unwrap_or_default()
}
