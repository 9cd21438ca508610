//! One complete design request: dispatch, annotation and TALE matching

use log::info;

use crate::annotation::{self, BystanderAnnotationRow};
use crate::config::EngineConfig;
use crate::dispatch;
use crate::error::{MitoEditError, Result};
use crate::pipeline::{PipelineKind, PipelineResult};
use crate::reconcile;
use crate::sequence::Sequence;
use crate::tale_nt::{TaleNt, TaleReport};

/// What to design for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// 1-based target position
    pub position: usize,
    pub mutant_base: u8,
    /// Reference base the caller expects at `position`, checked when given
    pub reference_base: Option<u8>,
    /// Run this pipeline instead of the dispatcher's choice
    pub pipeline: Option<PipelineKind>,
}

impl AnalysisRequest {
    pub fn new(position: usize, mutant_base: u8) -> Self {
        AnalysisRequest {
            position,
            mutant_base: mutant_base.to_ascii_uppercase(),
            reference_base: None,
            pipeline: None,
        }
    }

    pub fn with_reference(mut self, base: u8) -> Self {
        self.reference_base = Some(base.to_ascii_uppercase());
        self
    }

    pub fn with_pipeline(mut self, kind: PipelineKind) -> Self {
        self.pipeline = Some(kind);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub target_position: usize,
    pub reference_base: char,
    pub mutant_base: char,
    /// Adjacent bases as a one-record FASTA, the TALE-NT input
    pub fasta: String,
    pub pipeline: PipelineResult,
    pub bystander_annotations: Vec<BystanderAnnotationRow>,
    pub tale_report: Option<TaleReport>,
}

pub fn fasta_record(position: usize, context: &str) -> String {
    format!(">Adjacent_bases_position_{position}\n{context}\n")
}

/// Analyse a request against an already normalised sequence
pub fn analyze_sequence(
    seq: &Sequence,
    request: &AnalysisRequest,
    config: &EngineConfig,
    annotations: Option<&[BystanderAnnotationRow]>,
    tale_nt: Option<&TaleNt>,
) -> Result<AnalysisResult> {
    let position = request.position;
    seq.check_position(position)?;

    let found = seq.base(position as i64);
    if let Some(expected) = request.reference_base {
        if expected != found {
            return Err(MitoEditError::ReferenceBaseMismatch {
                position,
                expected: expected as char,
                found: found as char,
            });
        }
    }

    let mut pipeline = match request.pipeline {
        Some(kind) => {
            if !kind.supports(found, request.mutant_base) {
                return Err(MitoEditError::NoPipeline {
                    reference: found as char,
                    mutant: request.mutant_base as char,
                });
            }
            info!("Running requested pipeline {kind}");
            kind.run(seq, position, config)?
        }
        None => dispatch::dispatch(seq, position, request.mutant_base, config)?,
    };

    let bystanders = pipeline.bystander_positions();
    let bystander_annotations = annotation::resolve(&bystanders, annotations);
    info!(
        "{} windows, {} distinct bystanders, {} annotated",
        pipeline.windows.len(),
        bystanders.len(),
        bystander_annotations.len()
    );

    let fasta = fasta_record(position, &pipeline.adjacent_bases);

    let tale_report = match tale_nt {
        Some(runner) => {
            let report = runner.run(&fasta)?;
            reconcile::reconcile(&mut pipeline.windows, &report);
            Some(report)
        }
        None => None,
    };

    Ok(AnalysisResult {
        target_position: position,
        reference_base: found as char,
        mutant_base: request.mutant_base as char,
        fasta,
        pipeline,
        bystander_annotations,
        tale_report,
    })
}

/// Normalise `sequence_text` and analyse `request`
pub fn analyze(
    sequence_text: &str,
    request: &AnalysisRequest,
    config: &EngineConfig,
    annotations: Option<&[BystanderAnnotationRow]>,
    tale_nt: Option<&TaleNt>,
) -> Result<AnalysisResult> {
    let seq = Sequence::normalize(sequence_text)?;
    analyze_sequence(&seq, request, config, annotations, tale_nt)
}
