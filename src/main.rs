use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info, warn};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mitoedit::analysis::{analyze_sequence, AnalysisRequest, AnalysisResult};
use mitoedit::config::EngineConfig;
use mitoedit::io::{read_annotation_table, read_sequence};
use mitoedit::output::write_results;
use mitoedit::pipeline::PipelineKind;
use mitoedit::sequence::parse_base;
use mitoedit::tale_nt::{TaleNt, TaleNtConfig};

/// MitoEdit - base-editing window design for mitochondrial DNA
///
/// Enumerates every editing window around a target base for the base editor
/// able to make the requested substitution, marks bystander bases and matches
/// the windows against TALE-NT array designs.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Target position (1-based)
    #[clap(value_name = "POSITION")]
    position: usize,

    /// Base the target should become (A, C, G or T)
    #[clap(value_name = "MUTANT_BASE")]
    mutant_base: String,

    /// mtDNA sequence: plain text or FASTA, optionally gzipped
    #[clap(short = 'i', long = "input", default_value = "mtDNA.txt")]
    input: PathBuf,

    /// Bystander annotation table (CSV, or TSV for .tsv/.txt)
    #[clap(long = "bystander-file")]
    bystander_file: Option<PathBuf>,

    /// Output directory
    #[clap(short = 'o', long = "output", default_value = ".")]
    output: PathBuf,

    /// Expected reference base at POSITION; the run fails if the sequence disagrees
    #[clap(long = "reference-base")]
    reference_base: Option<String>,

    /// Run one pipeline instead of choosing from the substitution
    #[clap(long = "pipeline")]
    pipeline: Option<PipelineKind>,

    /// Run G1397, G1333 and DddA11 separately with 14-18bp windows
    #[clap(long)]
    legacy: bool,

    /// Smallest window size in bp
    #[clap(long = "min-window")]
    min_window: Option<usize>,

    /// Largest window size in bp
    #[clap(long = "max-window")]
    max_window: Option<usize>,

    /// TALE-NT command line (program and leading arguments)
    #[clap(long = "tale-nt", value_name = "CMD")]
    tale_nt: Option<String>,

    /// Do not run TALE-NT
    #[clap(long = "skip-tale-nt", conflicts_with = "tale_nt")]
    skip_tale_nt: bool,

    /// Minimum spacer length passed to TALE-NT
    #[clap(long = "min-spacer", default_value = "14")]
    min_spacer: u32,

    /// Maximum spacer length passed to TALE-NT
    #[clap(long = "max-spacer", default_value = "18")]
    max_spacer: u32,

    /// Minimum TALE array length
    #[clap(long = "array-min", default_value = "14")]
    array_min: u32,

    /// Maximum TALE array length
    #[clap(long = "array-max", default_value = "18")]
    array_max: u32,

    /// TALE-NT filter mode (1 = require the cut position inside the spacer)
    #[clap(long = "filter", default_value = "1")]
    filter: u32,

    /// Cut position within the adjacent bases used by the filter
    #[clap(long = "cut-pos", default_value = "31")]
    cut_pos: u32,

    /// TALE-NT timeout in seconds
    #[clap(long = "timeout", default_value = "300")]
    timeout: u64,

    /// Extra requests, one `position<TAB>mutant[<TAB>reference]` per line
    #[clap(long = "batch")]
    batch: Option<PathBuf>,

    /// Number of threads for batch requests
    #[clap(short = 't', long = "threads", default_value = "1")]
    threads: usize,

    /// Only report warnings and errors
    #[clap(long)]
    quiet: bool,

    /// Report per-window detail
    #[clap(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn engine_config(args: &Args) -> Result<EngineConfig> {
    let base = if args.legacy {
        EngineConfig::legacy()
    } else {
        EngineConfig::library()
    };
    let min = args.min_window.unwrap_or(*base.window_sizes.start());
    let max = args.max_window.unwrap_or(*base.window_sizes.end());
    if min < 2 || min > max {
        bail!("Invalid window sizes: min {min}, max {max}");
    }
    Ok(base.with_window_sizes(min..=max))
}

fn tale_nt(args: &Args) -> Result<Option<TaleNt>> {
    if args.skip_tale_nt {
        return Ok(None);
    }
    let defaults = TaleNtConfig::default();
    let command = match &args.tale_nt {
        Some(cmd) => cmd.split_whitespace().map(str::to_string).collect(),
        None => defaults.command,
    };
    if command.is_empty() {
        bail!("--tale-nt needs a command");
    }
    Ok(Some(TaleNt::new(TaleNtConfig {
        command,
        min_spacer: args.min_spacer,
        max_spacer: args.max_spacer,
        array_min: args.array_min,
        array_max: args.array_max,
        filter: args.filter,
        cut_pos: args.cut_pos,
        timeout: Duration::from_secs(args.timeout),
    })))
}

fn build_request(
    position: usize,
    mutant: &str,
    reference: Option<&str>,
    pipeline: Option<PipelineKind>,
) -> Result<AnalysisRequest> {
    let mut request = AnalysisRequest::new(position, parse_base(mutant)?);
    if let Some(r) = reference {
        request = request.with_reference(parse_base(r)?);
    }
    if let Some(kind) = pipeline {
        request = request.with_pipeline(kind);
    }
    Ok(request)
}

fn read_batch(path: &Path, pipeline: Option<PipelineKind>) -> Result<Vec<AnalysisRequest>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    let mut requests = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 || fields.len() > 3 {
            bail!("{}:{}: expected 'position mutant [reference]'", path.display(), n + 1);
        }
        let position: usize = fields[0]
            .parse()
            .with_context(|| format!("{}:{}: bad position '{}'", path.display(), n + 1, fields[0]))?;
        let request = build_request(position, fields[1], fields.get(2).copied(), pipeline)
            .with_context(|| format!("{}:{}", path.display(), n + 1))?;
        requests.push(request);
    }
    Ok(requests)
}

/// Each request writes into its own `position_<pos>/` directory
fn ensure_distinct_positions(requests: &[AnalysisRequest]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for request in requests {
        if !seen.insert(request.position) {
            bail!(
                "Position {} is requested more than once; results for it would share position_{}/",
                request.position,
                request.position
            );
        }
    }
    Ok(())
}

fn summarize(result: &AnalysisResult) {
    let windows = &result.pipeline.windows;
    let fewest = windows.iter().map(|w| w.bystander_count()).min();
    let matching = windows
        .iter()
        .filter(|w| w.matches_external_tool == Some(true))
        .count();
    match fewest {
        Some(fewest) => info!(
            "Position {} {}>{}: {} windows, fewest bystanders {}, {} matching TALE-NT",
            result.target_position,
            result.reference_base,
            result.mutant_base,
            windows.len(),
            fewest,
            matching
        ),
        None => warn!(
            "Position {}: no windows fit the sequence",
            result.target_position
        ),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let seq = read_sequence(&args.input)
        .with_context(|| format!("Failed to read sequence from {}", args.input.display()))?;

    let annotations = match &args.bystander_file {
        Some(path) => Some(
            read_annotation_table(path)
                .with_context(|| format!("Failed to read bystander table {}", path.display()))?,
        ),
        None => {
            warn!("No bystander annotation file given, bystander effects will not be annotated");
            None
        }
    };

    let engine = engine_config(&args)?;
    let runner = tale_nt(&args)?;

    let first = build_request(
        args.position,
        &args.mutant_base,
        args.reference_base.as_deref(),
        args.pipeline,
    )?;

    let Some(batch) = &args.batch else {
        let result = analyze_sequence(&seq, &first, &engine, annotations.as_deref(), runner.as_ref())?;
        write_results(&args.output, &result)
            .with_context(|| format!("Failed to write results to {}", args.output.display()))?;
        summarize(&result);
        return Ok(());
    };

    let mut requests = vec![first];
    requests.extend(read_batch(batch, args.pipeline)?);
    ensure_distinct_positions(&requests)?;
    info!("Analysing {} requests on {} threads", requests.len(), args.threads);

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let failures: Vec<(usize, anyhow::Error)> = requests
        .par_iter()
        .filter_map(|request| {
            let dir = args.output.join(format!("position_{}", request.position));
            let outcome = analyze_sequence(&seq, request, &engine, annotations.as_deref(), runner.as_ref())
                .map_err(anyhow::Error::from)
                .and_then(|result| {
                    write_results(&dir, &result)?;
                    summarize(&result);
                    Ok(())
                });
            outcome.err().map(|e| (request.position, e))
        })
        .collect();

    for (position, e) in &failures {
        error!("Position {position}: {e:#}");
    }
    if !failures.is_empty() {
        bail!("{} of {} requests failed", failures.len(), requests.len());
    }
    Ok(())
}
