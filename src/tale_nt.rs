//! TALE-NT array-design tool: invocation and report parsing
//!
//! The tool is a black box taking a FASTA file and spacer/array bounds and
//! writing a tab-delimited report. Every invocation runs in its own scratch
//! directory, removed when the runner returns on any path.

use csv::ReaderBuilder;
use log::{debug, info};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{MitoEditError, Result};

/// Column of the report holding the spacer (lowercase) and arms (uppercase)
pub const PLUS_STRAND_COLUMN: &str = "Plus strand sequence";

/// Metadata lines preceding the report's header row
const REPORT_PREAMBLE_LINES: usize = 2;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Parameters passed to the array-design tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaleNtConfig {
    /// Program followed by any leading arguments
    pub command: Vec<String>,
    pub min_spacer: u32,
    pub max_spacer: u32,
    pub array_min: u32,
    pub array_max: u32,
    /// 1 applies the positional filter at `cut_pos`
    pub filter: u32,
    pub cut_pos: u32,
    pub timeout: Duration,
}

impl Default for TaleNtConfig {
    fn default() -> Self {
        TaleNtConfig {
            command: vec!["findTAL".to_string()],
            min_spacer: 14,
            max_spacer: 18,
            array_min: 14,
            array_max: 18,
            filter: 1,
            cut_pos: 31,
            timeout: Duration::from_secs(300),
        }
    }
}

impl TaleNtConfig {
    /// Base position handed to the tool's filter, -1 when filtering is off
    pub fn filter_base(&self) -> i64 {
        if self.filter == 1 {
            self.cut_pos as i64
        } else {
            -1
        }
    }
}

/// Tabular report produced by the tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaleReport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    plus_strand: usize,
}

impl TaleReport {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse report text, skipping the metadata preamble
    pub fn parse(text: &str) -> Result<Self> {
        let body: String = text
            .split_inclusive('\n')
            .skip(REPORT_PREAMBLE_LINES)
            .collect();

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(body.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| MitoEditError::ExternalTool(format!("unreadable report header: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let plus_strand = headers
            .iter()
            .position(|h| h == PLUS_STRAND_COLUMN)
            .ok_or_else(|| {
                MitoEditError::ExternalTool(format!("report has no '{PLUS_STRAND_COLUMN}' column"))
            })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| MitoEditError::ExternalTool(format!("unreadable report row: {e}")))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(TaleReport {
            headers,
            rows,
            plus_strand,
        })
    }

    /// Plus-strand field of every row, in report order; short rows are skipped
    pub fn plus_strand_sequences(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(self.plus_strand).map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs the array-design tool as a subprocess
#[derive(Debug, Clone)]
pub struct TaleNt {
    config: TaleNtConfig,
}

impl TaleNt {
    pub fn new(config: TaleNtConfig) -> Self {
        TaleNt { config }
    }

    pub fn config(&self) -> &TaleNtConfig {
        &self.config
    }

    /// Tool arguments following the configured command
    pub fn arguments(&self, fasta: &Path, outpath: &Path) -> Vec<OsString> {
        let c = &self.config;
        let mut args: Vec<OsString> = Vec::new();
        args.push("--fasta".into());
        args.push(fasta.into());
        for (flag, value) in [
            ("--min", c.min_spacer as i64),
            ("--max", c.max_spacer as i64),
            ("--arraymin", c.array_min as i64),
            ("--arraymax", c.array_max as i64),
            ("--filter", c.filter as i64),
            ("--filterbase", c.filter_base()),
        ] {
            args.push(flag.into());
            args.push(value.to_string().into());
        }
        args.push("--outpath".into());
        args.push(outpath.into());
        args
    }

    /// Design TALE arrays for `fasta` and return the parsed report
    pub fn run(&self, fasta: &str) -> Result<TaleReport> {
        let (program, leading) = self
            .config
            .command
            .split_first()
            .ok_or_else(|| MitoEditError::ExternalTool("no TALE-NT command configured".to_string()))?;

        let workdir = tempfile::Builder::new().prefix("mitoedit-talent-").tempdir()?;
        let fasta_path = workdir.path().join("adjacent_bases.fasta");
        let report_path = workdir.path().join("talen_output.txt");
        let stderr_path = workdir.path().join("stderr.log");
        fs::write(&fasta_path, fasta)?;

        let mut cmd = Command::new(program);
        cmd.args(leading)
            .args(self.arguments(&fasta_path, &report_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(File::create(&stderr_path)?));

        info!("Running TALE-NT: {cmd:?}");
        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| MitoEditError::ExternalTool(format!("failed to launch '{program}': {e}")))?;
        let status = wait_with_timeout(&mut child, self.config.timeout)?;
        debug!("TALE-NT finished in {:.2}s", started.elapsed().as_secs_f64());

        if !status.success() {
            let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
            return Err(MitoEditError::ExternalTool(format!(
                "'{program}' exited with {status}: {}",
                stderr.trim()
            )));
        }
        if !report_path.exists() {
            return Err(MitoEditError::ExternalTool(format!(
                "'{program}' wrote no report"
            )));
        }

        let report = TaleReport::from_path(&report_path)?;
        info!("TALE-NT reported {} candidate arrays", report.rows.len());
        Ok(report)
    }
}

/// Wait for `child`, killing it once `timeout` has elapsed
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(MitoEditError::ExternalTool(format!(
                "TALE-NT timed out after {}s",
                timeout.as_secs()
            )));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
