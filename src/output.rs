//! Result files written for one analysis

use csv::WriterBuilder;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisResult;
use crate::annotation::BystanderAnnotationRow;
use crate::error::Result;
use crate::pipeline::Window;
use crate::tale_nt::TaleReport;

pub const FASTA_FILE: &str = "adjacent_bases.fasta";
pub const WINDOWS_FILE: &str = "all_windows.csv";
pub const BYSTANDERS_FILE: &str = "all_bystanders.csv";
pub const REPORT_FILE: &str = "talen_output.txt";

const WINDOW_COLUMNS: [&str; 12] = [
    "Pipeline",
    "Strand",
    "Position",
    "Reference Base",
    "Mutant Base",
    "Window Size",
    "Window Sequence",
    "Target Location",
    "Number of Bystanders",
    "Position of Bystanders",
    "Matching TALEs",
    "Flag (CheckBystanderEffect)",
];

fn window_record(window: &Window, tale_columns: usize) -> Vec<String> {
    let positions: Vec<String> = window.bystander_positions.iter().map(|p| p.to_string()).collect();
    let mut record = vec![
        window.pipeline.clone(),
        window.strand.to_string(),
        window.target_position.to_string(),
        window.reference_base.to_string(),
        window.mutant_base.to_string(),
        format!("{}bp", window.size),
        window.marked_sequence(),
        window.target_location(),
        window.bystander_count().to_string(),
        positions.join(", "),
        window
            .matches_external_tool
            .map(|m| if m { "True" } else { "False" })
            .unwrap_or_default()
            .to_string(),
        if window.adjacent_bystander {
            "CheckBystanderEffect".to_string()
        } else {
            String::new()
        },
    ];
    for i in 0..tale_columns {
        match window.flanking_arrays.get(i) {
            Some(arrays) => {
                record.push(arrays.left.clone());
                record.push(arrays.right.clone());
            }
            None => {
                record.push(String::new());
                record.push(String::new());
            }
        }
    }
    record
}

/// Window table with one Left/Right TALE pair per reported match
pub fn write_windows<W: Write>(writer: W, windows: &[Window]) -> Result<()> {
    let tale_columns = windows.iter().map(|w| w.flanking_arrays.len()).max().unwrap_or(0);
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header: Vec<String> = WINDOW_COLUMNS.iter().map(|c| c.to_string()).collect();
    for i in 1..=tale_columns {
        header.push(format!("Left TALE {i}"));
        header.push(format!("Right TALE {i}"));
    }
    wtr.write_record(&header)?;

    for window in windows {
        wtr.write_record(window_record(window, tale_columns))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_bystanders<W: Write>(writer: W, rows: &[BystanderAnnotationRow]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Tool report re-serialised tab-delimited, header first
pub fn write_report<W: Write>(writer: W, report: &TaleReport) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(writer);
    wtr.write_record(&report.headers)?;
    for row in &report.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every result file into `dir`, creating it; returns the paths written
pub fn write_results(dir: &Path, result: &AnalysisResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join(FASTA_FILE);
    fs::write(&path, &result.fasta)?;
    written.push(path);

    let path = dir.join(WINDOWS_FILE);
    write_windows(BufWriter::new(File::create(&path)?), &result.pipeline.windows)?;
    written.push(path);

    if !result.bystander_annotations.is_empty() {
        let path = dir.join(BYSTANDERS_FILE);
        write_bystanders(BufWriter::new(File::create(&path)?), &result.bystander_annotations)?;
        written.push(path);
    }

    if let Some(report) = &result.tale_report {
        let path = dir.join(REPORT_FILE);
        write_report(BufWriter::new(File::create(&path)?), report)?;
        written.push(path);
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}
