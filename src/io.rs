//! Reading sequence files and annotation tables

use csv::ReaderBuilder;
use flate2::read::MultiGzDecoder;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::annotation::BystanderAnnotationRow;
use crate::error::{MitoEditError, Result};
use crate::sequence::Sequence;

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Open `path`, decompressing `.gz` files on the fly
fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if has_extension(path, "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Concatenate sequence lines, dropping FASTA headers and `;` comments
pub fn parse_sequence_text<R: BufRead>(reader: R) -> Result<String> {
    let mut text = String::new();
    let mut records = 0;
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('>') {
            records += 1;
            if records > 1 {
                return Err(MitoEditError::MalformedSequence(
                    "expected a single sequence, found several FASTA records".to_string(),
                ));
            }
            continue;
        }
        if line.starts_with(';') {
            continue;
        }
        text.push_str(line.trim());
    }
    Ok(text)
}

/// Read and normalise a plain-text or FASTA sequence file
pub fn read_sequence(path: &Path) -> Result<Sequence> {
    let text = parse_sequence_text(open(path)?)?;
    let seq = Sequence::normalize(&text)?;
    info!("Loaded {}bp sequence from {}", seq.len(), path.display());
    Ok(seq)
}

/// Parse an annotation table from any reader
pub fn parse_annotation_table<R: Read>(reader: R, delimiter: u8) -> Result<Vec<BystanderAnnotationRow>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Read the bystander annotation table; `.tsv`/`.txt` are tab-delimited
pub fn read_annotation_table(path: &Path) -> Result<Vec<BystanderAnnotationRow>> {
    let stem = path.with_extension("");
    let inner = if has_extension(path, "gz") { stem.as_path() } else { path };
    let delimiter = if has_extension(inner, "tsv") || has_extension(inner, "txt") {
        b'\t'
    } else {
        b','
    };
    let rows = parse_annotation_table(open(path)?, delimiter)?;
    debug!("Read {} annotation rows from {}", rows.len(), path.display());
    Ok(rows)
}
