/// Command-line behaviour of the mitoedit binary
///
/// Every run passes --skip-tale-nt so no external tool is needed.
use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

#[path = "synthetic_sequences.rs"]
mod synthetic_sequences;
use synthetic_sequences::{with_motif, write_annotation_table, write_fasta};

fn mitoedit(args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_mitoedit")).args(args).output()?)
}

fn setup(dir: &Path) -> String {
    let seq = with_motif(300, 149, "TCATCA");
    write_fasta(&dir.join("mt.fa"), "chrM", &seq)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_single_request_writes_result_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = setup(temp_dir.path());
    let out = temp_dir.path().join("out");
    let table = write_annotation_table(&temp_dir.path().join("annot.csv"), &[(153, 'C', 'T'), (10, 'A', 'G')]);

    let output = mitoedit(&[
        "-i",
        &input,
        "-o",
        out.to_str().unwrap(),
        "--bystander-file",
        table.to_str().unwrap(),
        "--skip-tale-nt",
        "150",
        "T",
    ])?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let fasta = fs::read_to_string(out.join("adjacent_bases.fasta"))?;
    assert!(fasta.starts_with(">Adjacent_bases_position_150\n"));

    let windows = fs::read_to_string(out.join("all_windows.csv"))?;
    let mut lines = windows.lines();
    assert!(lines.next().unwrap().starts_with("Pipeline,Strand,Position"));
    assert!(lines.all(|l| l.starts_with("Mok2020_Unified_")));

    // C153 (second TC) is a bystander of some window and annotated
    let bystanders = fs::read_to_string(out.join("all_bystanders.csv"))?;
    assert!(bystanders.starts_with("Bystander Position,"));
    assert!(bystanders.contains("\n153,C,T,"));
    assert!(!bystanders.contains("\n10,"));

    assert!(!out.join("talen_output.txt").exists());
    Ok(())
}

#[test]
fn test_unsupported_substitution_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = setup(temp_dir.path());
    let out = temp_dir.path().join("out");

    let output = mitoedit(&["-i", &input, "-o", out.to_str().unwrap(), "--skip-tale-nt", "150", "G"])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no pipeline found"), "got: {stderr}");
    Ok(())
}

#[test]
fn test_reference_base_mismatch_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = setup(temp_dir.path());

    let output = mitoedit(&[
        "-i",
        &input,
        "-o",
        temp_dir.path().to_str().unwrap(),
        "--skip-tale-nt",
        "--reference-base",
        "G",
        "150",
        "T",
    ])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("reference base mismatch"), "got: {stderr}");
    Ok(())
}

#[test]
fn test_batch_requests_get_their_own_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = setup(temp_dir.path());
    let out = temp_dir.path().join("batch_out");
    let batch = temp_dir.path().join("requests.tsv");
    // 151 is the A of TCA (A->G via sTALED); 2 is in poly-A and cannot be edited
    fs::write(&batch, "# position\tmutant\n153\tT\n151\tG\tA\n2\tG\n")?;

    let output = mitoedit(&[
        "-i",
        &input,
        "-o",
        out.to_str().unwrap(),
        "--skip-tale-nt",
        "--legacy",
        "--batch",
        batch.to_str().unwrap(),
        "-t",
        "2",
        "150",
        "T",
    ])?;

    // The uneditable request fails the run but not its siblings
    assert!(!output.status.success());
    for pos in [150, 151, 153] {
        let dir = out.join(format!("position_{pos}"));
        assert!(dir.join("all_windows.csv").exists(), "missing {}", dir.display());
    }
    assert!(!out.join("position_2").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 of 4 requests failed"), "got: {stderr}");
    Ok(())
}

#[test]
fn test_batch_rejects_repeated_positions() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = setup(temp_dir.path());
    let out = temp_dir.path().join("batch_out");
    let batch = temp_dir.path().join("requests.tsv");
    fs::write(&batch, "153\tT\n150\tT\n")?;

    let output = mitoedit(&[
        "-i",
        &input,
        "-o",
        out.to_str().unwrap(),
        "--skip-tale-nt",
        "--batch",
        batch.to_str().unwrap(),
        "150",
        "T",
    ])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Position 150 is requested more than once"), "got: {stderr}");
    assert!(!out.join("position_150").exists());
    assert!(!out.join("position_153").exists());
    Ok(())
}

#[test]
fn test_quiet_suppresses_info() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = setup(temp_dir.path());

    let output = mitoedit(&[
        "-i",
        &input,
        "-o",
        temp_dir.path().to_str().unwrap(),
        "--skip-tale-nt",
        "--quiet",
        "150",
        "T",
    ])?;
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("INFO"), "got: {stderr}");
    Ok(())
}
