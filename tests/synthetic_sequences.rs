use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
/// Synthetic mtDNA-like sequences for integration tests
use std::fs;
use std::path::{Path, PathBuf};

/// Generate a stable random DNA sequence with a fixed seed
#[allow(dead_code)]
pub fn generate_base_sequence(length: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let bases = ['A', 'C', 'G', 'T'];

    (0..length).map(|_| bases[rng.gen_range(0..4)]).collect()
}

/// Poly-A background of `length` bases with `motif` written at 1-based `at`
#[allow(dead_code)]
pub fn with_motif(length: usize, at: usize, motif: &str) -> String {
    let mut bases: Vec<u8> = vec![b'A'; length];
    for (i, b) in motif.bytes().enumerate() {
        bases[(at - 1 + i) % length] = b;
    }
    String::from_utf8(bases).unwrap()
}

/// Write `sequence` as a wrapped FASTA record
#[allow(dead_code)]
pub fn write_fasta(path: &Path, name: &str, sequence: &str) -> PathBuf {
    let mut text = format!(">{name}\n");
    for chunk in sequence.as_bytes().chunks(60) {
        text.push_str(std::str::from_utf8(chunk).unwrap());
        text.push('\n');
    }
    fs::write(path, text).unwrap();
    path.to_path_buf()
}

/// Annotation table with one row per position, CSV
#[allow(dead_code)]
pub fn write_annotation_table(path: &Path, positions: &[(usize, char, char)]) -> PathBuf {
    let mut text = String::from(
        "mtDNA_pos,Ref. Allele,Mutant Allele,Location,Predicted Impact,Syn vs NonSyn,AA Variant,Func. Impact,MutationAssessor Score\n",
    );
    for (pos, r, m) in positions {
        text.push_str(&format!("{pos},{r},{m},MT-CO1,missense,NonSyn,p.X{pos}Y,medium,1.5\n"));
    }
    fs::write(path, text).unwrap();
    path.to_path_buf()
}
