//! Gene-impact annotations for bystander positions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the mtDNA variant annotation table.
///
/// Read with the table's own column names and written back out under the
/// names used in result files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BystanderAnnotationRow {
    #[serde(rename(deserialize = "mtDNA_pos", serialize = "Bystander Position"))]
    pub position: usize,
    #[serde(rename(deserialize = "Ref. Allele", serialize = "Reference Base"))]
    pub reference_base: String,
    #[serde(rename(deserialize = "Mutant Allele", serialize = "Mutant Base"))]
    pub mutant_base: String,
    #[serde(rename(deserialize = "Location", serialize = "Location On Genome"))]
    pub location: String,
    #[serde(rename(deserialize = "Predicted Impact", serialize = "Predicted Mutation Impact"))]
    pub predicted_impact: String,
    #[serde(rename(deserialize = "Syn vs NonSyn", serialize = "SNV Type"))]
    pub synonymy: String,
    #[serde(rename = "AA Variant")]
    pub aa_variant: String,
    #[serde(rename(deserialize = "Func. Impact", serialize = "Functional Impact"))]
    pub functional_impact: String,
    #[serde(rename = "MutationAssessor Score")]
    pub score: String,
}

/// Every row whose position is a bystander, in table order.
/// An absent table resolves to nothing.
pub fn resolve(
    positions: &BTreeSet<usize>,
    table: Option<&[BystanderAnnotationRow]>,
) -> Vec<BystanderAnnotationRow> {
    table
        .unwrap_or_default()
        .iter()
        .filter(|row| positions.contains(&row.position))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(position: usize, reference: &str, mutant: &str) -> BystanderAnnotationRow {
        BystanderAnnotationRow {
            position,
            reference_base: reference.to_string(),
            mutant_base: mutant.to_string(),
            location: "MT-ND1".to_string(),
            predicted_impact: "missense".to_string(),
            synonymy: "NonSyn".to_string(),
            aa_variant: "p.A52T".to_string(),
            functional_impact: "medium".to_string(),
            score: "2.1".to_string(),
        }
    }

    #[test]
    fn test_resolve_filters_by_position() {
        let table = vec![row(10, "C", "T"), row(11, "C", "A"), row(12, "G", "A"), row(11, "C", "T")];
        let positions: BTreeSet<usize> = [11, 12, 99].into_iter().collect();
        let rows = resolve(&positions, Some(&table));
        assert_eq!(rows, vec![table[1].clone(), table[2].clone(), table[3].clone()]);
    }

    #[test]
    fn test_resolve_without_table_is_empty() {
        let positions: BTreeSet<usize> = [1, 2].into_iter().collect();
        assert!(resolve(&positions, None).is_empty());
        assert!(resolve(&BTreeSet::new(), Some(&[row(1, "A", "G")])).is_empty());
    }
}
