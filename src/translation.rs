//! mRNA to protein translation.
//!
//! Reading frame is always 0. Translation stops at the first stop codon,
//! which is not part of the protein; a trailing incomplete codon is
//! ignored.

use crate::genetic_code::{CodonTable, DataIntegrityError};
use crate::sequence::{AminoAcid, Codon, ProteinChain, Sequence};

/// One decoded codon, as shown by the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationStep {
    pub index: usize,
    pub codon: Codon,
    pub amino_acid: AminoAcid,
}

impl TranslationStep {
    pub fn is_stop(&self) -> bool {
        self.amino_acid.is_stop()
    }
}

/// Decodes codons up to and including the first stop codon.
pub fn translation_steps(
    mrna: &Sequence,
    table: &CodonTable,
) -> Result<Vec<TranslationStep>, DataIntegrityError> {
    let mut steps = Vec::with_capacity(mrna.len() / 3);
    for (index, triplet) in mrna.triplets().enumerate() {
        let codon = Codon::parse(triplet)
            .ok_or_else(|| DataIntegrityError::InvalidCodon(triplet.to_string()))?;
        let amino_acid = table.amino_acid(codon);
        steps.push(TranslationStep {
            index,
            codon,
            amino_acid,
        });
        if amino_acid.is_stop() {
            break;
        }
    }
    Ok(steps)
}

/// Translates an mRNA sequence into a protein chain.
///
/// Fails only if the sequence holds something that is not a codon, which
/// validated input never does.
pub fn translate(mrna: &Sequence, table: &CodonTable) -> Result<ProteinChain, DataIntegrityError> {
    let mut chain = ProteinChain::new();
    for step in translation_steps(mrna, table)? {
        if step.is_stop() {
            break;
        }
        chain.push(step.amino_acid);
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Alphabet;
    use crate::transcription::transcribe;
    use crate::validate::SequenceValidator;

    fn rna(s: &str) -> Sequence {
        Sequence::from_parts(Alphabet::Rna, s.to_string())
    }

    #[test]
    fn test_dna_to_protein_scenario() {
        let dna = SequenceValidator::default().validate_dna("ATGTTTTAA").unwrap();
        let mrna = transcribe(&dna);
        let protein = translate(&mrna, &CodonTable::standard()).unwrap();
        assert_eq!(protein.residues(), &[AminoAcid::Met, AminoAcid::Phe]);
        assert_eq!(protein.names(), "Methionine-Phenylalanine");
    }

    #[test]
    fn test_stops_at_first_stop_codon() {
        let table = CodonTable::standard();
        let protein = translate(&rna("AUGUAAUUUUGA"), &table).unwrap();
        assert_eq!(protein.symbols(), "M");
        assert!(!protein.residues().contains(&AminoAcid::Stop));
    }

    #[test]
    fn test_incomplete_codon_discarded() {
        let table = CodonTable::standard();
        let protein = translate(&rna("AUGUUUGG"), &table).unwrap();
        assert_eq!(protein.symbols(), "MF");
    }

    #[test]
    fn test_reading_frame_zero_only() {
        let table = CodonTable::standard();
        // Frame 0: CAU GUU -> H V (no search for AUG)
        let protein = translate(&rna("CAUGUU"), &table).unwrap();
        assert_eq!(protein.symbols(), "HV");
    }

    #[test]
    fn test_steps_include_stop() {
        let table = CodonTable::standard();
        let steps = translation_steps(&rna("AUGUUUUAAGGG"), &table).unwrap();
        assert_eq!(steps.len(), 3);
        assert!(steps[2].is_stop());
        assert_eq!(steps[2].codon.to_string(), "UAA");
    }

    #[test]
    fn test_invalid_codon_is_integrity_error() {
        let table = CodonTable::standard();
        assert_eq!(
            translate(&rna("AUGNNN"), &table),
            Err(DataIntegrityError::InvalidCodon("NNN".to_string()))
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::sequence::Alphabet;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn never_emits_stop(mrna in "[ACGU]{0,120}") {
            let table = CodonTable::standard();
            let seq = Sequence::from_parts(Alphabet::Rna, mrna.clone());
            let protein = translate(&seq, &table).unwrap();
            prop_assert!(!protein.residues().contains(&AminoAcid::Stop));

            // Halts at the first stop: no more residues than codons before it
            let first_stop = seq
                .triplets()
                .position(|t| table.amino_acid(Codon::parse(t).unwrap()).is_stop());
            if let Some(pos) = first_stop {
                prop_assert_eq!(protein.len(), pos);
            } else {
                prop_assert_eq!(protein.len(), mrna.len() / 3);
            }
        }
    }
}
