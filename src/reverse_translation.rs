//! Protein to mRNA to DNA reverse translation.
//!
//! Each residue gets one codon from a `CodonSelector`. A `*` appends its
//! stop codon and ends the walk: unlike forward translation, the stop is
//! kept so the user can see which DNA produces it.

use rand::Rng;

use crate::codon_select::{CodonSelector, Strategy};
use crate::genetic_code::DataIntegrityError;
use crate::sequence::{codon_groups, Alphabet, AminoAcid, Codon, Nucleotide, ProteinChain, Sequence};

/// One residue and the codon chosen for it, as shown by the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseStep {
    pub index: usize,
    pub amino_acid: AminoAcid,
    pub codon: Codon,
}

impl ReverseStep {
    /// Template DNA bases pairing with this codon.
    pub fn template(&self) -> String {
        template_strand(&self.codon.to_string())
    }
}

/// Result of reverse-translating one protein.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseTranslation {
    pub protein: ProteinChain,
    pub strategy: Strategy,
    pub steps: Vec<ReverseStep>,
    pub mrna: Sequence,
    /// Template strand, complementary to the mRNA
    pub dna: Sequence,
}

impl ReverseTranslation {
    /// Residue and codon pairs, in order.
    pub fn picks(&self) -> Vec<(AminoAcid, Codon)> {
        self.steps.iter().map(|s| (s.amino_acid, s.codon)).collect()
    }

    pub fn codon_count(&self) -> usize {
        self.steps.len()
    }

    pub fn gc_content(&self) -> f64 {
        self.mrna.gc_content()
    }

    /// Multi-line summary in the layout of the results panel.
    pub fn summary(&self, width: usize) -> String {
        let wrap = |s: &str| textwrap::fill(&codon_groups(s), width.max(12));
        format!(
            "Protein: {}\nStrategy: {}\nmRNA ({} nt):\n{}\nDNA template ({} bp):\n{}\nCodons: {}\nGC content: {:.1}%",
            self.protein,
            self.strategy.description(),
            self.mrna.len(),
            wrap(self.mrna.as_str()),
            self.dna.len(),
            wrap(self.dna.as_str()),
            self.codon_count(),
            self.gc_content() * 100.0
        )
    }
}

/// Complements an mRNA string into its template DNA strand.
///
/// A→T, U→A, G→C, C→G; anything else becomes `N`.
pub fn template_strand(mrna: &str) -> String {
    mrna.chars()
        .map(|c| match Nucleotide::from_char(c) {
            Some(n) if n != Nucleotide::T => n.template_partner().as_char(),
            _ => 'N',
        })
        .collect()
}

/// Reverse-translates `protein` with one codon per residue.
pub fn reverse_translate<R: Rng>(
    protein: &ProteinChain,
    strategy: Strategy,
    selector: &CodonSelector<'_>,
    rng: &mut R,
) -> Result<ReverseTranslation, DataIntegrityError> {
    let mut steps = Vec::with_capacity(protein.len());
    let mut mrna = String::with_capacity(protein.len() * 3);

    for (index, &amino_acid) in protein.residues().iter().enumerate() {
        let codon = selector.select(amino_acid, strategy, rng)?;
        mrna.push_str(&codon.to_string());
        steps.push(ReverseStep {
            index,
            amino_acid,
            codon,
        });
        if amino_acid.is_stop() {
            break;
        }
    }

    let dna = template_strand(&mrna);
    Ok(ReverseTranslation {
        protein: protein.clone(),
        strategy,
        steps,
        mrna: Sequence::from_parts(Alphabet::Rna, mrna),
        dna: Sequence::from_parts(Alphabet::Dna, dna),
    })
}
