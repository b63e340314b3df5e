//! Codon usage frequencies.
//!
//! Approximate relative usage of synonymous codons, used by the
//! `most_common` and `balanced` codon selection strategies. Values for one
//! amino acid should sum to about 1; `deviations` reports the ones that do
//! not.

use std::collections::HashMap;

use crate::sequence::{AminoAcid, Codon};

/// Bundled approximate frequencies (symbol, codon, frequency).
const BUNDLED: &[(char, &[(&str, f64)])] = &[
    ('F', &[("UUU", 0.46), ("UUC", 0.54)]),
    (
        'L',
        &[
            ("UUA", 0.08),
            ("UUG", 0.13),
            ("CUU", 0.12),
            ("CUC", 0.19),
            ("CUA", 0.07),
            ("CUG", 0.41),
        ],
    ),
    (
        'S',
        &[
            ("UCU", 0.15),
            ("UCC", 0.17),
            ("UCA", 0.12),
            ("UCG", 0.04),
            ("AGU", 0.12),
            ("AGC", 0.40),
        ],
    ),
    ('Y', &[("UAU", 0.44), ("UAC", 0.56)]),
    ('C', &[("UGU", 0.46), ("UGC", 0.54)]),
    ('W', &[("UGG", 1.0)]),
    ('P', &[("CCU", 0.16), ("CCC", 0.20), ("CCA", 0.27), ("CCG", 0.37)]),
    ('H', &[("CAU", 0.42), ("CAC", 0.58)]),
    ('Q', &[("CAA", 0.25), ("CAG", 0.75)]),
    (
        'R',
        &[
            ("CGU", 0.08),
            ("CGC", 0.19),
            ("CGA", 0.06),
            ("CGG", 0.21),
            ("AGA", 0.20),
            ("AGG", 0.26),
        ],
    ),
    ('I', &[("AUU", 0.36), ("AUC", 0.48), ("AUA", 0.16)]),
    ('M', &[("AUG", 1.0)]),
    ('T', &[("ACU", 0.13), ("ACC", 0.19), ("ACA", 0.15), ("ACG", 0.53)]),
    ('N', &[("AAU", 0.46), ("AAC", 0.54)]),
    ('K', &[("AAA", 0.42), ("AAG", 0.58)]),
    ('V', &[("GUU", 0.11), ("GUC", 0.24), ("GUA", 0.07), ("GUG", 0.58)]),
    ('A', &[("GCU", 0.18), ("GCC", 0.40), ("GCA", 0.16), ("GCG", 0.26)]),
    ('D', &[("GAU", 0.46), ("GAC", 0.54)]),
    ('E', &[("GAA", 0.42), ("GAG", 0.58)]),
    ('G', &[("GGU", 0.10), ("GGC", 0.34), ("GGA", 0.25), ("GGG", 0.31)]),
    ('*', &[("UAA", 0.28), ("UAG", 0.20), ("UGA", 0.52)]),
];

/// Default tolerance for `deviations`.
pub const SUM_TOLERANCE: f64 = 0.01;

/// Usage probability of each codon among its synonyms.
#[derive(Debug, Clone, Default)]
pub struct CodonFrequencyTable {
    frequencies: HashMap<AminoAcid, HashMap<Codon, f64>>,
}

impl CodonFrequencyTable {
    /// The bundled approximate frequencies.
    pub fn bundled() -> Self {
        let mut table = Self::default();
        for &(symbol, codons) in BUNDLED {
            let Some(aa) = AminoAcid::from_symbol(symbol) else {
                continue;
            };
            for &(codon, freq) in codons {
                if let Some(codon) = Codon::parse(codon) {
                    table.insert(aa, codon, freq);
                }
            }
        }
        table
    }

    /// Sets the frequency of `codon` for `amino_acid`, clamped to [0, 1].
    pub fn insert(&mut self, amino_acid: AminoAcid, codon: Codon, frequency: f64) {
        self.frequencies
            .entry(amino_acid)
            .or_default()
            .insert(codon, frequency.clamp(0.0, 1.0));
    }

    pub fn frequency(&self, amino_acid: AminoAcid, codon: Codon) -> Option<f64> {
        self.frequencies.get(&amino_acid)?.get(&codon).copied()
    }

    /// Returns true if any frequency is known for `amino_acid`.
    pub fn covers(&self, amino_acid: AminoAcid) -> bool {
        self.frequencies.contains_key(&amino_acid)
    }

    /// Amino acids whose frequencies do not sum to 1 within `tolerance`,
    /// with the actual sum.
    pub fn deviations(&self, tolerance: f64) -> Vec<(AminoAcid, f64)> {
        let mut out: Vec<(AminoAcid, f64)> = self
            .frequencies
            .iter()
            .map(|(&aa, codons)| (aa, codons.values().sum::<f64>()))
            .filter(|&(_, sum)| (sum - 1.0).abs() > tolerance)
            .collect();
        out.sort_by_key(|&(aa, _)| aa);
        out
    }

    /// Logs a warning for every amino acid whose frequencies drift from 1.
    pub fn check(&self) {
        for (aa, sum) in self.deviations(SUM_TOLERANCE) {
            tracing::warn!(amino_acid = %aa, sum, "codon frequencies do not sum to 1");
        }
    }
}
