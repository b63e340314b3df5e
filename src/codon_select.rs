//! Synonymous codon selection for reverse translation.
//!
//! Given an amino acid, picks one of the codons that encode it according to
//! a `Strategy`. Ties always resolve to the first codon in the reverse
//! index, which follows codon table order.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::codon_usage::CodonFrequencyTable;
use crate::genetic_code::{DataIntegrityError, ReverseCodonIndex};
use crate::sequence::{AminoAcid, Codon};

/// How to choose among synonymous codons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Uniform choice
    #[default]
    Random,
    /// Highest usage frequency
    MostCommon,
    /// Highest GC fraction
    GcRich,
    /// Lowest GC fraction
    GcPoor,
    /// Weighted draw following usage frequencies
    Balanced,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Random,
        Strategy::MostCommon,
        Strategy::GcRich,
        Strategy::GcPoor,
        Strategy::Balanced,
    ];

    /// Identifier used in configuration ("most_common").
    pub fn id(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::MostCommon => "most_common",
            Strategy::GcRich => "gc_rich",
            Strategy::GcPoor => "gc_poor",
            Strategy::Balanced => "balanced",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Strategy::Random => "Random Selection",
            Strategy::MostCommon => "Most Common Codons",
            Strategy::GcRich => "GC-Rich Codons",
            Strategy::GcPoor => "GC-Poor Codons",
            Strategy::Balanced => "Balanced Selection",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Strategy::ALL
            .iter()
            .copied()
            .find(|st| st.id() == wanted)
            .ok_or_else(|| format!("Unknown strategy: {} (expected random, most_common, gc_rich, gc_poor or balanced)", s))
    }
}

/// Picks codons from a reverse index and a frequency table.
#[derive(Debug, Clone, Copy)]
pub struct CodonSelector<'a> {
    index: &'a ReverseCodonIndex,
    usage: &'a CodonFrequencyTable,
}

impl<'a> CodonSelector<'a> {
    pub fn new(index: &'a ReverseCodonIndex, usage: &'a CodonFrequencyTable) -> Self {
        Self { index, usage }
    }

    /// Selects a codon for `amino_acid`.
    ///
    /// Fails with `NoSynonymousCodon` if the index has no codon for it.
    pub fn select<R: Rng>(
        &self,
        amino_acid: AminoAcid,
        strategy: Strategy,
        rng: &mut R,
    ) -> Result<Codon, DataIntegrityError> {
        let codons = self.index.codons_for(amino_acid)?;
        let codon = match strategy {
            Strategy::Random => codons[rng.random_range(0..codons.len())],
            Strategy::MostCommon => self.most_common(amino_acid, codons),
            Strategy::GcRich => first_best(codons, |a, b| a > b),
            Strategy::GcPoor => first_best(codons, |a, b| a < b),
            Strategy::Balanced => self.balanced(amino_acid, codons, rng.random::<f64>()),
        };
        Ok(codon)
    }

    fn most_common(&self, amino_acid: AminoAcid, codons: &[Codon]) -> Codon {
        let mut best = codons[0];
        if !self.usage.covers(amino_acid) {
            return best;
        }
        let mut best_freq = 0.0;
        for &codon in codons {
            let freq = self.usage.frequency(amino_acid, codon).unwrap_or(0.0);
            if freq > best_freq {
                best_freq = freq;
                best = codon;
            }
        }
        best
    }

    /// Cumulative draw; `draw` is uniform in [0, 1).
    fn balanced(&self, amino_acid: AminoAcid, codons: &[Codon], draw: f64) -> Codon {
        let residual = 1.0 / codons.len() as f64;
        let mut cumulative = 0.0;
        for &codon in codons {
            cumulative += self.usage.frequency(amino_acid, codon).unwrap_or(residual);
            if draw <= cumulative {
                return codon;
            }
        }
        // Rounding can leave the mass just below the draw.
        codons[codons.len() - 1]
    }
}

/// First codon whose GC fraction beats all earlier ones under `better`.
fn first_best(codons: &[Codon], better: impl Fn(f64, f64) -> bool) -> Codon {
    let mut best = codons[0];
    for &codon in &codons[1..] {
        if better(codon.gc_fraction(), best.gc_fraction()) {
            best = codon;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::genetic_code::CodonTable;

    fn fixtures() -> (ReverseCodonIndex, CodonFrequencyTable) {
        (
            ReverseCodonIndex::new(&CodonTable::standard()),
            CodonFrequencyTable::bundled(),
        )
    }

    fn codon(s: &str) -> Codon {
        Codon::parse(s).unwrap()
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("most_common".parse::<Strategy>(), Ok(Strategy::MostCommon));
        assert_eq!("GC-rich".parse::<Strategy>(), Ok(Strategy::GcRich));
        assert!("fastest".parse::<Strategy>().is_err());
        for st in Strategy::ALL {
            assert_eq!(st.to_string().parse::<Strategy>(), Ok(st));
        }
        assert_eq!(Strategy::GcPoor.description(), "GC-Poor Codons");
    }

    #[test]
    fn test_most_common() {
        let (index, usage) = fixtures();
        let selector = CodonSelector::new(&index, &usage);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(selector.select(AminoAcid::Stop, Strategy::MostCommon, &mut rng), Ok(codon("UGA")));
        assert_eq!(selector.select(AminoAcid::Leu, Strategy::MostCommon, &mut rng), Ok(codon("CUG")));
        assert_eq!(selector.select(AminoAcid::Met, Strategy::MostCommon, &mut rng), Ok(codon("AUG")));
    }

    #[test]
    fn test_most_common_without_frequencies_uses_first() {
        let index = ReverseCodonIndex::new(&CodonTable::standard());
        let usage = CodonFrequencyTable::default();
        let selector = CodonSelector::new(&index, &usage);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(selector.select(AminoAcid::Leu, Strategy::MostCommon, &mut rng), Ok(codon("UUA")));
    }

    #[test]
    fn test_gc_rich_and_poor() {
        let (index, usage) = fixtures();
        let selector = CodonSelector::new(&index, &usage);
        let mut rng = StdRng::seed_from_u64(1);
        // Ties resolve to the first codon in table order
        assert_eq!(selector.select(AminoAcid::Ala, Strategy::GcRich, &mut rng), Ok(codon("GCC")));
        assert_eq!(selector.select(AminoAcid::Ala, Strategy::GcPoor, &mut rng), Ok(codon("GCU")));
        assert_eq!(selector.select(AminoAcid::Leu, Strategy::GcPoor, &mut rng), Ok(codon("UUA")));
        assert_eq!(selector.select(AminoAcid::Leu, Strategy::GcRich, &mut rng), Ok(codon("CUC")));
    }

    #[test]
    fn test_gc_rich_is_maximal_for_every_amino_acid() {
        let (index, usage) = fixtures();
        let selector = CodonSelector::new(&index, &usage);
        let mut rng = StdRng::seed_from_u64(7);
        for aa in AminoAcid::ALL {
            let chosen = selector.select(aa, Strategy::GcRich, &mut rng).unwrap();
            for &other in index.codons_for(aa).unwrap() {
                assert!(chosen.gc_fraction() >= other.gc_fraction());
            }
            let chosen = selector.select(aa, Strategy::GcPoor, &mut rng).unwrap();
            for &other in index.codons_for(aa).unwrap() {
                assert!(chosen.gc_fraction() <= other.gc_fraction());
            }
        }
    }

    #[test]
    fn test_random_stays_synonymous() {
        let (index, usage) = fixtures();
        let selector = CodonSelector::new(&index, &usage);
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let c = selector.select(AminoAcid::Ser, Strategy::Random, &mut rng).unwrap();
            assert!(index.codons_for(AminoAcid::Ser).unwrap().contains(&c));
            seen.insert(c);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_balanced_converges_to_frequencies() {
        let (index, usage) = fixtures();
        let selector = CodonSelector::new(&index, &usage);
        let mut rng = StdRng::seed_from_u64(2024);
        let draws = 20_000;
        let mut counts: HashMap<Codon, usize> = HashMap::new();
        for _ in 0..draws {
            let c = selector.select(AminoAcid::Leu, Strategy::Balanced, &mut rng).unwrap();
            *counts.entry(c).or_default() += 1;
        }
        for &c in index.codons_for(AminoAcid::Leu).unwrap() {
            let expected = usage.frequency(AminoAcid::Leu, c).unwrap();
            let observed = counts.get(&c).copied().unwrap_or(0) as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "{}: observed {:.3}, expected {:.3}",
                c,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_balanced_missing_frequency_uses_residual_weight() {
        let index = ReverseCodonIndex::new(&CodonTable::standard());
        let mut usage = CodonFrequencyTable::default();
        // Only UUU known: UUC gets 1/2
        usage.insert(AminoAcid::Phe, codon("UUU"), 0.5);
        let selector = CodonSelector::new(&index, &usage);
        let phe = index.codons_for(AminoAcid::Phe).unwrap();
        assert_eq!(selector.balanced(AminoAcid::Phe, phe, 0.25), codon("UUU"));
        assert_eq!(selector.balanced(AminoAcid::Phe, phe, 0.75), codon("UUC"));
    }

    #[test]
    fn test_balanced_overflow_returns_last() {
        let index = ReverseCodonIndex::new(&CodonTable::standard());
        let mut usage = CodonFrequencyTable::default();
        usage.insert(AminoAcid::Tyr, codon("UAU"), 0.3);
        usage.insert(AminoAcid::Tyr, codon("UAC"), 0.3);
        let selector = CodonSelector::new(&index, &usage);
        let tyr = index.codons_for(AminoAcid::Tyr).unwrap();
        assert_eq!(selector.balanced(AminoAcid::Tyr, tyr, 0.99), codon("UAC"));
    }

    #[test]
    fn test_unknown_amino_acid() {
        // A table where nothing encodes Trp
        let mut json = String::from("{");
        let standard = CodonTable::standard();
        let pairs: Vec<String> = Codon::all()
            .map(|c| {
                let name = if c.to_string() == "UGG" { "Cysteine" } else { standard.entry(c).name.as_str() };
                format!("\"{}\": \"{}\"", c, name)
            })
            .collect();
        json.push_str(&pairs.join(","));
        json.push('}');
        let table = CodonTable::from_json_str(&json).unwrap();
        let index = ReverseCodonIndex::new(&table);
        let usage = CodonFrequencyTable::bundled();
        let selector = CodonSelector::new(&index, &usage);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            selector.select(AminoAcid::Trp, Strategy::MostCommon, &mut rng),
            Err(DataIntegrityError::NoSynonymousCodon('W'))
        );
    }
}
