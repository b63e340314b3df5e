//! Core sequence types.
//!
//! This module contains the value types every transform works on:
//! - `Nucleotide` and `Alphabet` (DNA or RNA)
//! - `Sequence`, a validated run of bases tagged with its alphabet
//! - `Codon`, a canonical RNA triplet
//! - `AminoAcid` and `ProteinChain`
//!
//! All of them are immutable once built: transforms produce new values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    U,
}

impl Nucleotide {
    /// Parses a base, case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Nucleotide::A),
            'C' => Some(Nucleotide::C),
            'G' => Some(Nucleotide::G),
            'T' => Some(Nucleotide::T),
            'U' => Some(Nucleotide::U),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Nucleotide::A => 'A',
            Nucleotide::C => 'C',
            Nucleotide::G => 'G',
            Nucleotide::T => 'T',
            Nucleotide::U => 'U',
        }
    }

    pub fn is_gc(self) -> bool {
        matches!(self, Nucleotide::G | Nucleotide::C)
    }

    /// Base on the template DNA strand that pairs with this one.
    pub fn template_partner(self) -> Nucleotide {
        match self {
            Nucleotide::A => Nucleotide::T,
            Nucleotide::U | Nucleotide::T => Nucleotide::A,
            Nucleotide::G => Nucleotide::C,
            Nucleotide::C => Nucleotide::G,
        }
    }

    /// Returns true if the base belongs to the given alphabet.
    pub fn belongs_to(self, alphabet: Alphabet) -> bool {
        match (self, alphabet) {
            (Nucleotide::T, Alphabet::Rna) | (Nucleotide::U, Alphabet::Dna) => false,
            _ => true,
        }
    }
}

/// Nucleotide alphabet of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    Dna,
    Rna,
}

impl Alphabet {
    /// Human-readable list of accepted bases.
    pub fn bases(self) -> &'static str {
        match self {
            Alphabet::Dna => "A, T, G, C",
            Alphabet::Rna => "A, U, G, C",
        }
    }

    /// Start codon spelled in this alphabet.
    pub fn start_codon(self) -> &'static str {
        match self {
            Alphabet::Dna => "ATG",
            Alphabet::Rna => "AUG",
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alphabet::Dna => write!(f, "DNA"),
            Alphabet::Rna => write!(f, "RNA"),
        }
    }
}

/// An uppercase nucleotide sequence tagged with its alphabet.
///
/// Values are only built by the validators and the transforms, so the
/// content always matches the alphabet (the template strand produced by
/// reverse translation may carry `N` if the codon table was defective).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    alphabet: Alphabet,
    data: String,
}

impl Sequence {
    pub(crate) fn from_parts(alphabet: Alphabet, data: String) -> Self {
        Self { alphabet, data }
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Complete triplets in reading frame 0, as raw slices.
    ///
    /// A trailing incomplete triplet is not returned.
    pub fn triplets(&self) -> impl Iterator<Item = &str> + '_ {
        let full = self.data.len() - self.data.len() % 3;
        (0..full).step_by(3).map(move |i| &self.data[i..i + 3])
    }

    /// Fraction of G/C bases, 0.0 for an empty sequence.
    pub fn gc_content(&self) -> f64 {
        gc_fraction(&self.data)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

/// Fraction of G/C characters in `s`.
pub fn gc_fraction(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let gc = s
        .chars()
        .filter_map(Nucleotide::from_char)
        .filter(|n| n.is_gc())
        .count();
    gc as f64 / s.len() as f64
}

/// Splits a sequence string into space-separated codon groups.
pub fn codon_groups(s: &str) -> String {
    s.as_bytes()
        .chunks(3)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

const RNA_BASES: [u8; 4] = [b'U', b'C', b'A', b'G'];

/// An RNA triplet, stored as its index in U/C/A/G order (0..64).
///
/// Index order matches the classic table layout UUU, UUC, UUA, UUG, UCU, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codon(u8);

impl Codon {
    /// Number of distinct codons.
    pub const COUNT: usize = 64;

    /// Parses a codon, case-insensitively. `T` is read as `U`.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 {
            return None;
        }
        let mut idx = 0u8;
        for &b in bytes {
            let pos = match b.to_ascii_uppercase() {
                b'U' | b'T' => 0,
                b'C' => 1,
                b'A' => 2,
                b'G' => 3,
                _ => return None,
            };
            idx = idx * 4 + pos;
        }
        Some(Codon(idx))
    }

    /// Builds a codon from its table index.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then(|| Codon(index as u8))
    }

    /// All 64 codons in table order.
    pub fn all() -> impl Iterator<Item = Codon> {
        (0..Self::COUNT as u8).map(Codon)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn bases(self) -> [u8; 3] {
        let i = self.0 as usize;
        [RNA_BASES[i >> 4], RNA_BASES[(i >> 2) & 3], RNA_BASES[i & 3]]
    }

    pub fn as_string(self) -> String {
        self.bases().iter().map(|&b| b as char).collect()
    }

    /// Fraction of the three positions that are G or C.
    pub fn gc_fraction(self) -> f64 {
        let gc = self.bases().iter().filter(|&&b| b == b'G' || b == b'C').count();
        gc as f64 / 3.0
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Chemical category used for grouping and coloring residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Nonpolar,
    Polar,
    Basic,
    Acidic,
    Stop,
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nonpolar" => Ok(Category::Nonpolar),
            "polar" => Ok(Category::Polar),
            "basic" => Ok(Category::Basic),
            "acidic" => Ok(Category::Acidic),
            "stop" => Ok(Category::Stop),
            _ => Err(()),
        }
    }
}

/// The 20 standard amino acids plus the stop signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    Stop,
}

impl AminoAcid {
    pub const ALL: [AminoAcid; 21] = [
        AminoAcid::Ala,
        AminoAcid::Arg,
        AminoAcid::Asn,
        AminoAcid::Asp,
        AminoAcid::Cys,
        AminoAcid::Gln,
        AminoAcid::Glu,
        AminoAcid::Gly,
        AminoAcid::His,
        AminoAcid::Ile,
        AminoAcid::Leu,
        AminoAcid::Lys,
        AminoAcid::Met,
        AminoAcid::Phe,
        AminoAcid::Pro,
        AminoAcid::Ser,
        AminoAcid::Thr,
        AminoAcid::Trp,
        AminoAcid::Tyr,
        AminoAcid::Val,
        AminoAcid::Stop,
    ];

    /// Parses a one-letter code (case-insensitive) or `*`.
    pub fn from_symbol(c: char) -> Option<Self> {
        let aa = match c.to_ascii_uppercase() {
            'A' => AminoAcid::Ala,
            'R' => AminoAcid::Arg,
            'N' => AminoAcid::Asn,
            'D' => AminoAcid::Asp,
            'C' => AminoAcid::Cys,
            'Q' => AminoAcid::Gln,
            'E' => AminoAcid::Glu,
            'G' => AminoAcid::Gly,
            'H' => AminoAcid::His,
            'I' => AminoAcid::Ile,
            'L' => AminoAcid::Leu,
            'K' => AminoAcid::Lys,
            'M' => AminoAcid::Met,
            'F' => AminoAcid::Phe,
            'P' => AminoAcid::Pro,
            'S' => AminoAcid::Ser,
            'T' => AminoAcid::Thr,
            'W' => AminoAcid::Trp,
            'Y' => AminoAcid::Tyr,
            'V' => AminoAcid::Val,
            '*' => AminoAcid::Stop,
            _ => return None,
        };
        Some(aa)
    }

    /// Parses a full name such as "Aspartic Acid" or "Stop", ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|aa| aa.name().eq_ignore_ascii_case(wanted))
    }

    pub fn symbol(self) -> char {
        match self {
            AminoAcid::Ala => 'A',
            AminoAcid::Arg => 'R',
            AminoAcid::Asn => 'N',
            AminoAcid::Asp => 'D',
            AminoAcid::Cys => 'C',
            AminoAcid::Gln => 'Q',
            AminoAcid::Glu => 'E',
            AminoAcid::Gly => 'G',
            AminoAcid::His => 'H',
            AminoAcid::Ile => 'I',
            AminoAcid::Leu => 'L',
            AminoAcid::Lys => 'K',
            AminoAcid::Met => 'M',
            AminoAcid::Phe => 'F',
            AminoAcid::Pro => 'P',
            AminoAcid::Ser => 'S',
            AminoAcid::Thr => 'T',
            AminoAcid::Trp => 'W',
            AminoAcid::Tyr => 'Y',
            AminoAcid::Val => 'V',
            AminoAcid::Stop => '*',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AminoAcid::Ala => "Alanine",
            AminoAcid::Arg => "Arginine",
            AminoAcid::Asn => "Asparagine",
            AminoAcid::Asp => "Aspartic Acid",
            AminoAcid::Cys => "Cysteine",
            AminoAcid::Gln => "Glutamine",
            AminoAcid::Glu => "Glutamic Acid",
            AminoAcid::Gly => "Glycine",
            AminoAcid::His => "Histidine",
            AminoAcid::Ile => "Isoleucine",
            AminoAcid::Leu => "Leucine",
            AminoAcid::Lys => "Lysine",
            AminoAcid::Met => "Methionine",
            AminoAcid::Phe => "Phenylalanine",
            AminoAcid::Pro => "Proline",
            AminoAcid::Ser => "Serine",
            AminoAcid::Thr => "Threonine",
            AminoAcid::Trp => "Tryptophan",
            AminoAcid::Tyr => "Tyrosine",
            AminoAcid::Val => "Valine",
            AminoAcid::Stop => "Stop",
        }
    }

    /// Three-letter abbreviation, uppercase ("MET", "STP").
    pub fn abbreviation(self) -> &'static str {
        match self {
            AminoAcid::Ala => "ALA",
            AminoAcid::Arg => "ARG",
            AminoAcid::Asn => "ASN",
            AminoAcid::Asp => "ASP",
            AminoAcid::Cys => "CYS",
            AminoAcid::Gln => "GLN",
            AminoAcid::Glu => "GLU",
            AminoAcid::Gly => "GLY",
            AminoAcid::His => "HIS",
            AminoAcid::Ile => "ILE",
            AminoAcid::Leu => "LEU",
            AminoAcid::Lys => "LYS",
            AminoAcid::Met => "MET",
            AminoAcid::Phe => "PHE",
            AminoAcid::Pro => "PRO",
            AminoAcid::Ser => "SER",
            AminoAcid::Thr => "THR",
            AminoAcid::Trp => "TRP",
            AminoAcid::Tyr => "TYR",
            AminoAcid::Val => "VAL",
            AminoAcid::Stop => "STP",
        }
    }

    /// Category used when a codon table does not provide one.
    pub fn default_category(self) -> Category {
        match self {
            AminoAcid::Ala
            | AminoAcid::Gly
            | AminoAcid::Ile
            | AminoAcid::Leu
            | AminoAcid::Met
            | AminoAcid::Phe
            | AminoAcid::Pro
            | AminoAcid::Trp
            | AminoAcid::Val => Category::Nonpolar,
            AminoAcid::Asn
            | AminoAcid::Cys
            | AminoAcid::Gln
            | AminoAcid::Ser
            | AminoAcid::Thr
            | AminoAcid::Tyr => Category::Polar,
            AminoAcid::Arg | AminoAcid::His | AminoAcid::Lys => Category::Basic,
            AminoAcid::Asp | AminoAcid::Glu => Category::Acidic,
            AminoAcid::Stop => Category::Stop,
        }
    }

    pub fn is_stop(self) -> bool {
        self == AminoAcid::Stop
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered chain of residues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProteinChain {
    residues: Vec<AminoAcid>,
}

impl ProteinChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, aa: AminoAcid) {
        self.residues.push(aa);
    }

    pub fn residues(&self) -> &[AminoAcid] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// One-letter representation, e.g. "MF*".
    pub fn symbols(&self) -> String {
        self.residues.iter().map(|aa| aa.symbol()).collect()
    }

    /// Full names joined with '-', e.g. "Methionine-Phenylalanine".
    pub fn names(&self) -> String {
        self.residues
            .iter()
            .map(|aa| aa.name())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Three-letter codes joined with '-', e.g. "MET-PHE".
    pub fn abbreviations(&self) -> String {
        self.residues
            .iter()
            .map(|aa| aa.abbreviation())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl From<Vec<AminoAcid>> for ProteinChain {
    fn from(residues: Vec<AminoAcid>) -> Self {
        Self { residues }
    }
}

impl fmt::Display for ProteinChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbols())
    }
}
