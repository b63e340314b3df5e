//! Codon table definitions and loading.
//!
//! This module provides:
//! - The standard codon table, embedded as a 64-character NCBI string
//! - Loading a table from JSON, in either accepted shape
//! - The reverse index from amino acids to their synonymous codons
//!
//! A `CodonTable` is total over the 64 codons by construction: it is an
//! array indexed by codon, and a loaded table missing any codon is rejected.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::sequence::{AminoAcid, Category, Codon};

/// Standard code in U, C, A, G order (NCBI table 1).
const STANDARD_NCBIEAA: &str =
    "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Errors caused by a codon table that does not describe all 64 codons.
///
/// These indicate a defect in bundled or supplied data and are never masked
/// as an "unknown" residue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("Codon table has no entry for codon {0}")]
    MissingCodon(Codon),

    #[error("Invalid codon '{0}' in codon table")]
    InvalidCodon(String),

    #[error("Codon {codon} maps to an unknown amino acid '{name}'")]
    UnknownAminoAcid { codon: String, name: String },

    #[error("Codon {0} appears more than once in codon table")]
    DuplicateCodon(Codon),

    #[error("No synonymous codon for amino acid '{0}'")]
    NoSynonymousCodon(char),
}

/// Errors that can occur while loading a codon table file.
#[derive(Error, Debug)]
pub enum CodonTableError {
    #[error("Failed to read codon table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed codon table JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Codon table must be a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Integrity(#[from] DataIntegrityError),
}

/// What a codon encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonEntry {
    pub amino_acid: AminoAcid,
    /// Display name as given by the table source
    pub name: String,
    pub category: Category,
}

impl CodonEntry {
    fn standard(amino_acid: AminoAcid) -> Self {
        Self {
            amino_acid,
            name: amino_acid.name().to_string(),
            category: amino_acid.default_category(),
        }
    }

    pub fn is_stop(&self) -> bool {
        self.amino_acid.is_stop()
    }
}

/// Value side of a JSON codon table, in either accepted shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    /// `"UUU": "Phenylalanine"`
    Name(String),
    /// `"UUU": { "amino_acid": "Phenylalanine", "symbol": "F", "category": "nonpolar" }`
    Full {
        amino_acid: Option<String>,
        symbol: Option<String>,
        category: Option<String>,
    },
}

/// A codon table covering all 64 codons.
#[derive(Debug, Clone)]
pub struct CodonTable {
    entries: Vec<CodonEntry>,
    /// Codons in the order the source listed them
    order: Vec<Codon>,
}

impl CodonTable {
    /// The standard genetic code.
    pub fn standard() -> Self {
        let entries: Vec<CodonEntry> = STANDARD_NCBIEAA
            .chars()
            .map(|c| CodonEntry::standard(AminoAcid::from_symbol(c).unwrap_or(AminoAcid::Stop)))
            .collect();
        Self {
            entries,
            order: Codon::all().collect(),
        }
    }

    /// Parses a JSON codon table.
    ///
    /// Accepts `{ "codon_table": { ... } }` or a bare map. Values are either a
    /// full amino acid name or an object with `amino_acid`, `symbol` and
    /// `category`.
    pub fn from_json_str(json: &str) -> Result<Self, CodonTableError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(mut root) = value else {
            return Err(CodonTableError::NotAnObject);
        };
        let map = match root.remove("codon_table") {
            Some(Value::Object(inner)) => inner,
            Some(_) => return Err(CodonTableError::NotAnObject),
            None => root,
        };
        Self::from_json_map(map)
    }

    fn from_json_map(map: Map<String, Value>) -> Result<Self, CodonTableError> {
        let mut slots: Vec<Option<CodonEntry>> = vec![None; Codon::COUNT];
        let mut order = Vec::with_capacity(Codon::COUNT);

        for (key, value) in map {
            let codon = Codon::parse(key.trim())
                .ok_or_else(|| DataIntegrityError::InvalidCodon(key.clone()))?;
            let raw: RawEntry = serde_json::from_value(value)?;
            let entry = normalize_entry(codon, raw)?;

            let slot = &mut slots[codon.index()];
            if slot.is_some() {
                return Err(DataIntegrityError::DuplicateCodon(codon).into());
            }
            *slot = Some(entry);
            order.push(codon);
        }

        let mut entries = Vec::with_capacity(Codon::COUNT);
        for (codon, slot) in Codon::all().zip(slots) {
            entries.push(slot.ok_or(DataIntegrityError::MissingCodon(codon))?);
        }

        Ok(Self { entries, order })
    }

    /// Loads a table from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CodonTableError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Loads a table, falling back to the standard code when the file is
    /// unavailable or not valid JSON.
    ///
    /// A file that parses but does not cover all 64 codons is still an error.
    pub fn load_or_standard<P: AsRef<Path>>(path: Option<P>) -> Result<Self, CodonTableError> {
        let Some(path) = path else {
            return Ok(Self::standard());
        };
        let path = path.as_ref();
        match Self::from_json_file(path) {
            Ok(table) => {
                tracing::info!(path = %path.display(), "codon table loaded");
                Ok(table)
            }
            Err(e @ (CodonTableError::Io(_) | CodonTableError::Json(_))) => {
                tracing::warn!(path = %path.display(), error = %e, "using embedded codon table");
                Ok(Self::standard())
            }
            Err(e) => Err(e),
        }
    }

    /// Looks up a codon. Total: every codon has an entry.
    pub fn entry(&self, codon: Codon) -> &CodonEntry {
        &self.entries[codon.index()]
    }

    pub fn amino_acid(&self, codon: Codon) -> AminoAcid {
        self.entry(codon).amino_acid
    }

    /// Codons in source order.
    pub fn codons(&self) -> &[Codon] {
        &self.order
    }

    /// Stop codons in source order.
    pub fn stop_codons(&self) -> Vec<Codon> {
        self.order
            .iter()
            .copied()
            .filter(|&c| self.entry(c).is_stop())
            .collect()
    }
}

impl Default for CodonTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize_entry(codon: Codon, raw: RawEntry) -> Result<CodonEntry, DataIntegrityError> {
    let unknown = |name: &str| DataIntegrityError::UnknownAminoAcid {
        codon: codon.to_string(),
        name: name.to_string(),
    };

    match raw {
        RawEntry::Name(name) => {
            let amino_acid = AminoAcid::from_name(&name).ok_or_else(|| unknown(&name))?;
            Ok(CodonEntry {
                amino_acid,
                name: amino_acid.name().to_string(),
                category: amino_acid.default_category(),
            })
        }
        RawEntry::Full {
            amino_acid,
            symbol,
            category,
        } => {
            // The one-letter symbol wins when both are given.
            let from_symbol = symbol.as_deref().and_then(|s| {
                let mut chars = s.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => AminoAcid::from_symbol(c),
                    _ => None,
                }
            });
            let resolved = from_symbol
                .or_else(|| amino_acid.as_deref().and_then(AminoAcid::from_name))
                .ok_or_else(|| {
                    unknown(amino_acid.as_deref().or(symbol.as_deref()).unwrap_or(""))
                })?;

            let category = match category.as_deref() {
                None => resolved.default_category(),
                Some(raw_category) => raw_category.parse().unwrap_or_else(|_| {
                    tracing::warn!(%codon, category = raw_category, "unknown category, using default");
                    resolved.default_category()
                }),
            };

            Ok(CodonEntry {
                amino_acid: resolved,
                name: amino_acid.unwrap_or_else(|| resolved.name().to_string()),
                category,
            })
        }
    }
}

/// Synonymous codons for each amino acid, in codon table source order.
#[derive(Debug, Clone)]
pub struct ReverseCodonIndex {
    by_amino_acid: HashMap<AminoAcid, Vec<Codon>>,
}

impl ReverseCodonIndex {
    /// Builds the index once from a codon table.
    pub fn new(table: &CodonTable) -> Self {
        let mut by_amino_acid: HashMap<AminoAcid, Vec<Codon>> = HashMap::new();
        for &codon in table.codons() {
            by_amino_acid
                .entry(table.amino_acid(codon))
                .or_default()
                .push(codon);
        }
        Self { by_amino_acid }
    }

    /// Synonymous codons of `amino_acid`, never empty.
    pub fn codons_for(&self, amino_acid: AminoAcid) -> Result<&[Codon], DataIntegrityError> {
        match self.by_amino_acid.get(&amino_acid) {
            Some(codons) if !codons.is_empty() => Ok(codons.as_slice()),
            _ => Err(DataIntegrityError::NoSynonymousCodon(amino_acid.symbol())),
        }
    }

    /// Number of codons encoding `amino_acid` (its degeneracy).
    pub fn degeneracy(&self, amino_acid: AminoAcid) -> usize {
        self.by_amino_acid.get(&amino_acid).map_or(0, Vec::len)
    }

    pub fn amino_acids(&self) -> impl Iterator<Item = AminoAcid> + '_ {
        self.by_amino_acid.keys().copied()
    }
}
