//! Input validation for DNA, RNA and protein sequences.
//!
//! Whitespace is treated as formatting and removed. Any other character
//! outside the alphabet is rejected; nothing is stripped silently.
//!
//! Positions in error messages are 1-based and count characters after
//! whitespace removal.

use std::fmt;

use thiserror::Error;

use crate::sequence::{AminoAcid, Alphabet, Nucleotide, ProteinChain, Sequence};

/// Default maximum protein length accepted for animation.
pub const DEFAULT_MAX_PROTEIN_LENGTH: usize = 100;

/// A recoverable problem with user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Sequence must contain only {}{}", .alphabet.bases(), describe_found(.found))]
    InvalidAlphabet {
        alphabet: Alphabet,
        /// First offending character and its position; `None` for empty input
        found: Option<(usize, char)>,
    },

    #[error("Sequence length must be divisible by 3 (got {0})")]
    LengthNotMultipleOfThree(usize),

    #[error("Sequence must contain start codon {}", .0.start_codon())]
    MissingStartCodon(Alphabet),

    #[error("Invalid amino acid '{found}' at position {position}")]
    InvalidResidue { position: usize, found: char },

    #[error("Sequence too long ({length} amino acids, maximum {max} for visualization)")]
    SequenceTooLong { length: usize, max: usize },

    #[error("Protein sequence cannot be empty")]
    EmptySequence,
}

fn describe_found(found: &Option<(usize, char)>) -> String {
    match found {
        Some((position, c)) => format!(" (found '{}' at position {})", c, position),
        None => " (sequence is empty)".to_string(),
    }
}

/// All problems found in one protein input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

/// Validates raw user input. Pure: no I/O, same input gives same result.
#[derive(Debug, Clone, Copy)]
pub struct SequenceValidator {
    max_protein_length: usize,
}

impl SequenceValidator {
    pub fn new(max_protein_length: usize) -> Self {
        Self { max_protein_length }
    }

    pub fn max_protein_length(&self) -> usize {
        self.max_protein_length
    }

    /// Validates a DNA coding sequence (A, T, G, C).
    pub fn validate_dna(&self, raw: &str) -> Result<Sequence, ValidationError> {
        validate_nucleotides(raw, Alphabet::Dna)
    }

    /// Validates an mRNA sequence (A, U, G, C).
    pub fn validate_rna(&self, raw: &str) -> Result<Sequence, ValidationError> {
        validate_nucleotides(raw, Alphabet::Rna)
    }

    /// Validates a protein sequence of one-letter codes and `*`.
    ///
    /// Every invalid residue is reported, together with the length limit.
    pub fn validate_protein(&self, raw: &str) -> Result<ProteinChain, ValidationErrors> {
        let cleaned = strip_whitespace(raw);
        if cleaned.is_empty() {
            return Err(ValidationError::EmptySequence.into());
        }

        let mut errors = Vec::new();
        let mut chain = ProteinChain::new();
        for (i, c) in cleaned.chars().enumerate() {
            match AminoAcid::from_symbol(c) {
                Some(aa) => chain.push(aa),
                None => errors.push(ValidationError::InvalidResidue {
                    position: i + 1,
                    found: c,
                }),
            }
        }

        let length = cleaned.chars().count();
        if length > self.max_protein_length {
            errors.push(ValidationError::SequenceTooLong {
                length,
                max: self.max_protein_length,
            });
        }

        if errors.is_empty() {
            Ok(chain)
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl Default for SequenceValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PROTEIN_LENGTH)
    }
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

fn validate_nucleotides(raw: &str, alphabet: Alphabet) -> Result<Sequence, ValidationError> {
    let cleaned = strip_whitespace(raw);
    if cleaned.is_empty() {
        return Err(ValidationError::InvalidAlphabet {
            alphabet,
            found: None,
        });
    }

    let mut data = String::with_capacity(cleaned.len());
    for (i, c) in cleaned.chars().enumerate() {
        match Nucleotide::from_char(c) {
            Some(n) if n.belongs_to(alphabet) => data.push(n.as_char()),
            _ => {
                return Err(ValidationError::InvalidAlphabet {
                    alphabet,
                    found: Some((i + 1, c)),
                })
            }
        }
    }

    if data.len() % 3 != 0 {
        return Err(ValidationError::LengthNotMultipleOfThree(data.len()));
    }

    // Anywhere in the sequence, not only at the start.
    if !data.contains(alphabet.start_codon()) {
        return Err(ValidationError::MissingStartCodon(alphabet));
    }

    Ok(Sequence::from_parts(alphabet, data))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coding_dna() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![Just('A'), Just('C'), Just('G'), Just('T'), Just('a'), Just('t')],
            0..60,
        )
        .prop_map(|bases| {
            let body: String = bases.into_iter().collect();
            let mut seq = format!("ATG{}", body);
            seq.truncate(seq.len() - seq.len() % 3);
            seq
        })
    }

    proptest! {
        #[test]
        fn valid_dna_is_uppercased(seq in coding_dna()) {
            let validated = SequenceValidator::default().validate_dna(&seq).unwrap();
            prop_assert_eq!(validated.as_str(), seq.to_uppercase());
        }

        #[test]
        fn validation_is_pure(raw in "[ACGTXU ]{0,30}") {
            let validator = SequenceValidator::default();
            prop_assert_eq!(validator.validate_dna(&raw), validator.validate_dna(&raw));
        }
    }
}
