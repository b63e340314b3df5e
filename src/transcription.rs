//! DNA to mRNA transcription.

use crate::sequence::{Alphabet, Sequence};

/// One transcribed base, as shown by the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptionStep {
    pub index: usize,
    /// Base read from the DNA sequence
    pub template: char,
    /// Base added to the mRNA
    pub transcript: char,
}

/// Replaces every T with U. Total over any string; other characters are
/// copied unchanged.
pub fn transcribe_str(dna: &str) -> String {
    dna.chars().map(|c| if c == 'T' { 'U' } else { c }).collect()
}

/// Transcribes a DNA sequence into mRNA.
pub fn transcribe(dna: &Sequence) -> Sequence {
    Sequence::from_parts(Alphabet::Rna, transcribe_str(dna.as_str()))
}

/// Per-base steps of the transcription of `dna`.
pub fn transcription_steps(dna: &Sequence) -> Vec<TranscriptionStep> {
    dna.as_str()
        .chars()
        .enumerate()
        .map(|(index, template)| TranscriptionStep {
            index,
            template,
            transcript: if template == 'T' { 'U' } else { template },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::SequenceValidator;

    #[test]
    fn test_transcribe() {
        let dna = SequenceValidator::default().validate_dna("ATGTTTTAA").unwrap();
        let rna = transcribe(&dna);
        assert_eq!(rna.as_str(), "AUGUUUUAA");
        assert_eq!(rna.alphabet(), Alphabet::Rna);
    }

    #[test]
    fn test_transcribe_str_passes_other_characters() {
        assert_eq!(transcribe_str("TxT-N"), "UxU-N");
        assert_eq!(transcribe_str(""), "");
    }

    #[test]
    fn test_steps() {
        let dna = SequenceValidator::default().validate_dna("ATGCAT").unwrap();
        let steps = transcription_steps(&dna);
        assert_eq!(steps.len(), 6);
        assert_eq!(
            steps[1],
            TranscriptionStep {
                index: 1,
                template: 'T',
                transcript: 'U'
            }
        );
        let mrna: String = steps.iter().map(|s| s.transcript).collect();
        assert_eq!(mrna, transcribe(&dna).as_str());
    }
}
