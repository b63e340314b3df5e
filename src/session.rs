//! Simulation session.
//!
//! A `Session` owns the current input, the three animation tracks and the
//! random source used for codon choices. The UI calls `poll()` on every
//! tick; it starts a scheduled translation when its delay is over and turns
//! playback events into `DogmaEvent`s.

use std::fmt;
use std::io;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::codon_select::{CodonSelector, Strategy};
use crate::codon_usage::CodonFrequencyTable;
use crate::config::{ConfigError, SimulationConfig};
use crate::genetic_code::{CodonTable, DataIntegrityError, ReverseCodonIndex};
use crate::playback::{
    PlaybackController, PlaybackEvent, PlaybackMessage, PlaybackMode, PlaybackState, StateError,
};
use crate::reverse_translation::{reverse_translate, ReverseStep, ReverseTranslation};
use crate::sequence::{codon_groups, AminoAcid, Codon, ProteinChain, Sequence};
use crate::transcription::{transcribe, transcription_steps, TranscriptionStep};
use crate::translation::{translate, translation_steps, TranslationStep};
use crate::validate::{SequenceValidator, ValidationError, ValidationErrors};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Protein(#[from] ValidationErrors),

    #[error("Codon table error: {0}")]
    Integrity(#[from] DataIntegrityError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start playback thread: {0}")]
    Driver(#[from] io::Error),

    #[error("No sequence loaded")]
    NoSequence,
}

/// One of the three animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Transcription,
    Translation,
    ReverseTranslation,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::Transcription, Track::Translation, Track::ReverseTranslation];

    pub fn label(self) -> &'static str {
        match self {
            Track::Transcription => "transcription",
            Track::Translation => "translation",
            Track::ReverseTranslation => "reverse",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the simulation reports to its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum DogmaEvent {
    SequenceValidated {
        sequence: String,
    },
    NucleotideTranscribed {
        index: usize,
        template: char,
        transcript: char,
    },
    TranscriptionComplete {
        mrna: String,
    },
    CodonTranslated {
        codon: Codon,
        amino_acid: AminoAcid,
        protein_length: usize,
    },
    StopEncountered {
        stop_codon: Codon,
        protein_length: usize,
    },
    /// Full residue names joined with `-`
    TranslationComplete {
        sequence: String,
    },
    CodonSelected {
        index: usize,
        amino_acid: AminoAcid,
        codon: Codon,
    },
    ReverseTranslationComplete {
        mrna: String,
        dna: String,
    },
    PlaybackStarted {
        track: Track,
        total: usize,
    },
    PlaybackPaused {
        track: Track,
        index: usize,
    },
    PlaybackResumed {
        track: Track,
        index: usize,
    },
    PlaybackReset {
        track: Track,
    },
}

impl DogmaEvent {
    /// Human-readable line for the event log, `None` for per-item noise.
    pub fn describe(&self) -> Option<String> {
        let line = match self {
            DogmaEvent::SequenceValidated { sequence } => {
                format!("Sequence accepted ({} residues/bases)", sequence.len())
            }
            DogmaEvent::TranscriptionComplete { mrna } => {
                format!("Transcription complete: {} nt of mRNA", mrna.len())
            }
            DogmaEvent::StopEncountered { stop_codon, protein_length } => format!(
                "Stop codon {} reached after {} amino acid(s)",
                stop_codon, protein_length
            ),
            DogmaEvent::TranslationComplete { sequence } => {
                if sequence.is_empty() {
                    "Translation complete: no amino acids".to_string()
                } else {
                    format!("Translation complete: {}", sequence)
                }
            }
            DogmaEvent::ReverseTranslationComplete { mrna, dna } => format!(
                "Reverse translation complete: {} nt mRNA, {} bp DNA",
                mrna.len(),
                dna.len()
            ),
            DogmaEvent::PlaybackStarted { track, total } => {
                format!("{} started ({} steps)", track, total)
            }
            DogmaEvent::PlaybackPaused { track, index } => format!("{} paused at {}", track, index),
            DogmaEvent::PlaybackResumed { track, index } => format!("{} resumed at {}", track, index),
            DogmaEvent::PlaybackReset { track } => format!("{} reset", track),
            DogmaEvent::NucleotideTranscribed { .. }
            | DogmaEvent::CodonTranslated { .. }
            | DogmaEvent::CodonSelected { .. } => return None,
        };
        Some(line)
    }
}

/// What the user asked to simulate.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Dna(Sequence),
    Protein(ProteinChain),
}

/// Results of a simulation computed without animation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Forward {
        dna: Sequence,
        mrna: Sequence,
        protein: ProteinChain,
    },
    Reverse(ReverseTranslation),
}

impl Outcome {
    /// Plain-text report, sequences in codon groups wrapped to `width`.
    pub fn report(&self, width: usize) -> String {
        match self {
            Outcome::Forward { dna, mrna, protein } => {
                let wrap = |s: &str| textwrap::fill(&codon_groups(s), width.max(12));
                let names = if protein.is_empty() {
                    "(none)".to_string()
                } else {
                    protein.names()
                };
                format!(
                    "DNA ({} bp):\n{}\nmRNA ({} nt):\n{}\nProtein ({} aa): {}\nOne-letter: {}\nNames: {}\n",
                    dna.len(),
                    wrap(dna.as_str()),
                    mrna.len(),
                    wrap(mrna.as_str()),
                    protein.len(),
                    protein.abbreviations(),
                    protein.symbols(),
                    names
                )
            }
            Outcome::Reverse(result) => format!("{}\n", result.summary(width)),
        }
    }
}

struct TrackChannel<T> {
    track: Track,
    controller: PlaybackController<T>,
    events: Receiver<PlaybackMessage<T>>,
}

impl<T: Clone + Send + 'static> TrackChannel<T> {
    fn new(track: Track, speed_ms: u64) -> Self {
        let (controller, events) = PlaybackController::new(track.label(), speed_ms);
        Self {
            track,
            controller,
            events,
        }
    }

    fn start(&self, items: Vec<T>, mode: PlaybackMode) -> Result<(), SessionError> {
        self.controller.start(items, mode)?;
        // The driver exits on its own when the run completes or is reset.
        self.controller.spawn()?;
        Ok(())
    }

    /// Pending events of the current run. Leftovers of earlier runs are
    /// dropped.
    fn drain(&self) -> Vec<PlaybackEvent<T>> {
        let run = self.controller.run_id();
        self.events
            .try_iter()
            .filter(|m| m.run == run)
            .map(|m| m.event)
            .collect()
    }

    /// Maps the events every track shares; returns the rest untouched.
    fn common(&self, event: PlaybackEvent<T>) -> Result<DogmaEvent, PlaybackEvent<T>> {
        let track = self.track;
        match event {
            PlaybackEvent::Started { total } => Ok(DogmaEvent::PlaybackStarted { track, total }),
            PlaybackEvent::Paused { index } => Ok(DogmaEvent::PlaybackPaused { track, index }),
            PlaybackEvent::Resumed { index } => Ok(DogmaEvent::PlaybackResumed { track, index }),
            PlaybackEvent::Reset => Ok(DogmaEvent::PlaybackReset { track }),
            other => Err(other),
        }
    }
}

pub struct Session {
    config: SimulationConfig,
    table: Arc<CodonTable>,
    index: Arc<ReverseCodonIndex>,
    usage: Arc<CodonFrequencyTable>,
    validator: SequenceValidator,
    rng: StdRng,
    input: Option<Input>,
    mrna: Option<Sequence>,
    reverse: Option<ReverseTranslation>,
    transcription: TrackChannel<TranscriptionStep>,
    translation: TrackChannel<TranslationStep>,
    reverse_track: TrackChannel<ReverseStep>,
    pending_translation: Option<(Instant, Vec<TranslationStep>)>,
    /// Set while the user holds the simulation paused
    paused_at: Option<Instant>,
    queued: Vec<DogmaEvent>,
}

impl Session {
    pub fn new(config: SimulationConfig, table: CodonTable, usage: CodonFrequencyTable) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let index = ReverseCodonIndex::new(&table);
        Self {
            validator: SequenceValidator::new(config.max_protein_length),
            transcription: TrackChannel::new(Track::Transcription, config.speed_ms),
            translation: TrackChannel::new(Track::Translation, config.speed_ms),
            reverse_track: TrackChannel::new(Track::ReverseTranslation, config.speed_ms),
            config,
            table: Arc::new(table),
            index: Arc::new(index),
            usage: Arc::new(usage),
            rng,
            input: None,
            mrna: None,
            reverse: None,
            pending_translation: None,
            paused_at: None,
            queued: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn table(&self) -> &CodonTable {
        &self.table
    }

    pub fn input(&self) -> Option<&Input> {
        self.input.as_ref()
    }

    /// mRNA of the current forward run, once started.
    pub fn mrna(&self) -> Option<&Sequence> {
        self.mrna.as_ref()
    }

    /// Result of the current reverse run, once started.
    pub fn reverse_result(&self) -> Option<&ReverseTranslation> {
        self.reverse.as_ref()
    }

    pub fn track_state(&self, track: Track) -> PlaybackState {
        match track {
            Track::Transcription => self.transcription.controller.state(),
            Track::Translation => self.translation.controller.state(),
            Track::ReverseTranslation => self.reverse_track.controller.state(),
        }
    }

    /// True while an animation runs or a translation is scheduled.
    pub fn is_busy(&self) -> bool {
        self.pending_translation.is_some()
            || Track::ALL.iter().any(|&t| self.track_state(t).is_active())
    }

    /// Validates and loads a DNA sequence, stopping any current run.
    pub fn load_dna(&mut self, raw: &str) -> Result<(), SessionError> {
        let dna = self.validator.validate_dna(raw)?;
        self.reset();
        tracing::info!(length = dna.len(), "DNA sequence loaded");
        self.queued.push(DogmaEvent::SequenceValidated {
            sequence: dna.as_str().to_string(),
        });
        self.input = Some(Input::Dna(dna));
        Ok(())
    }

    /// Validates and loads a protein sequence, stopping any current run.
    pub fn load_protein(&mut self, raw: &str) -> Result<(), SessionError> {
        let protein = self.validator.validate_protein(raw)?;
        self.reset();
        tracing::info!(length = protein.len(), "protein sequence loaded");
        self.queued.push(DogmaEvent::SequenceValidated {
            sequence: protein.symbols(),
        });
        self.input = Some(Input::Protein(protein));
        Ok(())
    }

    /// Computes the whole simulation for the loaded input at once.
    pub fn simulate(&mut self) -> Result<Outcome, SessionError> {
        match self.input.clone() {
            None => Err(SessionError::NoSequence),
            Some(Input::Dna(dna)) => {
                let mrna = transcribe(&dna);
                let protein = translate(&mrna, &self.table)?;
                Ok(Outcome::Forward { dna, mrna, protein })
            }
            Some(Input::Protein(protein)) => Ok(Outcome::Reverse(self.reverse_translate(&protein)?)),
        }
    }

    /// Starts the animation for the loaded input.
    ///
    /// For DNA, transcription starts now and translation after the
    /// configured delay. For a protein, codons are chosen up front and the
    /// reverse track replays them.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let mode = self.config.mode;
        match self.input.clone() {
            None => Err(SessionError::NoSequence),
            Some(Input::Dna(dna)) => {
                if self.is_busy() {
                    return Err(StateError::AlreadyRunning(PlaybackState::Running).into());
                }
                let mrna = transcribe(&dna);
                let codons = translation_steps(&mrna, &self.table)?;
                self.transcription.start(transcription_steps(&dna), mode)?;
                let delay = Duration::from_millis(self.config.translation_delay_ms);
                self.pending_translation = Some((Instant::now() + delay, codons));
                self.paused_at = None;
                self.mrna = Some(mrna);
                Ok(())
            }
            Some(Input::Protein(protein)) => {
                let result = self.reverse_translate(&protein)?;
                self.reverse_track.start(result.steps.clone(), mode)?;
                self.paused_at = None;
                self.reverse = Some(result);
                Ok(())
            }
        }
    }

    fn reverse_translate(&mut self, protein: &ProteinChain) -> Result<ReverseTranslation, SessionError> {
        let selector = CodonSelector::new(&self.index, &self.usage);
        let result = reverse_translate(protein, self.config.strategy, &selector, &mut self.rng)?;
        tracing::info!(
            strategy = %self.config.strategy,
            codons = result.codon_count(),
            "reverse translation computed"
        );
        Ok(result)
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Pauses the simulation, or resumes it if it is paused.
    pub fn toggle_pause(&mut self) {
        let any_running = Track::ALL.iter().any(|&t| {
            matches!(
                self.track_state(t),
                PlaybackState::Running | PlaybackState::StepWaiting
            )
        });
        let any_paused = Track::ALL
            .iter()
            .any(|&t| self.track_state(t) == PlaybackState::Paused);
        if self.is_paused() || (any_paused && !any_running) {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Pauses every running track and freezes the countdown of a scheduled
    /// translation.
    pub fn pause(&mut self) {
        if self.paused_at.is_none() && self.is_busy() {
            self.paused_at = Some(Instant::now());
        }
        self.transcription.controller.pause();
        self.translation.controller.pause();
        self.reverse_track.controller.pause();
    }

    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            if let Some((due, _)) = &mut self.pending_translation {
                *due += paused_at.elapsed();
            }
        }
        self.transcription.controller.resume();
        self.translation.controller.resume();
        self.reverse_track.controller.resume();
    }

    /// Releases one item on every track in step mode.
    pub fn step(&mut self) {
        self.transcription.controller.step();
        self.translation.controller.step();
        self.reverse_track.controller.step();
    }

    /// Stops all tracks and cancels a scheduled translation.
    pub fn reset(&mut self) {
        self.pending_translation = None;
        self.paused_at = None;
        if self.transcription.controller.state() != PlaybackState::Idle {
            self.transcription.controller.reset();
        }
        if self.translation.controller.state() != PlaybackState::Idle {
            self.translation.controller.reset();
        }
        if self.reverse_track.controller.state() != PlaybackState::Idle {
            self.reverse_track.controller.reset();
        }
        self.mrna = None;
        self.reverse = None;
    }

    /// Sets the duration of a whole animation.
    pub fn set_speed(&mut self, speed_ms: u64) -> Result<(), SessionError> {
        if speed_ms == 0 {
            return Err(ConfigError::NotPositive("speed").into());
        }
        self.config.speed_ms = speed_ms;
        self.transcription.controller.set_speed(speed_ms);
        self.translation.controller.set_speed(speed_ms);
        self.reverse_track.controller.set_speed(speed_ms);
        tracing::debug!(speed_ms, "speed changed");
        Ok(())
    }

    /// Takes effect on the next start.
    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.config.mode = mode;
    }

    /// Takes effect on the next start.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.config.strategy = strategy;
    }

    /// Starts a scheduled translation if due and collects pending events.
    /// The countdown does not run while the simulation is paused.
    pub fn poll(&mut self, now: Instant) -> Result<Vec<DogmaEvent>, SessionError> {
        let due_now = matches!(&self.pending_translation, Some((due, _)) if *due <= now);
        if due_now && !self.is_paused() {
            if let Some((_, codons)) = self.pending_translation.take() {
                self.translation.start(codons, self.config.mode)?;
            }
        }

        let mut out = std::mem::take(&mut self.queued);

        for event in self.transcription.drain() {
            match self.transcription.common(event) {
                Ok(mapped) => out.push(mapped),
                Err(PlaybackEvent::StepCompleted { item, .. }) => {
                    out.push(DogmaEvent::NucleotideTranscribed {
                        index: item.index,
                        template: item.template,
                        transcript: item.transcript,
                    })
                }
                Err(PlaybackEvent::Completed { items }) => out.push(DogmaEvent::TranscriptionComplete {
                    mrna: items.iter().map(|s| s.transcript).collect(),
                }),
                Err(_) => {}
            }
        }

        for event in self.translation.drain() {
            match self.translation.common(event) {
                Ok(mapped) => out.push(mapped),
                Err(PlaybackEvent::StepCompleted { item, .. }) if item.is_stop() => {
                    out.push(DogmaEvent::StopEncountered {
                        stop_codon: item.codon,
                        protein_length: item.index,
                    })
                }
                Err(PlaybackEvent::StepCompleted { item, .. }) => out.push(DogmaEvent::CodonTranslated {
                    codon: item.codon,
                    amino_acid: item.amino_acid,
                    protein_length: item.index + 1,
                }),
                Err(PlaybackEvent::Completed { items }) => {
                    let chain: ProteinChain = items
                        .iter()
                        .filter(|s| !s.is_stop())
                        .map(|s| s.amino_acid)
                        .collect::<Vec<_>>()
                        .into();
                    out.push(DogmaEvent::TranslationComplete {
                        sequence: chain.names(),
                    })
                }
                Err(_) => {}
            }
        }

        for event in self.reverse_track.drain() {
            match self.reverse_track.common(event) {
                Ok(mapped) => out.push(mapped),
                Err(PlaybackEvent::StepCompleted { item, .. }) => out.push(DogmaEvent::CodonSelected {
                    index: item.index,
                    amino_acid: item.amino_acid,
                    codon: item.codon,
                }),
                Err(PlaybackEvent::Completed { .. }) => {
                    if let Some(result) = &self.reverse {
                        out.push(DogmaEvent::ReverseTranslationComplete {
                            mrna: result.mrna.as_str().to_string(),
                            dna: result.dna.as_str().to_string(),
                        });
                    }
                }
                Err(_) => {}
            }
        }

        Ok(out)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Releases driver threads blocked in a step or pause wait
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::playback::Tick;

    fn session(config: SimulationConfig) -> Session {
        Session::new(config, CodonTable::standard(), CodonFrequencyTable::bundled())
    }

    fn fast_config() -> SimulationConfig {
        SimulationConfig {
            speed_ms: 40,
            translation_delay_ms: 0,
            seed: Some(1),
            ..SimulationConfig::default()
        }
    }

    fn poll_until(session: &mut Session, done: impl Fn(&DogmaEvent) -> bool) -> Vec<DogmaEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        loop {
            events.extend(session.poll(Instant::now()).unwrap());
            if events.iter().any(&done) {
                return events;
            }
            assert!(Instant::now() < deadline, "timed out; got {:?}", events);
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_forward_run() {
        let mut session = session(fast_config());
        session.load_dna("ATGTTTTAA").unwrap();
        session.start().unwrap();
        let events = poll_until(&mut session, |e| matches!(e, DogmaEvent::TranslationComplete { .. }));

        assert_eq!(
            events[0],
            DogmaEvent::SequenceValidated {
                sequence: "ATGTTTTAA".to_string()
            }
        );
        let transcribed = events
            .iter()
            .filter(|e| matches!(e, DogmaEvent::NucleotideTranscribed { .. }))
            .count();
        assert_eq!(transcribed, 9);
        assert!(events.contains(&DogmaEvent::TranscriptionComplete {
            mrna: "AUGUUUUAA".to_string()
        }));
        assert!(events.contains(&DogmaEvent::StopEncountered {
            stop_codon: Codon::parse("UAA").unwrap(),
            protein_length: 2
        }));
        assert!(events.contains(&DogmaEvent::TranslationComplete {
            sequence: "Methionine-Phenylalanine".to_string()
        }));
        assert_eq!(session.mrna().map(|m| m.as_str()), Some("AUGUUUUAA"));
    }

    #[test]
    fn test_reverse_run() {
        let mut session = session(SimulationConfig {
            strategy: Strategy::MostCommon,
            ..fast_config()
        });
        session.load_protein("M*").unwrap();
        session.start().unwrap();
        let events = poll_until(&mut session, |e| {
            matches!(e, DogmaEvent::ReverseTranslationComplete { .. })
        });
        assert!(events.contains(&DogmaEvent::CodonSelected {
            index: 0,
            amino_acid: AminoAcid::Met,
            codon: Codon::parse("AUG").unwrap()
        }));
        assert!(events.contains(&DogmaEvent::ReverseTranslationComplete {
            mrna: "AUGUGA".to_string(),
            dna: "TACACT".to_string()
        }));
    }

    #[test]
    fn test_start_without_sequence() {
        let mut session = session(fast_config());
        assert!(matches!(session.start(), Err(SessionError::NoSequence)));
    }

    #[test]
    fn test_invalid_input_keeps_previous() {
        let mut session = session(fast_config());
        session.load_dna("ATGAAA").unwrap();
        let err = session.load_dna("AT").unwrap_err();
        assert_eq!(err.to_string(), "Sequence length must be divisible by 3 (got 2)");
        assert!(matches!(session.input(), Some(Input::Dna(s)) if s.as_str() == "ATGAAA"));
    }

    #[test]
    fn test_reset_cancels_scheduled_translation() {
        let mut session = session(SimulationConfig {
            speed_ms: 10_000,
            translation_delay_ms: 50,
            ..fast_config()
        });
        session.load_dna("ATGTTTTAA").unwrap();
        session.start().unwrap();
        assert!(session.is_busy());
        session.reset();
        assert!(!session.is_busy());
        assert_eq!(session.track_state(Track::Transcription), PlaybackState::Cancelled);

        thread::sleep(Duration::from_millis(80));
        let events = session.poll(Instant::now()).unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, DogmaEvent::PlaybackStarted { track: Track::Translation, .. })));
        assert_eq!(session.track_state(Track::Translation), PlaybackState::Idle);
    }

    #[test]
    fn test_step_mode() {
        let mut session = session(SimulationConfig {
            mode: PlaybackMode::Step,
            translation_delay_ms: 60_000,
            ..fast_config()
        });
        session.load_dna("ATGCCC").unwrap();
        session.start().unwrap();
        session.step();
        let events = poll_until(&mut session, |e| matches!(e, DogmaEvent::NucleotideTranscribed { .. }));
        assert!(events.contains(&DogmaEvent::NucleotideTranscribed {
            index: 0,
            template: 'A',
            transcript: 'A'
        }));
        session.reset();
    }

    #[test]
    fn test_translation_waits_for_delay() {
        let mut session = session(SimulationConfig {
            speed_ms: 30,
            translation_delay_ms: 200,
            ..fast_config()
        });
        session.load_dna("ATGTTTTAA").unwrap();
        let began = Instant::now();
        session.start().unwrap();

        let events = poll_until(&mut session, |e| {
            matches!(e, DogmaEvent::PlaybackStarted { track: Track::Translation, .. })
        });
        assert!(began.elapsed() >= Duration::from_millis(200), "started after {:?}", began.elapsed());
        assert!(events.contains(&DogmaEvent::TranscriptionComplete {
            mrna: "AUGUUUUAA".to_string()
        }));
        session.reset();
    }

    #[test]
    fn test_pause_holds_scheduled_translation() {
        let mut session = session(SimulationConfig {
            speed_ms: 10_000,
            translation_delay_ms: 50,
            ..fast_config()
        });
        session.load_dna("ATGTTTTAA").unwrap();
        session.start().unwrap();
        session.toggle_pause();
        assert!(session.is_paused());

        thread::sleep(Duration::from_millis(100));
        session.poll(Instant::now()).unwrap();
        assert_eq!(session.track_state(Track::Transcription), PlaybackState::Paused);
        assert_eq!(session.track_state(Track::Translation), PlaybackState::Idle);

        // One press resumes; the remaining delay counts from here
        session.toggle_pause();
        assert!(!session.is_paused());
        assert_eq!(session.track_state(Track::Transcription), PlaybackState::Running);
        session.poll(Instant::now()).unwrap();
        assert_eq!(session.track_state(Track::Translation), PlaybackState::Idle);

        poll_until(&mut session, |e| {
            matches!(e, DogmaEvent::PlaybackStarted { track: Track::Translation, .. })
        });
        assert_eq!(session.track_state(Track::Translation), PlaybackState::Running);
        session.reset();
    }

    #[test]
    fn test_toggle_resumes_when_only_paused_tracks() {
        let mut session = session(SimulationConfig {
            speed_ms: 10_000,
            ..fast_config()
        });
        session.load_protein("MKV*").unwrap();
        session.start().unwrap();
        session.reverse_track.controller.pause();
        session.toggle_pause();
        assert_eq!(session.track_state(Track::ReverseTranslation), PlaybackState::Running);
        session.reset();
    }

    #[test]
    fn test_drop_releases_waiting_driver() {
        let mut session = session(SimulationConfig {
            mode: PlaybackMode::Step,
            ..fast_config()
        });
        session.load_protein("MK*").unwrap();
        session.start().unwrap();
        let track = session.reverse_track.controller.clone();
        let deadline = Instant::now() + Duration::from_secs(2);
        while track.state() != PlaybackState::StepWaiting {
            assert!(Instant::now() < deadline);
            thread::sleep(Duration::from_millis(5));
        }

        drop(session);
        assert_eq!(track.state(), PlaybackState::Cancelled);
        assert_eq!(track.advance(), Tick::Halted);
    }

    #[test]
    fn test_simulate() {
        let mut session = session(fast_config());
        session.load_dna("ATGTTTTAA").unwrap();
        match session.simulate().unwrap() {
            Outcome::Forward { protein, .. } => assert_eq!(protein.symbols(), "MF"),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_reports() {
        let mut session = session(SimulationConfig {
            strategy: Strategy::MostCommon,
            ..fast_config()
        });
        session.load_dna("ATGTTTTAA").unwrap();
        let report = session.simulate().unwrap().report(60);
        assert!(report.contains("mRNA (9 nt):\nAUG UUU UAA"));
        assert!(report.contains("Protein (2 aa): "));
        assert!(report.contains("One-letter: MF"));
        assert!(report.contains("Names: Methionine-Phenylalanine"));

        session.load_protein("M*").unwrap();
        let report = session.simulate().unwrap().report(60);
        assert!(report.contains("AUG UGA"));
        assert!(report.contains("TAC ACT"));
    }

    #[test]
    fn test_zero_speed_rejected() {
        let mut session = session(fast_config());
        assert!(session.set_speed(0).is_err());
        assert!(session.set_speed(500).is_ok());
        assert_eq!(session.config().speed_ms, 500);
    }

    #[test]
    fn test_describe() {
        let event = DogmaEvent::TranslationComplete {
            sequence: "Methionine".to_string(),
        };
        assert_eq!(event.describe().as_deref(), Some("Translation complete: Methionine"));
        let step = DogmaEvent::CodonSelected {
            index: 0,
            amino_acid: AminoAcid::Met,
            codon: Codon::parse("AUG").unwrap(),
        };
        assert_eq!(step.describe(), None);
    }
}
