//! View model for the interactive simulator.
//!
//! `AppState` owns the simulation `Session` and the `ProgressStore`, and
//! keeps what the panels draw: the growing mRNA, the growing protein, the
//! chosen codons and an event log. It only changes in response to user
//! actions and to `DogmaEvent`s drained on each tick.

use std::collections::VecDeque;
use std::time::Instant;

use crate::codon_select::Strategy;
use crate::playback::{PlaybackMode, PlaybackState};
use crate::progress::{ProgressStore, PASSING_SCORE};
use crate::sequence::{AminoAcid, Codon};
use crate::session::{DogmaEvent, Input, Session, Track};
use crate::ui::glyphs::Glyphs;

/// Number of event log lines kept.
pub const LOG_CAPACITY: usize = 200;
const MIN_SPEED_MS: u64 = 100;
const MAX_SPEED_MS: u64 = 60_000;

/// Application mode for handling different input states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Normal mode: single-key playback control
    #[default]
    Normal,
    /// Command input mode (after pressing ':')
    Command(String),
}

/// A parsed `:` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Dna(String),
    Protein(String),
    Run,
    Speed(u64),
    Mode(PlaybackMode),
    Strategy(Strategy),
    Progress,
    /// A finished quiz: phase, correct answers, questions
    Quiz {
        phase: String,
        score: u32,
        total: u32,
    },
    ResetProgress,
}

/// Parses the text typed after `:`.
pub fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();
    let (name, arg) = match input.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (input, ""),
    };
    let need_arg = |what: &str| -> Result<(), String> {
        if arg.is_empty() {
            Err(format!("Usage: :{} {}", name, what))
        } else {
            Ok(())
        }
    };

    match name {
        "q" | "quit" => Ok(Command::Quit),
        "h" | "help" => Ok(Command::Help),
        "run" => Ok(Command::Run),
        "progress" => Ok(Command::Progress),
        "reset-progress" => Ok(Command::ResetProgress),
        "quiz" => {
            need_arg("PHASE SCORE TOTAL")?;
            parse_quiz(arg).ok_or_else(|| format!("Usage: :quiz PHASE SCORE TOTAL (got '{}')", arg))
        }
        "dna" => {
            need_arg("SEQUENCE")?;
            Ok(Command::Dna(arg.to_string()))
        }
        "protein" => {
            need_arg("SEQUENCE")?;
            Ok(Command::Protein(arg.to_string()))
        }
        "speed" => {
            need_arg("MS")?;
            match arg.parse::<u64>() {
                Ok(ms) if ms > 0 => Ok(Command::Speed(ms)),
                _ => Err(format!("Invalid speed: {}", arg)),
            }
        }
        "mode" => {
            need_arg("auto|step")?;
            arg.parse().map(Command::Mode)
        }
        "strategy" => {
            need_arg("NAME")?;
            arg.parse().map(Command::Strategy)
        }
        "" => Err("Empty command".to_string()),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_quiz(arg: &str) -> Option<Command> {
    let mut parts = arg.split_whitespace();
    let phase = parts.next()?.to_string();
    let score = parts.next()?.parse().ok()?;
    let total = parts.next()?.parse().ok()?;
    if parts.next().is_some() || total == 0 || score > total {
        return None;
    }
    Some(Command::Quiz { phase, score, total })
}

/// Transcription panel: template DNA and the mRNA built so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptionView {
    pub template: String,
    pub mrna: String,
    pub complete: bool,
}

/// Translation panel: the mRNA codons and the residues decoded so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationView {
    pub codons: Vec<Codon>,
    pub residues: Vec<AminoAcid>,
    /// Codons read so far, stop included
    pub read: usize,
    pub stop: Option<Codon>,
    pub complete: bool,
}

/// Reverse translation panel: residues and the codons chosen for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseView {
    pub protein: Vec<AminoAcid>,
    pub picks: Vec<(AminoAcid, Codon)>,
    pub summary: Option<String>,
}

/// The complete application state.
pub struct AppState {
    pub session: Session,
    pub progress: ProgressStore,
    pub mode: AppMode,
    pub show_help: bool,
    pub should_quit: bool,
    /// Status message to display
    pub status_message: Option<String>,
    pub log: VecDeque<String>,
    pub transcription: TranscriptionView,
    pub translation: TranslationView,
    pub reverse: ReverseView,
    pub glyphs: Glyphs,
    /// Width used to wrap the reverse translation summary
    pub summary_width: usize,
}

impl AppState {
    pub fn new(session: Session, progress: ProgressStore, glyphs: Glyphs) -> Self {
        Self {
            session,
            progress,
            mode: AppMode::Normal,
            show_help: false,
            should_quit: false,
            status_message: Some("Type :dna SEQUENCE or :protein SEQUENCE, then press s".to_string()),
            log: VecDeque::with_capacity(LOG_CAPACITY),
            transcription: TranscriptionView::default(),
            translation: TranslationView::default(),
            reverse: ReverseView::default(),
            glyphs,
            summary_width: 60,
        }
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }

    fn report<E: std::fmt::Display>(&mut self, error: E) {
        let message = error.to_string();
        tracing::debug!(%message, "user-facing error");
        self.status_message = Some(message);
    }

    fn clear_views(&mut self) {
        self.transcription = TranscriptionView::default();
        self.translation = TranslationView::default();
        self.reverse = ReverseView::default();
    }

    pub fn load_dna(&mut self, raw: &str) {
        match self.session.load_dna(raw) {
            Ok(()) => {
                self.clear_views();
                self.status_message = Some("DNA loaded. Press s to start".to_string());
            }
            Err(e) => self.report(e),
        }
    }

    pub fn load_protein(&mut self, raw: &str) {
        match self.session.load_protein(raw) {
            Ok(()) => {
                self.clear_views();
                self.status_message = Some("Protein loaded. Press s to start".to_string());
            }
            Err(e) => self.report(e),
        }
    }

    pub fn start(&mut self) {
        match self.session.start() {
            Ok(()) => self.status_message = None,
            Err(e) => self.report(e),
        }
    }

    pub fn toggle_pause(&mut self) {
        self.session.toggle_pause();
    }

    pub fn step(&mut self) {
        self.session.step();
        if !self.session.config().mode.is_step() {
            self.status_message = Some("Step mode is off (:mode step)".to_string());
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.clear_views();
        self.status_message = Some("Reset".to_string());
    }

    /// Halves the animation duration.
    pub fn faster(&mut self) {
        let speed = (self.session.config().speed_ms / 2).max(MIN_SPEED_MS);
        self.set_speed(speed);
    }

    /// Doubles the animation duration.
    pub fn slower(&mut self) {
        let speed = (self.session.config().speed_ms * 2).min(MAX_SPEED_MS);
        self.set_speed(speed);
    }

    fn set_speed(&mut self, speed_ms: u64) {
        match self.session.set_speed(speed_ms) {
            Ok(()) => self.status_message = Some(format!("Speed: {} ms", speed_ms)),
            Err(e) => self.report(e),
        }
    }

    pub fn show_help(&mut self) {
        self.show_help = true;
    }

    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.mode = AppMode::Command(String::new());
    }

    /// Handles a character input in command mode.
    pub fn command_input(&mut self, c: char) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.push(c);
        }
    }

    /// Handles backspace in command mode.
    pub fn command_backspace(&mut self) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.pop();
            if cmd.is_empty() {
                self.mode = AppMode::Normal;
            }
        }
    }

    /// Cancels command mode and returns to normal mode.
    pub fn cancel_command(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Executes the current command.
    pub fn execute_command(&mut self) {
        let AppMode::Command(cmd) = std::mem::take(&mut self.mode) else {
            return;
        };
        match parse_command(&cmd) {
            Ok(Command::Quit) => self.should_quit = true,
            Ok(Command::Help) => self.show_help(),
            Ok(Command::Dna(seq)) => self.load_dna(&seq),
            Ok(Command::Protein(seq)) => self.load_protein(&seq),
            Ok(Command::Run) => self.start(),
            Ok(Command::Speed(ms)) => self.set_speed(ms),
            Ok(Command::Mode(mode)) => {
                self.session.set_mode(mode);
                self.status_message = Some(format!("Mode: {} (next run)", mode));
            }
            Ok(Command::Strategy(strategy)) => {
                self.session.set_strategy(strategy);
                self.status_message = Some(format!("Strategy: {} (next run)", strategy.description()));
            }
            Ok(Command::Progress) => self.status_message = Some(self.progress.summary()),
            Ok(Command::Quiz { phase, score, total }) => self.record_quiz(&phase, score, total),
            Ok(Command::ResetProgress) => {
                self.progress.reset_progress();
                self.push_log("Progress reset".to_string());
                self.status_message = Some(self.progress.summary());
            }
            Err(e) => self.status_message = Some(e),
        }
    }

    /// Records a quiz result and reports whether it passed.
    pub fn record_quiz(&mut self, phase: &str, score: u32, total: u32) {
        let unlocked = self.progress.record_quiz(phase, score, total);
        let passed = self
            .progress
            .progress()
            .quiz_scores
            .get(phase)
            .map(|q| (q.percentage, q.passed()));
        let line = match passed {
            Some((percentage, true)) => {
                format!("Quiz {}: {}/{} ({}%), passed", phase, score, total, percentage)
            }
            Some((percentage, false)) => format!(
                "Quiz {}: {}/{} ({}%), {}% needed to pass",
                phase, score, total, percentage, PASSING_SCORE
            ),
            None => return,
        };
        self.push_log(line.clone());
        self.status_message = Some(line);
        if let Some(achievement) = unlocked {
            let line = format!(
                "Achievement unlocked: {} (+{} points)",
                achievement.name, achievement.points
            );
            self.push_log(line);
        }
    }

    /// Drains the session and applies its events.
    pub fn tick(&mut self, now: Instant) {
        match self.session.poll(now) {
            Ok(events) => {
                for event in &events {
                    self.apply_event(event);
                }
            }
            Err(e) => self.report(e),
        }
    }

    pub fn apply_event(&mut self, event: &DogmaEvent) {
        if let Some(achievement) = self.progress.observe(event) {
            let line = format!(
                "Achievement unlocked: {} (+{} points)",
                achievement.name, achievement.points
            );
            self.status_message = Some(line.clone());
            self.push_log(line);
        }
        if let Some(line) = event.describe() {
            self.push_log(line);
        }

        match event {
            DogmaEvent::PlaybackStarted { track, .. } => self.begin_track(*track),
            DogmaEvent::NucleotideTranscribed { transcript, .. } => {
                self.transcription.mrna.push(*transcript);
            }
            DogmaEvent::TranscriptionComplete { mrna } => {
                self.transcription.mrna = mrna.clone();
                self.transcription.complete = true;
            }
            DogmaEvent::CodonTranslated { amino_acid, .. } => {
                self.translation.residues.push(*amino_acid);
                self.translation.read += 1;
            }
            DogmaEvent::StopEncountered { stop_codon, .. } => {
                self.translation.stop = Some(*stop_codon);
                self.translation.read += 1;
            }
            DogmaEvent::TranslationComplete { .. } => self.translation.complete = true,
            DogmaEvent::CodonSelected { amino_acid, codon, .. } => {
                self.reverse.picks.push((*amino_acid, *codon));
            }
            DogmaEvent::ReverseTranslationComplete { .. } => {
                self.reverse.summary = self
                    .session
                    .reverse_result()
                    .map(|r| r.summary(self.summary_width));
            }
            DogmaEvent::PlaybackReset { track } => self.clear_track(*track),
            DogmaEvent::SequenceValidated { .. }
            | DogmaEvent::PlaybackPaused { .. }
            | DogmaEvent::PlaybackResumed { .. } => {}
        }
    }

    fn begin_track(&mut self, track: Track) {
        match track {
            Track::Transcription => {
                let template = match self.session.input() {
                    Some(Input::Dna(dna)) => dna.as_str().to_string(),
                    _ => String::new(),
                };
                self.transcription = TranscriptionView {
                    template,
                    ..TranscriptionView::default()
                };
            }
            Track::Translation => {
                let codons = self
                    .session
                    .mrna()
                    .map(|m| m.triplets().filter_map(Codon::parse).collect())
                    .unwrap_or_default();
                self.translation = TranslationView {
                    codons,
                    ..TranslationView::default()
                };
            }
            Track::ReverseTranslation => {
                let protein = match self.session.input() {
                    Some(Input::Protein(p)) => p.residues().to_vec(),
                    _ => Vec::new(),
                };
                self.reverse = ReverseView {
                    protein,
                    ..ReverseView::default()
                };
            }
        }
    }

    fn clear_track(&mut self, track: Track) {
        match track {
            Track::Transcription => self.transcription = TranscriptionView::default(),
            Track::Translation => self.translation = TranslationView::default(),
            Track::ReverseTranslation => self.reverse = ReverseView::default(),
        }
    }

    pub fn track_state(&self, track: Track) -> PlaybackState {
        self.session.track_state(track)
    }
}
