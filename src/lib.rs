//! # dogmatui - Central Dogma Simulator
//!
//! A terminal simulator of transcription, translation and reverse
//! translation, built on ratatui.
//!
//! ## Architecture
//!
//! Pure sequence transforms at the bottom, one playback engine for every
//! animation, and an event-driven UI on top:
//! - `sequence`: nucleotides, codons, amino acids and protein chains
//! - `genetic_code`: the 64-codon table and its reverse index
//! - `codon_usage`: bundled codon usage frequencies
//! - `validate`: DNA, RNA and protein input validation
//! - `transcription`, `translation`: DNA to mRNA to protein
//! - `codon_select`, `reverse_translation`: protein back to mRNA and DNA
//! - `playback`: cancellable play/pause/step state machine
//! - `session`: owns input, tracks and random source; emits `DogmaEvent`s
//! - `progress`: achievements and quiz scores
//! - `config`, `logging`: settings and tracing setup
//! - `model`, `event`, `ui`, `controller`: the TUI

pub mod codon_select;
pub mod codon_usage;
pub mod config;
pub mod controller;
pub mod event;
pub mod genetic_code;
pub mod logging;
pub mod model;
pub mod playback;
pub mod progress;
pub mod reverse_translation;
pub mod sequence;
pub mod session;
pub mod transcription;
pub mod translation;
pub mod ui;
pub mod validate;
