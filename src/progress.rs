//! Learner progress: achievements, quiz scores and counters.
//!
//! `ProgressStore` only observes `DogmaEvent`s; it never drives the
//! simulation. Persistence is best-effort: a missing or corrupt file starts
//! fresh progress, and a failed save is logged and otherwise ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::session::DogmaEvent;

/// Distinct sequences needed for the explorer achievement.
const EXPLORER_THRESHOLD: usize = 5;
/// Percentage needed to pass a quiz.
pub const PASSING_SCORE: u32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points: u32,
}

pub const ACHIEVEMENTS: [Achievement; 3] = [
    Achievement {
        id: "first_transcription",
        name: "First Transcription",
        description: "Completed your first DNA to mRNA transcription",
        points: 10,
    },
    Achievement {
        id: "mutation_explorer",
        name: "Mutation Explorer",
        description: "Tried 5 different sequences",
        points: 25,
    },
    Achievement {
        id: "perfect_quiz",
        name: "Perfect Score",
        description: "Answered every question of a quiz correctly",
        points: 50,
    },
];

pub fn achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    /// Seconds since the Unix epoch
    pub date: u64,
}

impl QuizScore {
    pub fn passed(&self) -> bool {
        self.percentage >= PASSING_SCORE
    }
}

/// Persisted progress, in the shape of the progress file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    pub completed_lessons: Vec<String>,
    pub quiz_scores: BTreeMap<String, QuizScore>,
    pub achievements: Vec<String>,
    pub total_points: u32,
    pub sequences_tried: Vec<String>,
    pub simulations_completed: u32,
}

#[derive(Debug)]
pub struct ProgressStore {
    progress: Progress,
    path: Option<PathBuf>,
}

impl ProgressStore {
    /// In-memory store that is never saved.
    pub fn in_memory() -> Self {
        Self {
            progress: Progress::default(),
            path: None,
        }
    }

    /// Loads progress from `path`, starting fresh if it is missing or corrupt.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let progress = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "corrupt progress file, starting fresh");
                Progress::default()
            }),
            Err(_) => Progress::default(),
        };
        Self {
            progress,
            path: Some(path),
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.progress.achievements.iter().any(|a| a == id)
    }

    /// Updates progress for one event. Returns the achievement it unlocked,
    /// if any.
    pub fn observe(&mut self, event: &DogmaEvent) -> Option<&'static Achievement> {
        match event {
            DogmaEvent::TranscriptionComplete { .. } => self.unlock("first_transcription"),
            DogmaEvent::TranslationComplete { .. } => {
                self.progress.simulations_completed += 1;
                self.save();
                None
            }
            DogmaEvent::SequenceValidated { sequence } => {
                if self.progress.sequences_tried.contains(sequence) {
                    return None;
                }
                self.progress.sequences_tried.push(sequence.clone());
                self.save();
                if self.progress.sequences_tried.len() >= EXPLORER_THRESHOLD {
                    self.unlock("mutation_explorer")
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Stores a quiz result for `phase` and awards one point per 10%.
    pub fn record_quiz(&mut self, phase: &str, score: u32, total: u32) -> Option<&'static Achievement> {
        let percentage = if total == 0 {
            0
        } else {
            (f64::from(score) * 100.0 / f64::from(total)).round() as u32
        };
        let date = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.progress.quiz_scores.insert(
            phase.to_string(),
            QuizScore {
                score,
                total,
                percentage,
                date,
            },
        );
        self.progress.total_points += (f64::from(percentage) / 10.0).round() as u32;
        let unlocked = if percentage == 100 {
            self.unlock("perfect_quiz")
        } else {
            None
        };
        self.save();
        unlocked
    }

    pub fn reset_progress(&mut self) {
        self.progress = Progress::default();
        self.save();
    }

    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        format!(
            "{} points, {} achievement(s), {} sequence(s) tried, {} simulation(s) completed",
            self.progress.total_points,
            self.progress.achievements.len(),
            self.progress.sequences_tried.len(),
            self.progress.simulations_completed
        )
    }

    fn unlock(&mut self, id: &str) -> Option<&'static Achievement> {
        if self.has_achievement(id) {
            return None;
        }
        let achievement = achievement(id)?;
        self.progress.achievements.push(id.to_string());
        self.progress.total_points += achievement.points;
        tracing::info!(id, points = achievement.points, "achievement unlocked");
        self.save();
        Some(achievement)
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_string_pretty(&self.progress)
            .map_err(std::io::Error::from)
            .and_then(|json| fs::write(path, json));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "failed to save progress");
        }
    }
}
