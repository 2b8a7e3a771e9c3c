//! Core data model types for parla.
//!
//! Vocabulary cards, CEFR levels, practice modes and conversation topics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single vocabulary card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabCard {
    /// Unique identifier, stable across sessions.
    pub id: String,
    /// Italian word or phrase.
    pub it: String,
    /// English meaning.
    pub en: String,
    /// Example sentence in Italian.
    #[serde(default)]
    pub ex: String,
    /// Thematic tag (e.g. "sport", "mistakes").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// CEFR level, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
}

/// CEFR proficiency levels covered by the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::A1, Level::A2, Level::B1, Level::B2];
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::A1 => write!(f, "A1"),
            Level::A2 => write!(f, "A2"),
            Level::B1 => write!(f, "B1"),
            Level::B2 => write!(f, "B2"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            "B2" => Ok(Level::B2),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// How a flashcard is presented during practice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    /// Italian on the front, English on the back.
    #[default]
    Classic,
    /// English on the front, Italian on the back.
    Reverse,
    /// Italian only; the learner translates by ear.
    Listening,
    /// Fill the blank in the example sentence.
    Cloze,
}

impl fmt::Display for PracticeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PracticeMode::Classic => write!(f, "classic"),
            PracticeMode::Reverse => write!(f, "reverse"),
            PracticeMode::Listening => write!(f, "listening"),
            PracticeMode::Cloze => write!(f, "cloze"),
        }
    }
}

impl FromStr for PracticeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(PracticeMode::Classic),
            "reverse" => Ok(PracticeMode::Reverse),
            "listening" => Ok(PracticeMode::Listening),
            "cloze" => Ok(PracticeMode::Cloze),
            other => Err(format!("unknown practice mode: {other}")),
        }
    }
}

/// A conversation topic for the chat tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    /// Italian display name.
    pub name: String,
    /// Opening question the tutor asks.
    pub question: String,
    /// Vocabulary tag preferred when picking warm-up cards.
    #[serde(default)]
    pub tag_filter: Option<String>,
}
