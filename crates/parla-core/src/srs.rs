//! SM-2 spaced-repetition scheduler.
//!
//! Quality ratings (0-5):
//! - 0: complete blackout
//! - 1: incorrect, but the answer was recognised
//! - 2: incorrect, but the answer seemed easy once shown
//! - 3: correct with serious difficulty
//! - 4: correct after hesitation
//! - 5: perfect recall
//!
//! The ease factor is adjusted on every review. A rating below 3 resets the
//! repetition count and schedules the card for tomorrow.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::QualityError;

/// Minimum ease factor allowed.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor given to a card that has never been reviewed.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Review statistics for every card the learner has seen, keyed by card id.
pub type SrsState = BTreeMap<String, SrsCard>;

/// An SM-2 quality rating in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const BLACKOUT: Quality = Quality(0);
    pub const PERFECT: Quality = Quality(5);

    pub fn new(value: u8) -> Result<Self, QualityError> {
        if value <= 5 {
            Ok(Quality(value))
        } else {
            Err(QualityError(i64::from(value)))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether the rating counts as a successful recall.
    pub fn is_pass(self) -> bool {
        self.0 >= 3
    }

    /// Quality for a warm-up card the learner did or did not know.
    pub fn from_recall(knew: bool) -> Self {
        if knew {
            Quality(4)
        } else {
            Quality(1)
        }
    }
}

impl TryFrom<u8> for Quality {
    type Error = QualityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

impl TryFrom<i64> for Quality {
    type Error = QualityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| QualityError(value))
            .and_then(Quality::new)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Self-assessed difficulty after reviewing a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Easy,
    Good,
    Hard,
}

impl Feedback {
    pub const ALL: [Feedback; 3] = [Feedback::Easy, Feedback::Good, Feedback::Hard];

    /// Map feedback onto the SM-2 quality scale.
    pub fn quality(self) -> Quality {
        match self {
            Feedback::Easy => Quality(5),
            Feedback::Good => Quality(3),
            Feedback::Hard => Quality(1),
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Easy => write!(f, "easy"),
            Feedback::Good => write!(f, "good"),
            Feedback::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Feedback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Ok(Feedback::Easy),
            "good" | "g" => Ok(Feedback::Good),
            "hard" | "h" => Ok(Feedback::Hard),
            other => Err(format!("unknown feedback: {other}")),
        }
    }
}

/// Review statistics for one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsCard {
    pub id: String,
    /// SM-2 ease factor, never below [`MIN_EASE_FACTOR`].
    pub ease_factor: f64,
    /// Current interval in days.
    pub interval: u32,
    /// Consecutive successful reviews.
    pub repetitions: u32,
    /// First day the card is due again.
    pub next_review: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<NaiveDate>,
}

impl SrsCard {
    /// A card that has never been reviewed, due today.
    pub fn new(id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            next_review: today,
            last_review: None,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }
}

/// Apply one review to a card and return its updated statistics.
///
/// EF' = max(1.3, EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)))
pub fn sm2(card: &SrsCard, quality: Quality, today: NaiveDate) -> SrsCard {
    let q = f64::from(quality.value());
    let ease_factor =
        (card.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASE_FACTOR);

    let (interval, repetitions) = if quality.is_pass() {
        let repetitions = card.repetitions.saturating_add(1);
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            // Scaled by the updated ease factor.
            _ => ((f64::from(card.interval) * ease_factor).round() as u32).max(1),
        };
        (interval, repetitions)
    } else {
        (1, 0)
    };

    SrsCard {
        id: card.id.clone(),
        ease_factor,
        interval,
        repetitions,
        next_review: today
            .checked_add_days(Days::new(u64::from(interval)))
            .unwrap_or(NaiveDate::MAX),
        last_review: Some(today),
    }
}

/// Look up a card's statistics, or start fresh ones for an unseen card.
pub fn get_or_create_card(state: &SrsState, id: &str, today: NaiveDate) -> SrsCard {
    state
        .get(id)
        .cloned()
        .unwrap_or_else(|| SrsCard::new(id, today))
}

/// Filter `ids` down to the cards due today, keeping input order.
///
/// Cards without statistics are new and always due.
pub fn due_cards<'a, I>(state: &SrsState, ids: I, today: NaiveDate) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter()
        .filter(|id| state.get(*id).map_or(true, |card| card.is_due(today)))
        .map(str::to_string)
        .collect()
}

/// Interval each feedback choice would produce, in `Feedback::ALL` order.
pub fn preview_intervals(card: &SrsCard, today: NaiveDate) -> [(Feedback, u32); 3] {
    Feedback::ALL.map(|fb| (fb, sm2(card, fb.quality(), today).interval))
}

/// Format an interval in days as a short human-readable string.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{days}d"),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
