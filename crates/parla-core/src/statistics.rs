//! Progress statistics: card status buckets, level coverage, weekly activity,
//! accuracy and streak.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Level, VocabCard};
use crate::srs::SrsState;
use crate::store::{DailyActivity, SessionRecord};

/// Interval (days) from which a card counts as mastered.
pub const MASTERED_INTERVAL: u32 = 30;

/// Interval (days) from which a card counts as in review.
pub const REVIEW_INTERVAL: u32 = 7;

/// Sessions shown in the recent list.
const RECENT_SESSIONS: usize = 7;

/// Cards per review status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Never reviewed.
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub mastered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    /// CEFR level, or `?` for cards without one.
    pub level: String,
    pub total: usize,
    pub mastered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// One cell of the weekly heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    /// Short weekday name ("Mon").
    pub weekday: String,
    pub active: bool,
    pub count: u32,
}

/// Everything shown on the progress dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_cards: usize,
    pub due_today: usize,
    pub streak: u32,
    pub status: StatusCounts,
    pub levels: Vec<LevelStats>,
    /// Reviewed cards per tag, most reviewed first.
    pub tags: Vec<TagCount>,
    /// The last seven days, oldest first.
    pub heatmap: Vec<HeatmapDay>,
    /// Percentage of ratings >= 3, rounded.
    pub accuracy: u32,
    pub total_reviews: usize,
    /// Most recent first.
    pub recent_sessions: Vec<SessionRecord>,
}

/// Compute dashboard statistics over the learner's vocabulary.
pub fn compute_stats(
    vocab: &[VocabCard],
    state: &SrsState,
    activity: &DailyActivity,
    sessions: &[SessionRecord],
    today: NaiveDate,
) -> ProgressStats {
    let mut status = StatusCounts::default();
    let mut due_today = 0;
    let mut levels: HashMap<Option<Level>, (usize, usize)> = HashMap::new();
    let mut tags: HashMap<&str, usize> = HashMap::new();

    for card in vocab {
        let srs = state.get(&card.id);
        let entry = levels.entry(card.level).or_default();
        entry.0 += 1;

        match srs {
            None => {
                status.new += 1;
                due_today += 1;
            }
            Some(srs) => {
                if srs.interval >= MASTERED_INTERVAL {
                    status.mastered += 1;
                    entry.1 += 1;
                } else if srs.interval >= REVIEW_INTERVAL {
                    status.review += 1;
                } else {
                    status.learning += 1;
                }
                if srs.is_due(today) {
                    due_today += 1;
                }
                if let Some(tag) = card.tag.as_deref() {
                    *tags.entry(tag).or_default() += 1;
                }
            }
        }
    }

    let levels = Level::ALL
        .iter()
        .map(|l| Some(*l))
        .chain(std::iter::once(None))
        .filter_map(|level| {
            levels.get(&level).map(|(total, mastered)| LevelStats {
                level: level.map_or_else(|| "?".to_string(), |l| l.to_string()),
                total: *total,
                mastered: *mastered,
            })
        })
        .collect();

    let mut tags: Vec<TagCount> = tags
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));

    let (passed, total_reviews) = activity
        .values()
        .flat_map(|day| day.qualities.iter())
        .fold((0usize, 0usize), |(passed, total), q| {
            (passed + usize::from(q.is_pass()), total + 1)
        });
    let accuracy = if total_reviews == 0 {
        0
    } else {
        (passed as f64 / total_reviews as f64 * 100.0).round() as u32
    };

    ProgressStats {
        total_cards: vocab.len(),
        due_today,
        streak: compute_streak(sessions, activity, today),
        status,
        levels,
        tags,
        heatmap: weekly_heatmap(activity, today),
        accuracy,
        total_reviews,
        recent_sessions: sessions.iter().rev().take(RECENT_SESSIONS).cloned().collect(),
    }
}

/// Activity for the seven days ending today.
pub fn weekly_heatmap(activity: &DailyActivity, today: NaiveDate) -> Vec<HeatmapDay> {
    (0..7u64)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| {
            let day = activity.get(&date);
            HeatmapDay {
                date,
                weekday: date.weekday().to_string(),
                active: day.is_some(),
                count: day.map_or(0, |d| d.cards_reviewed),
            }
        })
        .collect()
}

/// Consecutive practice days ending today or yesterday.
///
/// A day counts when it has a finished lesson or at least one card review.
/// No streak is counted before the first lesson is saved.
pub fn compute_streak(sessions: &[SessionRecord], activity: &DailyActivity, today: NaiveDate) -> u32 {
    if sessions.is_empty() {
        return 0;
    }

    let days: BTreeSet<NaiveDate> = sessions
        .iter()
        .map(|s| s.date)
        .chain(activity.keys().copied())
        .filter(|d| *d <= today)
        .collect();

    let Some(&latest) = days.last() else {
        return 0;
    };
    if latest != today && Some(latest) != today.pred_opt() {
        return 0;
    }

    let mut streak = 0;
    let mut cursor = Some(latest);
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}
