//! Local progress store.
//!
//! Every piece of learner state is a small JSON document in one data
//! directory:
//!
//! ```text
//! <data-dir>/
//! ├── srs.json            # card id -> review statistics
//! ├── user-vocab.json     # cards created from conversations
//! ├── sessions.json       # completed lesson records
//! ├── settings.json       # learner preferences
//! ├── daily.json          # date -> cards reviewed and ratings
//! ├── last-topic.json     # topic of the last lesson
//! └── last-feedback.json  # topic and feedback of the last lesson
//! ```
//!
//! Missing documents read as their empty or default value.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::{PracticeMode, VocabCard};
use crate::srs::{get_or_create_card, sm2, Feedback, Quality, SrsCard, SrsState};
use crate::statistics::compute_streak;

const SRS_DOC: &str = "srs";
const USER_VOCAB_DOC: &str = "user-vocab";
const SESSIONS_DOC: &str = "sessions";
const SETTINGS_DOC: &str = "settings";
const DAILY_DOC: &str = "daily";
const LAST_TOPIC_DOC: &str = "last-topic";
const LAST_FEEDBACK_DOC: &str = "last-feedback";

/// A completed lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub date: NaiveDate,
    /// Topic display name.
    pub topic: String,
    pub cards_reviewed: u32,
    pub errors_count: u32,
    pub new_phrases_count: u32,
    pub feedback: Feedback,
    pub duration_secs: u64,
}

/// Reviews done on one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayActivity {
    pub cards_reviewed: u32,
    #[serde(default)]
    pub qualities: Vec<Quality>,
}

/// Date -> activity.
pub type DailyActivity = BTreeMap<NaiveDate, DayActivity>;

/// Topic and feedback of the most recent lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastFeedback {
    pub topic: String,
    pub feedback: Feedback,
}

/// Learner preferences. Stored fields override the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub muted: bool,
    /// Cards to review per day.
    pub daily_goal: u32,
    pub auto_speak: bool,
    pub speech_rate: f64,
    pub preferred_mode: PracticeMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            daily_goal: 20,
            auto_speak: true,
            speech_rate: 0.85,
            preferred_mode: PracticeMode::Classic,
        }
    }
}

/// A partial settings update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub muted: Option<bool>,
    pub daily_goal: Option<u32>,
    pub auto_speak: Option<bool>,
    pub speech_rate: Option<f64>,
    pub preferred_mode: Option<PracticeMode>,
}

impl SettingsPatch {
    /// Parse a `key=value` assignment, accepting snake_case or camelCase keys.
    pub fn parse_assignment(assignment: &str) -> Result<Self> {
        let (key, value) = assignment
            .split_once('=')
            .with_context(|| format!("expected key=value, got '{assignment}'"))?;
        let value = value.trim();
        let mut patch = SettingsPatch::default();

        match key.trim() {
            "muted" => patch.muted = Some(parse_bool(value)?),
            "auto_speak" | "autoSpeak" => patch.auto_speak = Some(parse_bool(value)?),
            "daily_goal" | "dailyGoal" => {
                let goal: u32 = value
                    .parse()
                    .with_context(|| format!("invalid daily goal: '{value}'"))?;
                anyhow::ensure!(goal >= 1, "daily goal must be at least 1");
                patch.daily_goal = Some(goal);
            }
            "speech_rate" | "speechRate" => {
                let rate: f64 = value
                    .parse()
                    .with_context(|| format!("invalid speech rate: '{value}'"))?;
                anyhow::ensure!(
                    rate > 0.0 && rate <= 2.0,
                    "speech rate must be in (0.0, 2.0]"
                );
                patch.speech_rate = Some(rate);
            }
            "preferred_mode" | "preferredMode" | "mode" => {
                patch.preferred_mode = Some(value.parse().map_err(|e: String| anyhow::anyhow!(e))?);
            }
            other => anyhow::bail!("unknown setting: '{other}'"),
        }

        Ok(patch)
    }

    /// Combine two patches; fields set in `other` win.
    pub fn merge(self, other: SettingsPatch) -> SettingsPatch {
        SettingsPatch {
            muted: other.muted.or(self.muted),
            daily_goal: other.daily_goal.or(self.daily_goal),
            auto_speak: other.auto_speak.or(self.auto_speak),
            speech_rate: other.speech_rate.or(self.speech_rate),
            preferred_mode: other.preferred_mode.or(self.preferred_mode),
        }
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(v) = self.muted {
            settings.muted = v;
        }
        if let Some(v) = self.daily_goal {
            settings.daily_goal = v;
        }
        if let Some(v) = self.auto_speak {
            settings.auto_speak = v;
        }
        if let Some(v) = self.speech_rate {
            settings.speech_rate = v;
        }
        if let Some(v) = self.preferred_mode {
            settings.preferred_mode = v;
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => anyhow::bail!("expected true or false, got '{other}'"),
    }
}

/// JSON-document store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn doc_path(&self, doc: &str) -> PathBuf {
        self.dir.join(format!("{doc}.json"))
    }

    fn read_doc<T: DeserializeOwned + Default>(&self, doc: &str) -> Result<T> {
        let path = self.doc_path(doc);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    fn write_doc<T: Serialize + ?Sized>(&self, doc: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create data directory {}", self.dir.display()))?;
        let path = self.doc_path(doc);
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {doc}"))?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "saved");
        Ok(())
    }

    fn remove_doc(&self, doc: &str) -> Result<()> {
        let path = self.doc_path(doc);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
        Ok(())
    }

    // ==================== Review statistics ====================

    pub fn load_srs(&self) -> Result<SrsState> {
        self.read_doc(SRS_DOC)
    }

    pub fn save_srs(&self, state: &SrsState) -> Result<()> {
        self.write_doc(SRS_DOC, state)
    }

    /// Review one flashcard: update its schedule and log the rating for today.
    pub fn review_card(&self, id: &str, quality: Quality, today: NaiveDate) -> Result<SrsCard> {
        let mut state = self.load_srs()?;
        let current = get_or_create_card(&state, id, today);
        let updated = sm2(&current, quality, today);
        state.insert(id.to_string(), updated.clone());
        self.save_srs(&state)?;
        self.record_card_review(quality, today)?;
        Ok(updated)
    }

    /// Apply warm-up outcomes (knew it / didn't) to the schedule.
    pub fn apply_recall_results(&self, results: &[(String, bool)], today: NaiveDate) -> Result<()> {
        let mut state = self.load_srs()?;
        for (id, knew) in results {
            let current = get_or_create_card(&state, id, today);
            state.insert(id.clone(), sm2(&current, Quality::from_recall(*knew), today));
        }
        self.save_srs(&state)
    }

    // ==================== User vocabulary ====================

    pub fn load_user_vocab(&self) -> Result<Vec<VocabCard>> {
        self.read_doc(USER_VOCAB_DOC)
    }

    pub fn save_user_vocab(&self, cards: &[VocabCard]) -> Result<()> {
        self.write_doc(USER_VOCAB_DOC, cards)
    }

    /// Append cards, skipping ids already present. Returns how many were added.
    pub fn add_user_vocab(&self, new_cards: &[VocabCard]) -> Result<usize> {
        let mut existing = self.load_user_vocab()?;
        let before = existing.len();
        for card in new_cards {
            if !existing.iter().any(|c| c.id == card.id) {
                existing.push(card.clone());
            }
        }
        let added = existing.len() - before;
        self.save_user_vocab(&existing)?;
        Ok(added)
    }

    // ==================== Sessions ====================

    pub fn load_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.read_doc(SESSIONS_DOC)
    }

    pub fn save_session(&self, session: &SessionRecord) -> Result<()> {
        let mut sessions = self.load_sessions()?;
        sessions.push(session.clone());
        self.write_doc(SESSIONS_DOC, &sessions)
    }

    /// Consecutive days with a lesson or a review, ending today or yesterday.
    pub fn streak(&self, today: NaiveDate) -> Result<u32> {
        let sessions = self.load_sessions()?;
        let activity = self.load_daily_activity()?;
        Ok(compute_streak(&sessions, &activity, today))
    }

    // ==================== Settings ====================

    pub fn load_settings(&self) -> Result<Settings> {
        self.read_doc(SETTINGS_DOC)
    }

    /// Merge a partial update into the stored settings.
    pub fn save_settings(&self, patch: &SettingsPatch) -> Result<Settings> {
        let mut settings = self.load_settings()?;
        patch.apply(&mut settings);
        self.write_doc(SETTINGS_DOC, &settings)?;
        Ok(settings)
    }

    // ==================== Daily activity ====================

    pub fn load_daily_activity(&self) -> Result<DailyActivity> {
        self.read_doc(DAILY_DOC)
    }

    pub fn record_card_review(&self, quality: Quality, today: NaiveDate) -> Result<()> {
        let mut activity = self.load_daily_activity()?;
        let day = activity.entry(today).or_default();
        day.cards_reviewed += 1;
        day.qualities.push(quality);
        self.write_doc(DAILY_DOC, &activity)
    }

    pub fn today_reviewed(&self, today: NaiveDate) -> Result<u32> {
        Ok(self
            .load_daily_activity()?
            .get(&today)
            .map_or(0, |d| d.cards_reviewed))
    }

    // ==================== Topic rotation ====================

    pub fn load_last_topic(&self) -> Result<Option<String>> {
        self.read_doc(LAST_TOPIC_DOC)
    }

    pub fn save_last_topic(&self, topic_id: &str) -> Result<()> {
        self.write_doc(LAST_TOPIC_DOC, topic_id)
    }

    pub fn load_last_feedback(&self) -> Result<Option<LastFeedback>> {
        self.read_doc(LAST_FEEDBACK_DOC)
    }

    pub fn save_last_feedback(&self, topic_id: &str, feedback: Feedback) -> Result<()> {
        self.write_doc(
            LAST_FEEDBACK_DOC,
            &LastFeedback {
                topic: topic_id.to_string(),
                feedback,
            },
        )
    }

    // ==================== Export / reset ====================

    /// Every stored document as one pretty-printed JSON object keyed by name.
    ///
    /// Documents that are not valid JSON are exported as raw strings.
    pub fn export_all(&self) -> Result<String> {
        let mut data = serde_json::Map::new();

        if self.dir.is_dir() {
            let mut paths = fs::read_dir(&self.dir)
                .with_context(|| format!("failed to read {}", self.dir.display()))?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            paths.sort();

            for path in paths {
                if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
                data.insert(name.to_string(), value);
            }
        }

        serde_json::to_string_pretty(&serde_json::Value::Object(data))
            .context("failed to serialize export")
    }

    /// Forget all review progress. Vocabulary, sessions and settings are kept.
    pub fn reset_srs(&self) -> Result<()> {
        self.remove_doc(SRS_DOC)?;
        self.remove_doc(DAILY_DOC)?;
        tracing::info!(dir = %self.dir.display(), "review progress reset");
        Ok(())
    }
}
