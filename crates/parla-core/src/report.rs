//! Progress report snapshots with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::statistics::ProgressStats;
use crate::store::Settings;

/// A snapshot of the learner's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub stats: ProgressStats,
    pub settings: Settings,
    /// Cards reviewed on the report day.
    pub today_reviewed: u32,
}

impl ProgressReport {
    pub fn new(stats: ProgressStats, settings: Settings, today_reviewed: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            stats,
            settings,
            today_reviewed,
        }
    }

    /// Progress toward the daily goal, in `0.0..=1.0`.
    pub fn goal_progress(&self) -> f64 {
        if self.settings.daily_goal == 0 {
            return 1.0;
        }
        (f64::from(self.today_reviewed) / f64::from(self.settings.daily_goal)).min(1.0)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ProgressReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::SrsState;
    use crate::statistics::compute_stats;
    use crate::store::DailyActivity;

    fn sample() -> ProgressReport {
        let vocab = crate::deck::builtin_deck().unwrap().cards;
        let stats = compute_stats(
            &vocab,
            &SrsState::new(),
            &DailyActivity::new(),
            &[],
            "2026-03-01".parse().unwrap(),
        );
        ProgressReport::new(stats, Settings::default(), 5)
    }

    #[test]
    fn json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let report = sample();

        report.save_json(&path).unwrap();
        let loaded = ProgressReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.stats, report.stats);
        assert_eq!(loaded.settings, report.settings);
    }

    #[test]
    fn goal_progress_is_capped() {
        let mut report = sample();
        assert!((report.goal_progress() - 0.25).abs() < 1e-9);
        report.today_reviewed = 50;
        assert_eq!(report.goal_progress(), 1.0);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = ProgressReport::load_json(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read report"));
    }
}
