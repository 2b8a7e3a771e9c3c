//! The `parla stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use parla_core::report::ProgressReport;
use parla_core::statistics::compute_stats;

use super::{goal_line, today, Context};

/// Tags listed in the summary.
const TOP_TAGS: usize = 8;

pub fn execute(
    ctx: &Context,
    json: Option<PathBuf>,
    html: Option<PathBuf>,
    vocab_path: Option<PathBuf>,
) -> Result<()> {
    let today = today();
    let vocab = ctx.vocab(vocab_path.as_deref())?;
    let state = ctx.store.load_srs()?;
    let activity = ctx.store.load_daily_activity()?;
    let sessions = ctx.store.load_sessions()?;
    let settings = ctx.store.load_settings()?;

    let stats = compute_stats(&vocab, &state, &activity, &sessions, today);
    let today_reviewed = activity.get(&today).map_or(0, |d| d.cards_reviewed);

    let mut overview = Table::new();
    overview.set_header(vec!["Cards", "Due today", "Streak", "Accuracy", "Reviews"]);
    overview.add_row(vec![
        stats.total_cards.to_string(),
        stats.due_today.to_string(),
        format!("{} day(s)", stats.streak),
        format!("{}%", stats.accuracy),
        stats.total_reviews.to_string(),
    ]);
    println!("{overview}");
    println!("{}\n", goal_line(today_reviewed, settings.daily_goal));

    let mut status = Table::new();
    status.set_header(vec!["New", "Learning (<7d)", "Review (7-30d)", "Mastered (>30d)"]);
    status.add_row(vec![
        stats.status.new.to_string(),
        stats.status.learning.to_string(),
        stats.status.review.to_string(),
        stats.status.mastered.to_string(),
    ]);
    println!("{status}\n");

    let mut levels = Table::new();
    levels.set_header(vec!["Level", "Mastered", "Total"]);
    for level in &stats.levels {
        levels.add_row(vec![
            level.level.clone(),
            level.mastered.to_string(),
            level.total.to_string(),
        ]);
    }
    println!("{levels}\n");

    let mut week = Table::new();
    week.set_header(stats.heatmap.iter().map(|d| d.weekday.clone()).collect::<Vec<_>>());
    week.add_row(
        stats
            .heatmap
            .iter()
            .map(|d| if d.active { d.count.to_string() } else { "-".into() })
            .collect::<Vec<_>>(),
    );
    println!("This week\n{week}\n");

    if !stats.tags.is_empty() {
        let tags: Vec<String> = stats
            .tags
            .iter()
            .take(TOP_TAGS)
            .map(|t| format!("{} ({})", t.tag, t.count))
            .collect();
        println!("Topics studied: {}\n", tags.join(", "));
    }

    if stats.recent_sessions.is_empty() {
        println!("No lessons yet. Start one with `parla lesson`.");
    } else {
        let mut sessions = Table::new();
        sessions.set_header(vec!["Date", "Topic", "Cards", "Errors", "Phrases", "Feedback", "Time"]);
        for s in &stats.recent_sessions {
            sessions.add_row(vec![
                s.date.to_string(),
                s.topic.clone(),
                s.cards_reviewed.to_string(),
                s.errors_count.to_string(),
                s.new_phrases_count.to_string(),
                s.feedback.to_string(),
                format!("{}:{:02}", s.duration_secs / 60, s.duration_secs % 60),
            ]);
        }
        println!("Recent lessons\n{sessions}");
    }

    if json.is_some() || html.is_some() {
        let report = ProgressReport::new(stats, settings, today_reviewed);
        if let Some(path) = json {
            report.save_json(&path)?;
            println!("JSON report: {}", path.display());
        }
        if let Some(path) = html {
            parla_report::write_html_report(&report, &path)?;
            println!("HTML report: {}", path.display());
        }
    }

    Ok(())
}
