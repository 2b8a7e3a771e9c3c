//! HTML progress dashboard.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use std::path::Path;

use anyhow::{Context, Result};

use parla_core::report::ProgressReport;
use parla_core::statistics::{HeatmapDay, StatusCounts};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Generate an HTML dashboard from a progress report.
pub fn generate_html(report: &ProgressReport) -> String {
    let stats = &report.stats;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>parla progress, {}</title>\n",
        report.created_at.format("%Y-%m-%d")
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>parla progress</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} cards | daily goal {} | {}</p>\n",
        stats.total_cards,
        report.settings.daily_goal,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Headline numbers
    html.push_str("<section class=\"tiles\">\n");
    for (value, label) in [
        (stats.streak.to_string(), "Day streak"),
        (stats.due_today.to_string(), "Due today"),
        (format!("{}%", stats.accuracy), "Accuracy (good + easy)"),
        (
            format!("{}/{}", report.today_reviewed, report.settings.daily_goal),
            "Reviewed today",
        ),
    ] {
        html.push_str(&format!(
            "<div class=\"tile\"><p class=\"value\">{value}</p><p class=\"label\">{label}</p></div>\n"
        ));
    }
    html.push_str("</section>\n");
    html.push_str(&format!(
        "<div class=\"goal\"><div class=\"goal-fill\" style=\"width: {:.0}%\"></div></div>\n",
        report.goal_progress() * 100.0
    ));

    // Weekly activity
    html.push_str("<section>\n<h2>This week</h2>\n");
    html.push_str(&generate_heatmap(&stats.heatmap));
    html.push_str("</section>\n");

    // Card status
    html.push_str("<section>\n<h2>Card status</h2>\n");
    html.push_str(&status_table(&stats.status, stats.total_cards));
    html.push_str("</section>\n");

    // Levels
    html.push_str("<section>\n<h2>Cards by level</h2>\n");
    html.push_str("<table>\n<thead><tr><th>Level</th><th>Mastered</th><th>Total</th><th></th></tr></thead>\n<tbody>\n");
    for level in &stats.levels {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td><div class=\"bar\"><div class=\"bar-fill\" style=\"width: {:.0}%\"></div></div></td></tr>\n",
            html_escape(&level.level),
            level.mastered,
            level.total,
            percent(level.mastered, level.total),
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");

    // Topics
    if !stats.tags.is_empty() {
        html.push_str("<section>\n<h2>Topics studied</h2>\n<ul class=\"tags\">\n");
        for tag in &stats.tags {
            html.push_str(&format!(
                "<li>{} <span class=\"count\">{}</span></li>\n",
                html_escape(&tag.tag),
                tag.count
            ));
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Sessions
    html.push_str("<section>\n<h2>Recent lessons</h2>\n");
    if stats.recent_sessions.is_empty() {
        html.push_str("<p class=\"meta\">No lessons yet.</p>\n");
    } else {
        html.push_str("<table>\n<thead><tr><th>Date</th><th>Topic</th><th>Cards</th><th>Errors</th><th>New phrases</th><th>Feedback</th><th>Duration</th></tr></thead>\n<tbody>\n");
        for s in &stats.recent_sessions {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}:{:02}</td></tr>\n",
                s.date,
                html_escape(&s.topic),
                s.cards_reviewed,
                s.errors_count,
                s.new_phrases_count,
                s.feedback,
                s.feedback,
                s.duration_secs / 60,
                s.duration_secs % 60,
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ProgressReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn status_table(status: &StatusCounts, total: usize) -> String {
    let mut table = String::from(
        "<table>\n<thead><tr><th>Status</th><th>Cards</th><th>Share</th></tr></thead>\n<tbody>\n",
    );
    for (label, count) in [
        ("New", status.new),
        ("Learning (&lt;7d)", status.learning),
        ("Review (7-30d)", status.review),
        ("Mastered (&gt;30d)", status.mastered),
    ] {
        table.push_str(&format!(
            "<tr><td>{label}</td><td>{count}</td><td>{:.0}%</td></tr>\n",
            percent(count, total)
        ));
    }
    table.push_str("</tbody></table>\n");
    table
}

fn generate_heatmap(days: &[HeatmapDay]) -> String {
    let cell = 40;
    let gap = 8;
    let width = days.len() * (cell + gap) + gap;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        width,
        cell + 40
    );

    for (i, day) in days.iter().enumerate() {
        let x = gap + i * (cell + gap);
        let color = match day.count {
            0 if day.active => "#a7f3d0",
            0 => "#e5e7eb",
            1..=9 => "#6ee7b7",
            10..=19 => "#34d399",
            _ => "#059669",
        };
        svg.push_str(&format!(
            "  <rect x=\"{x}\" y=\"4\" width=\"{cell}\" height=\"{cell}\" fill=\"{color}\" rx=\"6\"><title>{}: {} cards</title></rect>\n",
            day.date, day.count
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#111827\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
            x + cell / 2,
            4 + cell / 2,
            day.count
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            x + cell / 2,
            cell + 24,
            html_escape(&day.weekday)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --accent: #059669; --easy: #dcfce7; --good: #e0f2fe; --hard: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --easy: #064e3b; --good: #0c4a6e; --hard: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; padding: 2rem; max-width: 60rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.tiles { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.tile { border: 1px solid var(--border); border-radius: 8px; padding: 1rem; text-align: center; }
.tile .value { font-size: 1.8rem; font-weight: bold; margin: 0; }
.tile .label { font-size: 0.8rem; color: #6b7280; margin: 0.25rem 0 0; }
.goal, .bar { background: var(--border); border-radius: 4px; height: 8px; margin: 1rem 0; }
.bar { width: 8rem; margin: 0; }
.goal-fill, .bar-fill { background: var(--accent); border-radius: 4px; height: 100%; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.easy { background: var(--easy); }
.good { background: var(--good); }
.hard { background: var(--hard); }
.tags { list-style: none; padding: 0; display: flex; flex-wrap: wrap; gap: 0.5rem; }
.tags li { border: 1px solid var(--border); border-radius: 999px; padding: 0.25rem 0.75rem; }
.tags .count { color: #6b7280; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use parla_core::srs::{Feedback, Quality, SrsState};
    use parla_core::statistics::compute_stats;
    use parla_core::store::{DailyActivity, DayActivity, SessionRecord, Settings};

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn make_test_report() -> ProgressReport {
        let vocab = parla_core::deck::builtin_deck().unwrap().cards;
        let mut activity = DailyActivity::new();
        activity.insert(
            day("2026-03-09"),
            DayActivity {
                cards_reviewed: 2,
                qualities: vec![Quality::new(5).unwrap(), Quality::new(1).unwrap()],
            },
        );
        let sessions = vec![SessionRecord {
            date: day("2026-03-09"),
            topic: "Cibo & ristoranti <script>".into(),
            cards_reviewed: 12,
            errors_count: 2,
            new_phrases_count: 3,
            feedback: Feedback::Hard,
            duration_secs: 425,
        }];
        let stats = compute_stats(&vocab, &SrsState::new(), &activity, &sessions, day("2026-03-10"));

        let mut report = ProgressReport::new(stats, Settings::default(), 5);
        report.id = uuid::Uuid::nil();
        report
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_test_report());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Day streak"));
        assert!(html.contains("5/20"));
        assert!(html.contains("50%"));
        assert!(html.contains("Mastered (&gt;30d)"));
        assert!(html.contains("<td class=\"hard\">hard</td>"));
        assert!(html.contains("<td>7:05</td>"));
        assert!(html.contains(">Mon</text>"));
    }

    #[test]
    fn html_escapes_user_content() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("Cibo &amp; ristoranti &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("progress.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
