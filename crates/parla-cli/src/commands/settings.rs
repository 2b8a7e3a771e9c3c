//! The `parla settings` command.

use anyhow::Result;
use comfy_table::Table;

use parla_core::store::{Settings, SettingsPatch};

use super::Context;

pub fn execute(ctx: &Context, assignments: &[String]) -> Result<()> {
    let settings = if assignments.is_empty() {
        ctx.store.load_settings()?
    } else {
        let patch = assignments
            .iter()
            .map(|a| SettingsPatch::parse_assignment(a))
            .try_fold(SettingsPatch::default(), |acc, patch| {
                patch.map(|p| acc.merge(p))
            })?;
        let saved = ctx.store.save_settings(&patch)?;
        println!("Settings saved.");
        saved
    };

    print_settings(&settings);
    Ok(())
}

fn print_settings(settings: &Settings) {
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec!["daily_goal".to_string(), settings.daily_goal.to_string()]);
    table.add_row(vec!["preferred_mode".to_string(), settings.preferred_mode.to_string()]);
    table.add_row(vec!["muted".to_string(), settings.muted.to_string()]);
    table.add_row(vec!["auto_speak".to_string(), settings.auto_speak.to_string()]);
    table.add_row(vec!["speech_rate".to_string(), settings.speech_rate.to_string()]);
    println!("{table}");
}
