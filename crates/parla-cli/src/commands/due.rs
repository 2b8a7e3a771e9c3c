//! The `parla due` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use parla_core::model::Level;
use parla_core::srs::due_cards;

use super::{today, Context};

pub fn execute(ctx: &Context, level: Option<Level>, vocab_path: Option<PathBuf>) -> Result<()> {
    let today = today();
    let vocab = ctx.vocab(vocab_path.as_deref())?;
    let state = ctx.store.load_srs()?;

    let candidates: Vec<_> = vocab
        .iter()
        .filter(|v| level.map_or(true, |l| v.level == Some(l)))
        .collect();
    let due = due_cards(&state, candidates.iter().map(|v| v.id.as_str()), today);

    if due.is_empty() {
        println!("No cards due today.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Italian", "English", "Level", "Tag", "Due since"]);
    for card in candidates.iter().filter(|v| due.contains(&v.id)) {
        let due_since = state
            .get(&card.id)
            .map_or_else(|| "new".to_string(), |s| s.next_review.to_string());
        table.add_row(vec![
            card.id.clone(),
            card.it.clone(),
            card.en.clone(),
            card.level.map_or_else(|| "?".to_string(), |l| l.to_string()),
            card.tag.clone().unwrap_or_default(),
            due_since,
        ]);
    }

    println!("{table}");
    println!("{} card(s) due.", due.len());
    Ok(())
}
