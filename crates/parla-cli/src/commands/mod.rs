pub mod due;
pub mod export;
pub mod init;
pub mod lesson;
pub mod list_models;
pub mod practice;
pub mod reset;
pub mod settings;
pub mod stats;
pub mod validate;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use parla_core::deck::{builtin_deck, load_decks, merge_vocab};
use parla_core::model::VocabCard;
use parla_core::store::ProgressStore;
use parla_providers::{load_config_from, ParlaConfig};

/// Configuration and store shared by the commands.
pub struct Context {
    pub config: ParlaConfig,
    pub store: ProgressStore,
}

impl Context {
    pub fn load(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
        tracing::debug!(data_dir = %dir.display(), "using data directory");
        Ok(Self {
            store: ProgressStore::new(dir),
            config,
        })
    }

    /// Built-in cards, then cards from `extra`, then cards learned in lessons.
    pub fn vocab(&self, extra: Option<&Path>) -> Result<Vec<VocabCard>> {
        let builtin = builtin_deck()?;
        let extra_decks = match extra {
            Some(path) => load_decks(path)?,
            None => Vec::new(),
        };
        let user = self.store.load_user_vocab()?;

        Ok(merge_vocab(
            std::iter::once(builtin.cards.as_slice())
                .chain(extra_decks.iter().map(|d| d.cards.as_slice()))
                .chain(std::iter::once(user.as_slice())),
        ))
    }
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Print a prompt and read one trimmed line. `None` at end of input.
pub fn prompt_line<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// "today/goal" with a note once the goal is met.
pub fn goal_line(reviewed: u32, goal: u32) -> String {
    if reviewed >= goal {
        format!("Daily goal: {reviewed}/{goal} reached. Bravissimo!")
    } else {
        format!("Daily goal: {reviewed}/{goal} ({} to go)", goal - reviewed)
    }
}
