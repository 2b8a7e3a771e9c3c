//! TOML vocabulary decks.
//!
//! Loads decks from TOML files and directories, validates them, and exposes
//! the core vocabulary compiled into the binary.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Level, VocabCard};
use crate::session::cloze;

const BUILTIN_DECK: &str = include_str!("../vocab/core.toml");

/// A named collection of vocabulary cards.
#[derive(Debug, Clone)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cards: Vec<VocabCard>,
}

#[derive(Debug, Deserialize)]
struct TomlDeckFile {
    deck: TomlDeckHeader,
    #[serde(default)]
    cards: Vec<TomlCard>,
}

#[derive(Debug, Deserialize)]
struct TomlDeckHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlCard {
    id: String,
    it: String,
    en: String,
    #[serde(default)]
    ex: String,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    level: Option<String>,
}

/// The core vocabulary shipped with parla.
pub fn builtin_deck() -> Result<Deck> {
    parse_deck_str(BUILTIN_DECK, Path::new("<builtin>/core.toml"))
}

/// Parse a single TOML file into a `Deck`.
pub fn parse_deck(path: &Path) -> Result<Deck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;

    parse_deck_str(&content, path)
}

/// Parse a TOML string into a `Deck`.
pub fn parse_deck_str(content: &str, source_path: &Path) -> Result<Deck> {
    let parsed: TomlDeckFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let cards = parsed
        .cards
        .into_iter()
        .map(|c| {
            let level = c
                .level
                .map(|l| {
                    l.parse::<Level>()
                        .map_err(|e| anyhow::anyhow!("card {}: {}", c.id, e))
                })
                .transpose()?;

            Ok(VocabCard {
                id: c.id,
                it: c.it,
                en: c.en,
                ex: c.ex,
                tag: c.tag,
                level,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Deck {
        id: parsed.deck.id,
        name: parsed.deck.name,
        description: parsed.deck.description,
        cards,
    })
}

/// Recursively load all `.toml` decks from a directory.
pub fn load_deck_directory(dir: &Path) -> Result<Vec<Deck>> {
    let mut decks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            decks.extend(load_deck_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_deck(&path) {
                Ok(deck) => decks.push(deck),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(decks)
}

/// Load a deck file, or every deck under a directory.
pub fn load_decks(path: &Path) -> Result<Vec<Deck>> {
    if path.is_dir() {
        load_deck_directory(path)
    } else {
        Ok(vec![parse_deck(path)?])
    }
}

/// Concatenate decks, dropping cards whose id was already seen.
pub fn merge_vocab<'a, I>(decks: I) -> Vec<VocabCard>
where
    I: IntoIterator<Item = &'a [VocabCard]>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for cards in decks {
        for card in cards {
            if seen.insert(card.id.clone()) {
                merged.push(card.clone());
            }
        }
    }
    merged
}

/// A warning from deck validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The card ID (if applicable).
    pub card_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a deck for common issues.
pub fn validate_deck(deck: &Deck) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if deck.cards.is_empty() {
        warnings.push(ValidationWarning {
            card_id: None,
            message: "deck has no cards".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for card in &deck.cards {
        if !seen_ids.insert(&card.id) {
            warnings.push(ValidationWarning {
                card_id: Some(card.id.clone()),
                message: format!("duplicate card ID: {}", card.id),
            });
        }
    }

    for card in &deck.cards {
        if card.it.trim().is_empty() {
            warnings.push(ValidationWarning {
                card_id: Some(card.id.clone()),
                message: "Italian text is empty".into(),
            });
        }
        if card.en.trim().is_empty() {
            warnings.push(ValidationWarning {
                card_id: Some(card.id.clone()),
                message: "English text is empty".into(),
            });
        }
    }

    // Cloze practice needs the word to appear in its example
    for card in &deck.cards {
        if !card.it.trim().is_empty() && cloze(card).is_none() {
            warnings.push(ValidationWarning {
                card_id: Some(card.id.clone()),
                message: "example sentence does not contain the word; cloze mode will show the translation".into(),
            });
        }
    }

    warnings
}
