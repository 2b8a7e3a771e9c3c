//! The `parla init` command.

use std::path::Path;

use anyhow::Result;

use parla_providers::config::LOCAL_CONFIG_FILE;

const EXAMPLE_DECK_DIR: &str = "decks";
const EXAMPLE_DECK: &str = "decks/my-words.toml";

pub fn execute() -> Result<()> {
    if Path::new(LOCAL_CONFIG_FILE).exists() {
        println!("{LOCAL_CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(LOCAL_CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {LOCAL_CONFIG_FILE}");
    }

    std::fs::create_dir_all(EXAMPLE_DECK_DIR)?;
    if Path::new(EXAMPLE_DECK).exists() {
        println!("{EXAMPLE_DECK} already exists, skipping.");
    } else {
        std::fs::write(EXAMPLE_DECK, SAMPLE_DECK)?;
        println!("Created {EXAMPLE_DECK}");
    }

    println!("\nNext steps:");
    println!("  1. Export OPENAI_API_KEY or edit {LOCAL_CONFIG_FILE}");
    println!("  2. Run: parla validate --vocab {EXAMPLE_DECK}");
    println!("  3. Run: parla practice --vocab {EXAMPLE_DECK}");
    println!("  4. Run: parla lesson");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# parla configuration

default_provider = "openai"
default_model = "gpt-4o-mini"
temperature = 0.7
max_tokens = 500
max_retries = 3
retry_delay_ms = 1000
# data_dir = "~/.local/share/parla"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;

const SAMPLE_DECK: &str = r#"[deck]
id = "my-words"
name = "My words"
description = "Personal vocabulary"

[[cards]]
id = "my-1"
it = "la passeggiata"
en = "the walk / stroll"
ex = "Dopo cena facciamo sempre una passeggiata."
tag = "routine"
level = "A2"

[[cards]]
id = "my-2"
it = "in bocca al lupo"
en = "good luck (lit. into the wolf's mouth)"
ex = "Domani hai l'esame? In bocca al lupo!"
tag = "idioms"
level = "B1"
"#;
