//! The `parla export` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::Context;

pub fn execute(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let data = ctx.store.export_all()?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, data)
                .with_context(|| format!("failed to write export to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{data}"),
    }
    Ok(())
}
