//! The `parla reset` command.

use anyhow::Result;

use super::Context;

pub fn execute(ctx: &Context, confirmed: bool) -> Result<()> {
    if !confirmed {
        anyhow::bail!(
            "this forgets every review in {}. Re-run with --yes to confirm",
            ctx.store.dir().display()
        );
    }
    ctx.store.reset_srs()?;
    println!("Review progress reset. Vocabulary, lessons and settings were kept.");
    Ok(())
}
