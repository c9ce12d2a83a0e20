//! `pulse cache clear`

use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;
use inquire::Confirm;
use is_terminal::IsTerminal;
use pulse_core::{Config, FileStore, KeyValueStore};

/// Storage operations the clear command needs.
pub trait ClearableCache {
    fn count_entries(&self) -> Result<usize>;
    fn clear_entries(&self) -> Result<usize>;
}

impl ClearableCache for FileStore {
    fn count_entries(&self) -> Result<usize> {
        Ok(self.entry_count()?)
    }

    fn clear_entries(&self) -> Result<usize> {
        Ok(KeyValueStore::clear(self)?)
    }
}

/// What [`execute_clear`] did.
#[derive(Debug, PartialEq, Eq)]
pub enum ClearOutcome {
    AlreadyEmpty,
    Cancelled,
    Cleared { removed: usize },
}

/// Clear the cache, asking `confirm` first unless `force` is set.
///
/// # Errors
///
/// Returns an error if counting, confirmation, or deletion fails.
pub fn execute_clear<S, W, C>(
    cache: &S,
    mut writer: W,
    force: bool,
    confirm: C,
) -> Result<ClearOutcome>
where
    S: ClearableCache,
    W: Write,
    C: FnOnce(usize) -> Result<bool>,
{
    let count = cache.count_entries()?;
    if count == 0 {
        writeln!(writer, "{} Cache is already empty", "ℹ".blue())?;
        return Ok(ClearOutcome::AlreadyEmpty);
    }

    if !force && !confirm(count)? {
        writeln!(writer, "{} Cancelled", "✗".red())?;
        return Ok(ClearOutcome::Cancelled);
    }

    let removed = cache.clear_entries()?;
    writeln!(
        writer,
        "{} Removed {removed} cached analysis result(s)",
        "✓".green()
    )?;
    Ok(ClearOutcome::Cleared { removed })
}

/// Clear the on-disk cache using terminal IO.
///
/// Without `--force`, a non-interactive stdin is treated as "no".
///
/// # Errors
///
/// Returns an error if the cache cannot be read or deleted.
pub fn run_clear(config: &Config, force: bool) -> Result<()> {
    let store = FileStore::new(&config.cache.dir);
    let stdout = io::stdout();

    execute_clear(&store, stdout.lock(), force, |count| {
        if !io::stdin().is_terminal() {
            return Ok(false);
        }
        Ok(
            Confirm::new(&format!("Delete {count} cached analysis result(s)?"))
                .with_default(false)
                .prompt()?,
        )
    })?;
    Ok(())
}
