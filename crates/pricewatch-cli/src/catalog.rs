//! `import` and `list` command handlers.

use std::path::Path;

use anyhow::Context;
use sqlx::SqlitePool;

use crate::report;

/// Parses `file`, echoes the catalog, and stores it.
///
/// With `replace`, the stored catalog is swapped atomically; otherwise the
/// new targets are appended.
pub(crate) async fn run_import(pool: &SqlitePool, file: &Path, replace: bool) -> anyhow::Result<()> {
    let targets = pricewatch_core::load_targets(file)
        .with_context(|| format!("failed to load catalog from {}", file.display()))?;

    if targets.is_empty() {
        println!("{} contains no targets; nothing imported", file.display());
        return Ok(());
    }

    print!("{}", report::format_catalog(&targets));

    let stored = if replace {
        pricewatch_db::replace_targets(pool, &targets).await?
    } else {
        pricewatch_db::insert_targets(pool, &targets).await?
    };

    tracing::info!(path = %file.display(), stored, replace, "imported catalog");
    println!(
        "{} {stored} target(s)",
        if replace { "replaced catalog with" } else { "imported" }
    );
    Ok(())
}

pub(crate) async fn run_list(pool: &SqlitePool) -> anyhow::Result<()> {
    let targets: Vec<_> = pricewatch_db::list_targets(pool)
        .await?
        .into_iter()
        .map(pricewatch_db::TargetRow::into_target)
        .collect();

    if targets.is_empty() {
        println!("{}", report::EMPTY_CATALOG_HINT);
    } else {
        print!("{}", report::format_catalog(&targets));
    }
    Ok(())
}
