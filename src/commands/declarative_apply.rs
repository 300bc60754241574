//! `pgalign declarative-apply` - run a directory of SQL files
//! round-robin until a full pass applies cleanly, for callers that
//! maintain their schema as a tree of `.sql` files rather than a second
//! live cluster. Kept thin and faithfully interfaced per §1: it reuses
//! the teacher's file discovery and execution primitives unchanged.

use crate::db::connection::connect_with_retry;
use crate::db::sql_executor::{SqlExecutorConfig, discover_sql_files_ordered, execute_sql_file};
use anyhow::{Result, anyhow};
use std::path::Path;
use tracing::info;

/// Run every `.sql` file under `dir` in discovery order, retrying the
/// whole set on failure up to `max_passes` times so files that depend on
/// objects created by a later file in the same pass still converge.
pub async fn cmd_declarative_apply(
    database_url: &str,
    dir: &Path,
    max_passes: u32,
) -> Result<i32> {
    let pool = connect_with_retry(database_url).await?;
    let files = discover_sql_files_ordered(dir)?;

    if files.is_empty() {
        println!("No SQL files found under {}", dir.display());
        return Ok(0);
    }

    let config = SqlExecutorConfig::default();
    let mut pending = files;

    for pass in 1..=max_passes {
        info!(pass, remaining = pending.len(), "declarative-apply pass");
        let mut failures = Vec::new();

        for file in &pending {
            if let Err(e) = execute_sql_file(&pool, file, &config).await {
                failures.push((file.clone(), e));
            }
        }

        if failures.is_empty() {
            println!(
                "Applied {} file(s) over {} pass(es)",
                pending.len().max(1),
                pass
            );
            return Ok(0);
        }

        if failures.len() == pending.len() {
            let message = failures
                .iter()
                .map(|(path, e)| format!("{}: {e}", path.display()))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(anyhow!(
                "no progress in pass {pass}; every remaining file failed:\n{message}"
            ));
        }

        pending = failures.into_iter().map(|(path, _)| path).collect();
    }

    Err(anyhow!(
        "{} file(s) still failing after {max_passes} passes",
        pending.len()
    ))
}
