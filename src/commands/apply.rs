//! `pgalign apply` - run a previously computed `Plan` against its
//! source cluster, after verifying the source hasn't drifted.

use crate::catalog::Catalog;
use crate::config::{Config, ObjectFilter};
use crate::db::connection::connect_with_retry;
use crate::error::EngineError;
use crate::fingerprint::fingerprint;
use crate::plan::Plan;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::io::Read;
use tracing::{info, warn};

/// Outcome of a successful apply. A post-apply fingerprint mismatch is
/// recorded as a warning rather than failing the command (§7) - the
/// statements already ran, and refusing to report success would hide
/// that from the caller.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub statements_run: usize,
    pub warnings: Vec<String>,
}

/// Read a plan from a file, or from stdin when `path` is `None` or `"-"`.
pub fn load_plan(path: Option<&str>) -> Result<Plan> {
    let raw = match path {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read plan from stdin")?;
            buf
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read plan file {path}"))?
        }
    };

    serde_json::from_str(&raw).context("failed to parse plan JSON")
}

pub async fn cmd_apply(config: &Config, plan_path: Option<&str>) -> Result<i32> {
    let plan = load_plan(plan_path)?;
    apply_plan(config, &plan).await?;
    Ok(0)
}

/// Re-extract and re-fingerprint the source, refuse on drift or
/// already-applied, then run the plan's statements against it.
pub async fn apply_plan(config: &Config, plan: &Plan) -> Result<ApplyOutcome> {
    let pool = connect_with_retry(&config.source_url).await?;

    if let Some(role) = &config.role {
        let sql = format!("SET ROLE {}", crate::render::quote_ident(role));
        sqlx::query(&sql)
            .execute(&pool)
            .await
            .with_context(|| format!("failed to SET ROLE {role}"))?;
    }

    info!("Re-checking source fingerprint before applying...");
    let current = current_fingerprint(config, &pool).await?;

    if current == plan.target.fingerprint {
        return Err(EngineError::AlreadyApplied.into());
    }
    if current != plan.source.fingerprint {
        return Err(EngineError::FingerprintMismatch {
            expected: plan.source.fingerprint.clone(),
            actual: current,
        }
        .into());
    }

    let statements_run = run_statements(&pool, &plan.statements).await?;

    let warnings = post_apply_warnings(config, &pool, plan).await;

    Ok(ApplyOutcome {
        statements_run,
        warnings,
    })
}

async fn current_fingerprint(config: &Config, pool: &PgPool) -> Result<String> {
    let catalog = Catalog::load(pool).await?;
    let filter = ObjectFilter::new(&config.objects);
    Ok(fingerprint(&filter.filter_catalog(catalog)))
}

/// Statements that PostgreSQL refuses to run inside a transaction block
/// (concurrent index builds, and similar) force a segment boundary: the
/// applier runs the surrounding statements transactionally and drops to
/// autocommit only for the statement that needs it.
fn requires_autocommit(statement: &str) -> bool {
    let upper = statement.to_uppercase();
    upper.contains("CONCURRENTLY")
}

async fn run_statements(pool: &PgPool, statements: &[String]) -> Result<usize> {
    let mut ran = 0;
    let mut segment: Vec<&String> = Vec::new();

    async fn flush(pool: &PgPool, segment: &mut Vec<&String>) -> Result<usize> {
        if segment.is_empty() {
            return Ok(0);
        }
        let mut tx = pool.begin().await?;
        for statement in segment.iter() {
            sqlx::raw_sql(statement)
                .execute(&mut *tx)
                .await
                .map_err(|source| EngineError::SqlExecution {
                    statement: statement.to_string(),
                    source,
                })?;
        }
        let n = segment.len();
        tx.commit().await?;
        segment.clear();
        Ok(n)
    }

    for statement in statements {
        if requires_autocommit(statement) {
            ran += flush(pool, &mut segment).await?;
            sqlx::raw_sql(statement)
                .execute(pool)
                .await
                .map_err(|source| EngineError::SqlExecution {
                    statement: statement.to_string(),
                    source,
                })?;
            ran += 1;
        } else {
            segment.push(statement);
        }
    }
    ran += flush(pool, &mut segment).await?;

    Ok(ran)
}

async fn post_apply_warnings(config: &Config, pool: &PgPool, plan: &Plan) -> Vec<String> {
    let mut warnings = Vec::new();
    match current_fingerprint(config, pool).await {
        Ok(actual) if actual != plan.target.fingerprint => {
            let message = format!(
                "post-apply fingerprint does not match the plan's target fingerprint (expected {}, got {actual}) - the target may have drifted during apply",
                plan.target.fingerprint
            );
            warn!("{message}");
            warnings.push(message);
        }
        Err(e) => {
            let message = format!("could not verify post-apply fingerprint: {e}");
            warn!("{message}");
            warnings.push(message);
        }
        _ => {}
    }
    warnings
}
