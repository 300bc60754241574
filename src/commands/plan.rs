//! `pgalign plan` - compute the ordered SQL script that reconciles a
//! target cluster with a source cluster, without touching either one.

use crate::catalog::Catalog;
use crate::catalog::id::ObjectKind;
use crate::config::{Config, ObjectFilter};
use crate::db::connection::connect_with_retry;
use crate::diff::operations::{MigrationStep, OperationKind, SqlRenderer};
use crate::diff::{cascade, diff_all, diff_order};
use crate::fingerprint::fingerprint;
use crate::plan::{ClusterFingerprint, Plan, PlanStats};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::info;

/// Extract both clusters, diff, order, and render - everything `plan`
/// needs short of deciding what to do with the result.
pub async fn build_plan(config: &Config) -> Result<Plan> {
    info!("Connecting to source and target clusters...");
    let (source_pool, target_pool) = tokio::try_join!(
        connect_with_retry(&config.source_url),
        connect_with_retry(&config.target_url),
    )?;

    if let Some(role) = &config.role {
        set_role(&source_pool, role).await?;
        set_role(&target_pool, role).await?;
    }

    info!("Extracting catalogs...");
    let (source_catalog, target_catalog) = tokio::try_join!(
        Catalog::load(&source_pool),
        Catalog::load(&target_pool),
    )
    .context("failed to extract a catalog")?;

    let filter = ObjectFilter::new(&config.objects);
    let source = filter.filter_catalog(source_catalog);
    let target = filter.filter_catalog(target_catalog);

    info!("Diffing catalogs...");
    let raw_steps = diff_all(&source, &target);
    let full_steps = cascade::expand(raw_steps, &source, &target);
    let ordered = diff_order(full_steps, &source, &target)?;

    let stats = compute_stats(&ordered);
    let statements = render_statements(&ordered);

    let stable_ids: Vec<String> = {
        let mut ids: Vec<String> = ordered.iter().map(|step| step.id().stable_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };

    let source_fingerprint = fingerprint(&source);
    let target_fingerprint = fingerprint(&target);

    Ok(Plan::new(
        config.role.clone(),
        ClusterFingerprint {
            url: config.source_url.clone(),
            fingerprint: source_fingerprint,
        },
        ClusterFingerprint {
            url: config.target_url.clone(),
            fingerprint: target_fingerprint,
        },
        stable_ids,
        statements,
        stats,
    ))
}

/// `plan` runs `build_plan` and prints the result, exiting 2 when the
/// plan is non-empty so CI can gate on drift (§6's exit code contract).
pub async fn cmd_plan(config: &Config, as_sql: bool) -> Result<i32> {
    let plan = build_plan(config).await?;

    if as_sql {
        print_sql(&plan);
    } else {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    }

    Ok(if plan.is_empty() { 0 } else { 2 })
}

fn print_sql(plan: &Plan) {
    if plan.statements.is_empty() {
        println!("-- no changes");
        return;
    }
    for statement in &plan.statements {
        println!("{};", statement);
    }
}

async fn set_role(pool: &sqlx::PgPool, role: &str) -> Result<()> {
    let sql = format!("SET ROLE {}", crate::render::quote_ident(role));
    sqlx::query(&sql)
        .execute(pool)
        .await
        .with_context(|| format!("failed to SET ROLE {role}"))?;
    Ok(())
}

fn compute_stats(steps: &[MigrationStep]) -> PlanStats {
    let mut stats = PlanStats::default();
    let mut by_object_type: BTreeMap<String, usize> = BTreeMap::new();

    for step in steps {
        match step.operation_kind() {
            OperationKind::Create => stats.creates += 1,
            OperationKind::Alter => stats.alters += 1,
            OperationKind::Drop => stats.drops += 1,
        }
        *by_object_type
            .entry(step.id().kind().as_str().to_string())
            .or_insert(0) += 1;
    }

    stats.total = steps.len();
    stats.by_object_type = by_object_type;
    stats
}

/// Render every step to SQL, prepending `SET check_function_bodies =
/// false` when the script touches any function/procedure/aggregate
/// (§4.5) so forward-referencing function bodies don't fail to parse.
fn render_statements(steps: &[MigrationStep]) -> Vec<String> {
    let needs_relaxed_bodies = steps.iter().any(|step| {
        matches!(
            step.id().kind(),
            ObjectKind::Function | ObjectKind::Procedure | ObjectKind::Aggregate
        )
    });

    let mut statements = Vec::new();
    if needs_relaxed_bodies {
        statements.push("SET check_function_bodies = false".to_string());
    }

    for step in steps {
        for rendered in step.to_sql() {
            statements.push(rendered.sql.trim_end_matches(';').to_string());
        }
    }

    statements
}
