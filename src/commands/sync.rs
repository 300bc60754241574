//! `pgalign sync` - plan, ask for confirmation, then apply. The
//! interactive convenience wrapper around `plan` + `apply`.

use crate::commands::apply::apply_plan;
use crate::commands::plan::build_plan;
use crate::config::Config;
use crate::prompts::confirm_apply;
use anyhow::Result;
use tracing::info;

pub async fn cmd_sync(config: &Config, assume_yes: bool) -> Result<i32> {
    let plan = build_plan(config).await?;

    if plan.is_empty() {
        println!("No changes detected.");
        return Ok(0);
    }

    println!(
        "{} statement(s): {} create, {} alter, {} drop",
        plan.stats.total, plan.stats.creates, plan.stats.alters, plan.stats.drops
    );

    if !assume_yes && !confirm_apply(plan.stats.total, plan.stats.drops)? {
        println!("Cancelled.");
        return Ok(2);
    }

    let outcome = apply_plan(config, &plan).await?;
    info!("Applied {} statement(s)", outcome.statements_run);
    for warning in &outcome.warnings {
        println!("warning: {warning}");
    }

    Ok(0)
}
