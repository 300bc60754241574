use anyhow::Result;
use dialoguer::Confirm;

/// Ask the user to confirm applying a plan. Used by `sync` before it runs
/// any statement against the target.
pub fn confirm_apply(statement_count: usize, destructive_count: usize) -> Result<bool> {
    let prompt = if destructive_count > 0 {
        format!(
            "Apply {} statement{} ({} destructive)?",
            statement_count,
            if statement_count == 1 { "" } else { "s" },
            destructive_count
        )
    } else {
        format!(
            "Apply {} statement{}?",
            statement_count,
            if statement_count == 1 { "" } else { "s" }
        )
    };

    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(Into::into)
}
