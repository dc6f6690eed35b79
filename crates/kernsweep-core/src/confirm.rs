//! Interactive confirmation before any package is removed

use std::fmt::Write as _;
use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::workflow::RemovalPlan;

/// Answers accepted as "yes"; anything else declines
const AFFIRMATIVE: &[&str] = &["y", "yes", "o", "oui"];

/// Asks the operator whether a removal plan may proceed
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// `true` only on an explicit affirmative answer
    async fn confirm(&self, plan: &RemovalPlan) -> bool;
}

/// Whether `answer` is an explicit yes
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// Prompt text shown before removal
#[must_use]
pub fn render_prompt(plan: &RemovalPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "CONFIRMATION REQUIRED");
    let _ = writeln!(out, "Running kernel:    {}", plan.running);
    let _ = writeln!(out, "Kernel to remove:  {}", plan.group.version);
    let _ = writeln!(out, "Packages to purge: {}", plan.group.len());
    for pkg in &plan.group.packages {
        let _ = writeln!(out, "  - {pkg}");
    }
    let _ = write!(out, "\nRemove this kernel? (yes/no): ");
    out
}

/// Write the prompt, `false` if the operator cannot have seen it
fn write_prompt(out: &mut impl Write, plan: &RemovalPlan) -> bool {
    match out
        .write_all(render_prompt(plan).as_bytes())
        .and_then(|()| out.flush())
    {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "could not show confirmation prompt, treating as no");
            false
        }
    }
}

/// Prompts on stdout and reads one line from stdin
#[derive(Debug, Default)]
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, plan: &RemovalPlan) -> bool {
        if !write_prompt(&mut std::io::stdout(), plan) {
            return false;
        }

        let mut answer = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match reader.read_line(&mut answer).await {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                warn!(error = %e, "could not read confirmation, treating as no");
                false
            }
        }
    }
}
