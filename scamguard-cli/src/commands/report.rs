//! Report command - flag a suspicious phone number

use anyhow::{bail, Result};
use colored::Colorize;

use super::get_context;

pub async fn run(phone: &str, reason: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let outcome = ctx.report_service.submit_phone_report(phone, reason).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.success {
        println!("\n{} {}\n", "✓".green(), outcome.message);
        if !ctx.store.is_logged_in() {
            println!("{}", "Reported anonymously. Sign in to track your reports.".dimmed());
        }
    }

    if !outcome.success {
        bail!("{}", outcome.message);
    }
    Ok(())
}
