//! Verify-image command - check an image for scam patterns

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use scamguard_core::{ImageRef, VerificationResult};

use super::{get_context, require_login};
use crate::output;

pub async fn run(image: PathBuf, description: Option<&str>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let user = require_login(&ctx)?;
    let image = ImageRef::new(image);

    let spinner = (!json).then(|| output::spinner("Analyzing image..."));
    let outcome = ctx
        .verification_service
        .verify_image(&image, user.id, description)
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        return output::print_json(&outcome);
    }

    let result = output::require(outcome)?;
    print_verdict(&result);
    Ok(())
}

fn print_verdict(result: &VerificationResult) {
    match result.is_scam {
        Some(true) => println!("\n{}", "⚠ Likely scam".red().bold()),
        Some(false) => println!("\n{}", "✓ No scam detected".green().bold()),
        None => println!("\n{}", "Analysis complete".bold()),
    }

    let mut rows: Vec<(&str, String)> = Vec::new();
    if let Some(level) = &result.risk_level {
        rows.push(("Risk level", level.clone()));
    }
    if let Some(confidence) = result.confidence {
        rows.push(("Confidence", output::format_confidence(confidence)));
    }
    if let Some(id) = &result.id {
        rows.push(("Reference", id.clone()));
    }
    if !rows.is_empty() {
        let mut table = output::create_table();
        for (label, value) in rows {
            table.add_row(vec![label.to_string(), value]);
        }
        println!("{}", table);
    }

    if let Some(explanation) = &result.explanation {
        println!("{}", explanation);
    }
    println!();
}
