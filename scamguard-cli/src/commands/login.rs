//! Login command - sign in with a one-time code

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Input;
use scamguard_core::{CancelToken, Outcome, User};

use super::get_context;
use crate::output;

pub async fn run(phone: &str, code: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;

    if let Some(user) = ctx.store.current_user() {
        output::warning(&format!("Already signed in as {}; signing in again", user.name));
    }

    let code = match code {
        Some(code) => code,
        None => {
            let sent = output::require(ctx.auth_service.send_otp(phone).await)?;
            if !json {
                output::success(&format!("Code sent to {}", sent.phone_number));
                if let Some(message) = sent.message {
                    output::info(&message);
                }
            }
            prompt_code()?
        }
    };

    let cancel = CancelToken::new();
    let outcome = tokio::select! {
        outcome = ctx.auth_service.login(phone, &code, &cancel) => outcome,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            Outcome::failure("Sign-in was cancelled")
        }
    };

    if json {
        return output::print_json(&outcome);
    }

    let user = output::require(outcome)?;
    print_welcome(&user);
    Ok(())
}

/// Ask for the code on a terminal, or read one line from piped stdin
fn prompt_code() -> Result<String> {
    if atty::is(atty::Stream::Stdin) {
        let code: String = Input::new()
            .with_prompt("Enter the code you received")
            .interact_text()?;
        return Ok(code);
    }

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read code from stdin")?;
    if line.trim().is_empty() {
        bail!("No code provided");
    }
    Ok(line.trim().to_string())
}

fn print_welcome(user: &User) {
    println!("\n{} Signed in as {}", "✓".green(), user.name.bold());
    if user.is_elderly {
        println!(
            "{}",
            "Extra protection is on: we will warn you before anything risky.".dimmed()
        );
    }
    println!();
}
