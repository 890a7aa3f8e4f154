//! OTP command - request a one-time code

use anyhow::Result;
use clap::Subcommand;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum OtpCommands {
    /// Text a one-time code to a phone number
    Send {
        /// Phone number to send the code to
        phone: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: OtpCommands) -> Result<()> {
    match command {
        OtpCommands::Send { phone, json } => send(&phone, json).await,
    }
}

async fn send(phone: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let outcome = ctx.auth_service.send_otp(phone).await;

    if json {
        return output::print_json(&outcome);
    }

    let sent = output::require(outcome)?;
    output::success(&format!("Code sent to {}", sent.phone_number));
    if let Some(secs) = sent.expires_in_secs {
        println!("It expires in {} minute(s).", (secs + 59) / 60);
    }
    if let Some(message) = sent.message {
        output::info(&message);
    }
    Ok(())
}
