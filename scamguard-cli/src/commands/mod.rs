//! CLI command implementations

pub mod demo;
pub mod login;
pub mod logout;
pub mod otp;
pub mod report;
pub mod verify;
pub mod whoami;

use std::path::PathBuf;

use anyhow::{Context, Result};
use scamguard_core::{ScamGuardContext, User};

/// Get the scamguard directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SCAMGUARD_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory; set SCAMGUARD_DIR")?;
    Ok(home.join(".scamguard"))
}

/// Build the context, restoring any saved session
pub fn get_context() -> Result<ScamGuardContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create scamguard directory: {:?}", data_dir))?;

    ScamGuardContext::new(&data_dir).context("Failed to initialize scamguard context")
}

/// The signed-in user, or an error telling the user how to sign in
pub fn require_login(ctx: &ScamGuardContext) -> Result<User> {
    ctx.store
        .current_user()
        .context("Not signed in. Run 'sg login <phone>' first.")
}
