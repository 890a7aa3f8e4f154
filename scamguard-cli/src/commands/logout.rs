//! Logout command

use anyhow::Result;

use super::get_context;
use crate::output;

pub fn run() -> Result<()> {
    let ctx = get_context()?;
    let was_logged_in = ctx.store.is_logged_in();

    ctx.auth_service.logout();

    if was_logged_in {
        output::success("Signed out");
    } else {
        output::info("Not signed in");
    }
    Ok(())
}
