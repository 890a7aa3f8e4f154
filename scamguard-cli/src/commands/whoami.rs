//! Whoami command - show the signed-in user

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let snapshot = ctx.store.current_snapshot();

    if json {
        let value = json!({
            "loggedIn": snapshot.is_logged_in(),
            "user": snapshot.current_user(),
            "demoMode": ctx.config.demo_mode,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let Some(user) = snapshot.current_user() else {
        println!("{}", "Not signed in".yellow());
        println!("{}", "Run 'sg login <phone>' to sign in.".dimmed());
        return Ok(());
    };

    let mut table = output::create_table();
    table.add_row(vec!["User ID", user.id.to_string().as_str()]);
    table.add_row(vec!["Name", user.name.as_str()]);
    if let Some(phone) = &user.phone_number {
        table.add_row(vec!["Phone", phone.as_str()]);
    }
    if let Some(email) = &user.email {
        table.add_row(vec!["Email", email.as_str()]);
    }
    table.add_row(vec!["Extra protection", if user.is_elderly { "on" } else { "off" }]);
    println!("{}", table);

    if ctx.config.demo_mode {
        output::info("Demo mode is on");
    }
    Ok(())
}
