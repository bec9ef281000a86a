// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth;
use crate::commands::expenses;
use crate::utils::required;
use anyhow::{Context, Result};
use rusqlite::Connection;

fn password_from(m: &clap::ArgMatches, id: &str, prompt: &str) -> Result<String> {
    match m.get_one::<String>(id) {
        Some(p) => Ok(p.clone()),
        None => rpassword::prompt_password(prompt).context("Failed to read password"),
    }
}

pub fn register(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let name = required(m, "name")?;
    let email = required(m, "email")?;
    let password = password_from(m, "password", "Password: ")?;
    let confirm = match m.get_one::<String>("confirm") {
        Some(c) => c.clone(),
        None if m.get_one::<String>("password").is_some() => password.clone(),
        None => rpassword::prompt_password("Confirm password: ")
            .context("Failed to read password")?,
    };
    let user = auth::register(conn, &name, &email, &password, &confirm)?;
    println!(
        "Account created! Welcome to BudgetBloom, {}.",
        user.display_name()
    );
    Ok(())
}

pub fn login(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let email = required(m, "email")?;
    let password = password_from(m, "password", "Password: ")?;
    let user = auth::login(conn, &email, &password)?;
    println!("Welcome back, {}!", user.display_name());
    Ok(())
}

pub fn logout(conn: &Connection) -> Result<()> {
    if auth::logout(conn)? {
        println!("Logged out");
    } else {
        println!("No active session");
    }
    Ok(())
}

pub fn whoami(conn: &Connection) -> Result<()> {
    let user = auth::require_user(conn)?;
    let count = expenses::load_all(conn, user.id)?.len();
    println!(
        "{} <{}> · {} expenses · member since {}",
        user.display_name(),
        user.email,
        count,
        user.created_at
    );
    Ok(())
}
