// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::require_user;
use crate::commands::expenses;
use crate::utils::{opt_trimmed, today_for};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde_json::json;
use std::path::PathBuf;

pub fn handle(conn: &rusqlite::Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let fmt = m
        .get_one::<String>("format")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "json".to_string());
    let today = today_for(m)?;
    let out = match opt_trimmed(m, "out") {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(format!("budgetbloom-export-{}.{}", today, fmt)),
    };

    let rows = expenses::load_all(conn, user.id)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            wtr.write_record(["id", "date", "category", "description", "amount", "note"])?;
            for e in &rows {
                wtr.write_record([
                    e.id.to_string(),
                    e.date.to_string(),
                    e.category.to_string(),
                    e.description.clone(),
                    e.amount.to_string(),
                    e.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let doc = json!({
                "expenses": rows,
                "exportDate": Utc::now().to_rfc3339(),
                "user": user.email,
            });
            std::fs::write(&out, serde_json::to_string_pretty(&doc)?)
                .with_context(|| format!("Failed to write {}", out.display()))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!(
        "Data exported successfully: {} expenses written to {}",
        rows.len(),
        out.display()
    );
    Ok(())
}
