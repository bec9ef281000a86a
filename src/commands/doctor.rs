// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{find_user, session_user_id};
use crate::models::Category;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Scans every user's rows; returns (issue, detail) pairs.
pub fn scan(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Expense amounts, categories and descriptions
    let mut stmt = conn.prepare("SELECT id, amount, category, description FROM expenses")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let amount: String = r.get(1)?;
        let category: String = r.get(2)?;
        let description: String = r.get(3)?;
        match amount.parse::<Decimal>() {
            Ok(d) if d > Decimal::ZERO => {}
            Ok(_) => rows.push(vec!["expense_non_positive_amount".into(), format!("#{} {}", id, amount)]),
            Err(_) => rows.push(vec!["expense_bad_amount".into(), format!("#{} '{}'", id, amount)]),
        }
        if category.parse::<Category>().is_err() {
            rows.push(vec!["expense_unknown_category".into(), format!("#{} {}", id, category)]);
        }
        if description.trim().is_empty() {
            rows.push(vec!["expense_empty_description".into(), format!("#{}", id)]);
        }
    }

    // 2) Goals that can never make progress
    let mut stmt2 = conn.prepare("SELECT id, name, target_amount FROM savings_goals")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        let target: String = r.get(2)?;
        let ok = target.parse::<Decimal>().map(|d| d > Decimal::ZERO).unwrap_or(false);
        if !ok {
            rows.push(vec!["goal_bad_target".into(), format!("#{} {} '{}'", id, name, target)]);
        }
    }

    // 3) Session pointing at a deleted account
    if let Some(uid) = session_user_id(conn)? {
        if find_user(conn, uid)?.is_none() {
            rows.push(vec!["session_missing_user".into(), format!("user {}", uid)]);
        }
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = scan(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
