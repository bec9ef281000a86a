// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{self, GoalProgress};
use crate::auth::require_user;
use crate::commands::{expenses, notifications};
use crate::error::ValidationError;
use crate::models::SavingsGoal;
use crate::utils::{
    fmt_money, is_money, maybe_print_json, month_end, month_title, opt_trimmed, parse_amount,
    parse_date, parse_decimal, parse_month, parse_timestamp, pretty_table, required, required_id,
    today_for,
};
use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("add", sub)) => add(conn, sub)?,
        Some(("update", sub)) => update_cmd(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct GoalInput {
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
}

impl GoalInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::GoalName);
        }
        if self.target_amount <= Decimal::ZERO || !is_money(&self.target_amount) {
            return Err(ValidationError::GoalTarget);
        }
        if self.current_amount < Decimal::ZERO || !is_money(&self.current_amount) {
            return Err(ValidationError::GoalCurrent);
        }
        Ok(())
    }
}

/// A user's goals, most recently created first.
pub fn load_all(conn: &Connection, user_id: i64) -> Result<Vec<SavingsGoal>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, target_amount, current_amount, deadline, created_at
         FROM savings_goals WHERE user_id=?1 ORDER BY created_at DESC, id DESC",
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let target: String = r.get(2)?;
        let current: String = r.get(3)?;
        let deadline: String = r.get(4)?;
        let created_at: String = r.get(5)?;
        out.push(SavingsGoal {
            id,
            name: r.get(1)?,
            target_amount: parse_decimal(&target)
                .with_context(|| format!("Invalid target '{}' on goal {}", target, id))?,
            current_amount: parse_decimal(&current)
                .with_context(|| format!("Invalid current amount '{}' on goal {}", current, id))?,
            deadline: parse_date(&deadline)?,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(out)
}

pub fn insert(conn: &Connection, user_id: i64, input: &GoalInput) -> Result<i64> {
    input.validate()?;
    conn.execute(
        "INSERT INTO savings_goals(user_id, name, target_amount, current_amount, deadline)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            input.name.trim(),
            input.target_amount.to_string(),
            input.current_amount.to_string(),
            input.deadline.to_string()
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(user_id, goal_id = id, "savings goal added");
    Ok(id)
}

pub fn update(conn: &Connection, user_id: i64, id: i64, input: &GoalInput) -> Result<()> {
    input.validate()?;
    let n = conn.execute(
        "UPDATE savings_goals SET name=?1, target_amount=?2, current_amount=?3, deadline=?4
         WHERE id=?5 AND user_id=?6",
        params![
            input.name.trim(),
            input.target_amount.to_string(),
            input.current_amount.to_string(),
            input.deadline.to_string(),
            id,
            user_id
        ],
    )?;
    if n == 0 {
        bail!("Goal {} not found", id);
    }
    info!(user_id, goal_id = id, "savings goal updated");
    Ok(())
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM savings_goals WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        bail!("Goal {} not found", id);
    }
    Ok(())
}

/// Updates the target of the month's goal, or creates "Monthly Goal <Month>"
/// due at month end. Returns the goal id and whether it was created.
pub fn set_monthly_goal(
    conn: &Connection,
    user_id: i64,
    amount: Decimal,
    year: i32,
    month: u32,
) -> Result<(i64, bool)> {
    let goals = load_all(conn, user_id)?;
    if let Some(goal) = analytics::current_goal(&goals, year, month) {
        let input = GoalInput {
            name: goal.name.clone(),
            target_amount: amount,
            current_amount: goal.current_amount,
            deadline: goal.deadline,
        };
        update(conn, user_id, goal.id, &input)?;
        return Ok((goal.id, false));
    }
    let input = GoalInput {
        name: format!("Monthly Goal {}", month_title(year, month)),
        target_amount: amount,
        current_amount: Decimal::ZERO,
        deadline: month_end(year, month)?,
    };
    Ok((insert(conn, user_id, &input)?, true))
}

fn month_or_today(sub: &clap::ArgMatches, today: NaiveDate) -> Result<(i32, u32)> {
    match opt_trimmed(sub, "month") {
        Some(m) => parse_month(&m),
        None => Ok((today.year(), today.month())),
    }
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let amount = parse_amount(&required(sub, "amount")?)?;
    let (y, m) = month_or_today(sub, today)?;
    let (id, created) = set_monthly_goal(conn, user.id, amount, y, m)?;
    if created {
        println!(
            "Monthly goal for {} set to {} (id {})",
            month_title(y, m),
            fmt_money(&amount),
            id
        );
    } else {
        println!(
            "Monthly goal for {} updated to {}",
            month_title(y, m),
            fmt_money(&amount)
        );
    }
    notifications::refresh_and_announce(conn, user.id, today)?;
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let current = match opt_trimmed(sub, "current") {
        Some(c) => parse_decimal(&c)?,
        None => Decimal::ZERO,
    };
    let input = GoalInput {
        name: required(sub, "name")?,
        target_amount: parse_decimal(&required(sub, "target")?)?,
        current_amount: current,
        deadline: parse_date(&required(sub, "deadline")?)?,
    };
    let id = insert(conn, user.id, &input)?;
    println!(
        "Added goal '{}' targeting {} by {} (id {})",
        input.name,
        fmt_money(&input.target_amount),
        input.deadline,
        id
    );
    notifications::refresh_and_announce(conn, user.id, today)?;
    Ok(())
}

fn update_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let id = required_id(sub)?;
    let goal = load_all(conn, user.id)?
        .into_iter()
        .find(|g| g.id == id)
        .with_context(|| format!("Goal {} not found", id))?;
    let mut input = GoalInput {
        name: goal.name,
        target_amount: goal.target_amount,
        current_amount: goal.current_amount,
        deadline: goal.deadline,
    };
    // a given-but-blank value is validated, not ignored
    if let Some(n) = sub.get_one::<String>("name") {
        input.name = n.trim().to_string();
    }
    if let Some(t) = sub.get_one::<String>("target") {
        input.target_amount = parse_decimal(t)?;
    }
    if let Some(c) = sub.get_one::<String>("current") {
        input.current_amount = parse_decimal(c)?;
    }
    if let Some(d) = sub.get_one::<String>("deadline") {
        input.deadline = parse_date(d)?;
    }
    update(conn, user.id, id, &input)?;
    println!("Goal {} updated", id);
    notifications::refresh_and_announce(conn, user.id, today)?;
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let id = required_id(sub)?;
    delete(conn, user.id, id)?;
    println!("Goal {} deleted", id);
    notifications::refresh_and_announce(conn, user.id, today)?;
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let goals = load_all(conn, user.id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &goals)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = goals
        .iter()
        .map(|g| {
            let progress = match analytics::percent_of(g.current_amount, g.target_amount) {
                Some(pct) => format!("{:.0}%", pct),
                None if g.target_amount > Decimal::ZERO => ">100%".to_string(),
                None => "-".to_string(),
            };
            vec![
                g.id.to_string(),
                g.name.clone(),
                fmt_money(&g.target_amount),
                fmt_money(&g.current_amount),
                progress,
                g.deadline.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Name", "Target", "Saved", "Progress", "Deadline"], rows)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct GoalStatus {
    pub month: String,
    pub goal: Option<SavingsGoal>,
    pub progress: GoalProgress,
}

pub fn goal_status(conn: &Connection, user_id: i64, year: i32, month: u32) -> Result<GoalStatus> {
    let goals = load_all(conn, user_id)?;
    let goal = analytics::current_goal(&goals, year, month).cloned();
    let spent = analytics::total(&analytics::monthly(
        &expenses::load_all(conn, user_id)?,
        year,
        month,
    ));
    Ok(GoalStatus {
        month: month_title(year, month),
        progress: analytics::goal_progress(goal.as_ref(), spent),
        goal,
    })
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let (y, m) = month_or_today(sub, today)?;
    let st = goal_status(conn, user.id, y, m)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &st)? {
        return Ok(());
    }
    if st.goal.is_none() {
        println!(
            "No savings goal for {}. Set one with `budgetbloom goal set --amount <N>`.",
            st.month
        );
        return Ok(());
    }
    let p = &st.progress;
    let rows = vec![
        vec!["Month".to_string(), st.month.clone()],
        vec!["Goal".to_string(), fmt_money(&p.target)],
        vec!["Spent".to_string(), fmt_money(&p.spent)],
        vec!["Remaining".to_string(), fmt_money(&p.remaining)],
        vec!["Progress".to_string(), format!("{:.0}%", p.progress_pct)],
    ];
    println!("{}", pretty_table(&["", "Monthly Savings Goal"], rows));
    if p.overspending {
        println!(
            "⚠️  You're over your goal by {}",
            fmt_money(&(p.spent - p.target))
        );
    }
    Ok(())
}
