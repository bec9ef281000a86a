// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics;
use crate::auth::require_user;
use crate::commands::notifications;
use crate::error::ValidationError;
use crate::models::{Category, Expense};
use crate::utils::{
    fmt_money, is_money, maybe_print_json, month_end, month_start, opt_trimmed, parse_amount,
    parse_date, parse_decimal, parse_month, pretty_table, required, required_id, today_for,
};
use anyhow::{Context, Result, bail};
use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Fields of an expense as submitted; validated before any write.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub amount: Decimal,
    pub category: Category,
    pub description: String,
    pub note: Option<String>,
    pub date: NaiveDate,
}

impl ExpenseInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO || !is_money(&self.amount) {
            return Err(ValidationError::Amount);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::Description);
        }
        Ok(())
    }
}

type ExpenseRow = (i64, String, String, String, Option<String>, String);

fn expense_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
    ))
}

fn decode(raw: ExpenseRow) -> Result<Expense> {
    let (id, amount, category, description, note, date) = raw;
    Ok(Expense {
        id,
        amount: parse_decimal(&amount)
            .with_context(|| format!("Invalid amount '{}' on expense {}", amount, id))?,
        category: category.parse()?,
        description,
        note: note.filter(|n| !n.is_empty()),
        date: parse_date(&date)?,
    })
}

/// All of a user's expenses, newest date first.
pub fn load_all(conn: &Connection, user_id: i64) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, amount, category, description, note, date FROM expenses
         WHERE user_id=?1 ORDER BY date DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], expense_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

pub fn find(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Expense>> {
    let raw = conn
        .query_row(
            "SELECT id, amount, category, description, note, date FROM expenses
             WHERE user_id=?1 AND id=?2",
            params![user_id, id],
            expense_from_row,
        )
        .optional()?;
    raw.map(decode).transpose()
}

pub fn insert(conn: &Connection, user_id: i64, input: &ExpenseInput) -> Result<i64> {
    input.validate()?;
    conn.execute(
        "INSERT INTO expenses(user_id, amount, category, description, note, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            input.amount.to_string(),
            input.category.as_str(),
            input.description.trim(),
            input.note,
            input.date.to_string()
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(user_id, expense_id = id, "expense added");
    Ok(id)
}

pub fn update(conn: &Connection, user_id: i64, id: i64, input: &ExpenseInput) -> Result<()> {
    input.validate()?;
    let n = conn.execute(
        "UPDATE expenses SET amount=?1, category=?2, description=?3, note=?4, date=?5
         WHERE id=?6 AND user_id=?7",
        params![
            input.amount.to_string(),
            input.category.as_str(),
            input.description.trim(),
            input.note,
            input.date.to_string(),
            id,
            user_id
        ],
    )?;
    if n == 0 {
        bail!("Expense {} not found", id);
    }
    info!(user_id, expense_id = id, "expense updated");
    Ok(())
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM expenses WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        bail!("Expense {} not found", id);
    }
    info!(user_id, expense_id = id, "expense deleted");
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let input = ExpenseInput {
        amount: parse_amount(&required(sub, "amount")?)?,
        category: required(sub, "category")?.parse()?,
        description: required(sub, "description")?,
        note: opt_trimmed(sub, "note"),
        date: match opt_trimmed(sub, "date") {
            Some(d) => parse_date(&d)?,
            None => today,
        },
    };
    let id = insert(conn, user.id, &input)?;
    println!(
        "Expense added: {} expense has been recorded. (id {})",
        fmt_money(&input.amount),
        id
    );
    notifications::refresh_and_announce(conn, user.id, today)?;
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let id = required_id(sub)?;
    let current = find(conn, user.id, id)?.with_context(|| format!("Expense {} not found", id))?;

    let mut input = ExpenseInput {
        amount: current.amount,
        category: current.category,
        description: current.description,
        note: current.note,
        date: current.date,
    };
    if let Some(a) = sub.get_one::<String>("amount") {
        input.amount = parse_amount(a)?;
    }
    if let Some(c) = sub.get_one::<String>("category") {
        input.category = c.parse()?;
    }
    if let Some(d) = sub.get_one::<String>("description") {
        input.description = d.trim().to_string();
    }
    if let Some(n) = opt_trimmed(sub, "note") {
        input.note = Some(n);
    }
    if sub.get_flag("clear_note") {
        input.note = None;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        input.date = parse_date(d)?;
    }

    update(conn, user.id, id, &input)?;
    println!("Expense {} updated", id);
    notifications::refresh_and_announce(conn, user.id, today)?;
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let id = required_id(sub)?;
    delete(conn, user.id, id)?;
    println!("Expense {} deleted", id);
    notifications::refresh_and_announce(conn, user.id, today)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Date,
    Amount,
}

/// Filters and ordering taken from `expense list`.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub category: Option<Category>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort: SortBy,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn from_matches(sub: &clap::ArgMatches, today: NaiveDate) -> Result<Self> {
        let category = match opt_trimmed(sub, "category") {
            Some(c) if c != "all" => Some(c.parse::<Category>()?),
            _ => None,
        };
        let (mut from, mut to) = (None, None);
        if let Some(f) = sub.get_one::<String>("from") {
            from = Some(parse_date(f)?);
        }
        if let Some(t) = sub.get_one::<String>("to") {
            to = Some(parse_date(t)?);
        }
        if let Some(mo) = sub.get_one::<String>("month") {
            let (y, m) = parse_month(mo)?;
            from = Some(month_start(y, m)?);
            to = Some(month_end(y, m)?);
        }
        if sub.get_flag("last7") {
            from = Some(today - Duration::days(6));
            to = Some(today);
        }
        if sub.get_flag("this_month") {
            from = Some(month_start(today.year(), today.month())?);
            to = Some(month_end(today.year(), today.month())?);
        }
        let sort = match sub.get_one::<String>("sort").map(|s| s.as_str()) {
            Some("amount") => SortBy::Amount,
            _ => SortBy::Date,
        };
        Ok(Self {
            category,
            from,
            to,
            sort,
            limit: sub.get_one::<usize>("limit").copied(),
        })
    }

    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        let mut rows = analytics::filter(expenses, self.category, self.from, self.to);
        match self.sort {
            SortBy::Date => rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id))),
            SortBy::Amount => rows.sort_by(|a, b| b.amount.cmp(&a.amount).then(b.id.cmp(&a.id))),
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

/// Resolves the `expense list` query against the session user's expenses.
/// Returns the matching rows and the user's overall expense count.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<(Vec<Expense>, usize)> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let all = load_all(conn, user.id)?;
    let query = ListQuery::from_matches(sub, today)?;
    Ok((query.apply(&all), all.len()))
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let (data, overall) = query_rows(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    if data.is_empty() {
        match opt_trimmed(sub, "category") {
            Some(c) if c != "all" => println!("No expenses found in {}", c.parse::<Category>()?.label()),
            _ => println!("No expenses yet. Add one with `budgetbloom expense add`."),
        }
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.date.format("%b %d, %Y").to_string(),
                format!("{} {}", e.category.icon(), e.category.label()),
                e.description.clone(),
                fmt_money(&e.amount),
                e.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Category", "Description", "Amount", "Note"],
            rows
        )
    );
    println!("{} of {} expenses", data.len(), overall);
    Ok(())
}
