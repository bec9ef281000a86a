// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValidationError;
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Today's date, unless the global `--today` override is set.
pub fn today_for(m: &clap::ArgMatches) -> Result<NaiveDate> {
    match m.try_get_one::<String>("today").ok().flatten() {
        Some(s) => parse_date(s),
        None => Ok(today()),
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parses `YYYY-MM` into (year, month).
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((first.year(), first.month()))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Money is kept to whole cents.
pub const MONEY_SCALE: u32 = 2;

/// True when `d` has no digits below a cent; trailing zeros don't count.
pub fn is_money(d: &Decimal) -> bool {
    d.normalize().scale() <= MONEY_SCALE
}

/// Amounts typed by the user must parse, be strictly positive and be in
/// whole cents.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    match s.trim().parse::<Decimal>() {
        Ok(d) if d > Decimal::ZERO && is_money(&d) => Ok(d),
        _ => Err(ValidationError::Amount.into()),
    }
}

/// Parses a stored SQLite `datetime('now')` timestamp.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("Invalid timestamp '{}'", s))
}

pub fn month_start(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow::anyhow!("Invalid month {}-{:02}", year, month))
}

pub fn month_end(year: i32, month: u32) -> Result<NaiveDate> {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = month_start(ny, nm)?;
    next.pred_opt()
        .ok_or_else(|| anyhow::anyhow!("Invalid month {}-{:02}", year, month))
}

/// The calendar month before (year, month).
pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// "October 2026"
pub fn month_title(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d.format("%B %Y").to_string(),
        None => format!("{}-{:02}", year, month),
    }
}

pub fn fmt_money(d: &Decimal) -> String {
    if d.is_sign_negative() {
        format!("-${:.2}", d.abs())
    } else {
        format!("${:.2}", d)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn delete_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}

pub fn required(m: &clap::ArgMatches, id: &str) -> Result<String> {
    m.get_one::<String>(id)
        .map(|s| s.trim().to_string())
        .with_context(|| format!("Missing --{}", id))
}

pub fn required_id(m: &clap::ArgMatches) -> Result<i64> {
    let raw = required(m, "id")?;
    raw.parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw))
}

/// Parses an optional trimmed string flag, dropping empty values.
pub fn opt_trimmed(m: &clap::ArgMatches, id: &str) -> Option<String> {
    m.get_one::<String>(id)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
