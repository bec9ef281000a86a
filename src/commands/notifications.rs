// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::require_user;
use crate::commands::{expenses, goals, settings};
use crate::models::{NewNotification, Notification, NotificationKind};
use crate::rules::{self, RuleContext};
use crate::utils::{maybe_print_json, parse_timestamp, pretty_table, required_id, today_for};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use std::collections::HashSet;
use tracing::{debug, info};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    match m.subcommand() {
        Some(("list", sub)) => list(conn, user.id, sub)?,
        Some(("read", sub)) => {
            let id = required_id(sub)?;
            mark_read(conn, user.id, id)?;
            println!("Notification {} marked as read", id);
        }
        Some(("read-all", _)) => {
            let n = mark_all_read(conn, user.id)?;
            println!("Marked {} notifications as read", n);
        }
        Some(("clear", sub)) => {
            let id = required_id(sub)?;
            clear(conn, user.id, id)?;
            println!("Notification {} cleared", id);
        }
        Some(("clear-all", _)) => {
            let n = clear_all(conn, user.id)?;
            println!("Cleared {} notifications", n);
        }
        Some(("check", sub)) => {
            let today = today_for(sub)?;
            let created = refresh(conn, user.id, today)?;
            if created.is_empty() {
                println!("No new notifications");
            } else {
                announce(&created);
            }
        }
        Some(("nudges", sub)) => nudges(conn, user.id, sub)?,
        Some(("dismiss", sub)) => {
            let id = required_id(sub)?;
            dismiss(conn, user.id, id)?;
            println!("Nudge {} dismissed", id);
        }
        Some(("weekly-report", sub)) => {
            let today = today_for(sub)?;
            match weekly_report(conn, user.id, today)? {
                Some(n) => announce(std::slice::from_ref(&n)),
                None => println!("Weekly reports are turned off"),
            }
        }
        _ => {}
    }
    Ok(())
}

type NotificationRow = (i64, String, String, String, bool, String, Option<String>);

fn notification_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

/// A user's notifications, newest first.
pub fn load_all(conn: &Connection, user_id: i64) -> Result<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, type, title, message, is_read, created_at, icon FROM notifications
         WHERE user_id=?1 ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], notification_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        let (id, kind, title, message, is_read, created_at, icon) = row?;
        out.push(Notification {
            id,
            kind: kind.parse()?,
            title,
            message,
            is_read,
            created_at: parse_timestamp(&created_at)?,
            icon,
        });
    }
    Ok(out)
}

pub fn insert(conn: &Connection, user_id: i64, n: &NewNotification) -> Result<i64> {
    conn.execute(
        "INSERT INTO notifications(user_id, type, title, message, icon) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, n.kind.as_str(), n.title, n.message, n.icon],
    )?;
    let id = conn.last_insert_rowid();
    debug!(user_id, notification_id = id, kind = %n.kind, "notification stored");
    Ok(id)
}

pub fn mark_read(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "UPDATE notifications SET is_read=1 WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        bail!("Notification {} not found", id);
    }
    Ok(())
}

pub fn mark_all_read(conn: &Connection, user_id: i64) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE notifications SET is_read=1 WHERE user_id=?1 AND is_read=0",
        params![user_id],
    )?)
}

pub fn clear(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM notifications WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        bail!("Notification {} not found", id);
    }
    Ok(())
}

pub fn clear_all(conn: &Connection, user_id: i64) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM notifications WHERE user_id=?1",
        params![user_id],
    )?;
    info!(user_id, cleared = n, "notification history cleared");
    Ok(n)
}

pub fn unread_count(conn: &Connection, user_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_id=?1 AND is_read=0",
        params![user_id],
        |r| r.get(0),
    )?)
}

/// Only nudges can be dismissed; the pair text is kept with the id.
pub fn dismiss(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let (kind, title, message): (String, String, String) = conn
        .query_row(
            "SELECT type, title, message FROM notifications WHERE id=?1 AND user_id=?2",
            params![id, user_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .with_context(|| format!("Notification {} not found", id))?;
    if kind != NotificationKind::Nudge.as_str() {
        bail!("Notification {} is not a nudge", id);
    }
    conn.execute(
        "INSERT OR IGNORE INTO dismissed_nudges(user_id, notification_id, title, message)
         VALUES (?1, ?2, ?3, ?4)",
        params![user_id, id, title, message],
    )?;
    Ok(())
}

/// Unread nudges whose title and message match no dismissed nudge.
pub fn active_nudges(conn: &Connection, user_id: i64) -> Result<Vec<Notification>> {
    let mut stmt =
        conn.prepare("SELECT title, message FROM dismissed_nudges WHERE user_id=?1")?;
    let dismissed: HashSet<(String, String)> = stmt
        .query_map(params![user_id], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<rusqlite::Result<_>>()?;
    Ok(load_all(conn, user_id)?
        .into_iter()
        .filter(|n| n.kind == NotificationKind::Nudge && !n.is_read)
        .filter(|n| !dismissed.contains(&(n.title.clone(), n.message.clone())))
        .collect())
}

/// Re-evaluates every automatic rule against the user's current data and
/// stores whatever is new.
pub fn refresh(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<Vec<NewNotification>> {
    let all_expenses = expenses::load_all(conn, user_id)?;
    let all_goals = goals::load_all(conn, user_id)?;
    let existing = load_all(conn, user_id)?;
    let prefs = settings::load_preferences(conn, user_id)?;
    let ctx = RuleContext {
        expenses: &all_expenses,
        goals: &all_goals,
        existing: &existing,
        prefs,
        today,
    };
    let created = rules::evaluate(&ctx);
    for n in &created {
        insert(conn, user_id, n)?;
    }
    debug!(user_id, created = created.len(), "notification rules evaluated");
    Ok(created)
}

pub fn refresh_and_announce(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<()> {
    let created = refresh(conn, user_id, today)?;
    announce(&created);
    Ok(())
}

/// Stores a weekly report unless the user switched them off or an identical
/// one already exists.
pub fn weekly_report(
    conn: &Connection,
    user_id: i64,
    today: NaiveDate,
) -> Result<Option<NewNotification>> {
    let prefs = settings::load_preferences(conn, user_id)?;
    if !prefs.weekly_reports {
        return Ok(None);
    }
    let report = rules::weekly_report(&expenses::load_all(conn, user_id)?, today);
    if !rules::is_duplicate(&load_all(conn, user_id)?, &report) {
        insert(conn, user_id, &report)?;
    }
    Ok(Some(report))
}

fn announce(created: &[NewNotification]) {
    for n in created {
        println!(
            "🔔 {} {}: {}",
            n.icon.as_deref().unwrap_or(""),
            n.title,
            n.message
        );
    }
}

fn render(items: &[Notification]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|n| {
            vec![
                n.id.to_string(),
                if n.is_read { "".into() } else { "●".into() },
                n.kind.to_string(),
                format!("{} {}", n.icon.as_deref().unwrap_or(""), n.title),
                n.message.clone(),
                n.created_at.format("%b %d %H:%M").to_string(),
            ]
        })
        .collect()
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let mut items = load_all(conn, user_id)?;
    if sub.get_flag("unread") {
        items.retain(|n| !n.is_read);
    }
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    if items.is_empty() {
        println!("No notifications");
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(&["ID", "New", "Type", "Title", "Message", "Created"], render(&items))
    );
    println!("{} unread", unread_count(conn, user_id)?);
    Ok(())
}

fn nudges(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let items = active_nudges(conn, user_id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    if items.is_empty() {
        println!("No nudges right now");
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(&["ID", "New", "Type", "Title", "Message", "Created"], render(&items))
    );
    Ok(())
}
