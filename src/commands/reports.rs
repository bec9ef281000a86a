// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{self, Bucket, GoalProgress, MonthComparison};
use crate::auth::require_user;
use crate::commands::{expenses, goals, notifications};
use crate::models::{Category, Expense};
use crate::utils::{
    fmt_money, maybe_print_json, month_title, opt_trimmed, parse_date, parse_month, pretty_table,
    required, today_for,
};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("categories", sub)) => categories(conn, sub)?,
        Some(("trend", sub)) => trend(conn, sub)?,
        Some(("calendar", sub)) => calendar(conn, sub)?,
        Some(("day", sub)) => day(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub user: String,
    pub expense_count: usize,
    pub total: Decimal,
    pub month: MonthComparison,
    pub average_daily: Decimal,
    pub top_category: Category,
    pub goal: GoalProgress,
    pub unread_notifications: i64,
    pub recent: Vec<Expense>,
}

pub fn build_summary(conn: &Connection, today: NaiveDate) -> Result<Summary> {
    let user = require_user(conn)?;
    let all = expenses::load_all(conn, user.id)?;
    let status = goals::goal_status(conn, user.id, today.year(), today.month())?;
    Ok(Summary {
        user: user.display_name(),
        expense_count: all.len(),
        total: analytics::total(&all),
        month: analytics::month_over_month(&all, today),
        average_daily: analytics::average_daily_spending(&all, today),
        top_category: analytics::top_category(&all),
        goal: status.progress,
        unread_notifications: notifications::unread_count(conn, user.id)?,
        recent: all.iter().take(3).cloned().collect(),
    })
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_for(sub)?;
    let s = build_summary(conn, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    println!("Welcome back, {}!", s.user);
    let mut rows = vec![
        vec!["Total spent".to_string(), fmt_money(&s.total)],
        vec![
            format!("This month ({})", month_title(today.year(), today.month())),
            fmt_money(&s.month.this_month),
        ],
        vec!["Last month".to_string(), fmt_money(&s.month.last_month)],
        vec![
            "Month over month".to_string(),
            format!("{:+.1}%", s.month.change_pct),
        ],
        vec!["Average per day".to_string(), fmt_money(&s.average_daily)],
        vec![
            "Top category".to_string(),
            format!("{} {}", s.top_category.icon(), s.top_category.label()),
        ],
        vec!["Expenses".to_string(), s.expense_count.to_string()],
    ];
    if s.goal.target > Decimal::ZERO {
        rows.push(vec![
            "Monthly goal".to_string(),
            format!(
                "{} left of {} ({:.0}%)",
                fmt_money(&s.goal.remaining),
                fmt_money(&s.goal.target),
                s.goal.progress_pct
            ),
        ]);
    }
    rows.push(vec![
        "Unread notifications".to_string(),
        s.unread_notifications.to_string(),
    ]);
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    if !s.recent.is_empty() {
        println!("Recent:");
        for e in &s.recent {
            println!(
                "  {} {}  {}  {}",
                e.category.icon(),
                e.date.format("%b %d"),
                e.description,
                fmt_money(&e.amount)
            );
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub category: Category,
    pub label: String,
    pub total: Decimal,
    pub share_pct: Decimal,
}

/// Per-category totals with their share of the overall total, highest first.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryRow> {
    let grand = analytics::total(expenses);
    let mut rows: Vec<CategoryRow> = analytics::category_totals(expenses)
        .into_iter()
        .map(|(category, total)| CategoryRow {
            category,
            label: category.label().to_string(),
            total,
            share_pct: analytics::percent_of(total, grand).unwrap_or(Decimal::ZERO),
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
    rows
}

fn categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let mut all = expenses::load_all(conn, user.id)?;
    if let Some(mo) = opt_trimmed(sub, "month") {
        let (y, m) = parse_month(&mo)?;
        all = analytics::monthly(&all, y, m);
    }
    let data = category_breakdown(&all);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|r| {
            vec![
                format!("{} {}", r.category.icon(), r.label),
                fmt_money(&r.total),
                format!("{:.1}%", r.share_pct),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
    Ok(())
}

fn bar(amount: Decimal, peak: Decimal) -> String {
    const WIDTH: i64 = 30;
    if peak <= Decimal::ZERO {
        return String::new();
    }
    let cells = amount
        .checked_div(peak)
        .and_then(|r| r.checked_mul(Decimal::from(WIDTH)))
        .and_then(|c| c.round().to_i64())
        .unwrap_or(0);
    "█".repeat(cells.clamp(0, WIDTH) as usize)
}

fn trend(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let all = expenses::load_all(conn, user.id)?;
    let weekly = sub.get_flag("weekly");
    let data: Vec<Bucket> = if weekly {
        analytics::weekly_series(&all, today, 4)
    } else {
        analytics::daily_series(&all, today, 30)
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let peak = analytics::peak(&data);
    let rows = data
        .iter()
        .map(|b| {
            let range = if weekly {
                format!("{} - {}", b.start.format("%b %d"), b.end.format("%b %d"))
            } else {
                b.start.to_string()
            };
            let marker = if peak > Decimal::ZERO && b.amount == peak { " ◀ peak" } else { "" };
            vec![
                b.label.clone(),
                range,
                fmt_money(&b.amount),
                format!("{}{}", bar(b.amount, peak), marker),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Period", "Range", "Spent", ""], rows));
    Ok(())
}

fn calendar(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let today = today_for(sub)?;
    let (y, m) = match opt_trimmed(sub, "month") {
        Some(mo) => parse_month(&mo)?,
        None => (today.year(), today.month()),
    };
    let all = expenses::load_all(conn, user.id)?;
    let days = analytics::calendar(&all, y, m)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &days)? {
        return Ok(());
    }
    const SHADES: [&str; 6] = ["", "░", "▒", "▓", "█", "██"];
    let rows = days
        .chunks(7)
        .map(|week| {
            week.iter()
                .map(|d| {
                    if !d.in_month {
                        return String::new();
                    }
                    let mark = if d.date == today { "*" } else { "" };
                    if d.total.is_zero() {
                        format!("{}{}", d.date.day(), mark)
                    } else {
                        format!(
                            "{}{}\n${:.0} {}",
                            d.date.day(),
                            mark,
                            d.total,
                            SHADES[d.intensity as usize]
                        )
                    }
                })
                .collect()
        })
        .collect();
    println!("{}", month_title(y, m));
    println!(
        "{}",
        pretty_table(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"], rows)
    );
    let month_total = days
        .iter()
        .filter(|d| d.in_month)
        .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d.total));
    println!("Month total: {}", fmt_money(&month_total));
    Ok(())
}

fn day(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let date = parse_date(&required(sub, "date")?)?;
    let all = expenses::load_all(conn, user.id)?;
    let detail = analytics::day_detail(&all, date);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &detail)? {
        return Ok(());
    }
    println!("{}", date.format("%A, %B %-d, %Y"));
    if detail.expenses.is_empty() {
        println!("No expenses on this day");
        return Ok(());
    }
    let rows = detail
        .expenses
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                format!("{} {}", e.category.icon(), e.category.label()),
                e.description.clone(),
                fmt_money(&e.amount),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Category", "Description", "Amount"], rows)
    );
    println!("Total: {}", fmt_money(&detail.total));
    Ok(())
}
