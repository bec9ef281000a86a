// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregations over an in-memory expense list.
//!
//! Everything here is a pure reduction recomputed on demand. `today` is always
//! passed in so callers and tests control the clock.

use crate::models::{Category, Expense, SavingsGoal};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Saturates at `Decimal::MAX` instead of overflowing.
pub fn total(expenses: &[Expense]) -> Decimal {
    expenses
        .iter()
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount))
}

/// `part / whole * 100`, or `None` when `whole` is zero or the result does
/// not fit in a `Decimal`.
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
}

/// Only categories that have at least one expense appear in the map.
pub fn category_totals(expenses: &[Expense]) -> BTreeMap<Category, Decimal> {
    let mut totals = BTreeMap::new();
    for e in expenses {
        let sum = totals.entry(e.category).or_insert(Decimal::ZERO);
        *sum = sum.saturating_add(e.amount);
    }
    totals
}

/// Highest-spend category; empty lists give `Other`.
///
/// Ties go to the category listed first in `Category::ALL`, so the answer
/// does not depend on the order expenses were loaded in. A running
/// "keep the larger" reduction over a map would instead keep whichever tied
/// key it met last.
pub fn top_category(expenses: &[Expense]) -> Category {
    let totals = category_totals(expenses);
    let mut best: Option<(Category, Decimal)> = None;
    for cat in Category::ALL {
        if let Some(&amt) = totals.get(&cat) {
            match best {
                Some((_, b)) if amt <= b => {}
                _ => best = Some((cat, amt)),
            }
        }
    }
    best.map(|(c, _)| c).unwrap_or(Category::Other)
}

/// Total divided by the number of days from the oldest expense through
/// `today` inclusive, never fewer than one.
pub fn average_daily_spending(expenses: &[Expense], today: NaiveDate) -> Decimal {
    let Some(oldest) = expenses.iter().map(|e| e.date).min() else {
        return Decimal::ZERO;
    };
    let days = ((today - oldest).num_days() + 1).max(1);
    total(expenses) / Decimal::from(days)
}

pub fn by_category(expenses: &[Expense], category: Option<Category>) -> Vec<Expense> {
    match category {
        Some(c) => expenses.iter().filter(|e| e.category == c).cloned().collect(),
        None => expenses.to_vec(),
    }
}

/// Inclusive on both date bounds.
pub fn filter(
    expenses: &[Expense],
    category: Option<Category>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|e| category.is_none_or(|c| e.category == c))
        .filter(|e| from.is_none_or(|f| e.date >= f))
        .filter(|e| to.is_none_or(|t| e.date <= t))
        .cloned()
        .collect()
}

pub fn monthly(expenses: &[Expense], year: i32, month: u32) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|e| e.date.year() == year && e.date.month() == month)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthComparison {
    pub this_month: Decimal,
    pub last_month: Decimal,
    /// Percent change from last month; zero when last month had no spending
    /// or the change is too large to represent.
    pub change_pct: Decimal,
}

pub fn month_over_month(expenses: &[Expense], today: NaiveDate) -> MonthComparison {
    let (y, m) = (today.year(), today.month());
    let (py, pm) = crate::utils::prev_month(y, m);
    let this_month = total(&monthly(expenses, y, m));
    let last_month = total(&monthly(expenses, py, pm));
    let change_pct = if last_month > Decimal::ZERO {
        percent_of(this_month.saturating_sub(last_month), last_month).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    MonthComparison {
        this_month,
        last_month,
        change_pct,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub amount: Decimal,
}

fn sum_between(expenses: &[Expense], start: NaiveDate, end: NaiveDate) -> Decimal {
    expenses
        .iter()
        .filter(|e| e.date >= start && e.date <= end)
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount))
}

/// One bucket per day for the `days` days ending today, oldest first.
pub fn daily_series(expenses: &[Expense], today: NaiveDate, days: u32) -> Vec<Bucket> {
    (0..days as i64)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            Bucket {
                label: day.format("%b %d").to_string(),
                start: day,
                end: day,
                amount: sum_between(expenses, day, day),
            }
        })
        .collect()
}

/// Rolling seven-day windows ending today, a week ago, and so on. The window
/// ending today is the highest-numbered week; output is oldest first.
pub fn weekly_series(expenses: &[Expense], today: NaiveDate, weeks: u32) -> Vec<Bucket> {
    let mut out: Vec<Bucket> = (0..weeks as i64)
        .map(|w| {
            let end = today - Duration::days(w * 7);
            let start = end - Duration::days(6);
            Bucket {
                label: format!("Week {}", weeks as i64 - w),
                start,
                end,
                amount: sum_between(expenses, start, end),
            }
        })
        .collect();
    out.reverse();
    out
}

/// Largest bucket amount, used to highlight the peak bar.
pub fn peak(buckets: &[Bucket]) -> Decimal {
    buckets
        .iter()
        .map(|b| b.amount)
        .fold(Decimal::ZERO, |max, a| if a > max { a } else { max })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub total: Decimal,
    pub count: usize,
    pub intensity: u8,
}

/// Spending heat level: 0 for nothing, then <20, <50, <100, <200, and above.
pub fn intensity(amount: Decimal) -> u8 {
    if amount.is_zero() {
        0
    } else if amount < Decimal::from(20) {
        1
    } else if amount < Decimal::from(50) {
        2
    } else if amount < Decimal::from(100) {
        3
    } else if amount < Decimal::from(200) {
        4
    } else {
        5
    }
}

/// Sunday-first month grid padded to whole weeks with neighbouring days.
pub fn calendar(expenses: &[Expense], year: i32, month: u32) -> anyhow::Result<Vec<CalendarDay>> {
    let start = crate::utils::month_start(year, month)?;
    let end = crate::utils::month_end(year, month)?;
    let lead = start.weekday().num_days_from_sunday() as i64;
    let trail = 6 - end.weekday().num_days_from_sunday() as i64;
    let first = start - Duration::days(lead);
    let last = end + Duration::days(trail);

    let mut days = Vec::new();
    let mut d = first;
    while d <= last {
        let detail = day_detail(expenses, d);
        days.push(CalendarDay {
            date: d,
            in_month: d >= start && d <= end,
            total: detail.total,
            count: detail.expenses.len(),
            intensity: intensity(detail.total),
        });
        d += Duration::days(1);
    }
    Ok(days)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub expenses: Vec<Expense>,
    pub total: Decimal,
}

pub fn day_detail(expenses: &[Expense], date: NaiveDate) -> DayDetail {
    let on_day: Vec<Expense> = expenses.iter().filter(|e| e.date == date).cloned().collect();
    let total = total(&on_day);
    DayDetail {
        date,
        expenses: on_day,
        total,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub target: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Share of the target still unspent, clamped to 0..=100.
    pub progress_pct: Decimal,
    pub overspending: bool,
}

pub fn goal_progress(goal: Option<&SavingsGoal>, month_spend: Decimal) -> GoalProgress {
    let target = goal.map(|g| g.target_amount).unwrap_or(Decimal::ZERO);
    let remaining = target.saturating_sub(month_spend).max(Decimal::ZERO);
    let progress_pct = if target > Decimal::ZERO {
        // an overflowing ratio is far outside 0..=100, so clamp by sign
        match percent_of(target.saturating_sub(month_spend), target) {
            Some(pct) => pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
            None if month_spend > target => Decimal::ZERO,
            None => Decimal::ONE_HUNDRED,
        }
    } else {
        Decimal::ZERO
    };
    GoalProgress {
        target,
        spent: month_spend,
        remaining,
        progress_pct,
        overspending: target > Decimal::ZERO && month_spend > target,
    }
}

/// First goal (in the given order) whose deadline falls in the month.
pub fn current_goal(goals: &[SavingsGoal], year: i32, month: u32) -> Option<&SavingsGoal> {
    goals
        .iter()
        .find(|g| g.deadline.year() == year && g.deadline.month() == month)
}
