// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Threshold rules that turn the expense and goal lists into notifications.
//!
//! Evaluation is a linear scan over everything in memory. A candidate is
//! dropped when a notification with the same type, title and message already
//! exists; there is no stored rule-firing key.

use crate::analytics;
use crate::models::{Category, Expense, NewNotification, Notification, NotificationKind, SavingsGoal};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashSet;

pub const HALFWAY_NUDGE_TITLE: &str = "You're halfway to your savings goal!";
pub const HALFWAY_NUDGE_MESSAGE: &str = "Great job! Keep up the saving streak.";
pub const ENTERTAINMENT_TITLE: &str = "Your entertainment spending has doubled this week!";
pub const ENTERTAINMENT_MESSAGE: &str = "Consider reviewing your fun budget.";
pub const NO_SPEND_TITLE: &str = "Try a no-spend day tomorrow?";
pub const NO_SPEND_MESSAGE: &str = "Challenge yourself to spend nothing for a day!";
pub const MILESTONE_HALF_TITLE: &str = "Halfway There! 🎉";
pub const MILESTONE_DONE_TITLE: &str = "Goal Achieved! 🏆";
pub const OVERSPEND_TITLE: &str = "You've gone over your monthly goal";
pub const WEEKLY_REPORT_TITLE: &str = "Your weekly spending report";

/// Which notification kinds the user allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub achievements: bool,
    pub warnings: bool,
    pub nudges: bool,
    pub weekly_reports: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            achievements: true,
            warnings: true,
            nudges: true,
            weekly_reports: true,
        }
    }
}

impl Preferences {
    pub fn allows(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Achievement => self.achievements,
            NotificationKind::Warning => self.warnings,
            NotificationKind::Nudge => self.nudges,
            NotificationKind::WeeklyReport => self.weekly_reports,
        }
    }
}

pub struct RuleContext<'a> {
    pub expenses: &'a [Expense],
    pub goals: &'a [SavingsGoal],
    pub existing: &'a [Notification],
    pub prefs: Preferences,
    pub today: NaiveDate,
}

fn note(kind: NotificationKind, title: &str, message: &str, icon: &str) -> NewNotification {
    NewNotification {
        kind,
        title: title.to_string(),
        message: message.to_string(),
        icon: Some(icon.to_string()),
    }
}

/// Sunday that starts the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_sunday() as i64)
}

fn month_spend(expenses: &[Expense], today: NaiveDate) -> Decimal {
    analytics::total(&analytics::monthly(expenses, today.year(), today.month()))
}

pub fn goal_halfway_nudge(ctx: &RuleContext<'_>) -> Option<NewNotification> {
    let goal = analytics::current_goal(ctx.goals, ctx.today.year(), ctx.today.month())?;
    if goal.target_amount <= Decimal::ZERO {
        return None;
    }
    let spent = month_spend(ctx.expenses, ctx.today);
    let progress = goal
        .target_amount
        .checked_sub(spent)?
        .checked_div(goal.target_amount)?;
    let lower = Decimal::new(45, 2);
    let upper = Decimal::new(5, 1);
    (progress > lower && progress <= upper).then(|| {
        note(
            NotificationKind::Nudge,
            HALFWAY_NUDGE_TITLE,
            HALFWAY_NUDGE_MESSAGE,
            "🌱",
        )
    })
}

pub fn entertainment_doubled_nudge(ctx: &RuleContext<'_>) -> Option<NewNotification> {
    let this_start = week_start(ctx.today);
    let this_end = this_start + Duration::days(6);
    let last_start = this_start - Duration::days(7);
    let last_end = this_start - Duration::days(1);
    let fun = analytics::by_category(ctx.expenses, Some(Category::Entertainment));
    let this_week = analytics::total(&analytics::filter(&fun, None, Some(this_start), Some(this_end)));
    let last_week = analytics::total(&analytics::filter(&fun, None, Some(last_start), Some(last_end)));
    let doubled = last_week.checked_mul(Decimal::TWO)?;
    (last_week > Decimal::ZERO && this_week > doubled).then(|| {
        note(
            NotificationKind::Nudge,
            ENTERTAINMENT_TITLE,
            ENTERTAINMENT_MESSAGE,
            "🎉",
        )
    })
}

/// Fires when each of the last seven days, today included, has spending.
pub fn no_spend_day_nudge(ctx: &RuleContext<'_>) -> Option<NewNotification> {
    let spent_days: HashSet<NaiveDate> = ctx.expenses.iter().map(|e| e.date).collect();
    let streak = (0..7).all(|back| spent_days.contains(&(ctx.today - Duration::days(back))));
    streak.then(|| {
        note(
            NotificationKind::Nudge,
            NO_SPEND_TITLE,
            NO_SPEND_MESSAGE,
            "💡",
        )
    })
}

pub fn savings_milestones(ctx: &RuleContext<'_>) -> Vec<NewNotification> {
    let mut out = Vec::new();
    for goal in ctx.goals {
        if goal.target_amount <= Decimal::ZERO || goal.current_amount < Decimal::ZERO {
            continue;
        }
        // overflow only happens far past the target
        let pct = analytics::percent_of(goal.current_amount, goal.target_amount)
            .unwrap_or(Decimal::ONE_HUNDRED);
        if pct >= Decimal::from(50) && pct < Decimal::from(55) && goal.current_amount > Decimal::ZERO {
            out.push(note(
                NotificationKind::Achievement,
                MILESTONE_HALF_TITLE,
                &format!(
                    "You're 50% of the way to your \"{}\" goal! Keep up the great work!",
                    goal.name
                ),
                "🎯",
            ));
        }
        if pct >= Decimal::from(100) {
            out.push(note(
                NotificationKind::Achievement,
                MILESTONE_DONE_TITLE,
                &format!(
                    "Congratulations! You've reached your \"{}\" goal of ${:.2}!",
                    goal.name, goal.target_amount
                ),
                "🏆",
            ));
        }
    }
    out
}

pub fn overspending_warning(ctx: &RuleContext<'_>) -> Option<NewNotification> {
    let goal = analytics::current_goal(ctx.goals, ctx.today.year(), ctx.today.month())?;
    let spent = month_spend(ctx.expenses, ctx.today);
    let progress = analytics::goal_progress(Some(goal), spent);
    progress.overspending.then(|| {
        note(
            NotificationKind::Warning,
            OVERSPEND_TITLE,
            &format!(
                "You've spent ${:.2} against your ${:.2} goal for {}.",
                spent,
                goal.target_amount,
                crate::utils::month_title(ctx.today.year(), ctx.today.month())
            ),
            "⚠️",
        )
    })
}

/// Summary of the seven days ending today. Only produced on request.
pub fn weekly_report(expenses: &[Expense], today: NaiveDate) -> NewNotification {
    let start = today - Duration::days(6);
    let week = analytics::filter(expenses, None, Some(start), Some(today));
    let message = if week.is_empty() {
        format!(
            "No expenses between {} and {}.",
            start.format("%b %d"),
            today.format("%b %d")
        )
    } else {
        let top = analytics::top_category(&week);
        format!(
            "You spent ${:.2} across {} expenses between {} and {}. Top category: {}.",
            analytics::total(&week),
            week.len(),
            start.format("%b %d"),
            today.format("%b %d"),
            top.label()
        )
    };
    note(NotificationKind::WeeklyReport, WEEKLY_REPORT_TITLE, &message, "📊")
}

pub fn is_duplicate(existing: &[Notification], candidate: &NewNotification) -> bool {
    existing.iter().any(|n| {
        n.kind == candidate.kind && n.title == candidate.title && n.message == candidate.message
    })
}

/// Runs every automatic rule and returns the notifications that should be
/// created, minus disabled kinds and duplicates.
pub fn evaluate(ctx: &RuleContext<'_>) -> Vec<NewNotification> {
    let mut candidates = savings_milestones(ctx);
    candidates.extend(overspending_warning(ctx));
    candidates.extend(goal_halfway_nudge(ctx));
    candidates.extend(entertainment_doubled_nudge(ctx));
    candidates.extend(no_spend_day_nudge(ctx));

    let mut out: Vec<NewNotification> = Vec::new();
    for c in candidates {
        if !ctx.prefs.allows(c.kind) || is_duplicate(ctx.existing, &c) || out.contains(&c) {
            continue;
        }
        out.push(c);
    }
    out
}
