// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbloom::models::{
    Category, Expense, NewNotification, Notification, NotificationKind, SavingsGoal,
};
use budgetbloom::rules::{self, Preferences, RuleContext};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// 2026-10-17 is a Saturday; its week starts Sunday 2026-10-11.
fn today() -> NaiveDate {
    d("2026-10-17")
}

fn exp(id: i64, amount: &str, category: Category, date: NaiveDate) -> Expense {
    Expense {
        id,
        amount: dec(amount),
        category,
        description: "x".into(),
        note: None,
        date,
    }
}

fn goal(target: &str, current: &str, deadline: &str) -> SavingsGoal {
    SavingsGoal {
        id: 1,
        name: "Trip".into(),
        target_amount: dec(target),
        current_amount: dec(current),
        deadline: d(deadline),
        created_at: d("2026-10-01").and_hms_opt(9, 0, 0).unwrap(),
    }
}

fn ctx<'a>(
    expenses: &'a [Expense],
    goals: &'a [SavingsGoal],
    existing: &'a [Notification],
) -> RuleContext<'a> {
    RuleContext {
        expenses,
        goals,
        existing,
        prefs: Preferences::default(),
        today: today(),
    }
}

fn stored(n: &NewNotification) -> Notification {
    Notification {
        id: 99,
        kind: n.kind,
        title: n.title.clone(),
        message: n.message.clone(),
        is_read: true,
        created_at: d("2026-10-16").and_hms_opt(8, 0, 0).unwrap(),
        icon: None,
    }
}

#[test]
fn week_starts_on_sunday() {
    assert_eq!(rules::week_start(today()), d("2026-10-11"));
    assert_eq!(rules::week_start(d("2026-10-11")), d("2026-10-11"));
}

#[test]
fn halfway_nudge_window_is_45_to_50_percent() {
    let goals = vec![goal("100", "0", "2026-10-31")];
    for (spent, fires) in [("50", true), ("52", true), ("55", false), ("40", false)] {
        let e = vec![exp(1, spent, Category::Food, d("2026-10-02"))];
        let got = rules::goal_halfway_nudge(&ctx(&e, &goals, &[]));
        assert_eq!(got.is_some(), fires, "spent {}", spent);
    }
    let other_month = vec![goal("100", "0", "2026-11-30")];
    let e = vec![exp(1, "52", Category::Food, d("2026-10-02"))];
    assert!(rules::goal_halfway_nudge(&ctx(&e, &other_month, &[])).is_none());
}

#[test]
fn entertainment_nudge_needs_more_than_double_last_week() {
    let last = d("2026-10-06");
    let this = d("2026-10-12");
    let doubled = vec![
        exp(1, "10", Category::Entertainment, last),
        exp(2, "21", Category::Entertainment, this),
    ];
    let n = rules::entertainment_doubled_nudge(&ctx(&doubled, &[], &[])).unwrap();
    assert_eq!(n.title, rules::ENTERTAINMENT_TITLE);
    assert_eq!(n.kind, NotificationKind::Nudge);

    let exactly_double = vec![
        exp(1, "10", Category::Entertainment, last),
        exp(2, "20", Category::Entertainment, this),
    ];
    assert!(rules::entertainment_doubled_nudge(&ctx(&exactly_double, &[], &[])).is_none());

    let nothing_last_week = vec![exp(2, "50", Category::Entertainment, this)];
    assert!(rules::entertainment_doubled_nudge(&ctx(&nothing_last_week, &[], &[])).is_none());

    let other_category = vec![
        exp(1, "10", Category::Entertainment, last),
        exp(2, "50", Category::Food, this),
    ];
    assert!(rules::entertainment_doubled_nudge(&ctx(&other_category, &[], &[])).is_none());
}

#[test]
fn no_spend_nudge_fires_after_seven_spending_days() {
    let streak: Vec<Expense> = (0..7)
        .map(|i| exp(i, "3", Category::Food, today() - Duration::days(i)))
        .collect();
    let n = rules::no_spend_day_nudge(&ctx(&streak, &[], &[])).unwrap();
    assert_eq!(n.title, rules::NO_SPEND_TITLE);

    let with_gap: Vec<Expense> = streak.iter().filter(|e| e.id != 3).cloned().collect();
    assert!(rules::no_spend_day_nudge(&ctx(&with_gap, &[], &[])).is_none());
}

#[test]
fn savings_milestones_at_half_and_full() {
    let half = vec![goal("100", "50", "2026-12-31")];
    let got = rules::savings_milestones(&ctx(&[], &half, &[]));
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].title, rules::MILESTONE_HALF_TITLE);
    assert!(got[0].message.contains("\"Trip\""));

    let past_window = vec![goal("100", "55", "2026-12-31")];
    assert!(rules::savings_milestones(&ctx(&[], &past_window, &[])).is_empty());

    let done = vec![goal("100", "120", "2026-12-31")];
    let got = rules::savings_milestones(&ctx(&[], &done, &[]));
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].kind, NotificationKind::Achievement);
    assert!(got[0].message.contains("$100.00"));
}

#[test]
fn overspending_warning_when_month_exceeds_goal() {
    let goals = vec![goal("100", "0", "2026-10-31")];
    let e = vec![exp(1, "120", Category::Shopping, d("2026-10-03"))];
    let w = rules::overspending_warning(&ctx(&e, &goals, &[])).unwrap();
    assert_eq!(w.kind, NotificationKind::Warning);
    assert!(w.message.contains("$120.00"));

    let under = vec![exp(1, "80", Category::Shopping, d("2026-10-03"))];
    assert!(rules::overspending_warning(&ctx(&under, &goals, &[])).is_none());
}

#[test]
fn evaluate_suppresses_existing_title_and_message() {
    let streak: Vec<Expense> = (0..7)
        .map(|i| exp(i, "3", Category::Food, today() - Duration::days(i)))
        .collect();
    let first = rules::evaluate(&ctx(&streak, &[], &[]));
    assert_eq!(first.len(), 1);

    let existing: Vec<Notification> = first.iter().map(stored).collect();
    assert!(rules::evaluate(&ctx(&streak, &[], &existing)).is_empty());
}

#[test]
fn evaluate_respects_preferences() {
    let streak: Vec<Expense> = (0..7)
        .map(|i| exp(i, "3", Category::Food, today() - Duration::days(i)))
        .collect();
    let done = vec![goal("100", "100", "2026-12-31")];
    let mut c = ctx(&streak, &done, &[]);
    c.prefs.nudges = false;
    let got = rules::evaluate(&c);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].kind, NotificationKind::Achievement);

    c.prefs.achievements = false;
    assert!(rules::evaluate(&c).is_empty());
}

#[test]
fn weekly_report_summarises_last_seven_days() {
    let e = vec![
        exp(1, "10", Category::Food, today()),
        exp(2, "25", Category::Transport, d("2026-10-12")),
        exp(3, "500", Category::Shopping, d("2026-10-01")),
    ];
    let r = rules::weekly_report(&e, today());
    assert_eq!(r.kind, NotificationKind::WeeklyReport);
    assert!(r.message.contains("$35.00"));
    assert!(r.message.contains("Transportation"));

    let empty = rules::weekly_report(&[], today());
    assert!(empty.message.starts_with("No expenses"));
}
