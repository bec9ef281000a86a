// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON instead of a table"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true).help("Row id")
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Month as YYYY-MM (defaults to the current month)")
}

fn category_arg() -> Arg {
    Arg::new("category")
        .long("category")
        .short('c')
        .help("food | transport | entertainment | shopping | health | other")
}

fn auth_cmds() -> Vec<Command> {
    vec![
        Command::new("register")
            .about("Create an account and log in")
            .arg(Arg::new("name").long("name").required(true))
            .arg(Arg::new("email").long("email").required(true))
            .arg(
                Arg::new("password")
                    .long("password")
                    .help("Prompted for when omitted"),
            )
            .arg(
                Arg::new("confirm")
                    .long("confirm")
                    .help("Password confirmation; prompted for when --password is omitted"),
            ),
        Command::new("login")
            .about("Log in with email and password")
            .arg(Arg::new("email").long("email").required(true))
            .arg(
                Arg::new("password")
                    .long("password")
                    .help("Prompted for when omitted"),
            ),
        Command::new("logout").about("End the current session"),
        Command::new("whoami").about("Show the logged-in user"),
    ]
}

fn expense_cmd() -> Command {
    Command::new("expense")
        .about("Log and manage expenses")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record an expense")
                .arg(Arg::new("amount").long("amount").short('a').required(true))
                .arg(category_arg().required(true))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .short('d')
                        .required(true),
                )
                .arg(Arg::new("note").long("note"))
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("YYYY-MM-DD (defaults to today)"),
                ),
        )
        .subcommand(
            Command::new("edit")
                .about("Change fields of an existing expense")
                .arg(id_arg())
                .arg(Arg::new("amount").long("amount").short('a'))
                .arg(category_arg())
                .arg(Arg::new("description").long("description").short('d'))
                .arg(Arg::new("note").long("note"))
                .arg(
                    Arg::new("clear_note")
                        .long("clear-note")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("note"),
                )
                .arg(Arg::new("date").long("date")),
        )
        .subcommand(Command::new("rm").about("Delete an expense").arg(id_arg()))
        .subcommand(json_flags(
            Command::new("list")
                .about("List expenses with filters")
                .arg(category_arg())
                .arg(Arg::new("from").long("from").help("YYYY-MM-DD, inclusive"))
                .arg(Arg::new("to").long("to").help("YYYY-MM-DD, inclusive"))
                .arg(month_arg().conflicts_with_all(["from", "to"]))
                .arg(
                    Arg::new("last7")
                        .long("last7")
                        .action(ArgAction::SetTrue)
                        .conflicts_with_all(["from", "to", "month"]),
                )
                .arg(
                    Arg::new("this_month")
                        .long("this-month")
                        .action(ArgAction::SetTrue)
                        .conflicts_with_all(["from", "to", "month", "last7"]),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_parser(["date", "amount"])
                        .default_value("date"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Savings goals")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .about("Set the monthly savings goal")
                .arg(Arg::new("amount").long("amount").short('a').required(true))
                .arg(month_arg()),
        )
        .subcommand(
            Command::new("add")
                .about("Add a named goal")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("target").long("target").required(true))
                .arg(Arg::new("current").long("current"))
                .arg(Arg::new("deadline").long("deadline").required(true)),
        )
        .subcommand(
            Command::new("update")
                .about("Change fields of a goal")
                .arg(id_arg())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("target").long("target"))
                .arg(Arg::new("current").long("current"))
                .arg(Arg::new("deadline").long("deadline")),
        )
        .subcommand(Command::new("rm").about("Delete a goal").arg(id_arg()))
        .subcommand(json_flags(Command::new("list").about("List goals")))
        .subcommand(json_flags(
            Command::new("status")
                .about("Progress against the monthly goal")
                .arg(month_arg()),
        ))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Spending analytics")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("summary").about("Totals, averages and goal progress"),
        ))
        .subcommand(json_flags(
            Command::new("categories")
                .about("Spending per category")
                .arg(month_arg().help("Limit to one month (YYYY-MM)")),
        ))
        .subcommand(json_flags(
            Command::new("trend")
                .about("Daily (30 days) or weekly (4 weeks) spending")
                .arg(
                    Arg::new("weekly")
                        .long("weekly")
                        .action(ArgAction::SetTrue),
                ),
        ))
        .subcommand(json_flags(
            Command::new("calendar")
                .about("Month grid of daily totals")
                .arg(month_arg()),
        ))
        .subcommand(json_flags(
            Command::new("day")
                .about("Expenses on one date")
                .arg(Arg::new("date").long("date").required(true)),
        ))
}

fn notify_cmd() -> Command {
    Command::new("notify")
        .about("Notification feed")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("list").about("List notifications").arg(
                Arg::new("unread")
                    .long("unread")
                    .action(ArgAction::SetTrue),
            ),
        ))
        .subcommand(Command::new("read").about("Mark one as read").arg(id_arg()))
        .subcommand(Command::new("read-all").about("Mark all as read"))
        .subcommand(Command::new("clear").about("Delete one").arg(id_arg()))
        .subcommand(Command::new("clear-all").about("Delete all notifications"))
        .subcommand(Command::new("check").about("Evaluate notification rules now"))
        .subcommand(json_flags(
            Command::new("nudges").about("Unread nudges that were not dismissed"),
        ))
        .subcommand(Command::new("dismiss").about("Hide a nudge").arg(id_arg()))
        .subcommand(Command::new("weekly-report").about("Create this week's report"))
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Notification preferences")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("Show preferences"))
        .subcommand(
            Command::new("get")
                .arg(Arg::new("key").long("key").required(true)),
        )
        .subcommand(
            Command::new("set")
                .arg(Arg::new("key").long("key").required(true))
                .arg(
                    Arg::new("value")
                        .long("value")
                        .required(true)
                        .value_parser(["on", "off"]),
                ),
        )
        .subcommand(
            Command::new("clear-notifications").about("Delete all notification history"),
        )
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Export your expenses")
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(["json", "csv"])
                .default_value("json"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .help("Defaults to budgetbloom-export-YYYY-MM-DD.<format>"),
        )
}

pub fn build_cli() -> Command {
    Command::new("budgetbloom")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track expenses, set a monthly savings goal and watch your spending bloom")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("BUDGETBLOOM_DB")
                .help("Path to the SQLite database"),
        )
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .hide(true)
                .env("BUDGETBLOOM_TODAY")
                .help("Override today's date (YYYY-MM-DD)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommands(auth_cmds())
        .subcommand(expense_cmd())
        .subcommand(goal_cmd())
        .subcommand(report_cmd())
        .subcommand(notify_cmd())
        .subcommand(settings_cmd())
        .subcommand(export_cmd())
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
}
