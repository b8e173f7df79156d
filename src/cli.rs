// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .help("Print as a pretty JSON array")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .help("Print one JSON object per line")
            .action(ArgAction::SetTrue),
    )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .help("Month to report on (default: current month)")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn password_arg() -> Arg {
    Arg::new("password")
        .long("password")
        .short('p')
        .required(true)
}

pub fn build_cli() -> Command {
    Command::new("kakeibo")
        .about("Household ledger: budgets, forecasts and spending insights")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .global(true)
                .help("SQLite file to use instead of the default location"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr (RUST_LOG takes precedence)"),
        )
        .subcommand(Command::new("init").about("Create the database and apply migrations"))
        .subcommand(tx_cmd())
        .subcommand(category_cmd())
        .subcommand(budget_cmd())
        .subcommand(report_cmd())
        .subcommand(recurring_cmd())
        .subcommand(tenant_cmd())
        .subcommand(user_cmd())
        .subcommand(config_cmd())
        .subcommand(
            Command::new("export").about("Back up data").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("import").about("Restore data").subcommand(
                Command::new("transactions").arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .help("CSV with date,main_category,sub_category,type,amount,detail"),
                ),
            ),
        )
        .subcommand(Command::new("doctor").about("Check ledger integrity"))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("main").long("main").help("Main category (default: daily category)"))
                .arg(Arg::new("sub").long("sub").required(true))
                .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .default_value("expense")
                        .help("expense|income|budget"),
                )
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default: today)"))
                .arg(Arg::new("detail").long("detail").default_value("")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .arg(month_arg().help("Only this month"))
                .arg(Arg::new("from").long("from").value_name("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").value_name("YYYY-MM-DD"))
                .arg(Arg::new("main").long("main"))
                .arg(Arg::new("sub").long("sub"))
                .arg(Arg::new("query").long("query").short('q'))
                .arg(Arg::new("limit").long("limit").value_parser(value_parser!(usize)))
                .arg(Arg::new("offset").long("offset").value_parser(value_parser!(usize))),
        ))
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(Arg::new("main").long("main"))
                .arg(Arg::new("sub").long("sub"))
                .arg(Arg::new("amount").long("amount").allow_hyphen_values(true))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("detail").long("detail")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(json_flags(
            Command::new("others")
                .about("Entries by others since your last entry")
                .arg(month_arg().help("Restrict to one month"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .default_value("5")
                        .value_parser(value_parser!(usize)),
                ),
        ))
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage main and sub categories")
        .subcommand(
            Command::new("main")
                .subcommand(Command::new("add").arg(Arg::new("name").required(true)))
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rename")
                        .arg(id_arg())
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("sub")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("main").long("main").required(true))
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(Arg::new("main").long("main")),
                ))
                .subcommand(
                    Command::new("rename")
                        .arg(id_arg())
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("move")
                        .arg(id_arg())
                        .arg(Arg::new("to").long("to").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly budgets of the everyday category")
        .subcommand(
            Command::new("set")
                .arg(month_arg())
                .arg(Arg::new("main").long("main").help("Main category (default: daily category)"))
                .arg(Arg::new("sub").long("sub").required(true))
                .arg(Arg::new("amount").long("amount").required(true)),
        )
        .subcommand(json_flags(Command::new("progress").arg(month_arg())))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Summaries and insights")
        .subcommand(json_flags(
            Command::new("summary")
                .about("Monthly income/expense with cumulative balance")
                .arg(Arg::new("from").long("from").value_name("YYYY-MM"))
                .arg(Arg::new("to").long("to").value_name("YYYY-MM")),
        ))
        .subcommand(json_flags(
            Command::new("context")
                .about("Month-end forecast and daily allowance")
                .arg(month_arg()),
        ))
        .subcommand(json_flags(
            Command::new("insights")
                .about("Month-over-month and year-over-year changes")
                .arg(month_arg()),
        ))
        .subcommand(json_flags(
            Command::new("gifts").about("Gifts received against returns"),
        ))
        .subcommand(json_flags(
            Command::new("months").about("Months that have entries"),
        ))
}

fn recurring_cmd() -> Command {
    Command::new("recurring")
        .about("Recurring bills")
        .subcommand(json_flags(Command::new("due").arg(
            Arg::new("date").long("date").help("Reference date (default: today)"),
        )))
        .subcommand(
            Command::new("fill")
                .arg(id_arg())
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("amount").long("amount")),
        )
}

fn tenant_cmd() -> Command {
    Command::new("tenant")
        .about("Shared ledgers (aikotoba)")
        .subcommand(
            Command::new("create")
                .arg(Arg::new("code").required(true))
                .arg(Arg::new("label").long("label")),
        )
        .subcommand(Command::new("join").arg(Arg::new("code").required(true)))
        .subcommand(Command::new("leave"))
        .subcommand(Command::new("current"))
        .subcommand(json_flags(Command::new("list")))
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Local accounts")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("username").required(true))
                .arg(password_arg()),
        )
        .subcommand(
            Command::new("login")
                .arg(Arg::new("username").required(true))
                .arg(password_arg()),
        )
        .subcommand(Command::new("logout"))
        .subcommand(Command::new("whoami"))
}

fn config_cmd() -> Command {
    Command::new("config")
        .about("Persisted settings")
        .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
        .subcommand(
            Command::new("set")
                .arg(Arg::new("key").required(true))
                .arg(Arg::new("value").required(true)),
        )
        .subcommand(json_flags(Command::new("list")))
}
