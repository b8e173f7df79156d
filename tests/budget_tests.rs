// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kakeibo::aggregate::{MonthSums, budget_and_spent_of_month, category_totals};
use kakeibo::models::{NewTransaction, TxType};
use kakeibo::month::Month;
use kakeibo::progress::{budget_progress, clamped_percentage};
use kakeibo::{cli, commands::budgets, db, store, utils::parse_date};
use rusqlite::Connection;
use std::collections::BTreeMap;

fn setup() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let tenant = store::public_tenant_id(&conn).unwrap();
    (conn, tenant)
}

fn sub(conn: &Connection, tenant: i64, main: &str, name: &str) -> i64 {
    let main = store::main_category_by_name(conn, tenant, main).unwrap();
    store::add_sub_category(conn, tenant, main.id, name).unwrap()
}

fn record(conn: &Connection, tenant: i64, sid: i64, amount: i64, ty: TxType, date: &str) -> i64 {
    store::insert_transaction(
        conn,
        tenant,
        &NewTransaction {
            sub_category_id: sid,
            amount,
            r#type: ty,
            date: parse_date(date).unwrap(),
            detail: String::new(),
            created_by: None,
        },
    )
    .unwrap()
}

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

#[test]
fn empty_month_yields_empty_maps() {
    let (conn, tenant) = setup();
    let sums = budget_and_spent_of_month(&conn, tenant, "Daily", month("2024-03")).unwrap();
    assert!(sums.spent.is_empty());
    assert!(sums.budget.is_empty());
    assert!(budget_progress(&sums).is_empty());
}

#[test]
fn expense_is_counted_once_in_its_month_only() {
    let (conn, tenant) = setup();
    let food = sub(&conn, tenant, "Daily", "Food");
    record(&conn, tenant, food, 1500, TxType::Expense, "2024-03-15");

    let march = budget_and_spent_of_month(&conn, tenant, "Daily", month("2024-03")).unwrap();
    assert_eq!(march.spent.get("Food"), Some(&1500));
    assert_eq!(march.total_spent(), 1500);

    for other in ["2024-02", "2024-04", "2023-03"] {
        let sums = budget_and_spent_of_month(&conn, tenant, "Daily", month(other)).unwrap();
        assert!(sums.spent.is_empty(), "{} should be empty", other);
    }
}

#[test]
fn month_boundaries_are_half_open() {
    let (conn, tenant) = setup();
    let food = sub(&conn, tenant, "Daily", "Food");
    record(&conn, tenant, food, 100, TxType::Expense, "2024-02-29");
    record(&conn, tenant, food, 200, TxType::Expense, "2024-03-01");
    record(&conn, tenant, food, 300, TxType::Expense, "2024-03-31");
    record(&conn, tenant, food, 400, TxType::Expense, "2024-04-01");

    let sums = budget_and_spent_of_month(&conn, tenant, "Daily", month("2024-03")).unwrap();
    assert_eq!(sums.spent.get("Food"), Some(&500));
}

#[test]
fn only_daily_category_and_own_tenant_are_aggregated() {
    let (conn, tenant) = setup();
    let food = sub(&conn, tenant, "Daily", "Food");
    let trip = sub(&conn, tenant, "Travel", "Hotel");
    record(&conn, tenant, food, 1000, TxType::Expense, "2024-03-02");
    record(&conn, tenant, trip, 50000, TxType::Expense, "2024-03-03");
    record(&conn, tenant, food, 99999, TxType::Income, "2024-03-04");

    let family = store::create_tenant(&conn, "family", "Family").unwrap();
    let their_food = sub(&conn, family, "Daily", "Food");
    record(&conn, family, their_food, 7000, TxType::Expense, "2024-03-05");

    let sums = budget_and_spent_of_month(&conn, tenant, "Daily", month("2024-03")).unwrap();
    assert_eq!(sums.spent.len(), 1);
    assert_eq!(sums.spent.get("Food"), Some(&1000));

    let theirs = budget_and_spent_of_month(&conn, family, "Daily", month("2024-03")).unwrap();
    assert_eq!(theirs.spent.get("Food"), Some(&7000));
}

#[test]
fn category_totals_group_by_type() {
    let (conn, tenant) = setup();
    let food = sub(&conn, tenant, "Daily", "Food");
    record(&conn, tenant, food, 30000, TxType::Budget, "2024-03-01");
    record(&conn, tenant, food, 1200, TxType::Expense, "2024-03-10");
    record(&conn, tenant, food, 800, TxType::Expense, "2024-03-11");

    let rows = category_totals(&conn, tenant, "Daily", month("2024-03")).unwrap();
    assert_eq!(rows.len(), 2);
    let expense = rows.iter().find(|r| r.tx_type == TxType::Expense).unwrap();
    assert_eq!(expense.total, 2000);
    assert_eq!(expense.sub_category_id, food);
    let budget = rows.iter().find(|r| r.tx_type == TxType::Budget).unwrap();
    assert_eq!(budget.total, 30000);
}

#[test]
fn zero_budget_reports_zero_percent() {
    let sums = MonthSums {
        spent: BTreeMap::from([("Food".to_string(), 500)]),
        budget: BTreeMap::from([("Food".to_string(), 0)]),
    };
    let rows = budget_progress(&sums);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].percentage, 0);
    assert_eq!(rows[0].spent, 500);
}

#[test]
fn overspending_clamps_percentage_not_amounts() {
    let sums = MonthSums {
        spent: BTreeMap::from([("Food".to_string(), 15000)]),
        budget: BTreeMap::from([("Food".to_string(), 10000)]),
    };
    let rows = budget_progress(&sums);
    assert_eq!(rows[0].percentage, 100);
    assert_eq!(rows[0].spent, 15000);
    assert_eq!(rows[0].budget, 10000);
}

#[test]
fn progress_lists_union_of_budgeted_and_spent() {
    let sums = MonthSums {
        spent: BTreeMap::from([("Food".to_string(), 2500), ("Snacks".to_string(), 300)]),
        budget: BTreeMap::from([("Food".to_string(), 10000), ("Household".to_string(), 5000)]),
    };
    let rows = budget_progress(&sums);
    let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(names, ["Food", "Household", "Snacks"]);
    assert_eq!(rows[0].percentage, 25);
    assert_eq!((rows[1].spent, rows[1].percentage), (0, 0));
    assert_eq!((rows[2].budget, rows[2].percentage), (0, 0));
}

#[test]
fn clamped_percentage_handles_negatives() {
    assert_eq!(clamped_percentage(-500, 1000), 0);
    assert_eq!(clamped_percentage(500, -1000), 0);
    assert_eq!(clamped_percentage(333, 1000), 33);
}

#[test]
fn budget_set_replaces_previous_value() {
    let (conn, tenant) = setup();
    let food = sub(&conn, tenant, "Daily", "Food");
    record(&conn, tenant, food, 4000, TxType::Expense, "2024-03-08");

    for amount in ["30000", "20000"] {
        let matches = cli::build_cli().get_matches_from([
            "kakeibo", "budget", "set", "--month", "2024-03", "--sub", "Food", "--amount", amount,
        ]);
        if let Some(("budget", budget_m)) = matches.subcommand() {
            budgets::handle(&conn, budget_m).unwrap();
        } else {
            panic!("no budget subcommand");
        }
    }

    let report = budgets::progress_report(&conn, month("2024-03")).unwrap();
    assert_eq!(report.total_budget, 20000);
    assert_eq!(report.total_spent, 4000);
    assert_eq!(report.total_percentage, 20);
    assert_eq!(report.rows.len(), 1);

    let budget_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM transactions WHERE type='budget'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(budget_rows, 1);
}

#[test]
fn huge_amounts_saturate_month_totals() {
    let (conn, tenant) = setup();
    let food = sub(&conn, tenant, "Daily", "Food");
    let snacks = sub(&conn, tenant, "Daily", "Snacks");
    record(&conn, tenant, food, i64::MAX, TxType::Expense, "2024-03-01");
    record(&conn, tenant, snacks, i64::MAX, TxType::Expense, "2024-03-02");
    record(&conn, tenant, food, 1000, TxType::Budget, "2024-03-01");
    record(&conn, tenant, snacks, 2000, TxType::Budget, "2024-03-01");

    let report = budgets::progress_report(&conn, month("2024-03")).unwrap();
    assert_eq!(report.total_spent, i64::MAX);
    assert_eq!(report.total_budget, 3000);
    assert_eq!(report.total_percentage, 100);
    let pcts: Vec<i64> = report.rows.iter().map(|r| r.percentage).collect();
    assert_eq!(pcts, [100, 100]);
}
