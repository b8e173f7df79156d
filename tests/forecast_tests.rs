// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kakeibo::forecast::{days_elapsed, month_context};
use kakeibo::month::{Month, add_months};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn linear_forecast_and_daily_allowance() {
    let april: Month = "2024-04".parse().unwrap();
    let ctx = month_context(30000, 10000, april, d(2024, 4, 10));
    assert_eq!(ctx.days_in_month, 30);
    assert_eq!(ctx.forecast, 30000);
    assert_eq!(ctx.days_left, 20);
    assert_eq!(ctx.per_day, 1000);
    assert_eq!(ctx.progress_pct, 33);
}

#[test]
fn reference_outside_month_is_clamped() {
    let april: Month = "2024-04".parse().unwrap();
    assert_eq!(days_elapsed(april, d(2024, 3, 15)), 1);
    assert_eq!(days_elapsed(april, d(2024, 4, 1)), 1);
    assert_eq!(days_elapsed(april, d(2024, 4, 30)), 30);
    assert_eq!(days_elapsed(april, d(2025, 1, 1)), 30);

    // A finished month projects its actual spend and keeps one day left.
    let past = month_context(30000, 12000, april, d(2024, 6, 1));
    assert_eq!(past.forecast, 12000);
    assert_eq!(past.days_left, 1);
    assert_eq!(past.per_day, 18000);

    let future = month_context(30000, 500, april, d(2024, 1, 1));
    assert_eq!(future.forecast, 15000);
    assert_eq!(future.days_left, 29);
}

#[test]
fn no_budget_and_overspending() {
    let march: Month = "2024-03".parse().unwrap();
    let none = month_context(0, 4000, march, d(2024, 3, 10));
    assert_eq!(none.progress_pct, 0);
    assert_eq!(none.per_day, 0);

    let over = month_context(1000, 5000, march, d(2024, 3, 10));
    assert_eq!(over.progress_pct, 100);
    assert_eq!(over.per_day, 0);
    assert_eq!(over.forecast, 15500);
}

#[test]
fn month_parsing_and_arithmetic() {
    let m: Month = "2024-01".parse().unwrap();
    assert_eq!(m.prev().to_string(), "2023-12");
    assert_eq!(m.year_ago().to_string(), "2023-01");
    assert_eq!(m.shift(14).to_string(), "2025-03");
    assert_eq!(m.range(), (d(2024, 1, 1), d(2024, 2, 1)));
    assert!(m.contains(d(2024, 1, 31)));
    assert!(!m.contains(d(2024, 2, 1)));

    let feb: Month = "2024-02".parse().unwrap();
    assert_eq!(feb.days_in_month(), 29);
    assert_eq!("2023-02".parse::<Month>().unwrap().days_in_month(), 28);

    for bad in ["2024-3", "2024-13", "2024-03-01", "march", ""] {
        assert!(bad.parse::<Month>().is_err(), "{:?} should be rejected", bad);
    }
}

#[test]
fn add_months_clamps_to_month_end() {
    assert_eq!(add_months(d(2024, 1, 31), 1), Some(d(2024, 2, 29)));
    assert_eq!(add_months(d(2023, 12, 15), 2), Some(d(2024, 2, 15)));
}

#[test]
fn context_report_reads_daily_budget_and_spend() {
    use kakeibo::commands::reports::context_for;
    use kakeibo::models::{NewTransaction, TxType};
    use kakeibo::{db, store};

    let conn = db::open_in_memory().unwrap();
    let tenant = store::public_tenant_id(&conn).unwrap();
    let daily = store::main_category_by_name(&conn, tenant, "Daily").unwrap();
    let food = store::add_sub_category(&conn, tenant, daily.id, "Food").unwrap();
    let april: Month = "2024-04".parse().unwrap();
    store::set_budget(&conn, tenant, food, april, 30000, None).unwrap();
    store::insert_transaction(
        &conn,
        tenant,
        &NewTransaction {
            sub_category_id: food,
            amount: 10000,
            r#type: TxType::Expense,
            date: d(2024, 4, 3),
            detail: String::new(),
            created_by: None,
        },
    )
    .unwrap();

    let ctx = context_for(&conn, april, d(2024, 4, 10)).unwrap();
    assert_eq!((ctx.forecast, ctx.per_day, ctx.progress_pct), (30000, 1000, 33));
}
