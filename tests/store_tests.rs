// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kakeibo::error::Error;
use kakeibo::models::{NewTransaction, TransactionPatch, TxType};
use kakeibo::store::{self, TransactionFilter};
use kakeibo::utils::{parse_amount, parse_date};
use kakeibo::db;
use rusqlite::{Connection, params};

fn setup() -> (Connection, i64, i64) {
    let conn = db::open_in_memory().unwrap();
    let tenant = store::public_tenant_id(&conn).unwrap();
    let daily = store::main_category_by_name(&conn, tenant, "Daily").unwrap();
    let food = store::add_sub_category(&conn, tenant, daily.id, "Food").unwrap();
    (conn, tenant, food)
}

fn new_tx(sid: i64, amount: i64, date: &str) -> NewTransaction {
    NewTransaction {
        sub_category_id: sid,
        amount,
        r#type: TxType::Expense,
        date: parse_date(date).unwrap(),
        detail: format!("on {}", date),
        created_by: None,
    }
}

#[test]
fn migrations_are_idempotent() {
    let mut conn = db::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    db::init_schema(&mut conn).unwrap();

    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap();
    assert_eq!(version, db::schema_version());
    let tenants: i64 = conn
        .query_row("SELECT COUNT(*) FROM aikotoba", [], |r| r.get(0))
        .unwrap();
    assert_eq!(tenants, 1);
    let mains: i64 = conn
        .query_row("SELECT COUNT(*) FROM main_categories", [], |r| r.get(0))
        .unwrap();
    assert_eq!(mains, 4);
}

#[test]
fn malformed_input_is_rejected() {
    for bad in ["2024-02-30", "2024-3-5", "2024/03/05", "20240305", ""] {
        assert!(
            matches!(parse_date(bad), Err(Error::InvalidDate(_))),
            "{:?} should be rejected",
            bad
        );
    }
    assert!(matches!("transfer".parse::<TxType>(), Err(Error::UnknownType(_))));
    assert_eq!("支出".parse::<TxType>().unwrap(), TxType::Expense);
    assert_eq!(" Income ".parse::<TxType>().unwrap(), TxType::Income);

    assert_eq!(parse_amount("¥1,500").unwrap(), 1500);
    assert_eq!(parse_amount("-300円").unwrap(), -300);
    assert_eq!(parse_amount(" $ 12 ").unwrap(), 12);
    for bad in [
        "", "abc", "12.5", "1-2", "-", "1e3", "12abc", "3 items 500", "0x10", "1,2,3", "¥",
    ] {
        assert!(
            matches!(parse_amount(bad), Err(Error::InvalidAmount(_))),
            "{:?} should be rejected",
            bad
        );
    }
}

#[test]
fn schema_rejects_bad_dates_and_types() {
    let (conn, tenant, food) = setup();
    let bad_date = conn.execute(
        "INSERT INTO transactions(sub_category_id, amount, type, date, aikotoba_id)
         VALUES (?1, 100, 'expense', '2024/03/01', ?2)",
        params![food, tenant],
    );
    assert!(bad_date.is_err());
    let bad_type = conn.execute(
        "INSERT INTO transactions(sub_category_id, amount, type, date, aikotoba_id)
         VALUES (?1, 100, 'transfer', '2024-03-01', ?2)",
        params![food, tenant],
    );
    assert!(bad_type.is_err());
    let ok = conn.execute(
        "INSERT INTO transactions(sub_category_id, amount, type, date, aikotoba_id)
         VALUES (?1, 100, 'expense', '2024-03-01', ?2)",
        params![food, tenant],
    );
    assert_eq!(ok.unwrap(), 1);
}

#[test]
fn writes_into_another_tenant_are_refused() {
    let (conn, tenant, _) = setup();
    let family = store::create_tenant(&conn, "family", "Family").unwrap();
    let their_daily = store::main_category_by_name(&conn, family, "Daily").unwrap();
    let their_food = store::add_sub_category(&conn, family, their_daily.id, "Food").unwrap();

    let err = store::insert_transaction(&conn, tenant, &new_tx(their_food, 100, "2024-03-01"))
        .unwrap_err();
    assert!(matches!(err, Error::TenantMismatch(_)));
    assert!(matches!(
        store::add_sub_category(&conn, tenant, their_daily.id, "Sneaky"),
        Err(Error::TenantMismatch(_))
    ));

    let id = store::insert_transaction(&conn, family, &new_tx(their_food, 100, "2024-03-01"))
        .unwrap();
    assert!(matches!(
        store::delete_transaction(&conn, tenant, id),
        Err(Error::TenantMismatch(_))
    ));
    assert_eq!(store::get_transaction(&conn, family, id).unwrap().tenant_id, family);
}

#[test]
fn sub_category_inherits_tenant_and_delete_cascades_rows() {
    let (conn, tenant, food) = setup();
    let sc = store::sub_category(&conn, tenant, food).unwrap();
    assert_eq!(sc.tenant_id, tenant);
    assert_eq!(sc.main_category_name, "Daily");

    store::insert_transaction(&conn, tenant, &new_tx(food, 100, "2024-03-01")).unwrap();
    store::insert_transaction(&conn, tenant, &new_tx(food, 200, "2024-03-02")).unwrap();
    assert_eq!(store::delete_sub_category(&conn, tenant, food).unwrap(), 2);
    assert!(matches!(
        store::sub_category(&conn, tenant, food),
        Err(Error::NotFound(_))
    ));
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 0);
}

#[test]
fn move_and_rename_sub_category() {
    let (conn, tenant, food) = setup();
    let special = store::main_category_by_name(&conn, tenant, "Special").unwrap();
    store::move_sub_category(&conn, tenant, food, special.id).unwrap();
    store::rename_sub_category(&conn, tenant, food, "Dining out").unwrap();
    let sc = store::sub_category(&conn, tenant, food).unwrap();
    assert_eq!(sc.main_category_name, "Special");
    assert_eq!(sc.name, "Dining out");
    let found = store::sub_category_by_name(&conn, tenant, "Special", "Dining out").unwrap();
    assert_eq!(found.id, food);
}

#[test]
fn blank_category_names_are_rejected_on_rename() {
    let (conn, tenant, food) = setup();
    let daily = store::main_category_by_name(&conn, tenant, "Daily").unwrap();
    for blank in ["", "   "] {
        assert!(matches!(
            store::rename_main_category(&conn, tenant, daily.id, blank),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            store::rename_sub_category(&conn, tenant, food, blank),
            Err(Error::Invalid(_))
        ));
    }
    assert_eq!(store::sub_category(&conn, tenant, food).unwrap().name, "Food");
    assert_eq!(store::main_category(&conn, tenant, daily.id).unwrap().name, "Daily");
}

#[test]
fn sub_category_names_are_unique_per_main_category() {
    let (conn, tenant, _) = setup();
    let daily = store::main_category_by_name(&conn, tenant, "Daily").unwrap();
    let travel = store::main_category_by_name(&conn, tenant, "Travel").unwrap();

    assert!(matches!(
        store::add_sub_category(&conn, tenant, daily.id, " Food "),
        Err(Error::Invalid(_))
    ));
    let snacks = store::add_sub_category(&conn, tenant, daily.id, "Snacks").unwrap();
    assert!(matches!(
        store::rename_sub_category(&conn, tenant, snacks, "Food"),
        Err(Error::Invalid(_))
    ));
    // Renaming to its own name is not a clash.
    store::rename_sub_category(&conn, tenant, snacks, "Snacks").unwrap();

    let travel_food = store::add_sub_category(&conn, tenant, travel.id, "Food").unwrap();
    assert!(matches!(
        store::move_sub_category(&conn, tenant, travel_food, daily.id),
        Err(Error::Invalid(_))
    ));

    let dup = conn.execute(
        "INSERT INTO sub_categories(main_category_id, name, aikotoba_id) VALUES (?1, 'Food', ?2)",
        params![daily.id, tenant],
    );
    assert!(dup.is_err());
}

#[test]
fn update_applies_only_given_fields() {
    let (conn, tenant, food) = setup();
    let id = store::insert_transaction(&conn, tenant, &new_tx(food, 100, "2024-03-01")).unwrap();

    assert!(matches!(
        store::update_transaction(&conn, tenant, id, &TransactionPatch::default()),
        Err(Error::Invalid(_))
    ));

    let patch = TransactionPatch {
        amount: Some(450),
        r#type: Some(TxType::Income),
        ..Default::default()
    };
    assert_eq!(store::update_transaction(&conn, tenant, id, &patch).unwrap(), 1);
    let t = store::get_transaction(&conn, tenant, id).unwrap();
    assert_eq!((t.amount, t.r#type), (450, TxType::Income));
    assert_eq!(t.date.to_string(), "2024-03-01");
    assert_eq!(t.detail, "on 2024-03-01");
}

#[test]
fn list_is_newest_first_with_paging() {
    let (conn, tenant, food) = setup();
    for date in ["2024-01-01", "2024-01-03", "2024-01-02"] {
        store::insert_transaction(&conn, tenant, &new_tx(food, 10, date)).unwrap();
    }

    let (rows, total) = store::list_transactions(
        &conn,
        tenant,
        &TransactionFilter {
            limit: Some(2),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(total, 3);
    let dates: Vec<String> = rows.iter().map(|t| t.date.to_string()).collect();
    assert_eq!(dates, ["2024-01-03", "2024-01-02"]);

    let (rows, _) = store::list_transactions(
        &conn,
        tenant,
        &TransactionFilter {
            offset: Some(2),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date.to_string(), "2024-01-01");

    let (rows, total) = store::list_transactions(
        &conn,
        tenant,
        &TransactionFilter {
            start: Some(parse_date("2024-01-02").unwrap()),
            end: Some(parse_date("2024-01-02").unwrap()),
            query: Some("01-02".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!((rows.len(), total), (1, 1));
}
