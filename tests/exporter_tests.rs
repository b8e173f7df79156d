// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kakeibo::models::{NewTransaction, TxType};
use kakeibo::{cli, commands::exporter, db, store, utils::parse_date};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = db::open_in_memory().unwrap();
    let tenant = store::public_tenant_id(&conn).unwrap();
    let daily = store::main_category_by_name(&conn, tenant, "Daily").unwrap();
    let food = store::add_sub_category(&conn, tenant, daily.id, "Food").unwrap();
    for (amount, ty, date, detail) in [
        (30000, TxType::Budget, "2025-01-01", ""),
        (1234, TxType::Expense, "2025-01-02", "Corner Shop, weekly run"),
    ] {
        store::insert_transaction(
            &conn,
            tenant,
            &NewTransaction {
                sub_category_id: food,
                amount,
                r#type: ty,
                date: parse_date(date).unwrap(),
                detail: detail.into(),
                created_by: None,
            },
        )
        .unwrap();
    }
    conn
}

fn export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "kakeibo",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_streams_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    export(&conn, "json", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2025-01-01",
                "main_category": "Daily",
                "sub_category": "Food",
                "type": "budget",
                "amount": 30000,
                "detail": ""
            },
            {
                "date": "2025-01-02",
                "main_category": "Daily",
                "sub_category": "Food",
                "type": "expense",
                "amount": 1234,
                "detail": "Corner Shop, weekly run"
            }
        ])
    );
}

#[test]
fn export_csv_uses_import_columns() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    export(&conn, "CSV", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], exporter::COLUMNS.join(","));
    assert_eq!(lines[1], "2025-01-01,Daily,Food,budget,30000,");
    assert_eq!(lines[2], "2025-01-02,Daily,Food,expense,1234,\"Corner Shop, weekly run\"");
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    assert!(export(&conn, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
