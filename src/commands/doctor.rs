// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

const CHECKS: [(&str, &str); 4] = [
    (
        "malformed_date",
        "SELECT 'transaction #' || id || ' date ' || quote(date) FROM transactions
          WHERE date IS NOT strftime('%Y-%m-%d', date) ORDER BY id",
    ),
    (
        "missing_sub_category",
        "SELECT 'transaction #' || t.id || ' -> sub category #' || t.sub_category_id
           FROM transactions t LEFT JOIN sub_categories sc ON t.sub_category_id=sc.id
          WHERE sc.id IS NULL ORDER BY t.id",
    ),
    (
        "sub_category_tenant",
        "SELECT 'sub category #' || sc.id || ' (' || sc.name || ')'
           FROM sub_categories sc JOIN main_categories mc ON sc.main_category_id=mc.id
          WHERE sc.aikotoba_id<>mc.aikotoba_id ORDER BY sc.id",
    ),
    (
        "transaction_tenant",
        "SELECT 'transaction #' || t.id
           FROM transactions t JOIN sub_categories sc ON t.sub_category_id=sc.id
          WHERE t.aikotoba_id<>sc.aikotoba_id ORDER BY t.id",
    ),
];

pub fn find_issues(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();
    for (kind, sql) in CHECKS {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        for row in rows {
            let detail = row?;
            warn!(kind, %detail, "integrity issue");
            issues.push(Issue { kind, detail });
        }
    }
    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = find_issues(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
