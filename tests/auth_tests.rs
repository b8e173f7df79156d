// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kakeibo::commands::{settings, tenants};
use kakeibo::error::Error;
use kakeibo::{auth, cli, db, store};

#[test]
fn hashes_are_salted_argon2() {
    let a = auth::hash_password("hunter2").unwrap();
    let b = auth::hash_password("hunter2").unwrap();
    assert!(a.starts_with("$argon2"));
    assert_ne!(a, b);
    assert!(auth::verify_password(&a, "hunter2"));
    assert!(!auth::verify_password(&a, "hunter3"));
    assert!(!auth::verify_password("sha256:abcdef", "hunter2"));
}

#[test]
fn login_sets_session_and_logout_clears_it() {
    let conn = db::open_in_memory().unwrap();
    auth::register(&conn, "alice", "s3cret").unwrap();
    assert!(auth::register(&conn, "alice", "other").is_err());
    assert!(auth::current_user(&conn).unwrap().is_none());

    assert!(matches!(
        auth::login(&conn, "alice", "wrong"),
        Err(Error::Auth)
    ));
    assert!(matches!(
        auth::login(&conn, "nobody", "s3cret"),
        Err(Error::Auth)
    ));
    assert!(auth::current_user(&conn).unwrap().is_none());

    let user = auth::login(&conn, "alice", "s3cret").unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(
        auth::current_user(&conn).unwrap().map(|u| u.username),
        Some("alice".to_string())
    );

    auth::logout(&conn).unwrap();
    assert!(auth::current_user(&conn).unwrap().is_none());
}

#[test]
fn joining_and_leaving_switches_tenant() {
    let conn = db::open_in_memory().unwrap();
    let public = store::public_tenant_id(&conn).unwrap();
    assert_eq!(auth::current_tenant(&conn).unwrap(), public);

    let family = store::create_tenant(&conn, "family", "Family").unwrap();
    assert!(tenants::join(&conn, "family").is_err(), "join needs a login");

    auth::register(&conn, "alice", "pw").unwrap();
    auth::login(&conn, "alice", "pw").unwrap();
    assert!(tenants::join(&conn, "no-such-code").is_err());

    tenants::join(&conn, "family").unwrap();
    assert_eq!(auth::current_tenant(&conn).unwrap(), family);
    let mains = store::list_main_categories(&conn, family).unwrap();
    assert_eq!(mains.len(), 4);

    conn.execute("UPDATE aikotoba SET active=0 WHERE code='family'", [])
        .unwrap();
    tenants::leave(&conn).unwrap();
    assert_eq!(auth::current_tenant(&conn).unwrap(), public);
    assert!(tenants::join(&conn, "family").is_err(), "inactive code");
}

#[test]
fn active_user_cannot_be_set_through_config() {
    let conn = db::open_in_memory().unwrap();
    auth::register(&conn, "alice", "pw").unwrap();
    let matches =
        cli::build_cli().get_matches_from(["kakeibo", "config", "set", "current_user", "alice"]);
    if let Some(("config", config_m)) = matches.subcommand() {
        assert!(settings::handle(&conn, config_m).is_err());
    } else {
        panic!("no config subcommand");
    }
    assert!(auth::current_user(&conn).unwrap().is_none());

    let matches =
        cli::build_cli().get_matches_from(["kakeibo", "config", "set", "insight_threshold", "25"]);
    if let Some(("config", config_m)) = matches.subcommand() {
        settings::handle(&conn, config_m).unwrap();
    }
    let rows = settings::list_rows(&conn).unwrap();
    let threshold = rows.iter().find(|r| r.key == "insight_threshold").unwrap();
    assert_eq!(threshold.value.as_deref(), Some("25"));
    assert_eq!(kakeibo::config::insight_threshold(&conn).unwrap(), 25);
}
