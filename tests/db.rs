//! Key lifecycle and payment ledger tests against the store directly.

mod common;
use common::*;

#[test]
fn test_create_key_persists_active_row() {
    let conn = setup_test_db();
    let key = create_test_key(&conn, Plan::Days7, JAN_1_2024);

    assert_eq!(key.key.len(), 32);
    assert_eq!(key.status, KeyStatus::Active);

    let row = queries::get_key(&conn, &key.key).unwrap().unwrap();
    assert_eq!(row.plan, Plan::Days7);
    assert_eq!(row.created_at, JAN_1_2024);
    assert_eq!(row.status, KeyStatus::Active);
}

#[test]
fn test_expiry_equals_created_at_plus_plan_duration() {
    let conn = setup_test_db();
    for plan in PAID_PLANS {
        let key = create_test_key(&conn, plan, JAN_1_2024);
        assert_eq!(
            key.expires_at,
            JAN_1_2024 + plan.duration_secs().unwrap(),
            "wrong expiry for plan {}",
            plan.as_ref()
        );
    }
}

#[test]
fn test_seven_day_key_lifecycle_around_expiry() {
    let conn = setup_test_db();
    let key = create_test_key(&conn, Plan::Days7, JAN_1_2024);
    assert_eq!(key.expires_at, JAN_8_2024);

    // One second before expiry: valid with one second left
    match queries::validate_key_at(&conn, &key.key, JAN_8_2024 - 1).unwrap() {
        Some(KeyValidation::Valid { remaining_secs, .. }) => assert_eq!(remaining_secs, 1),
        other => panic!("expected valid, got {:?}", other),
    }

    // Exactly at expiry: still valid, zero seconds left (expiry is strict)
    match queries::validate_key_at(&conn, &key.key, JAN_8_2024).unwrap() {
        Some(KeyValidation::Valid { remaining_secs, .. }) => assert_eq!(remaining_secs, 0),
        other => panic!("expected valid, got {:?}", other),
    }

    // One second past expiry: expired, and the row is flipped
    match queries::validate_key_at(&conn, &key.key, JAN_8_2024 + 1).unwrap() {
        Some(KeyValidation::Expired) => {}
        other => panic!("expected expired, got {:?}", other),
    }
    let row = queries::get_key(&conn, &key.key).unwrap().unwrap();
    assert_eq!(row.status, KeyStatus::Expired);

    // Validating again is idempotent: same answer, no further change
    match queries::validate_key_at(&conn, &key.key, JAN_8_2024 + 2).unwrap() {
        Some(KeyValidation::Expired) => {}
        other => panic!("expected expired, got {:?}", other),
    }
    let row = queries::get_key(&conn, &key.key).unwrap().unwrap();
    assert_eq!(row.status, KeyStatus::Expired);
}

#[test]
fn test_admin_key_never_expires() {
    let conn = setup_test_db();
    let key = create_test_key(&conn, Plan::Admin, JAN_1_2024);
    assert_eq!(key.expires_at, FAR_FUTURE);

    // A century of elapsed time changes nothing
    let century_later = JAN_1_2024 + 100 * 365 * 86400;
    match queries::validate_key_at(&conn, &key.key, century_later).unwrap() {
        Some(KeyValidation::Valid { remaining_secs, .. }) => {
            assert_eq!(remaining_secs, FAR_FUTURE - century_later);
        }
        other => panic!("expected valid, got {:?}", other),
    }

    let row = queries::get_key(&conn, &key.key).unwrap().unwrap();
    assert_eq!(row.status, KeyStatus::Active);
}

#[test]
fn test_unknown_token_validates_to_none() {
    let conn = setup_test_db();
    let result = queries::validate_key_at(&conn, "no-such-token", JAN_1_2024).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_disabled_key_reports_inactive_until_its_time_runs_out() {
    let conn = setup_test_db();
    let key = create_test_key(&conn, Plan::Days30, JAN_1_2024);
    set_key_status(&conn, &key.key, "disabled");

    match queries::validate_key_at(&conn, &key.key, JAN_1_2024 + 60).unwrap() {
        Some(KeyValidation::Disabled) => {}
        other => panic!("expected disabled, got {:?}", other),
    }

    // Past its time the answer becomes expired, but the row keeps the
    // operator's disabled status rather than being overwritten
    match queries::validate_key_at(&conn, &key.key, key.expires_at + 1).unwrap() {
        Some(KeyValidation::Expired) => {}
        other => panic!("expected expired, got {:?}", other),
    }
    let row = queries::get_key(&conn, &key.key).unwrap().unwrap();
    assert_eq!(row.status, KeyStatus::Disabled);
}

#[test]
fn test_mark_key_expired_reports_whether_it_wrote() {
    let conn = setup_test_db();
    let key = create_test_key(&conn, Plan::Days7, JAN_1_2024);

    assert!(queries::mark_key_expired(&conn, &key.key).unwrap());
    assert!(!queries::mark_key_expired(&conn, &key.key).unwrap());
}

#[test]
fn test_ensure_admin_key_only_creates_once() {
    let conn = setup_test_db();

    let first = queries::ensure_admin_key(&conn).unwrap();
    assert!(first.is_some());
    assert_eq!(first.unwrap().plan, Plan::Admin);

    let second = queries::ensure_admin_key(&conn).unwrap();
    assert!(second.is_none());
    assert_eq!(queries::count_keys(&conn).unwrap(), 1);
}

#[test]
fn test_count_active_keys_excludes_expired() {
    let conn = setup_test_db();
    let a = create_test_key(&conn, Plan::Days7, JAN_1_2024);
    let _b = create_test_key(&conn, Plan::Days15, JAN_1_2024);

    assert_eq!(queries::count_active_keys(&conn).unwrap(), 2);

    queries::mark_key_expired(&conn, &a.key).unwrap();
    assert_eq!(queries::count_active_keys(&conn).unwrap(), 1);
    assert_eq!(queries::count_keys(&conn).unwrap(), 2);
}

#[test]
fn test_payment_attempt_success_lifecycle() {
    let conn = setup_test_db();

    let attempt = queries::create_payment_attempt(
        &conn,
        PaymentProvider::Mpesa,
        "841234567",
        "Test Payer",
        Plan::Days7,
        300,
    )
    .unwrap();
    assert_eq!(attempt.status, PaymentAttemptStatus::Pending);
    assert_eq!(queries::count_pending_payment_attempts(&conn).unwrap(), 1);

    let key = create_test_key(&conn, Plan::Days7, JAN_1_2024);
    queries::complete_payment_attempt(&conn, &attempt.id, Some("TX123"), &key.key).unwrap();

    let row = queries::get_payment_attempt(&conn, &attempt.id)
        .unwrap()
        .unwrap();
    assert_eq!(row.status, PaymentAttemptStatus::Succeeded);
    assert_eq!(row.provider_ref.as_deref(), Some("TX123"));
    assert_eq!(row.key.as_deref(), Some(key.key.as_str()));
    assert!(row.failure_reason.is_none());
    assert_eq!(queries::count_pending_payment_attempts(&conn).unwrap(), 0);
}

#[test]
fn test_payment_attempt_failure_records_reason() {
    let conn = setup_test_db();

    let attempt = queries::create_payment_attempt(
        &conn,
        PaymentProvider::Emola,
        "861234567",
        "Test Payer",
        Plan::Days30,
        1200,
    )
    .unwrap();

    queries::fail_payment_attempt(&conn, &attempt.id, "Insufficient balance").unwrap();

    let row = queries::get_payment_attempt(&conn, &attempt.id)
        .unwrap()
        .unwrap();
    assert_eq!(row.status, PaymentAttemptStatus::Failed);
    assert_eq!(row.failure_reason.as_deref(), Some("Insufficient balance"));
    assert!(row.key.is_none());
    assert_eq!(queries::count_pending_payment_attempts(&conn).unwrap(), 0);
}

#[test]
fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.db");
    let path = path.to_str().unwrap();

    let token = {
        let pool = keygrid::db::create_pool(path).unwrap();
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
        create_test_key(&conn, Plan::Days15, JAN_1_2024).key
    };

    let pool = keygrid::db::create_pool(path).unwrap();
    let conn = pool.get().unwrap();
    init_db(&conn).unwrap();

    let row = queries::get_key(&conn, &token).unwrap().unwrap();
    assert_eq!(row.plan, Plan::Days15);
    assert_eq!(row.status, KeyStatus::Active);
}
