//! Integration tests for the leave ledger against an in-memory database.

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{App, test};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::LedgerError;
use crate::ledger::{LedgerSettings, balance, workflow};
use crate::model::leave_application::LeaveStatus;
use crate::model::leave_type::LeaveType;
use crate::routes;

async fn pool() -> SqlitePool {
    db::init_db("sqlite::memory:").await.expect("in-memory pool")
}

fn settings() -> LedgerSettings {
    LedgerSettings::default()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        rate_api_per_min: 1000,
        api_prefix: "/api/v1".into(),
        ledger: settings(),
    }
}

async fn seed_employee(pool: &SqlitePool, name: &str, email: &str, hire_date: NaiveDate) -> i64 {
    sqlx::query("INSERT INTO employees (name, email, hire_date) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(hire_date)
        .execute(pool)
        .await
        .expect("seed employee")
        .last_insert_rowid()
}

async fn seed_leave_type(
    pool: &SqlitePool,
    name: &str,
    annual_allocation: i64,
    max_consecutive_days: i64,
    min_notice_days: i64,
    carry_forward: bool,
) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO leave_types
            (name, annual_allocation, max_consecutive_days, min_notice_days, carry_forward)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(annual_allocation)
    .bind(max_consecutive_days)
    .bind(min_notice_days)
    .bind(carry_forward)
    .execute(pool)
    .await
    .expect("seed leave type")
    .last_insert_rowid()
}

fn leave_request(
    employee_id: i64,
    leave_type_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> workflow::LeaveRequest {
    workflow::LeaveRequest {
        employee_id,
        leave_type_id,
        start_date: start,
        end_date: end,
        reason: "personal".into(),
        comments: None,
    }
}

async fn balance_of(
    pool: &SqlitePool,
    employee_id: i64,
    leave_type_id: i64,
    year: i32,
) -> balance::LeaveBalance {
    let mut conn = pool.acquire().await.unwrap();
    let leave_type = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types WHERE id = ?")
        .bind(leave_type_id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    balance::compute(&mut conn, employee_id, &leave_type, year, 1)
        .await
        .unwrap()
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[actix_web::test]
async fn submit_creates_pending_application() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();

    assert_eq!(app.status, LeaveStatus::Pending);
    assert_eq!(app.days_requested, 5);
    assert!(app.validated_on.is_none());
}

#[actix_web::test]
async fn submit_same_day_counts_one_day() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 1)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();

    assert_eq!(app.days_requested, 1);
}

#[actix_web::test]
async fn submit_rejects_inverted_range() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 5), date(2026, 3, 1)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
}

#[actix_web::test]
async fn submit_rejects_start_before_hire_date() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2026, 6, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
}

#[actix_web::test]
async fn submit_rejects_past_start_date() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 1, 5), date(2026, 1, 8)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
}

#[actix_web::test]
async fn submit_rejects_inactive_employee() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;
    sqlx::query("UPDATE employees SET is_active = 0 WHERE id = ?")
        .bind(emp)
        .execute(&pool)
        .await
        .unwrap();

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
}

#[actix_web::test]
async fn submit_rejects_inactive_leave_type() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;
    sqlx::query("UPDATE leave_types SET is_active = 0 WHERE id = ?")
        .bind(lt)
        .execute(&pool)
        .await
        .unwrap();

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
}

#[actix_web::test]
async fn submit_rejects_unknown_employee_and_type() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(999, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, 999, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[actix_web::test]
async fn submit_rejects_exceeding_max_consecutive_days() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 30, 7, 0, false).await;

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 6, 1), date(2026, 6, 20)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
}

#[actix_web::test]
async fn submit_rejects_short_notice() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 5, false).await;

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 3), date(2026, 3, 4)),
        at(2026, 3, 1),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
}

#[actix_web::test]
async fn submit_rejects_overlap_even_on_shared_endpoint() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();

    // Sharing only the endpoint day still overlaps.
    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 5), date(2026, 3, 9)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    // A different leave type does not escape the overlap check.
    let sick = seed_leave_type(&pool, "Sick", 10, 30, 0, false).await;
    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, sick, date(2026, 3, 3), date(2026, 3, 4)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[actix_web::test]
async fn submit_rejects_insufficient_balance() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 10, 30, 0, false).await;

    let err = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 15)),
        at(2026, 1, 10),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
}

// ─── Approval ────────────────────────────────────────────────────────────────

#[actix_web::test]
async fn approve_debits_balance() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2024, 3, 1), date(2024, 3, 5)),
        at(2024, 1, 10),
    )
    .await
    .unwrap();

    let approved = workflow::approve(&pool, settings(), app.id, None, at(2024, 1, 11))
        .await
        .unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert!(approved.validated_on.is_some());

    let bal = balance_of(&pool, emp, lt, 2024).await;
    assert_eq!(bal.allocated, 20);
    assert_eq!(bal.used, 5);
    assert_eq!(bal.available, 15);
    assert_eq!(bal.available, bal.allocated - bal.used);
}

#[actix_web::test]
async fn approve_twice_is_a_state_error() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();

    workflow::approve(&pool, settings(), app.id, None, at(2026, 1, 11))
        .await
        .unwrap();
    let err = workflow::approve(&pool, settings(), app.id, None, at(2026, 1, 12))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::State(_)));
    // No double debit.
    assert_eq!(balance_of(&pool, emp, lt, 2026).await.used, 5);
}

#[actix_web::test]
async fn approve_unknown_application_is_not_found() {
    let pool = pool().await;
    let err = workflow::approve(&pool, settings(), 999, None, at(2026, 1, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[actix_web::test]
async fn second_approval_revalidates_against_committed_state() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    // Both fit the balance while pending; together they exceed it.
    let first = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 15)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();
    let second = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 4, 1), date(2026, 4, 10)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();

    workflow::approve(&pool, settings(), first.id, None, at(2026, 1, 11))
        .await
        .unwrap();
    let err = workflow::approve(&pool, settings(), second.id, None, at(2026, 1, 11))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
    let bal = balance_of(&pool, emp, lt, 2026).await;
    assert_eq!(bal.used, 15);
    assert_eq!(bal.available, 5);
}

#[actix_web::test]
async fn approval_splits_debit_across_year_boundary() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 12, 28), date(2027, 1, 3)),
        at(2026, 6, 1),
    )
    .await
    .unwrap();
    assert_eq!(app.days_requested, 7);

    workflow::approve(&pool, settings(), app.id, None, at(2026, 6, 2))
        .await
        .unwrap();

    assert_eq!(balance_of(&pool, emp, lt, 2026).await.used, 4);
    assert_eq!(balance_of(&pool, emp, lt, 2027).await.used, 3);
}

// ─── Rejection ───────────────────────────────────────────────────────────────

#[actix_web::test]
async fn reject_requires_a_reason() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();

    let err = workflow::reject(&pool, app.id, "   ".into(), at(2026, 1, 11))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let rejected = workflow::reject(&pool, app.id, "short-staffed".into(), at(2026, 1, 11))
        .await
        .unwrap();
    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("short-staffed"));
    assert!(rejected.validated_on.is_some());

    // Rejected applications never touch the balance.
    assert_eq!(balance_of(&pool, emp, lt, 2026).await.used, 0);

    // Terminal; a second rejection is refused.
    let err = workflow::reject(&pool, app.id, "again".into(), at(2026, 1, 12))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::State(_)));
}

// ─── Cancellation ────────────────────────────────────────────────────────────

#[actix_web::test]
async fn cancel_pending_application() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();

    let cancelled = workflow::cancel(&pool, settings(), app.id, at(2026, 1, 11))
        .await
        .unwrap();
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);
}

#[actix_web::test]
async fn cancel_approved_future_leave_restores_balance() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();
    workflow::approve(&pool, settings(), app.id, None, at(2026, 1, 11))
        .await
        .unwrap();
    assert_eq!(balance_of(&pool, emp, lt, 2026).await.used, 5);

    let cancelled = workflow::cancel(&pool, settings(), app.id, at(2026, 2, 1))
        .await
        .unwrap();
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);

    let bal = balance_of(&pool, emp, lt, 2026).await;
    assert_eq!(bal.used, 0);
    assert_eq!(bal.available, 20);
}

#[actix_web::test]
async fn cancel_approved_leave_already_underway_fails() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();
    workflow::approve(&pool, settings(), app.id, None, at(2026, 1, 11))
        .await
        .unwrap();

    // Start date has passed; the leave is underway.
    let err = workflow::cancel(&pool, settings(), app.id, at(2026, 3, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::State(_)));

    // Completed leave is just as uncancellable, and the debit stands.
    let err = workflow::cancel(&pool, settings(), app.id, at(2026, 6, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::State(_)));
    assert_eq!(balance_of(&pool, emp, lt, 2026).await.used, 5);
}

#[actix_web::test]
async fn cancel_terminal_application_fails() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();
    workflow::reject(&pool, app.id, "no".into(), at(2026, 1, 11))
        .await
        .unwrap();

    let err = workflow::cancel(&pool, settings(), app.id, at(2026, 1, 12))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::State(_)));
}

// ─── Balance ledger ──────────────────────────────────────────────────────────

#[actix_web::test]
async fn carry_forward_rolls_unused_days_into_next_year() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, true).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 15)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();
    workflow::approve(&pool, settings(), app.id, None, at(2026, 1, 11))
        .await
        .unwrap();

    assert_eq!(balance_of(&pool, emp, lt, 2026).await.available, 5);

    let next = balance_of(&pool, emp, lt, 2027).await;
    assert_eq!(next.allocated, 25);
    assert_eq!(next.used, 0);
    assert_eq!(next.available, 25);
}

#[actix_web::test]
async fn no_carry_forward_means_annual_reset() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 15)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();
    workflow::approve(&pool, settings(), app.id, None, at(2026, 1, 11))
        .await
        .unwrap();

    assert_eq!(balance_of(&pool, emp, lt, 2027).await.allocated, 20);
}

#[actix_web::test]
async fn carry_forward_lookback_is_capped() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2020, 1, 1)).await;
    let lt_id = seed_leave_type(&pool, "Annual", 20, 30, 0, true).await;

    let mut conn = pool.acquire().await.unwrap();
    let lt = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types WHERE id = ?")
        .bind(lt_id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();

    // Untouched prior years: one year of remainder with the default
    // lookback, two with a deeper horizon.
    let capped = balance::compute(&mut conn, emp, &lt, 2027, 1).await.unwrap();
    assert_eq!(capped.allocated, 40);

    let deeper = balance::compute(&mut conn, emp, &lt, 2027, 2).await.unwrap();
    assert_eq!(deeper.allocated, 60);

    // Lookback 0 disables carry-forward outright.
    let none = balance::compute(&mut conn, emp, &lt, 2027, 0).await.unwrap();
    assert_eq!(none.allocated, 20);
}

#[actix_web::test]
async fn allocation_change_applies_from_next_materialization() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 3, 1), date(2026, 3, 5)),
        at(2026, 1, 10),
    )
    .await
    .unwrap();
    workflow::approve(&pool, settings(), app.id, None, at(2026, 1, 11))
        .await
        .unwrap();

    let before = balance_of(&pool, emp, lt, 2026).await;
    assert_eq!(before.allocated, 20);
    assert_eq!(before.available, 15);

    sqlx::query("UPDATE leave_types SET annual_allocation = 30 WHERE id = ?")
        .bind(lt)
        .execute(&pool)
        .await
        .unwrap();

    // Nothing stored to recompute; the next materialization sees the new
    // allocation while the used days are untouched.
    let after = balance_of(&pool, emp, lt, 2026).await;
    assert_eq!(after.allocated, 30);
    assert_eq!(after.used, 5);
    assert_eq!(after.available, 25);
}

#[actix_web::test]
async fn active_years_cover_approved_spans_and_today() {
    let pool = pool().await;
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2023, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let app = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2026, 12, 28), date(2027, 1, 3)),
        at(2026, 6, 1),
    )
    .await
    .unwrap();
    workflow::approve(&pool, settings(), app.id, None, at(2026, 6, 2))
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let years = balance::active_years(&mut conn, emp, date(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(years, vec![2025, 2026, 2027]);
}

// ─── HTTP surface ────────────────────────────────────────────────────────────

macro_rules! api {
    ($pool:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(Data::new($pool.clone()))
                .app_data(Data::new($config.clone()))
                .configure(|cfg| routes::configure(cfg, $config.clone())),
        )
        .await
    };
}

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:54321".parse().unwrap()
}

#[actix_web::test]
async fn http_submit_approve_flow() {
    let pool = pool().await;
    let config = test_config();
    let app = api!(pool, config);

    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2099, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/leave")
        .peer_addr(peer())
        .set_json(json!({
            "employee_id": emp,
            "leave_type_id": lt,
            "start_date": "2100-06-01",
            "end_date": "2100-06-05",
            "reason": "family vacation"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["days_requested"], 5);
    let id = body["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/leave/{id}/approve"))
        .peer_addr(peer())
        .set_json(json!({"comments": "enjoy!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "approved");

    // Approving a second time is refused with 409.
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/leave/{id}/approve"))
        .peer_addr(peer())
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn http_reject_requires_reason() {
    let pool = pool().await;
    let config = test_config();
    let app = api!(pool, config);

    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2099, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/leave")
        .peer_addr(peer())
        .set_json(json!({
            "employee_id": emp,
            "leave_type_id": lt,
            "start_date": "2100-06-01",
            "end_date": "2100-06-05",
            "reason": "family vacation"
        }))
        .to_request();
    let body: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    let id = body["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/leave/{id}/reject"))
        .peer_addr(peer())
        .set_json(json!({"rejection_reason": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn http_balance_report() {
    let pool = pool().await;
    let config = test_config();
    let app = api!(pool, config);

    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2099, 1, 1)).await;
    seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/employees/{emp}/balance?year=2100"))
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["year"], 2100);
    assert_eq!(body["balances"][0]["allocated"], 20);
    assert_eq!(body["balances"][0]["available"], 20);

    // Unknown employees 404 instead of reporting empty balances.
    let req = test::TestRequest::get()
        .uri("/api/v1/employees/999/balance?year=2100")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn http_leave_type_validation_and_delete_conflict() {
    let pool = pool().await;
    let config = test_config();
    let app = api!(pool, config);

    // Registry validation: empty name, negative allocation.
    let req = test::TestRequest::post()
        .uri("/api/v1/leave-types")
        .peer_addr(peer())
        .set_json(json!({"name": "  ", "annual_allocation": 20}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/leave-types")
        .peer_addr(peer())
        .set_json(json!({"name": "Annual", "annual_allocation": -1}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    // A type with a pending application cannot be deleted.
    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2099, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 20, 30, 0, false).await;
    let pending = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2100, 6, 1), date(2100, 6, 5)),
        at(2100, 1, 10),
    )
    .await
    .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/leave-types/{lt}"))
        .peer_addr(peer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    // Once every reference is terminal the delete goes through.
    workflow::reject(&pool, pending.id, "no".into(), at(2100, 1, 11))
        .await
        .unwrap();
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/leave-types/{lt}"))
        .peer_addr(peer())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn http_leave_list_filters_by_status() {
    let pool = pool().await;
    let config = test_config();
    let app = api!(pool, config);

    let emp = seed_employee(&pool, "Alice", "alice@example.com", date(2099, 1, 1)).await;
    let lt = seed_leave_type(&pool, "Annual", 40, 30, 0, false).await;

    let first = workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2100, 6, 1), date(2100, 6, 5)),
        at(2100, 1, 10),
    )
    .await
    .unwrap();
    workflow::submit(
        &pool,
        settings(),
        leave_request(emp, lt, date(2100, 7, 1), date(2100, 7, 5)),
        at(2100, 1, 10),
    )
    .await
    .unwrap();
    workflow::approve(&pool, settings(), first.id, None, at(2100, 1, 11))
        .await
        .unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/leave?employee_id={emp}&status=pending"))
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["status"], "pending");

    // Unknown status values are a validation error, not an empty list.
    let req = test::TestRequest::get()
        .uri("/api/v1/leave?status=bogus")
        .peer_addr(peer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}
