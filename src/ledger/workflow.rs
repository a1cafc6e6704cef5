//! Leave Application Workflow: submission, approval, rejection and
//! cancellation, each validated and committed as a single transaction.
//!
//! `now` is taken once per operation at the API boundary and threaded
//! through, so every check inside one call sees the same instant.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{self, LedgerError};
use crate::ledger::{LedgerSettings, balance, policy};
use crate::model::employee::Employee;
use crate::model::leave_application::{LeaveApplication, LeaveStatus};
use crate::model::leave_type::LeaveType;

/// A leave request as it arrives at the submission boundary.
#[derive(Debug, Clone)]
pub struct LeaveRequest {
    pub employee_id: i64,
    pub leave_type_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub comments: Option<String>,
}

pub(crate) async fn fetch_employee(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Employee, LedgerError> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("employee {id} not found")))
}

pub(crate) async fn fetch_leave_type(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<LeaveType, LedgerError> {
    sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("leave type {id} not found")))
}

pub(crate) async fn fetch_application(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<LeaveApplication, LedgerError> {
    sqlx::query_as::<_, LeaveApplication>("SELECT * FROM leave_applications WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("leave application {id} not found")))
}

/// Validates a request against the employee, the leave type, existing
/// applications and the available balance, then creates it in `pending`.
/// The balance is not debited here; that happens on approval.
pub async fn submit(
    pool: &SqlitePool,
    settings: LedgerSettings,
    request: LeaveRequest,
    now: DateTime<Utc>,
) -> Result<LeaveApplication, LedgerError> {
    let today = now.date_naive();

    if request.start_date > request.end_date {
        return Err(LedgerError::Validation(
            "start_date cannot be after end_date".into(),
        ));
    }
    let days_requested = policy::inclusive_days(request.start_date, request.end_date);

    let mut tx = pool.begin().await?;

    let employee = fetch_employee(&mut tx, request.employee_id).await?;
    if !employee.is_active {
        return Err(LedgerError::Validation(
            "inactive employee cannot apply for leave".into(),
        ));
    }
    if request.start_date < employee.hire_date {
        return Err(LedgerError::Validation(
            "cannot apply for leave before the hire date".into(),
        ));
    }
    if request.start_date < today {
        return Err(LedgerError::Validation(
            "cannot apply for leave on past dates".into(),
        ));
    }

    let leave_type = fetch_leave_type(&mut tx, request.leave_type_id).await?;
    if !leave_type.is_active {
        return Err(LedgerError::Validation(format!(
            "leave type {} is not active",
            leave_type.name
        )));
    }
    if days_requested > leave_type.max_consecutive_days {
        return Err(LedgerError::Validation(format!(
            "cannot apply for more than {} consecutive days of {}",
            leave_type.max_consecutive_days, leave_type.name
        )));
    }
    let notice = policy::notice_days(today, request.start_date);
    if notice < leave_type.min_notice_days {
        return Err(LedgerError::Validation(format!(
            "minimum {} days notice required for {}",
            leave_type.min_notice_days, leave_type.name
        )));
    }

    // Overlap against any pending or approved application of the employee,
    // both endpoints inclusive, regardless of leave type.
    let open_applications = sqlx::query_as::<_, LeaveApplication>(
        r#"
        SELECT *
        FROM leave_applications
        WHERE employee_id = ? AND status IN ('pending', 'approved')
        "#,
    )
    .bind(request.employee_id)
    .fetch_all(&mut *tx)
    .await?;
    if let Some(existing) = open_applications.iter().find(|a| {
        policy::ranges_overlap(
            a.start_date,
            a.end_date,
            request.start_date,
            request.end_date,
        )
    }) {
        return Err(LedgerError::Validation(format!(
            "dates overlap an existing {} leave ({} to {})",
            existing.status, existing.start_date, existing.end_date
        )));
    }

    // Advisory balance check; approval re-validates against committed state.
    for (year, days) in policy::split_by_year(request.start_date, request.end_date) {
        let bal = balance::compute(
            &mut tx,
            request.employee_id,
            &leave_type,
            year,
            settings.carry_forward_lookback,
        )
        .await?;
        if days > bal.available {
            return Err(LedgerError::Validation(format!(
                "insufficient {} balance for {}: available {}, requested {}",
                leave_type.name, year, bal.available, days
            )));
        }
    }

    let id = sqlx::query(
        r#"
        INSERT INTO leave_applications
            (employee_id, leave_type_id, start_date, end_date, days_requested,
             reason, comments, status, applied_on)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(request.employee_id)
    .bind(request.leave_type_id)
    .bind(request.start_date)
    .bind(request.end_date)
    .bind(days_requested)
    .bind(&request.reason)
    .bind(&request.comments)
    .bind(LeaveStatus::Pending)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let application = fetch_application(&mut tx, id).await?;
    tx.commit().await?;

    tracing::debug!(
        application_id = id,
        employee_id = request.employee_id,
        days_requested,
        "leave application submitted"
    );
    Ok(application)
}

/// Approves a pending application. Available days are re-validated inside
/// the commit transaction for every calendar-year slice, so two approvals
/// racing on the same balance key cannot overdraw it: the status flip is the
/// debit, and a commit losing the race retries against post-commit state.
pub async fn approve(
    pool: &SqlitePool,
    settings: LedgerSettings,
    application_id: i64,
    comments: Option<String>,
    now: DateTime<Utc>,
) -> Result<LeaveApplication, LedgerError> {
    let mut attempt = 0;
    loop {
        match try_approve(pool, settings, application_id, comments.as_deref(), now).await {
            Err(LedgerError::Database(err)) if error::is_busy(&err) => {
                attempt += 1;
                if attempt > settings.balance_commit_retries {
                    return Err(LedgerError::Conflict(
                        "balance commit contention, please retry".into(),
                    ));
                }
                tracing::debug!(application_id, attempt, "approve hit a locked ledger, retrying");
            }
            other => return other,
        }
    }
}

async fn try_approve(
    pool: &SqlitePool,
    settings: LedgerSettings,
    application_id: i64,
    comments: Option<&str>,
    now: DateTime<Utc>,
) -> Result<LeaveApplication, LedgerError> {
    let mut tx = pool.begin().await?;

    let application = fetch_application(&mut tx, application_id).await?;
    if application.status != LeaveStatus::Pending {
        return Err(LedgerError::State(format!(
            "only pending applications can be approved; application {} is {}",
            application_id, application.status
        )));
    }

    let leave_type = fetch_leave_type(&mut tx, application.leave_type_id).await?;
    for (year, days) in policy::split_by_year(application.start_date, application.end_date) {
        let bal = balance::compute(
            &mut tx,
            application.employee_id,
            &leave_type,
            year,
            settings.carry_forward_lookback,
        )
        .await?;
        if days > bal.available {
            return Err(LedgerError::Validation(format!(
                "approving would overdraw the {} balance for {}: available {}, requested {}",
                leave_type.name, year, bal.available, days
            )));
        }
    }

    let updated = sqlx::query(
        r#"
        UPDATE leave_applications
        SET status = 'approved', validated_on = ?, comments = COALESCE(?, comments)
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(now)
    .bind(comments)
    .bind(application_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if updated == 0 {
        // The application reached a terminal state after the read above.
        return Err(LedgerError::State(format!(
            "application {application_id} is no longer pending"
        )));
    }

    let application = fetch_application(&mut tx, application_id).await?;
    tx.commit().await?;

    tracing::debug!(application_id, "leave application approved");
    Ok(application)
}

/// Rejects a pending application. No balance effect.
pub async fn reject(
    pool: &SqlitePool,
    application_id: i64,
    rejection_reason: String,
    now: DateTime<Utc>,
) -> Result<LeaveApplication, LedgerError> {
    if rejection_reason.trim().is_empty() {
        return Err(LedgerError::Validation("rejection reason is required".into()));
    }

    let mut tx = pool.begin().await?;

    let application = fetch_application(&mut tx, application_id).await?;
    if application.status != LeaveStatus::Pending {
        return Err(LedgerError::State(format!(
            "only pending applications can be rejected; application {} is {}",
            application_id, application.status
        )));
    }

    let updated = sqlx::query(
        r#"
        UPDATE leave_applications
        SET status = 'rejected', validated_on = ?, rejection_reason = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(now)
    .bind(&rejection_reason)
    .bind(application_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if updated == 0 {
        return Err(LedgerError::State(format!(
            "application {application_id} is no longer pending"
        )));
    }

    let application = fetch_application(&mut tx, application_id).await?;
    tx.commit().await?;

    tracing::debug!(application_id, "leave application rejected");
    Ok(application)
}

/// Cancels an application. Allowed while pending, or while approved with a
/// start date still in the future; cancelling an approved application
/// restores its used days (the ledger recomputes from approved rows only).
pub async fn cancel(
    pool: &SqlitePool,
    settings: LedgerSettings,
    application_id: i64,
    now: DateTime<Utc>,
) -> Result<LeaveApplication, LedgerError> {
    let mut attempt = 0;
    loop {
        match try_cancel(pool, application_id, now).await {
            Err(LedgerError::Database(err)) if error::is_busy(&err) => {
                attempt += 1;
                if attempt > settings.balance_commit_retries {
                    return Err(LedgerError::Conflict(
                        "balance commit contention, please retry".into(),
                    ));
                }
                tracing::debug!(application_id, attempt, "cancel hit a locked ledger, retrying");
            }
            other => return other,
        }
    }
}

async fn try_cancel(
    pool: &SqlitePool,
    application_id: i64,
    now: DateTime<Utc>,
) -> Result<LeaveApplication, LedgerError> {
    let today = now.date_naive();
    let mut tx = pool.begin().await?;

    let application = fetch_application(&mut tx, application_id).await?;
    match application.status {
        LeaveStatus::Pending => {}
        LeaveStatus::Approved if application.start_date > today => {}
        LeaveStatus::Approved => {
            return Err(LedgerError::State(
                "cannot cancel a leave already underway or completed".into(),
            ));
        }
        other => {
            return Err(LedgerError::State(format!(
                "application {application_id} is {other} and cannot be cancelled"
            )));
        }
    }

    let updated = sqlx::query(
        r#"
        UPDATE leave_applications
        SET status = 'cancelled'
        WHERE id = ? AND status IN ('pending', 'approved')
        "#,
    )
    .bind(application_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if updated == 0 {
        return Err(LedgerError::State(format!(
            "application {application_id} is no longer cancellable"
        )));
    }

    let application = fetch_application(&mut tx, application_id).await?;
    tx.commit().await?;

    tracing::debug!(application_id, "leave application cancelled");
    Ok(application)
}
