use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::error::LedgerError;
use crate::ledger::workflow::{self, LeaveRequest};
use crate::model::leave_application::{LeaveApplication, LeaveStatus};

use super::FilterValue;

#[derive(Deserialize, ToSchema)]
pub struct SubmitLeave {
    #[schema(example = 1000)]
    pub employee_id: i64,
    #[schema(example = 1)]
    pub leave_type_id: i64,
    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-03-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family vacation")]
    pub reason: String,
    #[schema(nullable = true)]
    pub comments: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ApproveLeave {
    #[schema(example = "enjoy!", nullable = true)]
    pub comments: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectLeave {
    #[schema(example = "short-staffed that week")]
    pub rejection_reason: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<i64>,
    #[schema(example = 1)]
    /// Filter by leave type ID
    pub leave_type_id: Option<i64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveApplication>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/* =========================
Submit leave application
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = SubmitLeave,
        description = "Leave application payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave application submitted", body = LeaveApplication),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Employee or leave type not found")
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    payload: web::Json<SubmitLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let request = LeaveRequest {
        employee_id: payload.employee_id,
        leave_type_id: payload.leave_type_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        reason: payload.reason,
        comments: payload.comments,
    };

    let application =
        workflow::submit(pool.get_ref(), config.ledger, request, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(application))
}

/* =========================
Approve leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave application to approve")
    ),
    request_body = ApproveLeave,
    responses(
        (status = 200, description = "Leave approved", body = LeaveApplication),
        (status = 400, description = "Approval would overdraw the balance"),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Application is not pending")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    payload: web::Json<ApproveLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let application = workflow::approve(
        pool.get_ref(),
        config.ledger,
        leave_id,
        payload.into_inner().comments,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(application))
}

/* =========================
Reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave application to reject")
    ),
    request_body = RejectLeave,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveApplication),
        (status = 400, description = "Rejection reason missing"),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Application is not pending")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<RejectLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let application = workflow::reject(
        pool.get_ref(),
        leave_id,
        payload.into_inner().rejection_reason,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(application))
}

/* =========================
Cancel leave
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave application to cancel")
    ),
    responses(
        (status = 200, description = "Leave cancelled", body = LeaveApplication),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Application is not cancellable")
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let application =
        workflow::cancel(pool.get_ref(), config.ledger, leave_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(application))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave application to fetch")
    ),
    responses(
        (status = 200, description = "Leave application found", body = LeaveApplication),
        (status = 404, description = "Leave application not found")
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let mut conn = pool.acquire().await.map_err(LedgerError::from)?;
    let application = workflow::fetch_application(&mut conn, leave_id).await?;

    Ok(HttpResponse::Ok().json(application))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter")
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    pool: web::Data<SqlitePool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::I64(emp_id));
    }

    if let Some(leave_type_id) = query.leave_type_id {
        where_sql.push_str(" AND leave_type_id = ?");
        args.push(FilterValue::I64(leave_type_id));
    }

    let status;
    if let Some(raw) = query.status.as_deref() {
        status = raw
            .parse::<LeaveStatus>()
            .map_err(|_| {
                LedgerError::Validation(format!(
                    "unknown status {raw}; expected pending, approved, rejected or cancelled"
                ))
            })?
            .to_string();
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(&status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_applications{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::I64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave applications");
        LedgerError::from(e)
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT *
        FROM leave_applications
        {}
        ORDER BY applied_on DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveApplication>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::I64(v) => data_q.bind(*v),
            FilterValue::Str(s) => data_q.bind(*s),
        };
    }

    let applications = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            LedgerError::from(e)
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = LeaveListResponse {
        data: applications,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
