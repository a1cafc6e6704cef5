use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::error::{self, LedgerError};
use crate::model::leave_type::LeaveType;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveType {
    #[schema(example = "Annual Leave")]
    pub name: String,
    #[schema(example = 20)]
    pub annual_allocation: i64,
    #[schema(example = 7)]
    pub max_consecutive_days: Option<i64>,
    #[schema(example = 1)]
    pub min_notice_days: Option<i64>,
    #[schema(example = false)]
    pub carry_forward: Option<bool>,
    #[schema(example = true)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveType {
    pub name: Option<String>,
    pub annual_allocation: Option<i64>,
    pub max_consecutive_days: Option<i64>,
    pub min_notice_days: Option<i64>,
    pub carry_forward: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveTypeFilter {
    /// Inactive types are hidden unless set
    pub show_inactive: Option<bool>,
}

fn validate_fields(
    name: Option<&str>,
    annual_allocation: Option<i64>,
    max_consecutive_days: Option<i64>,
    min_notice_days: Option<i64>,
) -> Result<(), LedgerError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(LedgerError::Validation("name cannot be empty".into()));
        }
    }
    if let Some(allocation) = annual_allocation {
        if allocation < 0 {
            return Err(LedgerError::Validation(
                "annual allocation cannot be negative".into(),
            ));
        }
    }
    if let Some(max_consecutive) = max_consecutive_days {
        if max_consecutive < 1 {
            return Err(LedgerError::Validation(
                "maximum consecutive days must be at least 1".into(),
            ));
        }
    }
    if let Some(min_notice) = min_notice_days {
        if min_notice < 0 {
            return Err(LedgerError::Validation(
                "minimum notice days cannot be negative".into(),
            ));
        }
    }
    Ok(())
}

/// Create Leave Type
#[utoipa::path(
    post,
    path = "/api/v1/leave-types",
    request_body = CreateLeaveType,
    responses(
        (status = 200, description = "Leave type created", body = LeaveType),
        (status = 400, description = "Invalid leave type definition"),
        (status = 409, description = "Name already in use")
    ),
    tag = "LeaveType"
)]
pub async fn create_leave_type(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateLeaveType>,
) -> actix_web::Result<impl Responder> {
    validate_fields(
        Some(&payload.name),
        Some(payload.annual_allocation),
        payload.max_consecutive_days,
        payload.min_notice_days,
    )?;

    let id = sqlx::query(
        r#"
        INSERT INTO leave_types
            (name, annual_allocation, max_consecutive_days, min_notice_days,
             carry_forward, is_active)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(payload.annual_allocation)
    .bind(payload.max_consecutive_days.unwrap_or(7))
    .bind(payload.min_notice_days.unwrap_or(1))
    .bind(payload.carry_forward.unwrap_or(false))
    .bind(payload.is_active.unwrap_or(true))
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if error::is_unique_violation(&e) {
            LedgerError::Conflict("leave type name already in use".into())
        } else {
            LedgerError::from(e)
        }
    })?
    .last_insert_rowid();

    let leave_type = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types WHERE id = ?")
        .bind(id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(LedgerError::from)?;

    Ok(HttpResponse::Ok().json(leave_type))
}

/// List leave types
#[utoipa::path(
    get,
    path = "/api/v1/leave-types",
    params(LeaveTypeFilter),
    responses(
        (status = 200, description = "Leave types", body = [LeaveType])
    ),
    tag = "LeaveType"
)]
pub async fn list_leave_types(
    pool: web::Data<SqlitePool>,
    query: web::Query<LeaveTypeFilter>,
) -> actix_web::Result<impl Responder> {
    let sql = if query.show_inactive.unwrap_or(false) {
        "SELECT * FROM leave_types ORDER BY name"
    } else {
        "SELECT * FROM leave_types WHERE is_active = 1 ORDER BY name"
    };

    let leave_types = sqlx::query_as::<_, LeaveType>(sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(LedgerError::from)?;

    Ok(HttpResponse::Ok().json(leave_types))
}

/// Get Leave Type by ID
#[utoipa::path(
    get,
    path = "/api/v1/leave-types/{leave_type_id}",
    params(
        ("leave_type_id", Path, description = "Leave type ID")
    ),
    responses(
        (status = 200, description = "Leave type found", body = LeaveType),
        (status = 404, description = "Leave type not found")
    ),
    tag = "LeaveType"
)]
pub async fn get_leave_type(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave_type_id = path.into_inner();

    let leave_type = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types WHERE id = ?")
        .bind(leave_type_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(LedgerError::from)?
        .ok_or_else(|| LedgerError::NotFound(format!("leave type {leave_type_id} not found")))?;

    Ok(HttpResponse::Ok().json(leave_type))
}

/// Update Leave Type
///
/// Changes apply prospectively: balances are materialized lazily, so an
/// allocation change is seen from the next balance query onward and no stored
/// state is recomputed.
#[utoipa::path(
    put,
    path = "/api/v1/leave-types/{leave_type_id}",
    params(
        ("leave_type_id", Path, description = "Leave type ID")
    ),
    request_body = UpdateLeaveType,
    responses(
        (status = 200, description = "Leave type updated", body = LeaveType),
        (status = 400, description = "Invalid field values"),
        (status = 404, description = "Leave type not found")
    ),
    tag = "LeaveType"
)]
pub async fn update_leave_type(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateLeaveType>,
) -> actix_web::Result<impl Responder> {
    let leave_type_id = path.into_inner();

    validate_fields(
        payload.name.as_deref(),
        payload.annual_allocation,
        payload.max_consecutive_days,
        payload.min_notice_days,
    )?;

    let existing = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types WHERE id = ?")
        .bind(leave_type_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(LedgerError::from)?
        .ok_or_else(|| LedgerError::NotFound(format!("leave type {leave_type_id} not found")))?;

    sqlx::query(
        r#"
        UPDATE leave_types
        SET name = ?, annual_allocation = ?, max_consecutive_days = ?,
            min_notice_days = ?, carry_forward = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.name.as_deref().unwrap_or(&existing.name))
    .bind(payload.annual_allocation.unwrap_or(existing.annual_allocation))
    .bind(
        payload
            .max_consecutive_days
            .unwrap_or(existing.max_consecutive_days),
    )
    .bind(payload.min_notice_days.unwrap_or(existing.min_notice_days))
    .bind(payload.carry_forward.unwrap_or(existing.carry_forward))
    .bind(payload.is_active.unwrap_or(existing.is_active))
    .bind(leave_type_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if error::is_unique_violation(&e) {
            LedgerError::Conflict("leave type name already in use".into())
        } else {
            LedgerError::from(e)
        }
    })?;

    let leave_type = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types WHERE id = ?")
        .bind(leave_type_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(LedgerError::from)?;

    Ok(HttpResponse::Ok().json(leave_type))
}

/// Delete Leave Type
///
/// Refused while any application references the type in a non-terminal way:
/// pending, or approved and not yet over.
#[utoipa::path(
    delete,
    path = "/api/v1/leave-types/{leave_type_id}",
    params(
        ("leave_type_id", Path, description = "Leave type ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Leave type not found"),
        (status = 409, description = "Leave type still in use")
    ),
    tag = "LeaveType"
)]
pub async fn delete_leave_type(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave_type_id = path.into_inner();
    let today = Utc::now().date_naive();

    let in_use = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM leave_applications
        WHERE leave_type_id = ?
          AND (status = 'pending' OR (status = 'approved' AND end_date >= ?))
        "#,
    )
    .bind(leave_type_id)
    .bind(today)
    .fetch_one(pool.get_ref())
    .await
    .map_err(LedgerError::from)?;

    if in_use > 0 {
        return Err(LedgerError::Conflict(format!(
            "leave type {leave_type_id} has {in_use} open application(s) and cannot be deleted"
        ))
        .into());
    }

    let result = sqlx::query("DELETE FROM leave_types WHERE id = ?")
        .bind(leave_type_id)
        .execute(pool.get_ref())
        .await
        .map_err(LedgerError::from)?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::NotFound(format!("leave type {leave_type_id} not found")).into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
