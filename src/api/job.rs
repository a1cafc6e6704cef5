use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{self, LedgerError},
    model::job::Job,
    utils::db_utils::{build_update_sql, execute_update},
};

use super::FilterValue;

#[derive(Deserialize, ToSchema)]
pub struct CreateJob {
    #[schema(example = "Backend Engineer")]
    pub title: String,
    #[schema(example = 1)]
    pub department_id: i64,
    #[schema(example = "Builds and operates backend services", nullable = true)]
    pub description: Option<String>,
    #[schema(example = true)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct JobFilter {
    pub department_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// Create Job
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJob,
    responses(
        (status = 200, description = "Job created", body = Job),
        (status = 400, description = "Empty title"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Title already in use")
    ),
    tag = "Job"
)]
pub async fn create_job(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateJob>,
) -> actix_web::Result<impl Responder> {
    if payload.title.trim().is_empty() {
        return Err(LedgerError::Validation("title cannot be empty".into()).into());
    }

    let department_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments WHERE id = ?")
            .bind(payload.department_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(LedgerError::from)?;
    if department_exists == 0 {
        return Err(LedgerError::NotFound(format!(
            "department {} not found",
            payload.department_id
        ))
        .into());
    }

    let id = sqlx::query(
        r#"
        INSERT INTO jobs (title, department_id, description, is_active)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&payload.title)
    .bind(payload.department_id)
    .bind(&payload.description)
    .bind(payload.is_active.unwrap_or(true))
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if error::is_unique_violation(&e) {
            return actix_web::Error::from(LedgerError::Conflict(
                "job title already in use".into(),
            ));
        }
        error!(error = %e, "Failed to create job");
        ErrorInternalServerError("Internal Server Error")
    })?
    .last_insert_rowid();

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch created job");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(job))
}

/// List jobs
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    params(JobFilter),
    responses(
        (status = 200, description = "Jobs matching the filter", body = [Job])
    ),
    tag = "Job"
)]
pub async fn list_jobs(
    pool: web::Data<SqlitePool>,
    query: web::Query<JobFilter>,
) -> actix_web::Result<impl Responder> {
    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(department_id) = query.department_id {
        conditions.push("department_id = ?");
        bindings.push(FilterValue::I64(department_id));
    }

    if let Some(is_active) = query.is_active {
        conditions.push("is_active = ?");
        bindings.push(FilterValue::I64(is_active as i64));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let data_sql = format!("SELECT * FROM jobs {} ORDER BY title", where_clause);

    let mut data_query = sqlx::query_as::<_, Job>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::I64(v) => data_query.bind(*v),
            FilterValue::Str(s) => data_query.bind(*s),
        };
    }

    let jobs = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch jobs");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(jobs))
}

/// Get Job by ID
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{job_id}",
    params(
        ("job_id", Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Job),
        (status = 404, description = "Job not found")
    ),
    tag = "Job"
)]
pub async fn get_job(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let job_id = path.into_inner();

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(job_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, job_id, "Failed to fetch job");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match job {
        Some(job) => Ok(HttpResponse::Ok().json(job)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Job not found"
        }))),
    }
}

/// Update Job
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{job_id}",
    params(
        ("job_id", Path, description = "Job ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Job updated successfully"),
        (status = 404, description = "Job not found")
    ),
    tag = "Job"
)]
pub async fn update_job(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let job_id = path.into_inner();

    let update = build_update_sql(
        "jobs",
        &body,
        &["title", "department_id", "description", "is_active"],
        "id",
        job_id,
    )?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, job_id, "Failed to update job");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Job not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Job updated successfully"
    })))
}

/// Delete Job
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{job_id}",
    params(
        ("job_id", Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Job not found")
    ),
    tag = "Job"
)]
pub async fn delete_job(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let job_id = path.into_inner();

    let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(job_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, job_id, "Failed to delete job");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Job not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
