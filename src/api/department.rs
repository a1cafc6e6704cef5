use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::{
    error::{self, LedgerError},
    model::department::Department,
    utils::db_utils::{build_update_sql, execute_update},
};

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
}

/// Create Department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 200, description = "Department created", body = Department),
        (status = 400, description = "Empty name"),
        (status = 409, description = "Name already in use")
    ),
    tag = "Department"
)]
pub async fn create_department(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateDepartment>,
) -> actix_web::Result<impl Responder> {
    if payload.name.trim().is_empty() {
        return Err(LedgerError::Validation("name cannot be empty".into()).into());
    }

    let id = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(&payload.name)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            if error::is_unique_violation(&e) {
                return actix_web::Error::from(LedgerError::Conflict(
                    "department name already in use".into(),
                ));
            }
            error!(error = %e, "Failed to create department");
            ErrorInternalServerError("Internal Server Error")
        })?
        .last_insert_rowid();

    let department = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?")
        .bind(id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch created department");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(department))
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments", body = [Department])
    ),
    tag = "Department"
)]
pub async fn list_departments(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let departments =
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch departments");
                ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Get Department by ID
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department found", body = Department),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn get_department(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();

    let department = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?")
        .bind(department_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, department_id, "Failed to fetch department");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match department {
        Some(dept) => Ok(HttpResponse::Ok().json(dept)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Department not found"
        }))),
    }
}

/// Update Department
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Department updated successfully"),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn update_department(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();

    let update = build_update_sql("departments", &body, &["name"], "id", department_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, department_id, "Failed to update department");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Department not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department updated successfully"
    })))
}

/// Delete Department
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Department not found")
    ),
    tag = "Department"
)]
pub async fn delete_department(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();

    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(department_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, department_id, "Failed to delete department");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Department not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
