use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::error::LedgerError;
use crate::ledger::{balance, workflow};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    /// Calendar year; omit to get every year with activity
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
#[schema(
    example = json!({
        "year": 2026,
        "balances": [
            {
                "leave_type_id": 1,
                "leave_type_name": "Annual Leave",
                "allocated": 20,
                "used": 5,
                "available": 15
            }
        ]
    })
)]
pub struct BalanceReport {
    pub year: i32,
    pub balances: Vec<balance::LeaveBalance>,
}

/// Leave balance report for one employee
///
/// With `year` set, one report for that year. Without it, one report per
/// year that shows up in the employee's approved applications plus the
/// current year.
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/balance",
    params(
        ("employee_id" = i64, Path, description = "Employee ID"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Balance report", body = BalanceReport),
        (status = 404, description = "Employee not found")
    ),
    tag = "Balance"
)]
pub async fn get_balance(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let lookback = config.ledger.carry_forward_lookback;
    let today = Utc::now().date_naive();

    let mut conn = pool.acquire().await.map_err(LedgerError::from)?;

    // 404 before any arithmetic
    workflow::fetch_employee(&mut conn, employee_id).await?;

    match query.year {
        Some(year) => {
            let balances = balance::for_year(&mut conn, employee_id, year, lookback).await?;
            Ok(HttpResponse::Ok().json(BalanceReport { year, balances }))
        }
        None => {
            let years = balance::active_years(&mut conn, employee_id, today).await?;
            let mut reports = Vec::with_capacity(years.len());
            for year in years {
                let balances = balance::for_year(&mut conn, employee_id, year, lookback).await?;
                reports.push(BalanceReport { year, balances });
            }
            Ok(HttpResponse::Ok().json(reports))
        }
    }
}
