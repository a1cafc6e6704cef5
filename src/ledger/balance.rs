//! Balance Ledger: per (employee, leave type, year) aggregates of allocated,
//! used and available days.
//!
//! Balances are not stored. They are materialized on demand from approved
//! applications plus the leave type's allocation and carry-forward rules, so
//! `available = allocated - used` holds by construction and approving an
//! application is the only write that moves a balance.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::SqliteConnection;
use utoipa::ToSchema;

use crate::error::LedgerError;
use crate::ledger::policy;
use crate::model::leave_type::LeaveType;

/// One materialized Balance Ledger row.
#[derive(Debug, Serialize, ToSchema)]
#[schema(
    example = json!({
        "leave_type_id": 1,
        "leave_type_name": "Annual Leave",
        "allocated": 20,
        "used": 5,
        "available": 15
    })
)]
pub struct LeaveBalance {
    pub leave_type_id: i64,
    pub leave_type_name: String,
    pub allocated: i64,
    pub used: i64,
    pub available: i64,
}

#[derive(sqlx::FromRow)]
struct DateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// Days of approved leave charged to `year` for one (employee, type) pair.
/// A straddling application contributes only its share inside `year`.
pub async fn used_days(
    conn: &mut SqliteConnection,
    employee_id: i64,
    leave_type_id: i64,
    year: i32,
) -> Result<i64, LedgerError> {
    let Some(year_start) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Ok(0);
    };
    let Some(year_end) = NaiveDate::from_ymd_opt(year, 12, 31) else {
        return Ok(0);
    };

    let ranges = sqlx::query_as::<_, DateRange>(
        r#"
        SELECT start_date, end_date
        FROM leave_applications
        WHERE employee_id = ?
          AND leave_type_id = ?
          AND status = 'approved'
          AND start_date <= ?
          AND end_date >= ?
        "#,
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .bind(year_end)
    .bind(year_start)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ranges
        .iter()
        .map(|r| policy::days_in_year(r.start_date, r.end_date, year))
        .sum())
}

/// Unused days rolled in from prior years, walking back at most `lookback`
/// years. Years beyond the horizon contribute nothing, so the default
/// lookback of 1 gives annual-reset semantics.
async fn carried_forward(
    conn: &mut SqliteConnection,
    employee_id: i64,
    leave_type: &LeaveType,
    year: i32,
    lookback: u32,
) -> Result<i64, LedgerError> {
    if !leave_type.carry_forward {
        return Ok(0);
    }
    let mut carried = 0;
    for prior in (year - lookback as i32)..year {
        let used = used_days(conn, employee_id, leave_type.id, prior).await?;
        carried = (leave_type.annual_allocation + carried - used).max(0);
    }
    Ok(carried)
}

/// Materializes the balance for one (employee, leave type, year) key.
pub async fn compute(
    conn: &mut SqliteConnection,
    employee_id: i64,
    leave_type: &LeaveType,
    year: i32,
    lookback: u32,
) -> Result<LeaveBalance, LedgerError> {
    let carried = carried_forward(conn, employee_id, leave_type, year, lookback).await?;
    let allocated = leave_type.annual_allocation + carried;
    let used = used_days(conn, employee_id, leave_type.id, year).await?;
    Ok(LeaveBalance {
        leave_type_id: leave_type.id,
        leave_type_name: leave_type.name.clone(),
        allocated,
        used,
        available: allocated - used,
    })
}

/// Balances across every leave type for one employee and year.
pub async fn for_year(
    conn: &mut SqliteConnection,
    employee_id: i64,
    year: i32,
    lookback: u32,
) -> Result<Vec<LeaveBalance>, LedgerError> {
    let types = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types ORDER BY name")
        .fetch_all(&mut *conn)
        .await?;

    let mut balances = Vec::with_capacity(types.len());
    for leave_type in &types {
        balances.push(compute(conn, employee_id, leave_type, year, lookback).await?);
    }
    Ok(balances)
}

/// Years that show up in the employee's approved applications, plus the
/// current year, ascending. Drives the year-keyed balance report.
pub async fn active_years(
    conn: &mut SqliteConnection,
    employee_id: i64,
    today: NaiveDate,
) -> Result<Vec<i32>, LedgerError> {
    let ranges = sqlx::query_as::<_, DateRange>(
        r#"
        SELECT start_date, end_date
        FROM leave_applications
        WHERE employee_id = ? AND status = 'approved'
        "#,
    )
    .bind(employee_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut years: BTreeSet<i32> = ranges
        .iter()
        .flat_map(|r| r.start_date.year()..=r.end_date.year())
        .collect();
    years.insert(today.year());
    Ok(years.into_iter().collect())
}
