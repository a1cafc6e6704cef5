use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a leave application. `Pending` is the only non-terminal
/// state; no transition ever leaves a terminal state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveApplication {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1000)]
    pub employee_id: i64,

    #[schema(example = 1)]
    pub leave_type_id: i64,

    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-03-05", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    /// Calendar-inclusive day count between start and end.
    #[schema(example = 5)]
    pub days_requested: i64,

    #[schema(example = "family vacation")]
    pub reason: String,

    #[schema(example = "enjoy!", nullable = true)]
    pub comments: Option<String>,

    #[schema(nullable = true)]
    pub rejection_reason: Option<String>,

    #[schema(example = "pending")]
    pub status: LeaveStatus,

    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub applied_on: DateTime<Utc>,

    #[schema(nullable = true, value_type = Option<String>, format = "date-time")]
    pub validated_on: Option<DateTime<Utc>>,
}
