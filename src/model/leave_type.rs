use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A leave policy definition: how many days a year it grants and the rules
/// an application against it must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Annual Leave",
        "annual_allocation": 20,
        "max_consecutive_days": 7,
        "min_notice_days": 1,
        "carry_forward": false,
        "is_active": true
    })
)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Annual Leave")]
    pub name: String,

    /// Base allocation in days per calendar year.
    #[schema(example = 20)]
    pub annual_allocation: i64,

    #[schema(example = 7)]
    pub max_consecutive_days: i64,

    #[schema(example = 1)]
    pub min_notice_days: i64,

    /// Unused days roll into the next year's allocation when set.
    #[schema(example = false)]
    pub carry_forward: bool,

    #[schema(example = true)]
    pub is_active: bool,
}
