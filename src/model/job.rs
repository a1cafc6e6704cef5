use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub department_id: i64,
    pub description: Option<String>,
    pub is_active: bool,
}
