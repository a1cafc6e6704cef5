use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "education": "BSc in CSE",
        "job_id": 3,
        "hire_date": "2023-01-01",
        "is_active": true
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "BSc in CSE", nullable = true)]
    pub education: Option<String>,

    #[schema(example = 3, nullable = true)]
    pub job_id: Option<i64>,

    #[schema(
        example = "2023-01-01",
        value_type = String,
        format = "date"
    )]
    pub hire_date: NaiveDate,

    #[schema(example = true)]
    pub is_active: bool,
}
