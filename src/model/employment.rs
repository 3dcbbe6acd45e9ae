use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Effective employment record for an employee: `informacion_laboral`
/// joined with the department name. When several records exist, the most
/// recent hire date wins. Maintained by the HR back office; read-only here.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct JobInfo {
    #[schema(example = "Operations")]
    pub department: String,

    #[schema(example = "Warehouse clerk")]
    pub position: String,

    #[schema(example = "morning")]
    pub shift: String,

    #[schema(example = "09:00:00", value_type = String)]
    pub shift_start: NaiveTime,

    #[schema(example = "18:00:00", value_type = String)]
    pub shift_end: NaiveTime,

    #[schema(example = "2023-11-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    #[schema(example = "permanent")]
    pub contract_type: String,
}
