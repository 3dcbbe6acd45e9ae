use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// State of one employee-day. Stored lowercase in `calendario.estado_jornada`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkState {
    Worked,
    Absence,
    Holiday,
    Vacation,
    /// Administrator override entered through manual registration.
    Manual,
}

/// Authoritative per-day attendance summary for one employee. Exactly one
/// row exists per (employee, date); writes go through the calendar upsert.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "employee_id": 1,
        "date": "2024-03-05",
        "weekday": "Tuesday",
        "state": "worked",
        "entry_time": "09:00:00",
        "exit_time": "18:00:00",
        "hours_worked": 8.0,
        "overtime_hours": 0.0,
        "description": null
    })
)]
pub struct CalendarEntry {
    #[schema(example = 7)]
    pub id: i64,

    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = "2024-03-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    /// Derived from `date` when the row is first inserted; never supplied
    /// by callers, so it cannot drift from the date.
    #[schema(example = "Tuesday")]
    pub weekday: String,

    #[schema(example = "worked")]
    pub state: WorkState,

    #[schema(example = "09:00:00", value_type = Option<String>)]
    pub entry_time: Option<NaiveTime>,

    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub exit_time: Option<NaiveTime>,

    #[schema(example = 8.0)]
    pub hours_worked: Option<f64>,

    #[schema(example = 0.0)]
    pub overtime_hours: Option<f64>,

    #[schema(example = "covered the early shift", nullable = true)]
    pub description: Option<String>,
}
