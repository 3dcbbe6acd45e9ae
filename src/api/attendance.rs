use crate::api::calendar::PeriodQuery;
use crate::api::caller::Caller;
use crate::engine;
use crate::engine::attendance::ManualRegistration;
use crate::error::HrError;
use crate::model::attendance::{AttendanceEvent, PunchKind};
use crate::model::calendar::CalendarEntry;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PunchRequest {
    #[schema(example = 1)]
    pub employee_id: i64,
    pub kind: PunchKind,
}

#[derive(Debug, Deserialize)]
pub struct HoursQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub include_overtime: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct HoursResponse {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 152.5)]
    pub total_hours: f64,
    #[schema(example = 4.0)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overtime_hours: Option<f64>,
}

/// Register Clock Punch
#[utoipa::path(
    post,
    path = "/api/v1/attendance/punch",
    request_body = PunchRequest,
    responses(
        (status = 200, description = "Punch recorded", body = AttendanceEvent),
        (status = 400, description = "Punch rejected by the daily policy", body = Object, example = json!({
            "message": "entry already registered for this day"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee not found"
        }))
    ),
    tag = "Attendance"
)]
pub async fn punch(
    pool: web::Data<SqlitePool>,
    payload: web::Json<PunchRequest>,
) -> Result<HttpResponse, HrError> {
    let event =
        engine::attendance::register_punch(pool.get_ref(), payload.employee_id, payload.kind)
            .await?;

    Ok(HttpResponse::Ok().json(event))
}

/// Register Manual Attendance
#[utoipa::path(
    post,
    path = "/api/v1/attendance/manual",
    request_body = ManualRegistration,
    params(
        ("X-Role", Header, description = "Caller role asserted by the gateway (admin | hr | employee)")
    ),
    responses(
        (status = 200, description = "Calendar entry after the correction", body = CalendarEntry),
        (status = 400, description = "Unknown work state or inconsistent times", body = Object, example = json!({
            "message": "unknown work state 'weekend'"
        })),
        (status = 403, description = "Caller lacks the administrative capability", body = Object, example = json!({
            "message": "HR or administrator capability required"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee not found"
        }))
    ),
    tag = "Attendance"
)]
pub async fn manual(
    pool: web::Data<SqlitePool>,
    caller: Caller,
    payload: web::Json<ManualRegistration>,
) -> Result<HttpResponse, HrError> {
    let entry =
        engine::attendance::register_manual(pool.get_ref(), caller.role, payload.into_inner())
            .await?;

    Ok(HttpResponse::Ok().json(entry))
}

/// Monthly Worked Hours
#[utoipa::path(
    get,
    path = "/api/v1/attendance/hours/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("year", Query, description = "Period year"),
        ("month", Query, description = "Period month"),
        ("include_overtime", Query, description = "Also aggregate overtime hours")
    ),
    responses(
        (status = 200, description = "Aggregated hours for the month", body = HoursResponse),
        (status = 400, description = "Invalid period", body = Object, example = json!({
            "message": "invalid period 2024-13"
        }))
    ),
    tag = "Attendance"
)]
pub async fn monthly_hours(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    query: web::Query<HoursQuery>,
) -> Result<HttpResponse, HrError> {
    let employee_id = path.into_inner();

    let (year, month) = match engine::period_filter(query.year, query.month)? {
        Some(period) => period,
        None => {
            return Err(HrError::InvalidInput(
                "year and month are required".to_string(),
            ));
        }
    };

    let total_hours = engine::calendar::monthly_hours(pool.get_ref(), employee_id, year, month).await?;

    let overtime_hours = if query.include_overtime.unwrap_or(false) {
        Some(engine::calendar::monthly_overtime(pool.get_ref(), employee_id, year, month).await?)
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(HoursResponse {
        employee_id,
        year,
        month,
        total_hours,
        overtime_hours,
    }))
}

/// List Raw Attendance Events
#[utoipa::path(
    get,
    path = "/api/v1/attendance/events/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("year", Query, description = "Period year (requires month)"),
        ("month", Query, description = "Period month (requires year)")
    ),
    responses(
        (status = 200, description = "Raw punches, newest first", body = Vec<AttendanceEvent>),
        (status = 400, description = "Half-supplied period", body = Object, example = json!({
            "message": "period filter requires both year and month"
        }))
    ),
    tag = "Attendance"
)]
pub async fn list_events(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, HrError> {
    let period = engine::period_filter(query.year, query.month)?;
    let events =
        engine::attendance::list_events(pool.get_ref(), path.into_inner(), period).await?;

    Ok(HttpResponse::Ok().json(events))
}
