use crate::engine;
use crate::engine::calendar::CalendarUpsert;
use crate::error::HrError;
use crate::model::calendar::CalendarEntry;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

/// Optional month window shared by the listing endpoints. Both halves or
/// neither; the engine rejects a lone year or month.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Upsert Calendar Entry
#[utoipa::path(
    put,
    path = "/api/v1/calendar",
    request_body = CalendarUpsert,
    responses(
        (status = 200, description = "Calendar entry written", body = Object, example = json!({
            "id": 17
        })),
        (status = 400, description = "Negative hours", body = Object, example = json!({
            "message": "hours_worked must not be negative"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee not found"
        }))
    ),
    tag = "Calendar"
)]
pub async fn upsert_entry(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CalendarUpsert>,
) -> Result<HttpResponse, HrError> {
    let id = engine::calendar::upsert_calendar_entry(pool.get_ref(), payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}

/// List Calendar Entries
#[utoipa::path(
    get,
    path = "/api/v1/calendar/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("year", Query, description = "Period year (requires month)"),
        ("month", Query, description = "Period month (requires year)")
    ),
    responses(
        (status = 200, description = "Calendar entries, newest first", body = Vec<CalendarEntry>),
        (status = 400, description = "Half-supplied period", body = Object, example = json!({
            "message": "period filter requires both year and month"
        }))
    ),
    tag = "Calendar"
)]
pub async fn list_entries(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, HrError> {
    let period = engine::period_filter(query.year, query.month)?;
    let entries = engine::calendar::list_calendar(pool.get_ref(), path.into_inner(), period).await?;

    Ok(HttpResponse::Ok().json(entries))
}
