use crate::engine::ensure_employee_exists;
use crate::error::HrError;
use crate::model::calendar::{CalendarEntry, WorkState};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::instrument;
use utoipa::ToSchema;

pub(crate) const CALENDAR_COLUMNS: &str = "id_asistencia AS id, id_empleado AS employee_id, \
     fecha AS date, dia AS weekday, estado_jornada AS state, hora_entrada AS entry_time, \
     hora_salida AS exit_time, horas_trabajadas AS hours_worked, \
     horas_extras AS overtime_hours, descripcion AS description";

/// One day of one employee's calendar, as supplied by the caller. The
/// weekday is never part of this: it is derived from the date at write time.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CalendarUpsert {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub state: WorkState,
    #[schema(example = "09:00:00", value_type = Option<String>)]
    pub entry_time: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub exit_time: Option<NaiveTime>,
    #[schema(example = 8.0)]
    pub hours_worked: Option<f64>,
    #[schema(example = 0.0)]
    pub overtime_hours: Option<f64>,
    pub description: Option<String>,
}

/// Creates or replaces the (employee, date) calendar row and returns its id.
#[instrument(
    name = "calendar_upsert",
    skip(pool, upsert),
    fields(employee_id = upsert.employee_id, date = %upsert.date)
)]
pub async fn upsert_calendar_entry(
    pool: &SqlitePool,
    upsert: CalendarUpsert,
) -> Result<i64, HrError> {
    for (field, hours) in [
        ("hours_worked", upsert.hours_worked),
        ("overtime_hours", upsert.overtime_hours),
    ] {
        if let Some(hours) = hours {
            if hours < 0.0 {
                return Err(HrError::InvalidInput(format!(
                    "{field} must not be negative"
                )));
            }
        }
    }

    let mut tx = pool.begin().await?;

    ensure_employee_exists(&mut *tx, upsert.employee_id).await?;
    let entry = upsert_row(&mut *tx, &upsert).await?;

    tx.commit().await?;

    Ok(entry.id)
}

/// The single-statement insert-or-update. The UNIQUE(id_empleado, fecha)
/// key serializes concurrent writers for the same day; on the update path
/// `fecha` and `dia` stay untouched.
pub(crate) async fn upsert_row(
    conn: &mut SqliteConnection,
    row: &CalendarUpsert,
) -> Result<CalendarEntry, sqlx::Error> {
    let weekday = row.date.format("%A").to_string();

    let sql = format!(
        "INSERT INTO calendario \
         (id_empleado, fecha, dia, estado_jornada, hora_entrada, hora_salida, \
          horas_trabajadas, horas_extras, descripcion) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id_empleado, fecha) DO UPDATE SET \
            estado_jornada   = excluded.estado_jornada, \
            hora_entrada     = excluded.hora_entrada, \
            hora_salida      = excluded.hora_salida, \
            horas_trabajadas = excluded.horas_trabajadas, \
            horas_extras     = excluded.horas_extras, \
            descripcion      = excluded.descripcion \
         RETURNING {CALENDAR_COLUMNS}"
    );

    sqlx::query_as::<_, CalendarEntry>(&sql)
        .bind(row.employee_id)
        .bind(row.date)
        .bind(weekday)
        .bind(row.state)
        .bind(row.entry_time)
        .bind(row.exit_time)
        .bind(row.hours_worked)
        .bind(row.overtime_hours)
        .bind(&row.description)
        .fetch_one(&mut *conn)
        .await
}

/// Worked hours for one employee over one calendar month. Months with no
/// rows sum to 0.0; no existence check, this aggregates whatever is there.
pub async fn monthly_hours(
    pool: &SqlitePool,
    employee_id: i64,
    year: i32,
    month: u32,
) -> Result<f64, HrError> {
    sum_for_month(pool, "horas_trabajadas", employee_id, year, month).await
}

/// Overtime counterpart of [`monthly_hours`], reported only on request.
pub async fn monthly_overtime(
    pool: &SqlitePool,
    employee_id: i64,
    year: i32,
    month: u32,
) -> Result<f64, HrError> {
    sum_for_month(pool, "horas_extras", employee_id, year, month).await
}

async fn sum_for_month(
    pool: &SqlitePool,
    column: &str,
    employee_id: i64,
    year: i32,
    month: u32,
) -> Result<f64, HrError> {
    let (start, end) = month_bounds(year, month)?;

    let sql = format!(
        "SELECT COALESCE(SUM({column}), 0.0) FROM calendario \
         WHERE id_empleado = ? AND fecha >= ? AND fecha < ?"
    );

    let total = sqlx::query_scalar::<_, f64>(&sql)
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

    Ok(total)
}

/// Calendar rows for one employee, optionally narrowed to a month,
/// newest first.
pub async fn list_calendar(
    pool: &SqlitePool,
    employee_id: i64,
    period: Option<(i32, u32)>,
) -> Result<Vec<CalendarEntry>, HrError> {
    let mut sql = format!("SELECT {CALENDAR_COLUMNS} FROM calendario WHERE id_empleado = ?");

    let bounds = match period {
        Some((year, month)) => {
            sql.push_str(" AND fecha >= ? AND fecha < ?");
            Some(month_bounds(year, month)?)
        }
        None => None,
    };
    sql.push_str(" ORDER BY fecha DESC");

    let mut query = sqlx::query_as::<_, CalendarEntry>(&sql).bind(employee_id);
    if let Some((start, end)) = bounds {
        query = query.bind(start).bind(end);
    }

    Ok(query.fetch_all(pool).await?)
}

/// [first of month, first of next month)
pub(crate) fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), HrError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| HrError::InvalidInput(format!("invalid period {year}-{month:02}")))?;

    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| HrError::InvalidInput(format!("invalid period {year}-{month:02}")))?;

    Ok((start, end))
}

/// Worked hours between two clock times at minute granularity, rounded to
/// two decimals. None when exit precedes entry.
pub(crate) fn hours_between(entry: NaiveTime, exit: NaiveTime) -> Option<f64> {
    let minutes = (exit - entry).num_minutes();
    if minutes < 0 {
        return None;
    }
    Some((minutes as f64 / 60.0 * 100.0).round() / 100.0)
}
