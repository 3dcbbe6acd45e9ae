use crate::error::HrError;
use sqlx::SqliteConnection;

pub mod attendance;
pub mod calendar;

/// Existence checks run on the caller's connection so they stay inside the
/// same transaction as the write they guard.
pub(crate) async fn ensure_employee_exists(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<(), HrError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM empleado WHERE id_empleado = ?)")
            .bind(employee_id)
            .fetch_one(&mut *conn)
            .await?;

    if !exists {
        return Err(HrError::NotFound("employee not found"));
    }
    Ok(())
}

/// A period filter is a complete (year, month) pair or nothing. A lone year
/// or month is rejected instead of being silently ignored.
pub fn period_filter(year: Option<i32>, month: Option<u32>) -> Result<Option<(i32, u32)>, HrError> {
    match (year, month) {
        (Some(year), Some(month)) => Ok(Some((year, month))),
        (None, None) => Ok(None),
        _ => Err(HrError::InvalidInput(
            "period filter requires both year and month".to_string(),
        )),
    }
}
