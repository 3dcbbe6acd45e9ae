use crate::engine::calendar::{CALENDAR_COLUMNS, CalendarUpsert, hours_between, upsert_row};
use crate::engine::ensure_employee_exists;
use crate::error::HrError;
use crate::model::attendance::{AttendanceEvent, PunchKind};
use crate::model::calendar::{CalendarEntry, WorkState};
use crate::model::role::Role;
use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::instrument;
use utoipa::ToSchema;

const EVENT_COLUMNS: &str = "id_registro AS id, id_empleado AS employee_id, tipo AS kind, \
     fecha AS date, hora AS time";

/// An administrative correction for one side of one day. It reconciles into
/// the calendar row; it never appends to the raw punch log.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualRegistration {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub kind: PunchKind,
    #[schema(example = "09:00:00", value_type = String)]
    pub time: NaiveTime,
    /// Replaces the day's work state when supplied; fresh rows without one
    /// default to `manual`.
    #[schema(example = "worked", value_type = Option<String>)]
    pub state: Option<String>,
    pub description: Option<String>,
}

/// Clock punch at "now" (local time, seconds precision).
pub async fn register_punch(
    pool: &SqlitePool,
    employee_id: i64,
    kind: PunchKind,
) -> Result<AttendanceEvent, HrError> {
    let now = Local::now().naive_local();
    let time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());

    register_punch_at(pool, employee_id, kind, now.date(), time).await
}

/// Policy: at most one entry and one exit per (employee, day), and an exit
/// needs a prior entry. The event append and the calendar reconciliation
/// commit together or not at all.
#[instrument(name = "attendance_punch", skip(pool))]
async fn register_punch_at(
    pool: &SqlitePool,
    employee_id: i64,
    kind: PunchKind,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<AttendanceEvent, HrError> {
    let mut tx = pool.begin().await?;

    ensure_employee_exists(&mut *tx, employee_id).await?;

    let events = day_events(&mut *tx, employee_id, date).await?;
    let has_entry = events.iter().any(|e| e.kind == PunchKind::Entry);
    let has_exit = events.iter().any(|e| e.kind == PunchKind::Exit);

    match kind {
        PunchKind::Entry if has_entry => {
            return Err(HrError::InvalidInput(
                "entry already registered for this day".to_string(),
            ));
        }
        PunchKind::Exit if has_exit => {
            return Err(HrError::InvalidInput(
                "exit already registered for this day".to_string(),
            ));
        }
        PunchKind::Exit if !has_entry => {
            return Err(HrError::InvalidInput(
                "exit punch without a prior entry".to_string(),
            ));
        }
        _ => {}
    }

    let sql = format!(
        "INSERT INTO registro_horario (id_empleado, tipo, fecha, hora) \
         VALUES (?, ?, ?, ?) RETURNING {EVENT_COLUMNS}"
    );
    let event = sqlx::query_as::<_, AttendanceEvent>(&sql)
        .bind(employee_id)
        .bind(kind)
        .bind(date)
        .bind(time)
        .fetch_one(&mut *tx)
        .await?;

    reconcile_day(&mut tx, employee_id, date).await?;

    tx.commit().await?;

    Ok(event)
}

/// Rebuilds the day's calendar row from its raw events: state `worked`,
/// times from the punches, hours once both sides exist. Overtime and
/// description on an existing row survive.
async fn reconcile_day(
    conn: &mut SqliteConnection,
    employee_id: i64,
    date: NaiveDate,
) -> Result<(), HrError> {
    let events = day_events(&mut *conn, employee_id, date).await?;
    let entry_time = events
        .iter()
        .find(|e| e.kind == PunchKind::Entry)
        .map(|e| e.time);
    let exit_time = events
        .iter()
        .find(|e| e.kind == PunchKind::Exit)
        .map(|e| e.time);

    let (overtime_hours, description) =
        match existing_row(&mut *conn, employee_id, date).await? {
            Some(row) => (row.overtime_hours, row.description),
            None => (None, None),
        };

    let hours_worked = match (entry_time, exit_time) {
        (Some(start), Some(end)) => Some(hours_between(start, end).ok_or_else(|| {
            HrError::InvalidInput("exit time precedes entry time".to_string())
        })?),
        _ => None,
    };

    let row = CalendarUpsert {
        employee_id,
        date,
        state: WorkState::Worked,
        entry_time,
        exit_time,
        hours_worked,
        overtime_hours,
        description,
    };
    upsert_row(&mut *conn, &row).await?;

    Ok(())
}

/// Administrative registration. Merges into the existing day: the punched
/// side is replaced, the other side and the rest of the row are preserved,
/// hours are recomputed from whatever times remain.
#[instrument(
    name = "attendance_manual",
    skip(pool, registration),
    fields(employee_id = registration.employee_id, date = %registration.date)
)]
pub async fn register_manual(
    pool: &SqlitePool,
    role: Role,
    registration: ManualRegistration,
) -> Result<CalendarEntry, HrError> {
    role.require_hr_or_admin()?;

    let supplied_state = match registration.state.as_deref() {
        Some(raw) => Some(
            raw.parse::<WorkState>()
                .map_err(|_| HrError::InvalidInput(format!("unknown work state '{raw}'")))?,
        ),
        None => None,
    };

    let mut tx = pool.begin().await?;

    ensure_employee_exists(&mut *tx, registration.employee_id).await?;

    let existing = existing_row(&mut *tx, registration.employee_id, registration.date).await?;
    let (mut entry_time, mut exit_time, existing_state, overtime_hours, existing_description) =
        match existing {
            Some(row) => (
                row.entry_time,
                row.exit_time,
                Some(row.state),
                row.overtime_hours,
                row.description,
            ),
            None => (None, None, None, None, None),
        };

    match registration.kind {
        PunchKind::Entry => entry_time = Some(registration.time),
        PunchKind::Exit => exit_time = Some(registration.time),
    }

    let hours_worked = match (entry_time, exit_time) {
        (Some(start), Some(end)) => Some(hours_between(start, end).ok_or_else(|| {
            HrError::InvalidInput("exit time precedes entry time".to_string())
        })?),
        _ => None,
    };

    let row = CalendarUpsert {
        employee_id: registration.employee_id,
        date: registration.date,
        state: supplied_state.or(existing_state).unwrap_or(WorkState::Manual),
        entry_time,
        exit_time,
        hours_worked,
        overtime_hours,
        description: registration.description.or(existing_description),
    };

    let entry = upsert_row(&mut *tx, &row).await?;

    tx.commit().await?;

    Ok(entry)
}

/// Raw punches for one employee, optionally narrowed to a month,
/// newest first. Listing only; hours live on the calendar row.
pub async fn list_events(
    pool: &SqlitePool,
    employee_id: i64,
    period: Option<(i32, u32)>,
) -> Result<Vec<AttendanceEvent>, HrError> {
    let mut sql = format!("SELECT {EVENT_COLUMNS} FROM registro_horario WHERE id_empleado = ?");

    let bounds = match period {
        Some((year, month)) => {
            sql.push_str(" AND fecha >= ? AND fecha < ?");
            Some(crate::engine::calendar::month_bounds(year, month)?)
        }
        None => None,
    };
    sql.push_str(" ORDER BY fecha DESC, hora DESC");

    let mut query = sqlx::query_as::<_, AttendanceEvent>(&sql).bind(employee_id);
    if let Some((start, end)) = bounds {
        query = query.bind(start).bind(end);
    }

    Ok(query.fetch_all(pool).await?)
}

async fn day_events(
    conn: &mut SqliteConnection,
    employee_id: i64,
    date: NaiveDate,
) -> Result<Vec<AttendanceEvent>, sqlx::Error> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM registro_horario \
         WHERE id_empleado = ? AND fecha = ? ORDER BY hora"
    );

    sqlx::query_as::<_, AttendanceEvent>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_all(&mut *conn)
        .await
}

async fn existing_row(
    conn: &mut SqliteConnection,
    employee_id: i64,
    date: NaiveDate,
) -> Result<Option<CalendarEntry>, sqlx::Error> {
    let sql = format!("SELECT {CALENDAR_COLUMNS} FROM calendario WHERE id_empleado = ? AND fecha = ?");

    sqlx::query_as::<_, CalendarEntry>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&mut *conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::calendar::{list_calendar, upsert_calendar_entry};
    use crate::test_util::{pool, seed_employee};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn manual(employee_id: i64, on: NaiveDate, kind: PunchKind, at: NaiveTime) -> ManualRegistration {
        ManualRegistration {
            employee_id,
            date: on,
            kind,
            time: at,
            state: None,
            description: None,
        }
    }

    #[actix_web::test]
    async fn entry_then_exit_builds_a_worked_day() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-200").await;
        let day = date(2024, 3, 4);

        let entry = register_punch_at(&pool, id, PunchKind::Entry, day, time(9, 0))
            .await
            .unwrap();
        assert_eq!(entry.kind, PunchKind::Entry);

        register_punch_at(&pool, id, PunchKind::Exit, day, time(17, 30))
            .await
            .unwrap();

        let events = list_events(&pool, id, None).await.unwrap();
        assert_eq!(events.len(), 2);

        let rows = list_calendar(&pool, id, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state, WorkState::Worked);
        assert_eq!(rows[0].entry_time, Some(time(9, 0)));
        assert_eq!(rows[0].exit_time, Some(time(17, 30)));
        assert_eq!(rows[0].hours_worked, Some(8.5));
    }

    #[actix_web::test]
    async fn double_punch_policy_is_enforced() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-201").await;
        let day = date(2024, 3, 4);

        // exit with no entry at all
        let err = register_punch_at(&pool, id, PunchKind::Exit, day, time(17, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(_)));

        register_punch_at(&pool, id, PunchKind::Entry, day, time(9, 0))
            .await
            .unwrap();
        let err = register_punch_at(&pool, id, PunchKind::Entry, day, time(9, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(_)));

        register_punch_at(&pool, id, PunchKind::Exit, day, time(17, 0))
            .await
            .unwrap();
        let err = register_punch_at(&pool, id, PunchKind::Exit, day, time(17, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(_)));

        // rejected punches stored nothing
        let events = list_events(&pool, id, None).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[actix_web::test]
    async fn punch_for_unknown_employee_is_not_found() {
        let pool = pool().await;

        let err = register_punch_at(&pool, 424242, PunchKind::Entry, date(2024, 3, 4), time(9, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::NotFound(_)));
    }

    #[actix_web::test]
    async fn live_punch_records_today() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-202").await;

        let before = Local::now().date_naive();
        let event = register_punch(&pool, id, PunchKind::Entry).await.unwrap();
        let after = Local::now().date_naive();

        assert!(event.date == before || event.date == after);
        assert_eq!(event.kind, PunchKind::Entry);
    }

    #[actix_web::test]
    async fn punching_a_classified_day_reclassifies_it_as_worked() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-203").await;
        let day = date(2024, 3, 4);

        upsert_calendar_entry(
            &pool,
            CalendarUpsert {
                employee_id: id,
                date: day,
                state: WorkState::Holiday,
                entry_time: None,
                exit_time: None,
                hours_worked: None,
                overtime_hours: Some(1.5),
                description: Some("bridge day".to_string()),
            },
        )
        .await
        .unwrap();

        register_punch_at(&pool, id, PunchKind::Entry, day, time(9, 0))
            .await
            .unwrap();

        let rows = list_calendar(&pool, id, None).await.unwrap();
        assert_eq!(rows[0].state, WorkState::Worked);
        assert_eq!(rows[0].entry_time, Some(time(9, 0)));
        // reconciliation keeps what punches cannot express
        assert_eq!(rows[0].overtime_hours, Some(1.5));
        assert_eq!(rows[0].description.as_deref(), Some("bridge day"));
    }

    #[actix_web::test]
    async fn manual_registration_requires_the_capability() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-204").await;
        let day = date(2024, 3, 4);

        let err = register_manual(&pool, Role::Employee, manual(id, day, PunchKind::Entry, time(9, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::PermissionDenied(_)));

        // nothing was written
        assert!(list_calendar(&pool, id, None).await.unwrap().is_empty());

        register_manual(&pool, Role::Hr, manual(id, day, PunchKind::Entry, time(9, 0)))
            .await
            .unwrap();
        register_manual(&pool, Role::Admin, manual(id, day, PunchKind::Exit, time(17, 0)))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn manual_merges_with_punched_times() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-205").await;
        let day = date(2024, 3, 4);

        register_punch_at(&pool, id, PunchKind::Entry, day, time(9, 0))
            .await
            .unwrap();

        let entry = register_manual(&pool, Role::Admin, manual(id, day, PunchKind::Exit, time(17, 30)))
            .await
            .unwrap();

        assert_eq!(entry.entry_time, Some(time(9, 0)));
        assert_eq!(entry.exit_time, Some(time(17, 30)));
        assert_eq!(entry.hours_worked, Some(8.5));
        // the punched day was already `worked`; no state was supplied
        assert_eq!(entry.state, WorkState::Worked);

        // corrections never touch the raw punch log
        let events = list_events(&pool, id, None).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[actix_web::test]
    async fn manual_on_a_fresh_day_defaults_to_manual_state() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-206").await;

        let entry = register_manual(
            &pool,
            Role::Admin,
            manual(id, date(2024, 3, 4), PunchKind::Entry, time(9, 0)),
        )
        .await
        .unwrap();

        assert_eq!(entry.state, WorkState::Manual);
        assert_eq!(entry.entry_time, Some(time(9, 0)));
        assert!(entry.exit_time.is_none());
        assert!(entry.hours_worked.is_none());
    }

    #[actix_web::test]
    async fn manual_supplied_state_wins() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-207").await;
        let day = date(2024, 3, 4);

        let mut registration = manual(id, day, PunchKind::Entry, time(9, 0));
        registration.state = Some("vacation".to_string());
        let entry = register_manual(&pool, Role::Admin, registration).await.unwrap();
        assert_eq!(entry.state, WorkState::Vacation);

        let mut registration = manual(id, day, PunchKind::Exit, time(17, 0));
        registration.state = Some("weekend".to_string());
        let err = register_manual(&pool, Role::Admin, registration).await.unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn manual_exit_before_entry_is_rejected() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-208").await;
        let day = date(2024, 3, 4);

        register_manual(&pool, Role::Admin, manual(id, day, PunchKind::Entry, time(18, 0)))
            .await
            .unwrap();

        let err = register_manual(&pool, Role::Admin, manual(id, day, PunchKind::Exit, time(9, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn concurrent_manual_registrations_collapse_to_one_row() {
        let pool = pool().await;
        let id = seed_employee(&pool, "ENG-209").await;
        let day = date(2024, 3, 4);

        let registrations = ["worked", "absence", "holiday", "vacation"].map(|state| {
            let mut registration = manual(id, day, PunchKind::Entry, time(9, 0));
            registration.state = Some(state.to_string());
            register_manual(&pool, Role::Admin, registration)
        });

        for result in futures::future::join_all(registrations).await {
            result.unwrap();
        }

        let rows = list_calendar(&pool, id, None).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
