use crate::error::{HrError, on_unique_violation};
use crate::model::employee::{CivilStatus, Employee, Gender};
use crate::model::employment::JobInfo;
use crate::utils::db_utils::{build_update, execute_update};
use crate::utils::{identification_cache, identification_filter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use utoipa::ToSchema;

/// Legacy columns aliased to the wire names. Every employee SELECT goes
/// through this list so row mapping stays by name, never by position.
const EMPLOYEE_COLUMNS: &str = "id_empleado AS id, nombre AS first_name, apellido AS last_name, \
     tipo_identificacion AS identification_type, numero_identificacion AS identification_number, \
     fecha_nacimiento AS birth_date, correo_electronico AS email, telefono AS phone, \
     calle AS street, numero_calle AS street_number, localidad AS locality, \
     partido AS district, provincia AS province, genero AS gender, \
     pais_nacimiento AS nationality, estado_civil AS civil_status";

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "Maria")]
    pub first_name: String,
    #[schema(example = "Lopez")]
    pub last_name: String,
    #[schema(example = "DNI")]
    pub identification_type: String,
    #[schema(example = "30123456")]
    pub identification_number: String,
    #[schema(example = "1990-04-12", format = "date", value_type = String)]
    pub birth_date: NaiveDate,
    #[schema(example = "maria.lopez@company.com", format = "email")]
    pub email: String,
    #[schema(example = "+54 11 5555 0101")]
    pub phone: String,
    #[schema(example = "Belgrano")]
    pub street: String,
    #[schema(example = "742")]
    pub street_number: String,
    #[schema(example = "San Isidro")]
    pub locality: String,
    #[schema(example = "San Isidro")]
    pub district: String,
    #[schema(example = "Buenos Aires")]
    pub province: String,
    pub gender: Gender,
    #[schema(example = "Argentina")]
    pub nationality: String,
    pub civil_status: CivilStatus,
}

/// Contact and address fields are the only mutable part of a profile.
/// Identity fields have no update path.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ContactUpdate {
    #[schema(example = "new.address@company.com", format = "email")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub locality: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeSearch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub identification_number: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl EmployeeSearch {
    /// Resolved (page, per_page): 1-based page, page size defaulted to 10
    /// and clamped to 100.
    pub fn paging(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(10).clamp(1, 100);
        (page, per_page)
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), HrError> {
    if value.trim().is_empty() {
        return Err(HrError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

/// true  => identification number AVAILABLE
/// false => identification number TAKEN
///
/// Advisory only. The UNIQUE constraint on `numero_identificacion` has the
/// final word when the insert lands.
pub async fn is_identification_available(
    identification: &str,
    pool: &SqlitePool,
) -> Result<bool, HrError> {
    // 1️⃣ Cuckoo filter: fast negative
    // if the filter says not present, the number was never registered.
    if !identification_filter::might_exist(identification) {
        return Ok(true);
    }

    // 2️⃣ Moka cache: fast positive
    if identification_cache::is_taken(identification).await {
        return Ok(false);
    }

    // 3️⃣ Database fallback
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM empleado WHERE numero_identificacion = ? LIMIT 1)",
    )
    .bind(identification.trim())
    .fetch_one(pool)
    .await?;

    Ok(!exists)
}

/// Enrollment. Identity fields are fixed after this point.
pub async fn create_employee(pool: &SqlitePool, new: NewEmployee) -> Result<Employee, HrError> {
    require_non_empty("first_name", &new.first_name)?;
    require_non_empty("last_name", &new.last_name)?;
    require_non_empty("identification_type", &new.identification_type)?;
    require_non_empty("identification_number", &new.identification_number)?;

    if !is_identification_available(&new.identification_number, pool).await? {
        return Err(HrError::UniquenessViolation(
            "identification number already registered".to_string(),
        ));
    }

    insert_employee(pool, &new).await
}

/// Inserts the employee row and keeps the cuckoo filter + cache in sync
/// with the authoritative table.
async fn insert_employee(pool: &SqlitePool, new: &NewEmployee) -> Result<Employee, HrError> {
    let sql = format!(
        "INSERT INTO empleado \
         (nombre, apellido, tipo_identificacion, numero_identificacion, fecha_nacimiento, \
          correo_electronico, telefono, calle, numero_calle, localidad, partido, provincia, \
          genero, pais_nacimiento, estado_civil) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         RETURNING {EMPLOYEE_COLUMNS}"
    );

    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(new.first_name.trim())
        .bind(new.last_name.trim())
        .bind(new.identification_type.trim())
        .bind(new.identification_number.trim())
        .bind(new.birth_date)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.street)
        .bind(&new.street_number)
        .bind(&new.locality)
        .bind(&new.district)
        .bind(&new.province)
        .bind(new.gender)
        .bind(&new.nationality)
        .bind(new.civil_status)
        .fetch_one(pool)
        .await
        .map_err(|e| on_unique_violation(e, "identification number already registered"))?;

    identification_filter::insert(&employee.identification_number);
    identification_cache::mark_taken(&employee.identification_number).await;

    Ok(employee)
}

pub async fn get_employee(pool: &SqlitePool, employee_id: i64) -> Result<Employee, HrError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM empleado WHERE id_empleado = ?");

    sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or(HrError::NotFound("employee not found"))
}

pub async fn get_by_identification(
    pool: &SqlitePool,
    identification: &str,
) -> Result<Employee, HrError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM empleado WHERE numero_identificacion = ?");

    sqlx::query_as::<_, Employee>(&sql)
        .bind(identification.trim())
        .fetch_optional(pool)
        .await?
        .ok_or(HrError::NotFound("employee not found"))
}

/// Dynamic UPDATE over just the provided contact fields, then a re-read so
/// the caller gets the row as stored.
pub async fn update_contact(
    pool: &SqlitePool,
    employee_id: i64,
    changes: ContactUpdate,
) -> Result<Employee, HrError> {
    for (field, value) in [
        ("email", &changes.email),
        ("phone", &changes.phone),
        ("street", &changes.street),
        ("street_number", &changes.street_number),
        ("locality", &changes.locality),
        ("district", &changes.district),
        ("province", &changes.province),
    ] {
        if let Some(value) = value {
            require_non_empty(field, value)?;
        }
    }

    let assignments = [
        ("correo_electronico", changes.email),
        ("telefono", changes.phone),
        ("calle", changes.street),
        ("numero_calle", changes.street_number),
        ("localidad", changes.locality),
        ("partido", changes.district),
        ("provincia", changes.province),
    ];

    let update = build_update("empleado", "id_empleado", &assignments)
        .ok_or_else(|| HrError::InvalidInput("no contact fields provided".to_string()))?;

    let affected = execute_update(pool, update, employee_id).await?;
    if affected == 0 {
        return Err(HrError::NotFound("employee not found"));
    }

    get_employee(pool, employee_id).await
}

/// Paginated directory search. Filters are case-insensitive substring
/// matches combined with AND; the total comes from a separate COUNT so an
/// out-of-range page still reports how many rows matched.
pub async fn search_employees(
    pool: &SqlitePool,
    query: &EmployeeSearch,
) -> Result<(Vec<Employee>, i64), HrError> {
    let (page, per_page) = query.paging();
    let offset = (i64::from(page) - 1) * i64::from(per_page);

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(first_name) = &query.first_name {
        conditions.push("nombre LIKE ?");
        bindings.push(format!("%{}%", first_name));
    }

    if let Some(last_name) = &query.last_name {
        conditions.push("apellido LIKE ?");
        bindings.push(format!("%{}%", last_name));
    }

    if let Some(identification) = &query.identification_number {
        conditions.push("numero_identificacion LIKE ?");
        bindings.push(format!("%{}%", identification.trim()));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM empleado {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool).await?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM empleado {} ORDER BY apellido, nombre LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(i64::from(per_page)).bind(offset);

    let employees = data_query.fetch_all(pool).await?;

    Ok((employees, total))
}

/// Employment metadata with the department name joined in. Maintained by
/// the HR back office; when several records exist the most recent hire
/// date wins.
pub async fn job_info(pool: &SqlitePool, employee_id: i64) -> Result<JobInfo, HrError> {
    sqlx::query_as::<_, JobInfo>(
        r#"
        SELECT
            d.nombre AS department,
            il.puesto AS position,
            il.turno AS shift,
            il.hora_inicio_turno AS shift_start,
            il.hora_fin_turno AS shift_end,
            il.fecha_ingreso AS hire_date,
            il.tipo_contrato AS contract_type
        FROM informacion_laboral il
        JOIN departamento d ON d.id_departamento = il.id_departamento
        WHERE il.id_empleado = ?
        ORDER BY il.fecha_ingreso DESC
        LIMIT 1
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?
    .ok_or(HrError::NotFound("employment record not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{new_employee, pool};

    #[actix_web::test]
    async fn enrollment_returns_the_stored_record() {
        let pool = pool().await;

        let employee = create_employee(&pool, new_employee("DIR-100")).await.unwrap();

        assert!(employee.id > 0);
        assert_eq!(employee.identification_number, "DIR-100");
        assert_eq!(employee.first_name, "Maria");

        let fetched = get_employee(&pool, employee.id).await.unwrap();
        assert_eq!(fetched.identification_number, "DIR-100");
    }

    #[actix_web::test]
    async fn blank_identity_fields_are_rejected() {
        let pool = pool().await;

        let mut new = new_employee("DIR-101");
        new.first_name = "   ".to_string();

        let err = create_employee(&pool, new).await.unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(ref m) if m.contains("first_name")));
    }

    #[actix_web::test]
    async fn duplicate_identification_is_a_conflict() {
        let pool = pool().await;

        let original = create_employee(&pool, new_employee("DIR-102")).await.unwrap();

        // straight to the insert, past the advisory pre-check, so the
        // UNIQUE constraint itself produces the conflict
        let mut dup = new_employee("DIR-102");
        dup.first_name = "Carla".to_string();
        let err = insert_employee(&pool, &dup).await.unwrap_err();
        assert!(matches!(err, HrError::UniquenessViolation(_)));

        // first row intact
        let kept = get_by_identification(&pool, "DIR-102").await.unwrap();
        assert_eq!(kept.id, original.id);
        assert_eq!(kept.first_name, "Maria");
    }

    #[actix_web::test]
    async fn pre_check_reports_registered_numbers_as_taken() {
        let pool = pool().await;

        create_employee(&pool, new_employee("DIR-103")).await.unwrap();

        assert!(!is_identification_available("DIR-103", &pool).await.unwrap());
        assert!(is_identification_available("DIR-103-FREE", &pool).await.unwrap());
    }

    #[actix_web::test]
    async fn missing_employee_lookup_is_not_found() {
        let pool = pool().await;

        let err = get_employee(&pool, 424242).await.unwrap_err();
        assert!(matches!(err, HrError::NotFound(_)));

        let err = get_by_identification(&pool, "DIR-NONE").await.unwrap_err();
        assert!(matches!(err, HrError::NotFound(_)));
    }

    #[actix_web::test]
    async fn contact_update_rewrites_only_contact_fields() {
        let pool = pool().await;

        let employee = create_employee(&pool, new_employee("DIR-104")).await.unwrap();

        let updated = update_contact(
            &pool,
            employee.id,
            ContactUpdate {
                email: Some("moved@company.com".to_string()),
                street: Some("Mitre".to_string()),
                ..ContactUpdate::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.email, "moved@company.com");
        assert_eq!(updated.street, "Mitre");
        // identity untouched
        assert_eq!(updated.identification_number, "DIR-104");
        assert_eq!(updated.first_name, employee.first_name);
        // unmentioned contact fields untouched
        assert_eq!(updated.phone, employee.phone);
    }

    #[actix_web::test]
    async fn contact_update_requires_at_least_one_field() {
        let pool = pool().await;

        let employee = create_employee(&pool, new_employee("DIR-105")).await.unwrap();

        let err = update_contact(&pool, employee.id, ContactUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn contact_update_for_unknown_employee_is_not_found() {
        let pool = pool().await;

        let err = update_contact(
            &pool,
            424242,
            ContactUpdate {
                phone: Some("+54 11 5555 9999".to_string()),
                ..ContactUpdate::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HrError::NotFound(_)));
    }

    #[actix_web::test]
    async fn search_pagination_reports_the_true_total() {
        let pool = pool().await;

        for i in 0..12 {
            let mut new = new_employee(&format!("DIR-2{:02}", i));
            new.last_name = format!("Paginada{:02}", i);
            create_employee(&pool, new).await.unwrap();
        }

        let query = EmployeeSearch {
            first_name: None,
            last_name: Some("Paginada".to_string()),
            identification_number: None,
            page: Some(1),
            per_page: Some(5),
        };
        let (rows, total) = search_employees(&pool, &query).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(total, 12);

        let query = EmployeeSearch { page: Some(3), ..query };
        let (rows, total) = search_employees(&pool, &query).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(total, 12);

        // out of range: empty page, same total
        let query = EmployeeSearch { page: Some(99), ..query };
        let (rows, total) = search_employees(&pool, &query).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 12);
    }

    #[actix_web::test]
    async fn search_filters_combine_with_and() {
        let pool = pool().await;

        let mut a = new_employee("DIR-300");
        a.first_name = "Ana".to_string();
        a.last_name = "Combinada".to_string();
        create_employee(&pool, a).await.unwrap();

        let mut b = new_employee("DIR-301");
        b.first_name = "Bruno".to_string();
        b.last_name = "Combinada".to_string();
        create_employee(&pool, b).await.unwrap();

        let query = EmployeeSearch {
            first_name: Some("ana".to_string()),
            last_name: Some("combinada".to_string()),
            identification_number: None,
            page: None,
            per_page: None,
        };
        let (rows, total) = search_employees(&pool, &query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].first_name, "Ana");
    }

    #[actix_web::test]
    async fn search_orders_by_last_then_first_name() {
        let pool = pool().await;

        for (i, (first, last)) in [("Zoe", "Alfa"), ("Ana", "Beta"), ("Mia", "Alfa")]
            .iter()
            .enumerate()
        {
            let mut new = new_employee(&format!("DIR-31{}", i));
            new.first_name = first.to_string();
            new.last_name = last.to_string();
            create_employee(&pool, new).await.unwrap();
        }

        let query = EmployeeSearch {
            first_name: None,
            last_name: None,
            identification_number: Some("DIR-31".to_string()),
            page: None,
            per_page: None,
        };
        let (rows, _) = search_employees(&pool, &query).await.unwrap();
        let names: Vec<_> = rows
            .iter()
            .map(|e| (e.last_name.as_str(), e.first_name.as_str()))
            .collect();
        assert_eq!(names, vec![("Alfa", "Mia"), ("Alfa", "Zoe"), ("Beta", "Ana")]);
    }

    #[actix_web::test]
    async fn job_info_prefers_the_latest_employment_record() {
        let pool = pool().await;

        let employee = create_employee(&pool, new_employee("DIR-400")).await.unwrap();

        sqlx::query("INSERT INTO departamento (nombre) VALUES (?)")
            .bind("Operaciones")
            .execute(&pool)
            .await
            .unwrap();
        let department_id: i64 = sqlx::query_scalar("SELECT id_departamento FROM departamento")
            .fetch_one(&pool)
            .await
            .unwrap();

        for (position, hired) in [("Analista", "2020-03-01"), ("Supervisor", "2023-07-15")] {
            sqlx::query(
                "INSERT INTO informacion_laboral \
                 (id_empleado, id_departamento, puesto, turno, hora_inicio_turno, \
                  hora_fin_turno, fecha_ingreso, tipo_contrato) \
                 VALUES (?, ?, ?, 'Mañana', '09:00:00', '18:00:00', ?, 'Permanente')",
            )
            .bind(employee.id)
            .bind(department_id)
            .bind(position)
            .bind(hired)
            .execute(&pool)
            .await
            .unwrap();
        }

        let info = job_info(&pool, employee.id).await.unwrap();
        assert_eq!(info.position, "Supervisor");
        assert_eq!(info.department, "Operaciones");

        let err = job_info(&pool, 424242).await.unwrap_err();
        assert!(matches!(err, HrError::NotFound(_)));
    }
}
