use crate::directory::NewEmployee;
use crate::model::employee::{CivilStatus, Gender};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Fresh in-memory database with the schema applied. A single connection,
/// so every query in a test sees the same database.
pub async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    crate::db::apply_schema(&pool).await.expect("schema bootstrap");

    pool
}

/// The identification filter and cache are process-wide, so every test must
/// enroll with an identification number no other test uses.
pub fn new_employee(identification: &str) -> NewEmployee {
    NewEmployee {
        first_name: "Maria".to_string(),
        last_name: "Lopez".to_string(),
        identification_type: "DNI".to_string(),
        identification_number: identification.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
        email: "maria.lopez@company.com".to_string(),
        phone: "+54 11 5555 0101".to_string(),
        street: "Belgrano".to_string(),
        street_number: "742".to_string(),
        locality: "San Isidro".to_string(),
        district: "San Isidro".to_string(),
        province: "Buenos Aires".to_string(),
        gender: Gender::Female,
        nationality: "Argentina".to_string(),
        civil_status: CivilStatus::Single,
    }
}

pub async fn seed_employee(pool: &SqlitePool, identification: &str) -> i64 {
    crate::directory::create_employee(pool, new_employee(identification))
        .await
        .expect("seed employee")
        .id
}
