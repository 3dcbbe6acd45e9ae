use sqlx::SqlitePool;

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<String>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Assignments with a `None` value are skipped. Returns `None` when no
/// assignment carries a value, so callers can reject empty updates.
pub fn build_update(
    table: &str,
    id_column: &str,
    assignments: &[(&str, Option<String>)],
) -> Option<SqlUpdate> {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for (column, value) in assignments {
        if let Some(value) = value {
            columns.push(*column);
            values.push(value.clone());
        }
    }

    if columns.is_empty() {
        return None;
    }

    let set_clause = columns
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    Some(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    pool: &SqlitePool,
    update: SqlUpdate,
    key: i64,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = query.bind(value);
    }
    query = query.bind(key);

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}
