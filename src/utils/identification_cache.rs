use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use std::time::Duration;

/// true  => identification number is TAKEN
/// false => identification number is AVAILABLE (usually we store only taken)
pub static IDENTIFICATION_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Mark a single identification number as taken
pub async fn mark_taken(identification: &str) {
    IDENTIFICATION_CACHE
        .insert(identification.trim().to_uppercase(), true)
        .await;
}

/// Check if an identification number is taken
pub async fn is_taken(identification: &str) -> bool {
    IDENTIFICATION_CACHE
        .get(&identification.trim().to_uppercase())
        .await
        .unwrap_or(false)
}

/// Batch mark identification numbers as taken
async fn batch_mark(identifications: &[String]) {
    let futures: Vec<_> = identifications
        .iter()
        .map(|id| IDENTIFICATION_CACHE.insert(id.trim().to_uppercase(), true))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load only RECENTLY HIRED employees into the in-memory cache (batched)
pub async fn warmup_identification_cache(
    pool: &SqlitePool,
    days: u32,
    batch_size: usize,
) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT e.numero_identificacion
        FROM empleado e
        JOIN informacion_laboral il ON il.id_empleado = e.id_empleado
        WHERE il.fecha_ingreso >= date('now', '-' || ? || ' days')
        ORDER BY il.fecha_ingreso DESC
        "#,
    )
    .bind(i64::from(days))
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (identification,) = row?;
        batch.push(identification);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining identification numbers
    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!(
        "Identification cache warmup complete: {} recent hires (last {} days)",
        total_count,
        days
    );

    Ok(())
}
