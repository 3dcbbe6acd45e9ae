use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real head counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static IDENTIFICATION_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(identification: &str) -> String {
    identification.trim().to_uppercase()
}

/// Check if an identification number might be registered (false positives possible)
pub fn might_exist(identification: &str) -> bool {
    let identification = normalize(identification);
    IDENTIFICATION_FILTER
        .read()
        .expect("identification filter poisoned")
        .contains(&identification)
}

/// Insert a single identification number into the filter
pub fn insert(identification: &str) {
    let identification = normalize(identification);
    IDENTIFICATION_FILTER
        .write()
        .expect("identification filter poisoned")
        .add(&identification);
}

/// Warm up the identification filter using streaming + batching
pub async fn warmup_identification_filter(pool: &SqlitePool, batch_size: usize) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String,)>("SELECT numero_identificacion FROM empleado").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (identification,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&identification));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Identification filter warmup complete: {} employees", total);
    Ok(())
}

/// Insert a batch of normalized identification numbers
fn insert_batch(identifications: &[String]) {
    let mut filter = IDENTIFICATION_FILTER
        .write()
        .expect("identification filter poisoned");

    for identification in identifications {
        filter.add(identification);
    }
}
