use anyhow::Result;
use sqlx::PgPool;
use std::hash::{Hash, Hasher};

/// Hash a job name into the `i64` key `pg_advisory_lock` takes. Two jobs with
/// different names practically never collide; a collision would only make
/// two unrelated jobs serialize against each other, not corrupt data.
pub fn job_lock_key(job_name: &str) -> i64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    job_name.hash(&mut hasher);
    hasher.finish() as i64
}

/// Attempt to take the named advisory lock without blocking. Returns `false`
/// if another instance already holds it, letting the caller skip this tick
/// instead of running the job twice.
pub async fn try_acquire(pool: &PgPool, job_name: &str) -> Result<bool> {
    let key = job_lock_key(job_name);
    let (acquired,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    Ok(acquired)
}

pub async fn release(pool: &PgPool, job_name: &str) -> Result<()> {
    let key = job_lock_key(job_name);
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}
