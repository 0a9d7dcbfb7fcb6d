use crate::models::Trip;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Trip>> {
    let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(trip)
}

/// Lock the trip row for the duration of the caller's transaction. Every
/// mutation that changes seat occupancy (hold, booking, cancellation) takes
/// this lock first, serializing concurrent attempts against the same trip.
pub async fn find_by_id_for_update(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Trip>> {
    let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(trip)
}

pub async fn list_upcoming(
    pool: &PgPool,
    route_id: Option<Uuid>,
    from: Option<DateTime<Utc>>,
) -> Result<Vec<Trip>> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM trips WHERE status != 'cancelled'");

    if let Some(route_id) = route_id {
        query_builder.push(" AND route_id = ");
        query_builder.push_bind(route_id);
    }

    match from {
        Some(from) => {
            query_builder.push(" AND departure_time >= ");
            query_builder.push_bind(from);
        }
        None => {
            query_builder.push(" AND departure_time >= NOW()");
        }
    }

    query_builder.push(" ORDER BY departure_time ASC");

    let trips = query_builder.build_query_as::<Trip>().fetch_all(pool).await?;

    Ok(trips)
}

pub async fn list_departing_within(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Trip>> {
    let trips = sqlx::query_as::<_, Trip>(
        r#"
        SELECT * FROM trips
        WHERE status != 'cancelled'
          AND departure_time BETWEEN $1 AND $2
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(trips)
}

pub async fn update_status(pool: &PgPool, id: Uuid, status: &str) -> Result<Trip> {
    let trip = sqlx::query_as::<_, Trip>(
        r#"
        UPDATE trips
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(trip)
}
