use crate::models::{Seat, SeatMap};
use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub async fn find_seat_map(pool: &PgPool, id: Uuid) -> Result<Option<SeatMap>> {
    let seat_map = sqlx::query_as::<_, SeatMap>("SELECT * FROM seat_maps WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(seat_map)
}

pub async fn list_seats_for_map(pool: &PgPool, seat_map_id: Uuid) -> Result<Vec<Seat>> {
    let seats = sqlx::query_as::<_, Seat>(
        "SELECT * FROM seats WHERE seat_map_id = $1 ORDER BY seat_number ASC",
    )
    .bind(seat_map_id)
    .fetch_all(pool)
    .await?;

    Ok(seats)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Seat>> {
    let seat = sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(seat)
}

pub async fn find_by_id_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Seat>> {
    let seat = sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(seat)
}

/// Seat ids sold (occupied by a booking whose status blocks the seat) on a trip.
pub async fn sold_seat_ids_for_trip(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
) -> Result<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT p.seat_id
        FROM passengers p
        JOIN bookings b ON b.id = p.booking_id
        WHERE b.trip_id = $1
          AND b.status IN ('pending', 'confirmed', 'completed')
        "#,
    )
    .bind(trip_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
