use crate::models::Passenger;
use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    seat_id: Uuid,
    full_name: &str,
    document_id: Option<&str>,
    seat_price_minor_units: i64,
) -> Result<Passenger> {
    let passenger = sqlx::query_as::<_, Passenger>(
        r#"
        INSERT INTO passengers (booking_id, seat_id, full_name, document_id, seat_price_minor_units)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(booking_id)
    .bind(seat_id)
    .bind(full_name)
    .bind(document_id)
    .bind(seat_price_minor_units)
    .fetch_one(&mut **tx)
    .await?;

    Ok(passenger)
}

/// Update a passenger's name/document, no re-pricing. Seat and price are
/// changed only via a seat change, never here.
pub async fn update_info(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    full_name: &str,
    document_id: Option<&str>,
) -> Result<Passenger> {
    let passenger = sqlx::query_as::<_, Passenger>(
        r#"
        UPDATE passengers
        SET full_name = $2, document_id = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(full_name)
    .bind(document_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(passenger)
}

pub async fn list_for_booking(pool: &PgPool, booking_id: Uuid) -> Result<Vec<Passenger>> {
    let passengers = sqlx::query_as::<_, Passenger>(
        "SELECT * FROM passengers WHERE booking_id = $1 ORDER BY created_at ASC",
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await?;

    Ok(passengers)
}

pub async fn list_for_booking_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> Result<Vec<Passenger>> {
    let passengers = sqlx::query_as::<_, Passenger>(
        "SELECT * FROM passengers WHERE booking_id = $1 ORDER BY created_at ASC",
    )
    .bind(booking_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(passengers)
}
