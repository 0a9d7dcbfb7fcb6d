use crate::models::Ticket;
use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    passenger_id: Uuid,
    seat_id: Uuid,
    ticket_number: &str,
    qr_payload: &str,
) -> Result<Ticket> {
    let ticket = sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (booking_id, passenger_id, seat_id, ticket_number, qr_payload)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(booking_id)
    .bind(passenger_id)
    .bind(seat_id)
    .bind(ticket_number)
    .bind(qr_payload)
    .fetch_one(&mut **tx)
    .await?;

    Ok(ticket)
}

pub async fn list_for_booking(pool: &PgPool, booking_id: Uuid) -> Result<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(
        "SELECT * FROM tickets WHERE booking_id = $1 ORDER BY issued_at ASC",
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await?;

    Ok(tickets)
}
