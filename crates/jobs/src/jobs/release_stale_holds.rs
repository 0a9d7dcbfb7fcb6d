use ticketing_core::ReservationManager;

/// Delete every `SeatReservation` whose TTL has lapsed without becoming a
/// booking. Runs every 5 minutes.
pub async fn release_stale_holds(reservations: &ReservationManager) -> anyhow::Result<()> {
    reservations.release_expired().await?;
    Ok(())
}
