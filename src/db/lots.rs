use crate::types::Lot;
use chrono::NaiveDate;
use std::convert::TryInto;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

#[tracing::instrument(skip(client))]
pub async fn get_lot<T: GenericClient>(client: &T, id: Uuid) -> Result<Option<Lot>, Error> {
    trace!(%id, "Fetching lot");
    client
        .query_opt("SELECT * FROM lots WHERE id = $1", &[&id])
        .await?
        .map(TryInto::try_into)
        .transpose()
}

/// Books one mortality event against a lot: additive counter increment and
/// an appended audit line, never an overwrite. Returns the number of rows
/// updated.
#[tracing::instrument(skip(client, note))]
pub async fn record_lot_mortality<T: GenericClient>(
    client: &T,
    id: Uuid,
    units: i32,
    date: NaiveDate,
    note: &str,
) -> Result<u64, Error> {
    trace!(%id, %units, %date, "Recording lot mortality");
    client
        .execute(
            "UPDATE lots
            SET total_mortality = COALESCE(total_mortality, 0) + $2,
                last_mortality_date = $3,
                mortality_notes = COALESCE(mortality_notes, '') || $4
            WHERE id = $1",
            &[&id, &units, &date, &note],
        )
        .await
}
