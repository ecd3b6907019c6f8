use crate::types::{Cycle, CycleState};
use chrono::NaiveDate;
use std::convert::TryInto;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

#[tracing::instrument(skip(client))]
pub async fn get_cycle<T: GenericClient>(client: &T, id: Uuid) -> Result<Option<Cycle>, Error> {
    trace!(%id, "Fetching cycle");
    client
        .query_opt("SELECT * FROM cycles WHERE id = $1", &[&id])
        .await?
        .map(TryInto::try_into)
        .transpose()
}

#[tracing::instrument(skip(client, cycle))]
pub async fn save_cycle<T: GenericClient>(client: &T, cycle: &Cycle) -> Result<(), Error> {
    trace!(id = %cycle.id, basket_id = %cycle.basket_id, "Saving cycle");
    client
        .execute(
            "INSERT INTO cycles (id, basket_id, start_date, end_date, state) VALUES ($1, $2, $3, $4, $5)",
            &[
                &cycle.id,
                &cycle.basket_id,
                &cycle.start_date,
                &cycle.end_date,
                &cycle.state,
            ],
        )
        .await?;
    Ok(())
}

/// Closes a cycle, guarded on it still being active. Returns the number of
/// rows updated so the caller can detect a cycle that was closed from under
/// it.
#[tracing::instrument(skip(client))]
pub async fn close_cycle<T: GenericClient>(
    client: &T,
    id: Uuid,
    end_date: NaiveDate,
) -> Result<u64, Error> {
    trace!(%id, %end_date, "Closing cycle");
    client
        .execute(
            "UPDATE cycles SET state = $1, end_date = $2 WHERE id = $3 AND state = $4",
            &[&CycleState::Closed, &end_date, &id, &CycleState::Active],
        )
        .await
}
