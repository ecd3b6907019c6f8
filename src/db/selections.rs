use crate::types::{DestinationBasket, Selection, SelectionStatus, SourceBasket};
use std::convert::TryInto;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

#[tracing::instrument(skip(client))]
pub async fn get_selection<T: GenericClient>(
    client: &T,
    id: Uuid,
) -> Result<Option<Selection>, Error> {
    trace!(%id, "Fetching selection");
    client
        .query_opt("SELECT * FROM selections WHERE id = $1", &[&id])
        .await?
        .map(TryInto::try_into)
        .transpose()
}

/// Fetches a selection under a row lock, serializing concurrent completion
/// attempts on the same selection for the rest of the transaction.
#[tracing::instrument(skip(client))]
pub async fn lock_selection<T: GenericClient>(
    client: &T,
    id: Uuid,
) -> Result<Option<Selection>, Error> {
    trace!(%id, "Locking selection");
    client
        .query_opt("SELECT * FROM selections WHERE id = $1 FOR UPDATE", &[&id])
        .await?
        .map(TryInto::try_into)
        .transpose()
}

#[tracing::instrument(skip(client))]
pub async fn get_source_baskets<T: GenericClient>(
    client: &T,
    selection_id: Uuid,
) -> Result<Vec<SourceBasket>, Error> {
    trace!(%selection_id, "Fetching source baskets");
    client
        .query(
            "SELECT * FROM selection_source_baskets WHERE selection_id = $1 ORDER BY id",
            &[&selection_id],
        )
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}

#[tracing::instrument(skip(client))]
pub async fn get_destination_baskets<T: GenericClient>(
    client: &T,
    selection_id: Uuid,
) -> Result<Vec<DestinationBasket>, Error> {
    trace!(%selection_id, "Fetching destination baskets");
    client
        .query(
            "SELECT * FROM selection_destination_baskets WHERE selection_id = $1 ORDER BY id",
            &[&selection_id],
        )
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}

#[tracing::instrument(skip(client))]
pub async fn set_destination_cycle<T: GenericClient>(
    client: &T,
    destination_id: i64,
    cycle_id: Uuid,
) -> Result<(), Error> {
    trace!(%destination_id, %cycle_id, "Attaching cycle to destination basket");
    client
        .execute(
            "UPDATE selection_destination_baskets SET cycle_id = $1 WHERE id = $2",
            &[&cycle_id, &destination_id],
        )
        .await?;
    Ok(())
}

#[tracing::instrument(skip(client))]
pub async fn update_selection_status<T: GenericClient>(
    client: &T,
    id: Uuid,
    status: SelectionStatus,
) -> Result<(), Error> {
    trace!(%id, %status, "Updating selection status");
    client
        .execute(
            "UPDATE selections SET status = $1, updated_at = now() WHERE id = $2",
            &[&status, &id],
        )
        .await?;
    Ok(())
}
