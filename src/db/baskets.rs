use crate::types::{Basket, BasketState, Placement};
use std::convert::TryInto;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

#[tracing::instrument(skip(client))]
pub async fn get_basket<T: GenericClient>(client: &T, id: Uuid) -> Result<Option<Basket>, Error> {
    trace!(%id, "Fetching basket");
    client
        .query_opt("SELECT * FROM baskets WHERE id = $1", &[&id])
        .await?
        .map(TryInto::try_into)
        .transpose()
}

/// Frees a basket at the end of its cycle. The placement fields are left
/// untouched so the basket can be reused where it stands.
#[tracing::instrument(skip(client))]
pub async fn release_basket<T: GenericClient>(client: &T, id: Uuid) -> Result<(), Error> {
    trace!(%id, "Releasing basket");
    client
        .execute(
            "UPDATE baskets SET state = $1, current_cycle_id = NULL WHERE id = $2",
            &[&BasketState::Available, &id],
        )
        .await?;
    Ok(())
}

#[tracing::instrument(skip(client, placement))]
pub async fn place_basket<T: GenericClient>(
    client: &T,
    id: Uuid,
    flupsy_id: Option<Uuid>,
    placement: &Placement,
    cycle_id: Uuid,
) -> Result<(), Error> {
    trace!(%id, %placement, %cycle_id, "Placing basket");
    client
        .execute(
            r#"UPDATE baskets
            SET state = $1, current_cycle_id = $2, flupsy_id = $3, "row" = $4, position = $5
            WHERE id = $6"#,
            &[
                &BasketState::Active,
                &cycle_id,
                &flupsy_id,
                &placement.row,
                &placement.slot,
                &id,
            ],
        )
        .await?;
    Ok(())
}
