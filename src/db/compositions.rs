use crate::types::LotComposition;
use std::convert::TryInto;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

#[tracing::instrument(skip(client))]
pub async fn get_lot_composition<T: GenericClient>(
    client: &T,
    basket_id: Uuid,
    cycle_id: Uuid,
) -> Result<Vec<LotComposition>, Error> {
    trace!(%basket_id, %cycle_id, "Fetching lot composition");
    client
        .query(
            "SELECT * FROM basket_lot_composition WHERE basket_id = $1 AND cycle_id = $2 ORDER BY id",
            &[&basket_id, &cycle_id],
        )
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}

#[tracing::instrument(skip(client, composition))]
pub async fn save_lot_composition<T: GenericClient>(
    client: &T,
    composition: &LotComposition,
) -> Result<(), Error> {
    trace!(
        basket_id = %composition.basket_id,
        lot_id = %composition.lot_id,
        animal_count = %composition.animal_count,
        "Saving lot composition"
    );
    client
        .execute(
            "INSERT INTO basket_lot_composition
            (basket_id, cycle_id, lot_id, animal_count, percentage, source_selection_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                &composition.basket_id,
                &composition.cycle_id,
                &composition.lot_id,
                &composition.animal_count,
                &composition.percentage,
                &composition.source_selection_id,
                &composition.notes,
            ],
        )
        .await?;
    Ok(())
}
