use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

/// Records one source-to-destination edge of a completed screening so the
/// population history of any basket can be reconstructed.
#[tracing::instrument(skip(client))]
pub async fn save_lineage<T: GenericClient>(
    client: &T,
    selection_id: Uuid,
    source_basket_id: Uuid,
    source_cycle_id: Uuid,
    destination_basket_id: Uuid,
    destination_cycle_id: Uuid,
) -> Result<(), Error> {
    trace!(%selection_id, %source_basket_id, %destination_basket_id, "Saving lineage");
    client
        .execute(
            "INSERT INTO selection_basket_history
            (selection_id, source_basket_id, source_cycle_id, destination_basket_id, destination_cycle_id)
            VALUES ($1, $2, $3, $4, $5)",
            &[
                &selection_id,
                &source_basket_id,
                &source_cycle_id,
                &destination_basket_id,
                &destination_cycle_id,
            ],
        )
        .await?;
    Ok(())
}
