use crate::types::Operation;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;

#[tracing::instrument(skip(client, operation))]
pub async fn save_operation<T: GenericClient>(
    client: &T,
    operation: &Operation,
) -> Result<(), Error> {
    trace!(
        id = %operation.id,
        operation_type = %operation.operation_type,
        basket_id = %operation.basket_id,
        "Saving operation"
    );
    client
        .execute(
            "INSERT INTO operations
            (id, date, type, basket_id, cycle_id, lot_id, size_id, animal_count, total_weight,
             animals_per_kg, average_weight, metadata, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            &[
                &operation.id,
                &operation.date,
                &operation.operation_type,
                &operation.basket_id,
                &operation.cycle_id,
                &operation.lot_id,
                &operation.size_id,
                &operation.animal_count,
                &operation.total_weight,
                &operation.animals_per_kg,
                &operation.average_weight,
                &operation.metadata,
                &operation.notes,
            ],
        )
        .await?;
    Ok(())
}
