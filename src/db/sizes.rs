use crate::types::Size;
use std::convert::TryInto;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;

#[tracing::instrument(skip(client))]
pub async fn size_for_animals_per_kg<T: GenericClient>(
    client: &T,
    animals_per_kg: i32,
) -> Result<Option<Size>, Error> {
    trace!(%animals_per_kg, "Looking up size classification");
    client
        .query_opt(
            "SELECT * FROM sizes
            WHERE $1 BETWEEN min_animals_per_kg AND max_animals_per_kg
            ORDER BY min_animals_per_kg
            LIMIT 1",
            &[&animals_per_kg],
        )
        .await?
        .map(TryInto::try_into)
        .transpose()
}
