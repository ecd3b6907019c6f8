use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tokio_postgres::Row;
use tracing::trace;
use uuid::Uuid;

/// Fractional ownership of a basket's cycle population by lot. The invariant
/// is that the unit counts for a (basket, cycle) sum exactly to the basket's
/// recorded count; `percentage` is the post-rounding actual, kept for
/// reporting.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LotComposition {
    pub basket_id: Uuid,
    pub cycle_id: Uuid,
    pub lot_id: Uuid,
    pub animal_count: i32,
    pub percentage: Decimal,
    pub source_selection_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl LotComposition {
    #[tracing::instrument(
        skip(basket_id, cycle_id, lot_id, animal_count, percentage, source_selection_id, notes)
    )]
    pub fn new(
        basket_id: Uuid,
        cycle_id: Uuid,
        lot_id: Uuid,
        animal_count: i32,
        percentage: Decimal,
        source_selection_id: Option<Uuid>,
        notes: Option<String>,
    ) -> Self {
        trace!(%basket_id, %cycle_id, %lot_id, %animal_count, %percentage, "New LotComposition");
        Self {
            basket_id,
            cycle_id,
            lot_id,
            animal_count,
            percentage,
            source_selection_id,
            notes,
        }
    }
}

impl TryFrom<Row> for LotComposition {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            basket_id: row.try_get("basket_id")?,
            cycle_id: row.try_get("cycle_id")?,
            lot_id: row.try_get("lot_id")?,
            animal_count: row.try_get("animal_count")?,
            percentage: row.try_get("percentage")?,
            source_selection_id: row.try_get("source_selection_id")?,
            notes: row.try_get("notes")?,
        })
    }
}
