use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tokio_postgres::Row;
use tracing::trace;
use uuid::Uuid;

/// A supplier batch of organisms. The mortality fields are mutated only by
/// the mortality booking step; `mortality_notes` is an append-only audit
/// trail.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Lot {
    pub id: Uuid,
    pub arrival_date: NaiveDate,
    pub supplier: String,
    pub animal_count: Option<i32>,
    pub total_mortality: Option<i32>,
    pub last_mortality_date: Option<NaiveDate>,
    pub mortality_notes: Option<String>,
}

impl Lot {
    #[tracing::instrument(skip(arrival_date, supplier, animal_count))]
    pub fn new(arrival_date: NaiveDate, supplier: String, animal_count: Option<i32>) -> Self {
        trace!(%arrival_date, %supplier, ?animal_count, "New Lot");
        Self {
            id: Uuid::new_v4(),
            arrival_date,
            supplier,
            animal_count,
            total_mortality: None,
            last_mortality_date: None,
            mortality_notes: None,
        }
    }
}

impl TryFrom<Row> for Lot {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            arrival_date: row.try_get("arrival_date")?,
            supplier: row.try_get("supplier")?,
            animal_count: row.try_get("animal_count")?,
            total_mortality: row.try_get("total_mortality")?,
            last_mortality_date: row.try_get("last_mortality_date")?,
            mortality_notes: row.try_get("mortality_notes")?,
        })
    }
}
