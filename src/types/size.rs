use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tokio_postgres::Row;
use uuid::Uuid;

/// A size classification, matched by units-per-kg range.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Size {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub min_animals_per_kg: Option<i32>,
    pub max_animals_per_kg: Option<i32>,
}

impl TryFrom<Row> for Size {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            min_animals_per_kg: row.try_get("min_animals_per_kg")?,
            max_animals_per_kg: row.try_get("max_animals_per_kg")?,
        })
    }
}
