use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use tokio_postgres::Row;
use tracing::trace;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, FromSql, PartialEq, Serialize, ToSql)]
#[postgres(name = "basket_state")]
#[serde(rename_all = "snake_case")]
pub enum BasketState {
    #[postgres(name = "available")]
    Available,
    #[postgres(name = "active")]
    Active,
}

impl fmt::Display for BasketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasketState::Available => write!(f, "available"),
            BasketState::Active => write!(f, "active"),
        }
    }
}

/// A physical rearing unit. The placement fields stay populated when a basket
/// is sold, so it can be reused where it stands.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Basket {
    pub id: Uuid,
    pub physical_number: i32,
    pub flupsy_id: Option<Uuid>,
    pub row: Option<String>,
    pub position: Option<i32>,
    pub state: BasketState,
    pub current_cycle_id: Option<Uuid>,
}

impl Basket {
    #[tracing::instrument(skip(physical_number, flupsy_id))]
    pub fn new(physical_number: i32, flupsy_id: Option<Uuid>) -> Self {
        trace!(%physical_number, "New Basket");
        Self {
            id: Uuid::new_v4(),
            physical_number,
            flupsy_id,
            row: None,
            position: None,
            state: BasketState::Available,
            current_cycle_id: None,
        }
    }
}

impl TryFrom<Row> for Basket {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            physical_number: row.try_get("physical_number")?,
            flupsy_id: row.try_get("flupsy_id")?,
            row: row.try_get("row")?,
            position: row.try_get("position")?,
            state: row.try_get("state")?,
            current_cycle_id: row.try_get("current_cycle_id")?,
        })
    }
}
