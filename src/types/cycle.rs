use chrono::NaiveDate;
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use tokio_postgres::Row;
use tracing::trace;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, FromSql, PartialEq, Serialize, ToSql)]
#[postgres(name = "cycle_state")]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    #[postgres(name = "active")]
    Active,
    #[postgres(name = "closed")]
    Closed,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleState::Active => write!(f, "active"),
            CycleState::Closed => write!(f, "closed"),
        }
    }
}

/// One rearing period on one basket. Closed exactly once; the end date never
/// changes afterwards.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Cycle {
    pub id: Uuid,
    pub basket_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub state: CycleState,
}

impl Cycle {
    #[tracing::instrument(skip(basket_id, start_date))]
    pub fn new(basket_id: Uuid, start_date: NaiveDate) -> Self {
        trace!(%basket_id, %start_date, "New Cycle");
        Self {
            id: Uuid::new_v4(),
            basket_id,
            start_date,
            end_date: None,
            state: CycleState::Active,
        }
    }
}

impl TryFrom<Row> for Cycle {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            basket_id: row.try_get("basket_id")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            state: row.try_get("state")?,
        })
    }
}
