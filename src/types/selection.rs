use chrono::{DateTime, NaiveDate, Utc};
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use tokio_postgres::Row;
use tracing::trace;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, FromSql, PartialEq, Serialize, ToSql)]
#[postgres(name = "selection_status")]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    #[postgres(name = "draft")]
    Draft,
    #[postgres(name = "completed")]
    Completed,
    #[postgres(name = "cancelled")]
    Cancelled,
}

impl fmt::Display for SelectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStatus::Draft => write!(f, "draft"),
            SelectionStatus::Completed => write!(f, "completed"),
            SelectionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What happens to a destination basket when the screening completes: `Sold`
/// baskets get their new cycle closed immediately, `Placed` baskets stay
/// active at a parsed placement.
#[derive(Clone, Copy, Debug, Deserialize, Eq, FromSql, PartialEq, Serialize, ToSql)]
#[postgres(name = "disposition")]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    #[postgres(name = "sold")]
    Sold,
    #[postgres(name = "placed")]
    Placed,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Sold => write!(f, "sold"),
            Disposition::Placed => write!(f, "placed"),
        }
    }
}

/// A screening operation: one or more source baskets split into one or more
/// destination baskets. Only `draft` selections can be completed or
/// cancelled; both end states are terminal.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Selection {
    pub id: Uuid,
    pub selection_number: i32,
    pub date: NaiveDate,
    pub status: SelectionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Selection {
    #[tracing::instrument(skip(selection_number, date, notes))]
    pub fn new(selection_number: i32, date: NaiveDate, notes: Option<String>) -> Self {
        trace!(%selection_number, %date, "New Selection");
        Self {
            id: Uuid::new_v4(),
            selection_number,
            date,
            status: SelectionStatus::Draft,
            notes,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl TryFrom<Row> for Selection {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            selection_number: row.try_get("selection_number")?,
            date: row.try_get("date")?,
            status: row.try_get("status")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// One source basket of a selection. `lot_id` is null when the basket holds a
/// recorded mix of lots; the mix is then read from `basket_lot_composition`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SourceBasket {
    pub id: i64,
    pub selection_id: Uuid,
    pub basket_id: Uuid,
    pub cycle_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub animal_count: Option<i32>,
}

impl TryFrom<Row> for SourceBasket {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            selection_id: row.try_get("selection_id")?,
            basket_id: row.try_get("basket_id")?,
            cycle_id: row.try_get("cycle_id")?,
            lot_id: row.try_get("lot_id")?,
            animal_count: row.try_get("animal_count")?,
        })
    }
}

/// One destination basket of a selection. `cycle_id` is filled in when the
/// completion creates the new cycle.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DestinationBasket {
    pub id: i64,
    pub selection_id: Uuid,
    pub basket_id: Uuid,
    pub cycle_id: Option<Uuid>,
    pub disposition: Disposition,
    pub flupsy_id: Option<Uuid>,
    pub placement: Option<String>,
    pub animal_count: Option<i32>,
    pub total_weight: Option<Decimal>,
    pub animals_per_kg: Option<i32>,
    pub size_id: Option<Uuid>,
}

impl TryFrom<Row> for DestinationBasket {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            selection_id: row.try_get("selection_id")?,
            basket_id: row.try_get("basket_id")?,
            cycle_id: row.try_get("cycle_id")?,
            disposition: row.try_get("disposition")?,
            flupsy_id: row.try_get("flupsy_id")?,
            placement: row.try_get("placement")?,
            animal_count: row.try_get("animal_count")?,
            total_weight: row.try_get("total_weight")?,
            animals_per_kg: row.try_get("animals_per_kg")?,
            size_id: row.try_get("size_id")?,
        })
    }
}
