use chrono::NaiveDate;
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::trace;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, FromSql, PartialEq, Serialize, ToSql)]
#[postgres(name = "operation_type")]
#[serde(rename_all = "kebab-case")]
pub enum OperationType {
    #[postgres(name = "cycle-close")]
    CycleClose,
    #[postgres(name = "activation")]
    Activation,
    #[postgres(name = "sale")]
    Sale,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::CycleClose => write!(f, "cycle-close"),
            OperationType::Activation => write!(f, "activation"),
            OperationType::Sale => write!(f, "sale"),
        }
    }
}

/// One entry of the append-only operation log.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Operation {
    pub id: Uuid,
    pub date: NaiveDate,
    pub operation_type: OperationType,
    pub basket_id: Uuid,
    pub cycle_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub size_id: Option<Uuid>,
    pub animal_count: Option<i32>,
    pub total_weight: Option<Decimal>,
    pub animals_per_kg: Option<i32>,
    pub average_weight: Option<Decimal>,
    pub metadata: Option<Value>,
    pub notes: Option<String>,
}

impl Operation {
    pub fn cycle_close(
        date: NaiveDate,
        basket_id: Uuid,
        cycle_id: Uuid,
        animal_count: Option<i32>,
        notes: String,
    ) -> Self {
        trace!(%basket_id, %cycle_id, "New cycle-close Operation");
        Self {
            id: Uuid::new_v4(),
            date,
            operation_type: OperationType::CycleClose,
            basket_id,
            cycle_id,
            lot_id: None,
            size_id: None,
            animal_count,
            total_weight: None,
            animals_per_kg: None,
            average_weight: None,
            metadata: None,
            notes: Some(notes),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn activation(
        date: NaiveDate,
        basket_id: Uuid,
        cycle_id: Uuid,
        lot_id: Option<Uuid>,
        size_id: Option<Uuid>,
        animal_count: Option<i32>,
        total_weight: Option<Decimal>,
        animals_per_kg: Option<i32>,
        metadata: Option<Value>,
        notes: String,
    ) -> Self {
        trace!(%basket_id, %cycle_id, "New activation Operation");
        Self::with_type(
            OperationType::Activation,
            date,
            basket_id,
            cycle_id,
            lot_id,
            size_id,
            animal_count,
            total_weight,
            animals_per_kg,
            metadata,
            notes,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn sale(
        date: NaiveDate,
        basket_id: Uuid,
        cycle_id: Uuid,
        lot_id: Option<Uuid>,
        size_id: Option<Uuid>,
        animal_count: Option<i32>,
        total_weight: Option<Decimal>,
        animals_per_kg: Option<i32>,
        metadata: Option<Value>,
        notes: String,
    ) -> Self {
        trace!(%basket_id, %cycle_id, "New sale Operation");
        Self::with_type(
            OperationType::Sale,
            date,
            basket_id,
            cycle_id,
            lot_id,
            size_id,
            animal_count,
            total_weight,
            animals_per_kg,
            metadata,
            notes,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn with_type(
        operation_type: OperationType,
        date: NaiveDate,
        basket_id: Uuid,
        cycle_id: Uuid,
        lot_id: Option<Uuid>,
        size_id: Option<Uuid>,
        animal_count: Option<i32>,
        total_weight: Option<Decimal>,
        animals_per_kg: Option<i32>,
        metadata: Option<Value>,
        notes: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            operation_type,
            basket_id,
            cycle_id,
            lot_id,
            size_id,
            animal_count,
            total_weight,
            animals_per_kg,
            average_weight: average_weight(total_weight, animal_count),
            metadata,
            notes: Some(notes),
        }
    }
}

/// Average unit weight in milligrams, derived from the total weight in grams.
fn average_weight(total_weight: Option<Decimal>, animal_count: Option<i32>) -> Option<Decimal> {
    match (total_weight, animal_count) {
        (Some(weight), Some(count)) if count > 0 => {
            Some((weight / Decimal::from(count) * Decimal::ONE_THOUSAND).round_dp(3))
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_average_weight() {
        let weight = average_weight(Some(Decimal::from(500)), Some(1000));
        assert_eq!(weight, Some(Decimal::new(500, 0)));
        assert_eq!(average_weight(Some(Decimal::from(500)), Some(0)), None);
        assert_eq!(average_weight(None, Some(1000)), None);
    }
}
