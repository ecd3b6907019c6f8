use super::composition::Composition;
use super::open::ActivatedDestination;
use crate::allocator::{self, LotShare};
use crate::db;
use crate::error::Error;
use crate::types::{LotComposition, Selection};
use rust_decimal::Decimal;
use tokio_postgres::GenericClient;
use tracing::debug;
use uuid::Uuid;

/// Splits one destination's unit count across the aggregated lots. The
/// percentage in each row is the post-rounding actual, so the persisted rows
/// always sum back to the destination's exact count.
fn plan_rows(
    destination_units: i32,
    shares: &[LotShare],
) -> Result<Vec<(Uuid, i32, Decimal)>, Error> {
    let allocations = allocator::allocate(destination_units, shares)?;
    Ok(allocations
        .into_iter()
        .filter(|allocation| allocation.units > 0)
        .map(|allocation| {
            let percentage = (Decimal::from(allocation.units)
                / Decimal::from(destination_units)
                * Decimal::ONE_HUNDRED)
                .round_dp(4);
            (allocation.lot_id, allocation.units, percentage)
        })
        .collect())
}

/// Persists the per-lot composition of every populated destination basket.
#[tracing::instrument(skip(client, selection, activated, composition))]
pub(super) async fn distribute<T: GenericClient>(
    client: &T,
    selection: &Selection,
    activated: &[ActivatedDestination],
    composition: &Composition,
) -> Result<(), Error> {
    let shares = composition.shares();
    for destination in activated {
        if destination.animal_count <= 0 {
            debug!(
                basket_id = %destination.basket_id,
                "Destination has no units, skipping composition"
            );
            continue;
        }
        for (lot_id, units, percentage) in plan_rows(destination.animal_count, &shares)? {
            let row = LotComposition::new(
                destination.basket_id,
                destination.cycle_id,
                lot_id,
                units,
                percentage,
                Some(selection.id),
                Some(format!(
                    "Screening #{} of {}",
                    selection.selection_number, selection.date
                )),
            );
            db::save_lot_composition(client, &row).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn shares() -> Vec<LotShare> {
        let third = Decimal::ONE / Decimal::from(3);
        vec![
            LotShare {
                lot_id: Uuid::from_u128(1),
                weight: third,
            },
            LotShare {
                lot_id: Uuid::from_u128(2),
                weight: Decimal::ONE - third,
            },
        ]
    }

    #[test]
    fn test_rows_sum_to_the_destination_count() {
        for destination_units in &[1, 10, 750, 9999] {
            let rows = plan_rows(*destination_units, &shares()).unwrap();
            assert_eq!(
                rows.iter().map(|(_, units, _)| units).sum::<i32>(),
                *destination_units
            );
        }
    }

    #[test]
    fn test_percentages_are_the_post_rounding_actuals() {
        let rows = plan_rows(750, &shares()).unwrap();
        assert_eq!(rows[0].1, 250);
        assert_eq!(rows[1].1, 500);
        assert_eq!(rows[0].2, Decimal::new(333_333, 4));
        assert_eq!(rows[1].2, Decimal::new(666_667, 4));
    }

    #[test]
    fn test_zero_unit_lots_get_no_row() {
        let sliver = Decimal::new(1, 4);
        let shares = vec![
            LotShare {
                lot_id: Uuid::from_u128(1),
                weight: Decimal::ONE - sliver,
            },
            LotShare {
                lot_id: Uuid::from_u128(2),
                weight: sliver,
            },
        ];
        let rows = plan_rows(10, &shares).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, Uuid::from_u128(1));
        assert_eq!(rows[0].1, 10);
    }
}
