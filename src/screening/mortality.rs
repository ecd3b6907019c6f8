use super::composition::Composition;
use crate::allocator::{self, LotAllocation};
use crate::db;
use crate::error::Error;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio_postgres::GenericClient;
use tracing::{debug, info};

/// Splits the source/destination unit delta across the source lots. Returns
/// `None` when there is nothing to book: zero mortality, or an apparent gain,
/// which is deliberately left unbooked rather than guessed at.
pub(super) fn plan(
    composition: &Composition,
    total_source_units: i32,
    total_destination_units: i32,
) -> Result<Option<Vec<LotAllocation>>, Error> {
    let mortality = total_source_units - total_destination_units;
    if mortality <= 0 {
        debug!(mortality, "No mortality to book");
        return Ok(None);
    }
    allocator::allocate(mortality, &composition.shares()).map(Some)
}

fn audit_line(audit_ref: &str, allocation: &LotAllocation) -> String {
    format!(
        "{}: -{} units ({:.2}% of this mortality event). ",
        audit_ref,
        allocation.units,
        allocation.weight * Decimal::ONE_HUNDRED
    )
}

/// Books the mortality of one screening against the source lots: cumulative
/// counter, last-mortality date and one appended audit line per lot.
#[tracing::instrument(skip(client, composition, audit_ref))]
pub(super) async fn reconcile<T: GenericClient>(
    client: &T,
    composition: &Composition,
    total_source_units: i32,
    total_destination_units: i32,
    date: NaiveDate,
    audit_ref: &str,
) -> Result<(), Error> {
    let allocations = match plan(composition, total_source_units, total_destination_units)? {
        Some(allocations) => allocations,
        None => return Ok(()),
    };
    info!(
        mortality = total_source_units - total_destination_units,
        lots = allocations.len(),
        "Booking mortality"
    );
    for allocation in allocations.iter().filter(|allocation| allocation.units > 0) {
        let note = audit_line(audit_ref, allocation);
        let updated =
            db::record_lot_mortality(client, allocation.lot_id, allocation.units, date, &note)
                .await?;
        if updated != 1 {
            return Err(Error::NotFound {
                entity: "lot",
                id: allocation.lot_id,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use uuid::Uuid;

    fn composition() -> Composition {
        let mut composition = Composition::default();
        composition.add(Uuid::from_u128(1), 6000);
        composition.add(Uuid::from_u128(2), 4000);
        composition
    }

    #[test]
    fn test_mortality_splits_along_source_weights() {
        let allocations = plan(&composition(), 10_000, 9_500).unwrap().unwrap();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].units, 300);
        assert_eq!(allocations[1].units, 200);
        assert_eq!(
            allocations.iter().map(|a| a.units).sum::<i32>(),
            10_000 - 9_500
        );
    }

    #[test]
    fn test_zero_and_negative_mortality_book_nothing() {
        assert!(plan(&composition(), 10_000, 10_000).unwrap().is_none());
        assert!(plan(&composition(), 9_500, 10_000).unwrap().is_none());
    }

    #[test]
    fn test_audit_line_names_the_screening() {
        let allocation = LotAllocation {
            lot_id: Uuid::from_u128(1),
            weight: rust_decimal::Decimal::new(6, 1),
            units: 300,
        };
        assert_eq!(
            audit_line("Screening #7", &allocation),
            "Screening #7: -300 units (60.00% of this mortality event). "
        );
    }
}
