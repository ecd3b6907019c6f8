use crate::allocator::LotShare;
use crate::db;
use crate::error::Error;
use crate::types::SourceBasket;
use rust_decimal::Decimal;
use tokio_postgres::GenericClient;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositionEntry {
    pub lot_id: Uuid,
    pub units: i32,
}

/// The aggregated lot composition of a set of source baskets. Entries keep
/// the order in which lots were first encountered, so the nominal lot and the
/// derived weights never depend on map iteration order.
#[derive(Clone, Debug, Default)]
pub struct Composition {
    entries: Vec<CompositionEntry>,
    total_units: i32,
}

impl Composition {
    /// Accumulates units for a lot. Non-positive counts contribute nothing.
    pub fn add(&mut self, lot_id: Uuid, units: i32) {
        if units <= 0 {
            return;
        }
        match self.entries.iter_mut().find(|entry| entry.lot_id == lot_id) {
            Some(entry) => entry.units += units,
            None => self.entries.push(CompositionEntry { lot_id, units }),
        }
        self.total_units += units;
    }

    pub fn total_units(&self) -> i32 {
        self.total_units
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_mixed(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn lot_count(&self) -> usize {
        self.entries.len()
    }

    /// The first lot encountered among the sources, used as the nominal lot
    /// reference on activation events. The authoritative breakdown lives in
    /// the per-basket composition records.
    pub fn nominal_lot(&self) -> Option<Uuid> {
        self.entries.first().map(|entry| entry.lot_id)
    }

    pub fn entries(&self) -> &[CompositionEntry] {
        &self.entries
    }

    pub fn shares(&self) -> Vec<LotShare> {
        if self.total_units <= 0 {
            return Vec::new();
        }
        let total = Decimal::from(self.total_units);
        self.entries
            .iter()
            .map(|entry| LotShare {
                lot_id: entry.lot_id,
                weight: Decimal::from(entry.units) / total,
            })
            .collect()
    }
}

/// Builds the aggregated composition of all source baskets. A basket with
/// recorded composition rows contributes those verbatim (they already encode
/// an earlier mixed split); otherwise the basket counts as 100% its declared
/// lot. Baskets with no lot or no units are skipped.
#[tracing::instrument(skip(client, sources))]
pub(super) async fn aggregate_sources<T: GenericClient>(
    client: &T,
    sources: &[SourceBasket],
) -> Result<Composition, Error> {
    let mut composition = Composition::default();
    for source in sources {
        let recorded = db::get_lot_composition(client, source.basket_id, source.cycle_id).await?;
        if !recorded.is_empty() {
            debug!(
                basket_id = %source.basket_id,
                lots = recorded.len(),
                "Source basket has a recorded lot mix"
            );
            for row in &recorded {
                composition.add(row.lot_id, row.animal_count);
            }
        } else if let (Some(lot_id), Some(units)) = (source.lot_id, source.animal_count) {
            composition.add(lot_id, units);
        } else {
            debug!(basket_id = %source.basket_id, "Source basket contributes nothing, skipping");
        }
    }
    Ok(composition)
}

#[cfg(test)]
mod test {
    use super::*;

    fn lot(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_entries_accumulate_in_encounter_order() {
        let mut composition = Composition::default();
        composition.add(lot(2), 4000);
        composition.add(lot(1), 2000);
        composition.add(lot(2), 2000);

        assert_eq!(composition.total_units(), 8000);
        assert_eq!(composition.lot_count(), 2);
        assert!(composition.is_mixed());
        assert_eq!(composition.nominal_lot(), Some(lot(2)));
        assert_eq!(
            composition.entries(),
            &[
                CompositionEntry {
                    lot_id: lot(2),
                    units: 6000
                },
                CompositionEntry {
                    lot_id: lot(1),
                    units: 2000
                },
            ]
        );
    }

    #[test]
    fn test_non_positive_counts_contribute_nothing() {
        let mut composition = Composition::default();
        composition.add(lot(1), 0);
        composition.add(lot(2), -5);
        assert!(composition.is_empty());
        assert_eq!(composition.total_units(), 0);
        assert!(composition.shares().is_empty());
    }

    #[test]
    fn test_shares_are_unit_fractions() {
        let mut composition = Composition::default();
        composition.add(lot(1), 6000);
        composition.add(lot(2), 4000);

        let shares = composition.shares();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].weight, Decimal::new(6, 1));
        assert_eq!(shares[1].weight, Decimal::new(4, 1));
        assert_eq!(
            shares.iter().map(|share| share.weight).sum::<Decimal>(),
            Decimal::ONE
        );
    }
}
