//! Whole-unit allocation across weighted lots.
//!
//! Splits an integer total over a set of fractional lot weights so that the
//! rounded parts always sum back to the total (largest-remainder method):
//! every lot first gets the floor of its exact share, then the leftover units
//! go one each to the lots with the largest fractional parts. Remainder ties
//! are broken by ascending lot id so the result never depends on input
//! ordering quirks.

use crate::error::Error;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

/// Weights further off than this from summing to 1 get flagged before
/// renormalization.
const DRIFT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// One lot's fractional share of a population.
#[derive(Clone, Debug, PartialEq)]
pub struct LotShare {
    pub lot_id: Uuid,
    pub weight: Decimal,
}

/// One lot's rounded share of an allocated total.
#[derive(Clone, Debug, PartialEq)]
pub struct LotAllocation {
    pub lot_id: Uuid,
    pub weight: Decimal,
    pub units: i32,
}

struct Candidate {
    lot_id: Uuid,
    weight: Decimal,
    exact: Decimal,
    units: i32,
    fraction: Decimal,
}

#[tracing::instrument(skip(shares))]
pub fn allocate(total: i32, shares: &[LotShare]) -> Result<Vec<LotAllocation>, Error> {
    if total <= 0 {
        return Err(Error::InvalidInput(format!(
            "allocation total must be positive, got {}",
            total
        )));
    }
    if shares.is_empty() {
        return Err(Error::InvalidInput(
            "no lot shares to allocate across".into(),
        ));
    }
    if let Some(share) = shares.iter().find(|share| share.weight < Decimal::ZERO) {
        return Err(Error::InvalidInput(format!(
            "negative weight {} for lot {}",
            share.weight, share.lot_id
        )));
    }
    let sum: Decimal = shares.iter().map(|share| share.weight).sum();
    if sum <= Decimal::ZERO {
        return Err(Error::InvalidInput(format!(
            "lot weights must sum to a positive value, got {}",
            sum
        )));
    }
    let shares = normalize(shares, sum);

    let exact_total = Decimal::from(total);
    let mut candidates: Vec<Candidate> = shares
        .iter()
        .map(|share| {
            let exact = exact_total * share.weight;
            let floor = exact.floor();
            Ok(Candidate {
                lot_id: share.lot_id,
                weight: share.weight,
                exact,
                units: floor.to_i32().ok_or_else(|| {
                    Error::Consistency(format!("allocation of {} for lot {} overflows", floor, share.lot_id))
                })?,
                fraction: exact - floor,
            })
        })
        .collect::<Result<_, Error>>()?;

    let floored: i32 = candidates.iter().map(|candidate| candidate.units).sum();
    let remainder = total - floored;
    if remainder > 0 {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            candidates[b]
                .fraction
                .cmp(&candidates[a].fraction)
                .then_with(|| candidates[a].lot_id.cmp(&candidates[b].lot_id))
        });
        for &index in order.iter().take(remainder as usize) {
            candidates[index].units += 1;
        }
        debug!(total, remainder, "Distributed rounding remainder");
    }

    let allocated: i32 = candidates.iter().map(|candidate| candidate.units).sum();
    if allocated != total {
        return Err(Error::Consistency(format!(
            "allocated {} units out of {}",
            allocated, total
        )));
    }
    for candidate in &candidates {
        if candidate.units < 0
            || (Decimal::from(candidate.units) - candidate.exact).abs() >= Decimal::ONE
        {
            return Err(Error::Consistency(format!(
                "allocation {} for lot {} strays from exact share {}",
                candidate.units, candidate.lot_id, candidate.exact
            )));
        }
    }

    Ok(candidates
        .into_iter()
        .map(|candidate| LotAllocation {
            lot_id: candidate.lot_id,
            weight: candidate.weight,
            units: candidate.units,
        })
        .collect())
}

fn normalize(shares: &[LotShare], sum: Decimal) -> Vec<LotShare> {
    if sum == Decimal::ONE {
        return shares.to_vec();
    }
    if (sum - Decimal::ONE).abs() > DRIFT_TOLERANCE {
        warn!(%sum, "Lot weights do not sum to 1, renormalizing");
    }
    shares
        .iter()
        .map(|share| LotShare {
            lot_id: share.lot_id,
            weight: share.weight / sum,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn lot(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn share(n: u128, weight: Decimal) -> LotShare {
        LotShare {
            lot_id: lot(n),
            weight,
        }
    }

    fn units(allocations: &[LotAllocation]) -> Vec<i32> {
        allocations.iter().map(|a| a.units).collect()
    }

    #[test]
    fn test_remainder_goes_to_largest_fraction() {
        let third = Decimal::ONE / Decimal::from(3);
        let allocations = allocate(
            10,
            &[share(1, third), share(2, Decimal::ONE - third)],
        )
        .unwrap();
        assert_eq!(units(&allocations), vec![3, 7]);
    }

    #[test]
    fn test_exact_floors_leave_no_remainder() {
        let allocations = allocate(
            1000,
            &[share(1, Decimal::new(667, 3)), share(2, Decimal::new(333, 3))],
        )
        .unwrap();
        assert_eq!(units(&allocations), vec![667, 333]);
    }

    #[test]
    fn test_remainder_ties_break_by_ascending_lot_id() {
        let half = Decimal::new(5, 1);
        // Both fractions are 0.5; the lower lot id must win regardless of
        // input order.
        let allocations = allocate(3, &[share(2, half), share(1, half)]).unwrap();
        assert_eq!(units(&allocations), vec![1, 2]);
    }

    #[test]
    fn test_drifted_weights_are_renormalized() {
        // 3:1 ratio expressed in raw unit counts rather than fractions.
        let allocations = allocate(
            100,
            &[share(1, Decimal::from(7500)), share(2, Decimal::from(2500))],
        )
        .unwrap();
        assert_eq!(units(&allocations), vec![75, 25]);
    }

    #[test]
    fn test_allocations_sum_to_total() {
        let seventh = Decimal::ONE / Decimal::from(7);
        let shares: Vec<LotShare> = (1..=7).map(|n| share(n, seventh)).collect();
        for total in &[1, 13, 997, 100_000] {
            let allocations = allocate(*total, &shares).unwrap();
            assert_eq!(allocations.iter().map(|a| a.units).sum::<i32>(), *total);
        }
    }

    #[test]
    fn test_allocations_stay_within_one_of_exact() {
        let shares = vec![
            share(1, Decimal::new(123, 3)),
            share(2, Decimal::new(456, 3)),
            share(3, Decimal::new(421, 3)),
        ];
        let total = 12_345;
        for allocation in allocate(total, &shares).unwrap() {
            let exact = Decimal::from(total) * allocation.weight;
            assert!((Decimal::from(allocation.units) - exact).abs() < Decimal::ONE);
        }
    }

    #[test]
    fn test_identical_inputs_allocate_identically() {
        let shares = vec![
            share(1, Decimal::new(3, 1)),
            share(2, Decimal::new(3, 1)),
            share(3, Decimal::new(4, 1)),
        ];
        let first = allocate(101, &shares).unwrap();
        let second = allocate(101, &shares).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let whole = vec![share(1, Decimal::ONE)];
        assert!(matches!(
            allocate(0, &whole),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            allocate(-5, &whole),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(allocate(10, &[]), Err(Error::InvalidInput(_))));
        assert!(matches!(
            allocate(10, &[share(1, Decimal::ZERO)]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_single_lot_takes_everything() {
        let allocations = allocate(42, &[share(1, Decimal::ONE)]).unwrap();
        assert_eq!(units(&allocations), vec![42]);
    }
}
