use anyhow::Result;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use screening_manager::allocator::{allocate, LotShare};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("RUST_LOG").is_ok() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        set_global_default(subscriber).unwrap();
    }
});

fn share(n: u128, weight: Decimal) -> LotShare {
    LotShare {
        lot_id: Uuid::from_u128(n),
        weight,
    }
}

#[test]
fn ten_units_over_a_one_third_two_thirds_split() -> Result<()> {
    Lazy::force(&TRACING);
    let third = Decimal::ONE / Decimal::from(3);
    let allocations = allocate(10, &[share(1, third), share(2, Decimal::ONE - third)])?;
    assert_eq!(allocations[0].units, 3);
    assert_eq!(allocations[1].units, 7);
    Ok(())
}

#[test]
fn exact_splits_need_no_remainder_distribution() -> Result<()> {
    Lazy::force(&TRACING);
    let allocations = allocate(
        1000,
        &[share(1, Decimal::new(667, 3)), share(2, Decimal::new(333, 3))],
    )?;
    assert_eq!(allocations[0].units, 667);
    assert_eq!(allocations[1].units, 333);
    Ok(())
}

#[test]
fn mortality_sized_splits_follow_the_source_ratio() -> Result<()> {
    Lazy::force(&TRACING);
    // 10,000 source units split 6,000/4,000; 9,500 units survive screening.
    let allocations = allocate(
        500,
        &[share(1, Decimal::new(6, 1)), share(2, Decimal::new(4, 1))],
    )?;
    assert_eq!(allocations[0].units, 300);
    assert_eq!(allocations[1].units, 200);
    Ok(())
}

#[test]
fn every_split_preserves_the_total() -> Result<()> {
    Lazy::force(&TRACING);
    let shares: Vec<LotShare> = (1..=9)
        .map(|n| share(n, Decimal::ONE / Decimal::from(9)))
        .collect();
    for total in 1..=250 {
        let allocations = allocate(total, &shares)?;
        assert_eq!(allocations.iter().map(|a| a.units).sum::<i32>(), total);
        for allocation in &allocations {
            let exact = Decimal::from(total) * allocation.weight;
            assert!((Decimal::from(allocation.units) - exact).abs() < Decimal::ONE);
        }
    }
    Ok(())
}
