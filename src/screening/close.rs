use crate::db;
use crate::error::Error;
use crate::types::{Operation, Selection, SourceBasket};
use std::collections::HashSet;
use tokio_postgres::GenericClient;
use tracing::debug;
use uuid::Uuid;

fn close_note(selection: &Selection, total_destination_units: i32, mortality_units: i32) -> String {
    format!(
        "Cycle closed by screening #{} of {}. Units distributed: {}. Mortality: {}.",
        selection.selection_number, selection.date, total_destination_units, mortality_units
    )
}

/// Closes every source basket's cycle. Baskets that also appear as
/// destinations are left alone here; the open phase assigns their final
/// state, so they never end up stranded as available.
#[tracing::instrument(skip(client, selection, sources, overlap))]
pub(super) async fn close_sources<T: GenericClient>(
    client: &T,
    selection: &Selection,
    sources: &[SourceBasket],
    overlap: &HashSet<Uuid>,
    total_destination_units: i32,
    mortality_units: i32,
) -> Result<usize, Error> {
    for source in sources {
        debug!(basket_id = %source.basket_id, cycle_id = %source.cycle_id, "Closing source basket");
        let operation = Operation::cycle_close(
            selection.date,
            source.basket_id,
            source.cycle_id,
            source.animal_count,
            close_note(selection, total_destination_units, mortality_units),
        );
        db::save_operation(client, &operation).await?;
        let closed = db::close_cycle(client, source.cycle_id, selection.date).await?;
        if closed != 1 {
            return Err(Error::Consistency(format!(
                "cycle {} of basket {} was no longer open",
                source.cycle_id, source.basket_id
            )));
        }
        if overlap.contains(&source.basket_id) {
            debug!(basket_id = %source.basket_id, "Basket is also a destination, deferring its final state");
        } else {
            db::release_basket(client, source.basket_id).await?;
        }
    }
    Ok(sources.len())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_close_note_carries_the_reconciliation_figures() {
        let selection = Selection::new(7, NaiveDate::from_ymd_opt(2021, 5, 3).unwrap(), None);
        assert_eq!(
            close_note(&selection, 9500, 500),
            "Cycle closed by screening #7 of 2021-05-03. Units distributed: 9500. Mortality: 500."
        );
    }
}
