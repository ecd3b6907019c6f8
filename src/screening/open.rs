use super::composition::Composition;
use crate::db;
use crate::error::Error;
use crate::types::{Cycle, DestinationBasket, Disposition, Operation, Placement, Selection};
use serde_json::json;
use std::collections::HashMap;
use tokio_postgres::GenericClient;
use tracing::debug;
use uuid::Uuid;

/// A destination basket with the cycle the open phase created for it.
pub(super) struct ActivatedDestination {
    pub basket_id: Uuid,
    pub cycle_id: Uuid,
    pub animal_count: i32,
}

fn activation_note(selection: &Selection, composition: &Composition) -> String {
    let mut note = format!(
        "From screening #{} of {}",
        selection.selection_number, selection.date
    );
    if composition.is_mixed() {
        note.push_str(&format!(
            " - mixed composition of {} lots",
            composition.lot_count()
        ));
    }
    note
}

fn sale_note(selection: &Selection, composition: &Composition) -> String {
    let mut note = format!(
        "Direct sale from screening #{} of {}",
        selection.selection_number, selection.date
    );
    if composition.is_mixed() {
        note.push_str(&format!(
            " - mixed composition of {} lots",
            composition.lot_count()
        ));
    }
    note
}

fn mixed_metadata(selection: &Selection, composition: &Composition) -> Option<serde_json::Value> {
    if !composition.is_mixed() {
        return None;
    }
    Some(json!({
        "mixed": true,
        "source_selection": selection.id,
        "nominal_lot": composition.nominal_lot(),
        "lot_count": composition.lot_count(),
    }))
}

/// Opens a new cycle on every destination basket and settles its final state.
/// Sold baskets get their cycle closed again right away and keep their
/// placement; placed baskets become active at the parsed placement.
#[tracing::instrument(skip(client, selection, destinations, placements, composition))]
pub(super) async fn open_destinations<T: GenericClient>(
    client: &T,
    selection: &Selection,
    destinations: &[DestinationBasket],
    placements: &HashMap<i64, Placement>,
    composition: &Composition,
) -> Result<Vec<ActivatedDestination>, Error> {
    let nominal_lot = composition.nominal_lot();
    let mut activated = Vec::with_capacity(destinations.len());
    for destination in destinations {
        debug!(
            basket_id = %destination.basket_id,
            disposition = %destination.disposition,
            "Opening destination basket"
        );
        let cycle = Cycle::new(destination.basket_id, selection.date);
        db::save_cycle(client, &cycle).await?;
        db::set_destination_cycle(client, destination.id, cycle.id).await?;

        let size_id = match (destination.size_id, destination.animals_per_kg) {
            (Some(size_id), _) => Some(size_id),
            (None, Some(animals_per_kg)) => db::size_for_animals_per_kg(client, animals_per_kg)
                .await?
                .map(|size| size.id),
            (None, None) => None,
        };

        let metadata = mixed_metadata(selection, composition);
        let operation = Operation::activation(
            selection.date,
            destination.basket_id,
            cycle.id,
            nominal_lot,
            size_id,
            destination.animal_count,
            destination.total_weight,
            destination.animals_per_kg,
            metadata.clone(),
            activation_note(selection, composition),
        );
        db::save_operation(client, &operation).await?;

        match destination.disposition {
            Disposition::Sold => {
                let sale = Operation::sale(
                    selection.date,
                    destination.basket_id,
                    cycle.id,
                    nominal_lot,
                    size_id,
                    destination.animal_count,
                    destination.total_weight,
                    destination.animals_per_kg,
                    metadata,
                    sale_note(selection, composition),
                );
                db::save_operation(client, &sale).await?;
                let closed = db::close_cycle(client, cycle.id, selection.date).await?;
                if closed != 1 {
                    return Err(Error::Consistency(format!(
                        "freshly opened cycle {} could not be closed for sale",
                        cycle.id
                    )));
                }
                db::release_basket(client, destination.basket_id).await?;
            }
            Disposition::Placed => {
                let placement = placements.get(&destination.id).ok_or_else(|| {
                    Error::Consistency(format!(
                        "no parsed placement for destination basket {}",
                        destination.basket_id
                    ))
                })?;
                db::place_basket(
                    client,
                    destination.basket_id,
                    destination.flupsy_id,
                    placement,
                    cycle.id,
                )
                .await?;
            }
        }

        activated.push(ActivatedDestination {
            basket_id: destination.basket_id,
            cycle_id: cycle.id,
            animal_count: destination.animal_count.unwrap_or(0),
        });
    }
    Ok(activated)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn selection() -> Selection {
        Selection::new(12, NaiveDate::from_ymd_opt(2021, 8, 16).unwrap(), None)
    }

    fn mixed() -> Composition {
        let mut composition = Composition::default();
        composition.add(Uuid::from_u128(1), 600);
        composition.add(Uuid::from_u128(2), 400);
        composition
    }

    fn pure() -> Composition {
        let mut composition = Composition::default();
        composition.add(Uuid::from_u128(1), 1000);
        composition
    }

    #[test]
    fn test_notes_flag_mixed_compositions() {
        assert_eq!(
            activation_note(&selection(), &pure()),
            "From screening #12 of 2021-08-16"
        );
        assert_eq!(
            activation_note(&selection(), &mixed()),
            "From screening #12 of 2021-08-16 - mixed composition of 2 lots"
        );
        assert_eq!(
            sale_note(&selection(), &pure()),
            "Direct sale from screening #12 of 2021-08-16"
        );
    }

    #[test]
    fn test_metadata_only_for_mixed_compositions() {
        assert!(mixed_metadata(&selection(), &pure()).is_none());
        let metadata = mixed_metadata(&selection(), &mixed()).unwrap();
        assert_eq!(metadata["mixed"], true);
        assert_eq!(metadata["lot_count"], 2);
        assert_eq!(
            metadata["nominal_lot"],
            serde_json::json!(Uuid::from_u128(1))
        );
    }
}
