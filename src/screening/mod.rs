use crate::db;
use crate::error::Error;
use crate::event_sender::{Event, EventSenderHandle};
use crate::types::{
    CycleState, DestinationBasket, Disposition, Placement, Selection, SelectionStatus,
    SourceBasket,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tokio_postgres::{Client, GenericClient};
use tracing::{info, warn};
use uuid::Uuid;

mod close;
mod composition;
mod distribution;
mod mortality;
mod open;

pub use composition::{Composition, CompositionEntry};

/// What one completed screening did, returned to the caller.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CompletionSummary {
    pub mortality_units: i32,
    pub total_source_units: i32,
    pub total_destination_units: i32,
    pub source_baskets_closed: usize,
    pub destination_baskets_activated: usize,
}

pub struct ScreeningManager {
    client: Client,
    event_sender: EventSenderHandle,
}

impl ScreeningManager {
    pub fn new(client: Client, event_sender: EventSenderHandle) -> Self {
        Self {
            client,
            event_sender,
        }
    }

    /// Completes a draft selection as one atomic unit of work: closes every
    /// source cycle, opens (and, for sold baskets, immediately closes) a
    /// cycle per destination, books the mortality on the source lots, writes
    /// the per-destination lot composition and the source-to-destination
    /// lineage, and marks the selection completed. Either everything commits
    /// or nothing does.
    #[tracing::instrument(skip(self))]
    pub async fn complete(&mut self, selection_id: Uuid) -> Result<CompletionSummary, Error> {
        let selection = db::get_selection(&self.client, selection_id)
            .await?
            .ok_or(Error::NotFound {
                entity: "selection",
                id: selection_id,
            })?;
        if selection.status != SelectionStatus::Draft {
            return Err(Error::InvalidState(format!(
                "selection #{} is {}, only draft selections can be completed",
                selection.selection_number, selection.status
            )));
        }
        let sources = db::get_source_baskets(&self.client, selection_id).await?;
        if sources.is_empty() {
            return Err(Error::InvalidInput(
                "selection has no source baskets".into(),
            ));
        }
        let destinations = db::get_destination_baskets(&self.client, selection_id).await?;
        if destinations.is_empty() {
            return Err(Error::InvalidInput(
                "selection has no destination baskets".into(),
            ));
        }
        self.validate_references(&sources, &destinations).await?;
        let placements = parse_placements(&destinations)?;

        let total_source_units: i32 = sources
            .iter()
            .filter_map(|source| source.animal_count)
            .sum();
        let total_destination_units: i32 = destinations
            .iter()
            .filter_map(|destination| destination.animal_count)
            .sum();
        let mortality_units = total_source_units - total_destination_units;
        if mortality_units < 0 {
            // More units counted out than in; left unbooked rather than
            // guessed at.
            warn!(
                gain = -mortality_units,
                "Destination units exceed source units"
            );
        }
        let overlap = overlapping_baskets(&sources, &destinations);
        info!(
            selection_number = selection.selection_number,
            total_source_units,
            total_destination_units,
            mortality_units,
            sources = sources.len(),
            destinations = destinations.len(),
            "Completing screening"
        );

        let transaction = self.client.transaction().await?;
        let locked = db::lock_selection(&transaction, selection_id)
            .await?
            .ok_or(Error::NotFound {
                entity: "selection",
                id: selection_id,
            })?;
        if locked.status != SelectionStatus::Draft {
            return Err(Error::Consistency(format!(
                "selection {} was completed concurrently",
                selection_id
            )));
        }

        let composition = composition::aggregate_sources(&transaction, &sources).await?;
        if composition.is_empty() {
            return Err(Error::InvalidInput(
                "no lot composition could be derived from the source baskets".into(),
            ));
        }

        let closed = close::close_sources(
            &transaction,
            &selection,
            &sources,
            &overlap,
            total_destination_units,
            mortality_units,
        )
        .await?;
        let activated = open::open_destinations(
            &transaction,
            &selection,
            &destinations,
            &placements,
            &composition,
        )
        .await?;
        mortality::reconcile(
            &transaction,
            &composition,
            total_source_units,
            total_destination_units,
            selection.date,
            &audit_ref(&selection),
        )
        .await?;
        distribution::distribute(&transaction, &selection, &activated, &composition).await?;
        record_lineage(&transaction, &selection, &sources, &activated).await?;
        db::update_selection_status(&transaction, selection_id, SelectionStatus::Completed).await?;
        transaction.commit().await?;

        let summary = CompletionSummary {
            mortality_units,
            total_source_units,
            total_destination_units,
            source_baskets_closed: closed,
            destination_baskets_activated: activated.len(),
        };
        info!(?summary, "Screening completed");
        if let Err(e) = self.event_sender.send(Event::ScreeningCompleted {
            selection_id,
            selection_number: selection.selection_number,
            mortality_units,
            total_source_units,
            total_destination_units,
        }) {
            warn!("Failed to publish completion event: {}", e);
        }
        Ok(summary)
    }

    /// Everything the completion will touch must exist, and every source
    /// cycle must still be open, before any mutation is attempted.
    async fn validate_references(
        &self,
        sources: &[SourceBasket],
        destinations: &[DestinationBasket],
    ) -> Result<(), Error> {
        for source in sources {
            db::get_basket(&self.client, source.basket_id)
                .await?
                .ok_or(Error::NotFound {
                    entity: "basket",
                    id: source.basket_id,
                })?;
            let cycle = db::get_cycle(&self.client, source.cycle_id)
                .await?
                .ok_or(Error::NotFound {
                    entity: "cycle",
                    id: source.cycle_id,
                })?;
            if cycle.state == CycleState::Closed {
                return Err(Error::InvalidState(format!(
                    "cycle {} of basket {} is already closed",
                    source.cycle_id, source.basket_id
                )));
            }
        }
        for destination in destinations {
            db::get_basket(&self.client, destination.basket_id)
                .await?
                .ok_or(Error::NotFound {
                    entity: "basket",
                    id: destination.basket_id,
                })?;
        }
        Ok(())
    }
}

/// Baskets appearing on both sides of the selection. The close phase leaves
/// their state alone so the open phase decides how they end up.
fn overlapping_baskets(
    sources: &[SourceBasket],
    destinations: &[DestinationBasket],
) -> HashSet<Uuid> {
    let destination_ids: HashSet<Uuid> = destinations
        .iter()
        .map(|destination| destination.basket_id)
        .collect();
    sources
        .iter()
        .map(|source| source.basket_id)
        .filter(|basket_id| destination_ids.contains(basket_id))
        .collect()
}

/// Parses the placement of every `placed` destination up front, so malformed
/// input is rejected before anything is mutated.
fn parse_placements(destinations: &[DestinationBasket]) -> Result<HashMap<i64, Placement>, Error> {
    let mut placements = HashMap::new();
    for destination in destinations {
        if destination.disposition != Disposition::Placed {
            continue;
        }
        let raw = destination.placement.as_deref().ok_or_else(|| {
            Error::InvalidInput(format!(
                "destination basket {} has no placement",
                destination.basket_id
            ))
        })?;
        placements.insert(destination.id, raw.parse()?);
    }
    Ok(placements)
}

fn audit_ref(selection: &Selection) -> String {
    format!("Screening #{}", selection.selection_number)
}

async fn record_lineage<T: GenericClient>(
    client: &T,
    selection: &Selection,
    sources: &[SourceBasket],
    activated: &[open::ActivatedDestination],
) -> Result<(), Error> {
    for source in sources {
        for destination in activated {
            db::save_lineage(
                client,
                selection.id,
                source.basket_id,
                source.cycle_id,
                destination.basket_id,
                destination.cycle_id,
            )
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn source(id: i64, basket: u128) -> SourceBasket {
        SourceBasket {
            id,
            selection_id: Uuid::from_u128(99),
            basket_id: Uuid::from_u128(basket),
            cycle_id: Uuid::from_u128(basket + 100),
            lot_id: Some(Uuid::from_u128(1)),
            animal_count: Some(800),
        }
    }

    fn destination(id: i64, basket: u128, disposition: Disposition, placement: Option<&str>) -> DestinationBasket {
        DestinationBasket {
            id,
            selection_id: Uuid::from_u128(99),
            basket_id: Uuid::from_u128(basket),
            cycle_id: None,
            disposition,
            flupsy_id: None,
            placement: placement.map(String::from),
            animal_count: Some(750),
            total_weight: None,
            animals_per_kg: None,
            size_id: None,
        }
    }

    #[test]
    fn test_overlap_catches_baskets_on_both_sides() {
        let sources = vec![source(1, 10), source(2, 11)];
        let destinations = vec![
            destination(1, 11, Disposition::Placed, Some("DX3")),
            destination(2, 12, Disposition::Sold, None),
        ];
        let overlap = overlapping_baskets(&sources, &destinations);
        assert_eq!(overlap.len(), 1);
        assert!(overlap.contains(&Uuid::from_u128(11)));
    }

    #[test]
    fn test_placed_destinations_need_a_valid_placement() {
        let ok = vec![
            destination(1, 10, Disposition::Placed, Some("SX4")),
            destination(2, 11, Disposition::Sold, None),
        ];
        let placements = parse_placements(&ok).unwrap();
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[&1].row, "SX");
        assert_eq!(placements[&1].slot, 4);

        let missing = vec![destination(1, 10, Disposition::Placed, None)];
        assert!(matches!(
            parse_placements(&missing),
            Err(Error::InvalidInput(_))
        ));

        let malformed = vec![destination(1, 10, Disposition::Placed, Some("3DX"))];
        assert!(matches!(
            parse_placements(&malformed),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_audit_ref_names_the_screening() {
        let selection = Selection::new(
            31,
            chrono::NaiveDate::from_ymd_opt(2022, 2, 1).unwrap(),
            None,
        );
        assert_eq!(audit_ref(&selection), "Screening #31");
    }
}
