use crate::error::Error;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;
use uuid::Uuid;

/// Post-commit notifications for the surrounding layer (cache invalidation,
/// client updates). Delivery is best-effort: a failed send is logged by the
/// caller and never fails the completed work.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum Event {
    ScreeningCompleted {
        selection_id: Uuid,
        selection_number: i32,
        mortality_units: i32,
        total_source_units: i32,
        total_destination_units: i32,
    },
}

#[derive(Clone, Debug)]
pub struct EventSenderHandle {
    sender: mpsc::UnboundedSender<Event>,
}

impl EventSenderHandle {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    #[tracing::instrument(skip(self))]
    pub fn send(&self, event: Event) -> Result<(), Error> {
        trace!(?event, "Publishing event");
        self.sender
            .send(event)
            .map_err(|e| Error::Downstream(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_the_receiver() {
        let (handle, mut receiver) = EventSenderHandle::new();
        handle
            .send(Event::ScreeningCompleted {
                selection_id: Uuid::from_u128(1),
                selection_number: 7,
                mortality_units: 500,
                total_source_units: 10_000,
                total_destination_units: 9_500,
            })
            .unwrap();
        let event = receiver.recv().await.unwrap();
        let payload = serde_json::to_value(&event).unwrap();
        assert_eq!(payload["event"], "screening_completed");
        assert_eq!(payload["mortality_units"], 500);
    }

    #[test]
    fn test_send_without_receiver_is_a_downstream_error() {
        let (handle, receiver) = EventSenderHandle::new();
        drop(receiver);
        let result = handle.send(Event::ScreeningCompleted {
            selection_id: Uuid::from_u128(1),
            selection_number: 1,
            mortality_units: 0,
            total_source_units: 1,
            total_destination_units: 1,
        });
        assert!(matches!(result, Err(Error::Downstream(_))));
    }
}
