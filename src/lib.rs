pub mod allocator;
pub mod db;
mod error;
mod event_sender;
pub mod screening;
mod settings;
pub mod types;

pub use error::Error;
pub use event_sender::{Event, EventSenderHandle};
pub use screening::{CompletionSummary, ScreeningManager};
pub use settings::{DatabaseSettings, Settings};

use tokio_postgres::NoTls;
use tracing::error;

/// Connects to the configured database and drives the connection on a
/// background task.
pub async fn connect(settings: &Settings) -> Result<tokio_postgres::Client, Error> {
    let (client, connection) = tokio_postgres::connect(
        &format!("{}/{}", settings.database.url, settings.database.name),
        NoTls,
    )
    .await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Database connection error: {}", e);
        }
    });
    Ok(client)
}
