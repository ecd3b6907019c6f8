mod baskets;
mod compositions;
mod cycles;
mod lineage;
mod lots;
mod operations;
mod selections;
mod sizes;

pub use baskets::*;
pub use compositions::*;
pub use cycles::*;
pub use lineage::*;
pub use lots::*;
pub use operations::*;
pub use selections::*;
pub use sizes::*;

mod embedded {
    refinery::embed_migrations!("./migrations");
}

pub async fn run_migrations(client: &mut tokio_postgres::Client) -> Result<(), crate::error::Error> {
    embedded::migrations::runner().run_async(client).await?;
    Ok(())
}
