mod basket;
mod composition;
mod cycle;
mod lot;
mod operation;
mod placement;
mod selection;
mod size;

pub use basket::{Basket, BasketState};
pub use composition::LotComposition;
pub use cycle::{Cycle, CycleState};
pub use lot::Lot;
pub use operation::{Operation, OperationType};
pub use placement::Placement;
pub use selection::{DestinationBasket, Disposition, Selection, SelectionStatus, SourceBasket};
pub use size::Size;
