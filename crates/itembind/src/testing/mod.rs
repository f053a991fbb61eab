/// A recording adapter over rectangular items.
pub mod grid;

pub use grid::{Grid, ItemId, Zone};
