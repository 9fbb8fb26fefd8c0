//! Typed store gateway over the single table.

mod conversions;
mod repository;

pub use conversions::ItemCodec;
pub use repository::{entity_item, SingleTableRepository};
