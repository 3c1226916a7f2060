//! Entity catalog: the flattened set of things the scanner can recognize.

pub mod data;
pub mod entity;
pub mod index;

pub use data::GameData;
pub use entity::{CatalogEntity, EntityKind, Rarity};
pub use index::CatalogIndex;
