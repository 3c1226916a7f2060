//! Catalog of known Megabonk entities shared by the detection pipeline.

pub mod catalog;

pub use catalog::{CatalogEntity, CatalogIndex, EntityKind, GameData, Rarity};
