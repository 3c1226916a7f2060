//! Flat, id-keyed index over all catalog entities.

use super::entity::{CatalogEntity, EntityKind, Rarity};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read-only lookup structure over every recognizable entity.
///
/// Entities are shared behind `Arc` so detections can reference them without
/// copying. The index is rebuilt wholesale by [`CatalogIndex::init`]; there is
/// no per-entity mutation.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entities: Vec<Arc<CatalogEntity>>,
    by_id: HashMap<String, usize>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a game-data bag (see [`CatalogIndex::init`]).
    pub fn from_game_data(game_data: &Value) -> Self {
        let mut index = Self::new();
        index.init(game_data);
        index
    }

    /// Build an index from already-parsed entities. Duplicate ids keep the first entry.
    pub fn from_entities<I>(entities: I) -> Self
    where
        I: IntoIterator<Item = CatalogEntity>,
    {
        let mut index = Self::new();
        for entity in entities {
            index.insert(entity);
        }
        index
    }

    /// Replace the index contents with the entities found in `game_data`.
    ///
    /// `game_data` is expected to be an object with optional `items`, `weapons`,
    /// `tomes`, `characters` and `shrines` collections. A collection may be an
    /// array, or an object wrapping the array under the same key. Anything else
    /// (null, wrong types, entities missing `id`/`name`) is skipped.
    pub fn init(&mut self, game_data: &Value) {
        self.clear();

        if !game_data.is_object() {
            debug!("game data is not an object; catalog left empty");
            return;
        }

        for kind in EntityKind::ALL {
            let entries = collection_entries(game_data, kind.collection());
            for entry in entries {
                match serde_json::from_value::<CatalogEntity>(entry.clone()) {
                    Ok(mut entity) => {
                        entity.kind = kind;
                        self.insert(entity);
                    }
                    Err(err) => {
                        warn!(
                            collection = kind.collection(),
                            error = %err,
                            "skipping malformed entity"
                        );
                    }
                }
            }
        }

        info!(entities = self.entities.len(), "catalog initialized");
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.by_id.clear();
    }

    fn insert(&mut self, entity: CatalogEntity) {
        if entity.id.is_empty() || self.by_id.contains_key(&entity.id) {
            debug!(id = %entity.id, "ignoring empty or duplicate entity id");
            return;
        }
        self.by_id.insert(entity.id.clone(), self.entities.len());
        self.entities.push(Arc::new(entity));
    }

    pub fn get(&self, id: &str) -> Option<&Arc<CatalogEntity>> {
        self.by_id.get(id).map(|&i| &self.entities[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<CatalogEntity>> {
        self.entities.iter()
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Arc<CatalogEntity>> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }

    /// Every entity except the one with `id`.
    pub fn all_excluding<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a Arc<CatalogEntity>> {
        self.entities.iter().filter(move |e| e.id != id)
    }

    /// Up to `limit` entities of `kind` other than `exclude_id`, offered as
    /// replacements during review. Entities sharing `rarity` come first;
    /// catalog order is kept otherwise.
    pub fn alternatives(
        &self,
        kind: EntityKind,
        exclude_id: &str,
        rarity: Option<Rarity>,
        limit: usize,
    ) -> Vec<Arc<CatalogEntity>> {
        if limit == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<&Arc<CatalogEntity>> = self
            .of_kind(kind)
            .filter(|e| e.id != exclude_id)
            .collect();

        if rarity.is_some() {
            candidates.sort_by_key(|e| e.rarity != rarity);
        }

        candidates.into_iter().take(limit).cloned().collect()
    }
}

impl<'a> IntoIterator for &'a CatalogIndex {
    type Item = &'a Arc<CatalogEntity>;
    type IntoIter = std::slice::Iter<'a, Arc<CatalogEntity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

fn collection_entries<'a>(game_data: &'a Value, key: &str) -> &'a [Value] {
    match game_data.get(key) {
        Some(Value::Array(entries)) => entries,
        Some(Value::Object(wrapper)) => wrapper
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}
