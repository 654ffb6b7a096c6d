//! Legacy key → internal id mapping, per entity type.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;

use crate::error::MigrateError;
use crate::model::{EntityType, InternalId, LegacyKey, OwnerId};
use crate::store::Store;

/// How an entity type's mapping was seeded. Fixed once chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// Nothing owned in the store yet; every id is minted by this run.
    Fresh,
    /// A previous run committed rows; their ids were read back.
    Resume,
}

/// Where a mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Read back from the store; the row is already committed.
    Reloaded,
    /// Minted by this run.
    Minted,
}

#[derive(Debug)]
struct EntityMappings {
    mode: IdentityMode,
    ids: HashMap<LegacyKey, (InternalId, Origin)>,
}

impl EntityMappings {
    fn new(mode: IdentityMode) -> Self {
        Self { mode, ids: HashMap::new() }
    }
}

/// Append-only: a key, once mapped, keeps its id for the rest of the run.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    entities: HashMap<EntityType, EntityMappings>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the mode for `entity`: resume when `owner` already has rows
    /// of this type, loading their `(filemaker_id, id)` pairs; fresh
    /// otherwise. Calling again for the same entity keeps the first choice.
    pub fn prepare<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        entity: EntityType,
        owner: &OwnerId,
    ) -> Result<IdentityMode, MigrateError> {
        if let Some(existing) = self.entities.get(&entity) {
            return Ok(existing.mode);
        }

        let existing_rows = store.count_owned(entity, owner)?;
        if existing_rows == 0 {
            log::info!("{entity}: no existing rows, fresh import");
            self.entities.insert(entity, EntityMappings::new(IdentityMode::Fresh));
            return Ok(IdentityMode::Fresh);
        }

        let pairs = store.load_identities(entity, owner)?;
        let mut mappings = EntityMappings::new(IdentityMode::Resume);
        for (key, id) in pairs {
            match mappings.ids.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert((id, Origin::Reloaded));
                }
                Entry::Occupied(slot) => {
                    log::warn!("{entity}: legacy key '{}' stored twice, keeping first id", slot.key());
                }
            }
        }
        log::info!(
            "{entity}: {existing_rows} existing rows, resuming with {} mapped legacy keys",
            mappings.ids.len()
        );
        self.entities.insert(entity, mappings);
        Ok(IdentityMode::Resume)
    }

    pub fn mode(&self, entity: EntityType) -> Option<IdentityMode> {
        self.entities.get(&entity).map(|m| m.mode)
    }

    pub fn get(&self, entity: EntityType, key: &LegacyKey) -> Option<&InternalId> {
        self.lookup(entity, key).map(|(id, _)| id)
    }

    pub fn lookup(&self, entity: EntityType, key: &LegacyKey) -> Option<(&InternalId, Origin)> {
        self.entities
            .get(&entity)?
            .ids
            .get(key)
            .map(|(id, origin)| (id, *origin))
    }

    /// Bind a freshly minted id. Never overwrites an existing mapping.
    /// An entity that was never prepared is treated as fresh.
    pub fn register(
        &mut self,
        entity: EntityType,
        key: LegacyKey,
        id: InternalId,
    ) -> Result<(), MigrateError> {
        let mappings = self
            .entities
            .entry(entity)
            .or_insert_with(|| EntityMappings::new(IdentityMode::Fresh));
        match mappings.ids.entry(key) {
            Entry::Occupied(slot) => Err(MigrateError::IdentityConflict {
                entity,
                key: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert((id, Origin::Minted));
                Ok(())
            }
        }
    }

    pub fn len(&self, entity: EntityType) -> usize {
        self.entities.get(&entity).map_or(0, |m| m.ids.len())
    }

    /// `(legacy key, id)` pairs for `entity`, sorted by legacy key.
    pub fn pairs(&self, entity: EntityType) -> Vec<(LegacyKey, InternalId)> {
        let mut pairs: Vec<_> = self
            .entities
            .get(&entity)
            .map(|m| m.ids.iter().map(|(k, (id, _))| (k.clone(), id.clone())).collect())
            .unwrap_or_default();
        pairs.sort();
        pairs
    }
}
