use serde::Serialize;

use crate::error::StoreError;
use crate::model::{Book, BookContributor, Contributor, EntityType, InternalId, LegacyKey, OwnerId};
use crate::reference::{ReferenceEntry, ReferenceKind};

/// One batch of destination rows, handed to [`Store::insert_batch`].
#[derive(Debug, Clone, Copy)]
pub enum EntityBatch<'a> {
    Books(&'a [Book]),
    Contributors(&'a [Contributor]),
    BookContributors(&'a [BookContributor]),
}

impl EntityBatch<'_> {
    pub fn entity(&self) -> EntityType {
        match self {
            Self::Books(_) => EntityType::Book,
            Self::Contributors(_) => EntityType::Contributor,
            Self::BookContributors(_) => EntityType::BookContributor,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Books(rows) => rows.len(),
            Self::Contributors(rows) => rows.len(),
            Self::BookContributors(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Row counts owned by the importing user, read after the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreTotals {
    pub books: u64,
    pub contributors: u64,
    pub book_contributors: u64,
}

/// The destination: a transactional relational store.
///
/// Implementations own their transaction boundaries. `insert_batch` is the
/// only mutating call and must be atomic per call.
pub trait Store {
    /// The owner to attribute rows to: `requested` if it exists, otherwise
    /// any user when `requested` is `None`. `Ok(None)` when nobody matches.
    fn resolve_owner(&mut self, requested: Option<&str>) -> Result<Option<OwnerId>, StoreError>;

    fn reference_entries(&mut self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, StoreError>;

    /// Rows of `entity` already attributed to `owner`.
    fn count_owned(&mut self, entity: EntityType, owner: &OwnerId) -> Result<u64, StoreError>;

    /// Committed `(filemaker_id, id)` pairs of `entity` owned by `owner`.
    fn load_identities(
        &mut self,
        entity: EntityType,
        owner: &OwnerId,
    ) -> Result<Vec<(LegacyKey, InternalId)>, StoreError>;

    /// Insert the batch in one transaction, skipping rows that collide with
    /// a unique constraint, and commit. Returns the number of rows inserted.
    fn insert_batch(&mut self, batch: EntityBatch<'_>) -> Result<usize, StoreError>;

    fn totals(&mut self, owner: &OwnerId) -> Result<StoreTotals, StoreError>;
}
