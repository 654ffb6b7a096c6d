use serde::Serialize;

use crate::error::MigrateError;
use crate::model::{Book, BookContributor, Contributor, EntityType};
use crate::store::{EntityBatch, Store};

/// A destination row type the upserter knows how to hand to a [`Store`].
pub trait Persist: Sized {
    const ENTITY: EntityType;

    fn batch(rows: &[Self]) -> EntityBatch<'_>;
}

impl Persist for Book {
    const ENTITY: EntityType = EntityType::Book;

    fn batch(rows: &[Self]) -> EntityBatch<'_> {
        EntityBatch::Books(rows)
    }
}

impl Persist for Contributor {
    const ENTITY: EntityType = EntityType::Contributor;

    fn batch(rows: &[Self]) -> EntityBatch<'_> {
        EntityBatch::Contributors(rows)
    }
}

impl Persist for BookContributor {
    const ENTITY: EntityType = EntityType::BookContributor;

    fn batch(rows: &[Self]) -> EntityBatch<'_> {
        EntityBatch::BookContributors(rows)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertOutcome {
    pub attempted: usize,
    pub inserted: usize,
    pub batches: usize,
}

impl UpsertOutcome {
    /// Rows the store skipped because they collided with an existing row.
    pub fn conflicts_skipped(&self) -> usize {
        self.attempted - self.inserted
    }
}

/// Writes records in fixed-size, order-preserving batches, one store
/// transaction per batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchUpserter {
    batch_size: usize,
}

impl BatchUpserter {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1) }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Insert `records`, skipping conflicts. A failing batch aborts the
    /// upsert; batches before it stay committed.
    pub fn upsert<S, T>(&self, store: &mut S, records: &[T]) -> Result<UpsertOutcome, MigrateError>
    where
        S: Store + ?Sized,
        T: Persist,
    {
        let entity = T::ENTITY;
        let total_batches = records.len().div_ceil(self.batch_size);
        let mut outcome = UpsertOutcome::default();

        for (batch_index, chunk) in records.chunks(self.batch_size).enumerate() {
            let inserted = store.insert_batch(T::batch(chunk)).map_err(|source| {
                log::error!(
                    "{entity}: batch {}/{total_batches} failed after {} committed batch(es)",
                    batch_index + 1,
                    outcome.batches
                );
                MigrateError::Batch {
                    entity,
                    batch_index,
                    committed_batches: outcome.batches,
                    source,
                }
            })?;

            let first_row = batch_index * self.batch_size + 1;
            log::info!(
                "{entity}: committed batch {}/{total_batches} (rows {first_row}-{}, {inserted} inserted)",
                batch_index + 1,
                first_row + chunk.len() - 1,
            );

            outcome.attempted += chunk.len();
            outcome.inserted += inserted;
            outcome.batches += 1;
        }

        Ok(outcome)
    }
}
