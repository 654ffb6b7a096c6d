//! In-memory [`Store`] for engine tests: unique-constraint emulation,
//! per-batch atomicity, and failure injection.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::model::{Book, BookContributor, Contributor, EntityType, InternalId, LegacyKey, OwnerId};
use crate::reference::{ReferenceEntry, ReferenceKind};
use crate::store::{EntityBatch, Store, StoreTotals};

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub users: Vec<OwnerId>,
    pub references: HashMap<ReferenceKind, Vec<ReferenceEntry>>,
    pub books: Vec<Book>,
    pub contributors: Vec<Contributor>,
    pub links: Vec<BookContributor>,
    /// Sizes of committed batches, in commit order.
    pub batch_sizes: Vec<usize>,
    /// Fail the n-th (0-based) `insert_batch` call for this entity type.
    pub fail_on: Option<(EntityType, usize)>,
    pub fail_reference_load: bool,
    calls: HashMap<EntityType, usize>,
}

fn entries(pairs: &[(&str, &str)]) -> Vec<ReferenceEntry> {
    pairs.iter().map(|(id, key)| ReferenceEntry::new(*id, *key)).collect()
}

impl MemoryStore {
    /// One user and a small vocabulary of each reference kind.
    pub fn seeded() -> Self {
        let mut references = HashMap::new();
        references.insert(
            ReferenceKind::Language,
            entries(&[("1", "English"), ("2", "Dutch"), ("3", "French"), ("4", "Spanish"), ("5", "German")]),
        );
        references.insert(
            ReferenceKind::Role,
            entries(&[("1", "aut"), ("2", "trl"), ("3", "ill"), ("4", "edt")]),
        );
        references.insert(
            ReferenceKind::Condition,
            entries(&[("1", "Fine"), ("2", "Good"), ("3", "Worn")]),
        );
        references.insert(
            ReferenceKind::Binding,
            entries(&[("1", "Hardcover"), ("2", "Paperback"), ("3", "Cloth")]),
        );
        Self {
            users: vec![OwnerId::new("owner-1")],
            references,
            ..Default::default()
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.users[0].clone()
    }

    pub fn insert_contributor_row(&mut self, owner: &OwnerId, key: &str, id: &str) {
        self.contributors.push(Contributor {
            id: InternalId::from(id),
            kind: "person",
            canonical_name: format!("Contributor {key}"),
            sort_name: format!("Contributor {key}"),
            display_name: format!("Contributor {key}"),
            given_names: None,
            family_name: None,
            created_by_user_id: owner.clone(),
            filemaker_id: LegacyKey::new(key).expect("test key"),
        });
    }

    fn insert_books(&mut self, rows: &[Book]) -> usize {
        let mut inserted = 0;
        for row in rows {
            let clash = self.books.iter().any(|b| {
                b.id == row.id || (b.user_id == row.user_id && b.filemaker_id == row.filemaker_id)
            });
            if !clash {
                self.books.push(row.clone());
                inserted += 1;
            }
        }
        inserted
    }

    fn insert_contributors(&mut self, rows: &[Contributor]) -> usize {
        let mut inserted = 0;
        for row in rows {
            let clash = self.contributors.iter().any(|c| {
                c.id == row.id
                    || (c.created_by_user_id == row.created_by_user_id
                        && c.filemaker_id == row.filemaker_id)
            });
            if !clash {
                self.contributors.push(row.clone());
                inserted += 1;
            }
        }
        inserted
    }

    fn insert_links(&mut self, rows: &[BookContributor]) -> Result<usize, StoreError> {
        // foreign keys are checked for the whole batch before anything lands
        for row in rows {
            if !self.books.iter().any(|b| b.id == row.book_id) {
                return Err(StoreError::new(format!("foreign key: unknown book {}", row.book_id)));
            }
            if !self.contributors.iter().any(|c| c.id == row.contributor_id) {
                return Err(StoreError::new(format!(
                    "foreign key: unknown contributor {}",
                    row.contributor_id
                )));
            }
        }
        let mut inserted = 0;
        for row in rows {
            let clash = self.links.iter().any(|l| {
                l.id == row.id
                    || (l.book_id == row.book_id
                        && l.contributor_id == row.contributor_id
                        && l.role_id == row.role_id)
            });
            if !clash {
                self.links.push(row.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

impl Store for MemoryStore {
    fn resolve_owner(&mut self, requested: Option<&str>) -> Result<Option<OwnerId>, StoreError> {
        Ok(match requested {
            Some(id) => self.users.iter().find(|u| u.as_str() == id).cloned(),
            None => self.users.first().cloned(),
        })
    }

    fn reference_entries(&mut self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, StoreError> {
        if self.fail_reference_load {
            return Err(StoreError::new("connection refused"));
        }
        Ok(self.references.get(&kind).cloned().unwrap_or_default())
    }

    fn count_owned(&mut self, entity: EntityType, owner: &OwnerId) -> Result<u64, StoreError> {
        let count = match entity {
            EntityType::Book => self.books.iter().filter(|b| &b.user_id == owner).count(),
            EntityType::Contributor => self
                .contributors
                .iter()
                .filter(|c| &c.created_by_user_id == owner)
                .count(),
            EntityType::BookContributor => self
                .links
                .iter()
                .filter(|l| self.books.iter().any(|b| b.id == l.book_id && &b.user_id == owner))
                .count(),
        };
        Ok(count as u64)
    }

    fn load_identities(
        &mut self,
        entity: EntityType,
        owner: &OwnerId,
    ) -> Result<Vec<(LegacyKey, InternalId)>, StoreError> {
        match entity {
            EntityType::Book => Ok(self
                .books
                .iter()
                .filter(|b| &b.user_id == owner)
                .map(|b| (b.filemaker_id.clone(), b.id.clone()))
                .collect()),
            EntityType::Contributor => Ok(self
                .contributors
                .iter()
                .filter(|c| &c.created_by_user_id == owner)
                .map(|c| (c.filemaker_id.clone(), c.id.clone()))
                .collect()),
            EntityType::BookContributor => {
                Err(StoreError::new("book_contributor rows carry no legacy key"))
            }
        }
    }

    fn insert_batch(&mut self, batch: EntityBatch<'_>) -> Result<usize, StoreError> {
        let entity = batch.entity();
        let call = self.calls.entry(entity).or_insert(0);
        let this_call = *call;
        *call += 1;
        if self.fail_on == Some((entity, this_call)) {
            return Err(StoreError::new("disk I/O error"));
        }

        let inserted = match batch {
            EntityBatch::Books(rows) => self.insert_books(rows),
            EntityBatch::Contributors(rows) => self.insert_contributors(rows),
            EntityBatch::BookContributors(rows) => self.insert_links(rows)?,
        };
        self.batch_sizes.push(batch.len());
        Ok(inserted)
    }

    fn totals(&mut self, owner: &OwnerId) -> Result<StoreTotals, StoreError> {
        Ok(StoreTotals {
            books: self.count_owned(EntityType::Book, owner)?,
            contributors: self.count_owned(EntityType::Contributor, owner)?,
            book_contributors: self.count_owned(EntityType::BookContributor, owner)?,
        })
    }
}
