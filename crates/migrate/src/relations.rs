use crate::columns::link as col;
use crate::identity::IdentityRegistry;
use crate::model::{BookContributor, EntityType, ExternalRecord, InternalId};
use crate::normalize::render;
use crate::reference::ReferenceMap;
use crate::report::{SoftFailure, SoftFailureCounts};
use crate::vocabulary::RoleTable;

/// Joins linking rows against the identity registry and the role tables.
pub struct RelationshipResolver<'a> {
    registry: &'a IdentityRegistry,
    roles: &'a RoleTable,
    role_ids: &'a ReferenceMap,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(registry: &'a IdentityRegistry, roles: &'a RoleTable, role_ids: &'a ReferenceMap) -> Self {
        Self { registry, roles, role_ids }
    }

    /// Resolve every row, in source order. Rows that cannot be fully
    /// resolved are dropped and counted.
    pub fn resolve(&self, rows: &[ExternalRecord]) -> (Vec<BookContributor>, SoftFailureCounts) {
        let mut links = Vec::with_capacity(rows.len());
        let mut failures = SoftFailureCounts::default();

        for row in rows {
            match self.resolve_row(row) {
                Ok(link) => links.push(link),
                Err(failure) => {
                    log::debug!("link row {}: {failure}", row.row());
                    failures.record(failure);
                }
            }
        }

        (links, failures)
    }

    fn resolve_row(&self, row: &ExternalRecord) -> Result<BookContributor, SoftFailure> {
        let book_key = row.legacy_key(col::BOOK).ok_or(SoftFailure::MissingLinkKey)?;
        let contributor_key = row.legacy_key(col::CONTRIBUTOR).ok_or(SoftFailure::MissingLinkKey)?;
        let label = render(row.get(col::ROLE)).ok_or(SoftFailure::MissingRole)?;

        let code = self.roles.code_for(&label).ok_or(SoftFailure::UnmappedRole)?;
        let role_id = self.role_ids.lookup(code).ok_or(SoftFailure::UnknownRoleCode)?;
        let book_id = self
            .registry
            .get(EntityType::Book, &book_key)
            .ok_or(SoftFailure::UnknownBook)?;
        let contributor_id = self
            .registry
            .get(EntityType::Contributor, &contributor_key)
            .ok_or(SoftFailure::UnknownContributor)?;

        Ok(BookContributor {
            id: InternalId::mint(),
            book_id: book_id.clone(),
            contributor_id: contributor_id.clone(),
            role_id: role_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LegacyKey, RawValue};
    use crate::reference::{ReferenceEntry, ReferenceKind};
    use crate::vocabulary::Vocabulary;

    fn key(s: &str) -> LegacyKey {
        LegacyKey::new(s).unwrap()
    }

    fn role_ids() -> ReferenceMap {
        ReferenceMap::new(
            ReferenceKind::Role,
            vec![ReferenceEntry::new("r1", "aut"), ReferenceEntry::new("r2", "trl")],
        )
    }

    fn registry(books: usize, contributors: usize) -> IdentityRegistry {
        let mut registry = IdentityRegistry::new();
        for i in 1..=books {
            registry
                .register(EntityType::Book, key(&i.to_string()), InternalId::from(format!("b{i}")))
                .unwrap();
        }
        for i in 1..=contributors {
            registry
                .register(EntityType::Contributor, key(&i.to_string()), InternalId::from(format!("c{i}")))
                .unwrap();
        }
        registry
    }

    fn link(row: usize, book: RawValue, contributor: RawValue, role: &str) -> ExternalRecord {
        ExternalRecord::new(
            row,
            [(col::BOOK, book), (col::CONTRIBUTOR, contributor), (col::ROLE, RawValue::from(role))],
        )
    }

    #[test]
    fn unknown_contributors_are_skipped_and_counted() {
        let registry = registry(3, 4);
        let vocab = Vocabulary::default();
        let roles = role_ids();
        let resolver = RelationshipResolver::new(&registry, &vocab.roles, &roles);

        // six rows, two of them point at contributors that were never imported
        let rows = vec![
            link(1, RawValue::Float(1.0), RawValue::Float(1.0), "Author"),
            link(2, RawValue::Float(1.0), RawValue::Float(99.0), "Author"),
            link(3, RawValue::Float(2.0), RawValue::Float(2.0), "Translator"),
            link(4, RawValue::Float(2.0), RawValue::Float(98.0), "Author"),
            link(5, RawValue::Float(3.0), RawValue::Float(3.0), "Co-Author"),
            link(6, RawValue::Float(3.0), RawValue::Float(4.0), "Lead Author"),
        ];
        let (links, failures) = resolver.resolve(&rows);

        assert_eq!(links.len(), 4);
        assert_eq!(failures.get(SoftFailure::UnknownContributor), 2);
        assert_eq!(failures.total(), 2);

        let first = &links[0];
        assert_eq!(first.book_id.as_str(), "b1");
        assert_eq!(first.contributor_id.as_str(), "c1");
        assert_eq!(first.role_id.as_str(), "r1");
        assert_eq!(links[1].role_id.as_str(), "r2");
    }

    #[test]
    fn each_unresolvable_part_has_its_own_counter() {
        let registry = registry(1, 1);
        let vocab = Vocabulary::default();
        let roles = role_ids();
        let resolver = RelationshipResolver::new(&registry, &vocab.roles, &roles);

        let rows = vec![
            link(1, RawValue::Empty, RawValue::Int(1), "Author"),
            ExternalRecord::new(2, [(col::BOOK, RawValue::Int(1)), (col::CONTRIBUTOR, RawValue::Int(1))]),
            link(3, RawValue::Int(1), RawValue::Int(1), "Ghost Writer"),
            // known label, but the catalog has no `ill` role
            link(4, RawValue::Int(1), RawValue::Int(1), "Illustrator"),
            link(5, RawValue::Int(7), RawValue::Int(1), "Author"),
            link(6, RawValue::Int(1), RawValue::Int(1), "  Author "),
        ];
        let (links, failures) = resolver.resolve(&rows);

        assert_eq!(links.len(), 1);
        assert_eq!(failures.get(SoftFailure::MissingLinkKey), 1);
        assert_eq!(failures.get(SoftFailure::MissingRole), 1);
        assert_eq!(failures.get(SoftFailure::UnmappedRole), 1);
        assert_eq!(failures.get(SoftFailure::UnknownRoleCode), 1);
        assert_eq!(failures.get(SoftFailure::UnknownBook), 1);
    }

    #[test]
    fn role_labels_are_case_sensitive() {
        let registry = registry(1, 1);
        let vocab = Vocabulary::default();
        let roles = role_ids();
        let resolver = RelationshipResolver::new(&registry, &vocab.roles, &roles);
        let (links, failures) = resolver.resolve(&[link(1, RawValue::Int(1), RawValue::Int(1), "author")]);
        assert!(links.is_empty());
        assert_eq!(failures.get(SoftFailure::UnmappedRole), 1);
    }
}
