use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::MigrateError;
use crate::model::InternalId;
use crate::store::Store;

/// The four small vocabularies the destination ships pre-populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Keyed by English name.
    Language,
    /// Keyed by short role code (`aut`, `trl`, ...).
    Role,
    Condition,
    Binding,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [Self::Language, Self::Role, Self::Condition, Self::Binding];

    /// Codes compare exactly; names compare case-insensitively.
    pub fn normalize_key(&self, raw: &str) -> String {
        match self {
            Self::Role => raw.to_string(),
            _ => raw.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Language => write!(f, "language"),
            Self::Role => write!(f, "role"),
            Self::Condition => write!(f, "condition"),
            Self::Binding => write!(f, "binding"),
        }
    }
}

/// `(internal_id, canonical name or code)` as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub id: InternalId,
    pub key: String,
}

impl ReferenceEntry {
    pub fn new(id: impl Into<InternalId>, key: impl Into<String>) -> Self {
        Self { id: id.into(), key: key.into() }
    }
}

/// One vocabulary, indexed by normalized key.
///
/// Entries are held in ascending internal-id order (numerically when both ids
/// are integers). Containment matching walks that order, so the first match
/// is the same on every run regardless of how the store returned the rows.
#[derive(Debug, Clone)]
pub struct ReferenceMap {
    kind: ReferenceKind,
    entries: Vec<(String, InternalId)>,
    index: HashMap<String, InternalId>,
}

impl ReferenceMap {
    pub fn new(kind: ReferenceKind, entries: Vec<ReferenceEntry>) -> Self {
        let mut entries: Vec<(String, InternalId)> = entries
            .into_iter()
            .map(|e| (kind.normalize_key(&e.key), e.id))
            .collect();
        entries.sort_by(|a, b| compare_ids(&a.1, &b.1));

        let mut index = HashMap::with_capacity(entries.len());
        for (key, id) in &entries {
            index.entry(key.clone()).or_insert_with(|| id.clone());
        }

        Self { kind, entries, index }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Exact lookup; `raw` is normalized first.
    pub fn lookup(&self, raw: &str) -> Option<&InternalId> {
        self.index.get(&self.kind.normalize_key(raw))
    }

    /// `(normalized key, id)` pairs in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &InternalId)> {
        self.entries.iter().map(|(k, id)| (k.as_str(), id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compare_ids(a: &InternalId, b: &InternalId) -> Ordering {
    match (a.as_str().parse::<i64>(), b.as_str().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.as_str().cmp(b.as_str()),
    }
}

/// All reference data for a run. Loaded once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    pub languages: ReferenceMap,
    pub roles: ReferenceMap,
    pub conditions: ReferenceMap,
    pub bindings: ReferenceMap,
}

impl ReferenceCatalog {
    pub fn load<S: Store + ?Sized>(store: &mut S) -> Result<Self, MigrateError> {
        let mut load_kind = |kind: ReferenceKind| -> Result<ReferenceMap, MigrateError> {
            let entries = store
                .reference_entries(kind)
                .map_err(|source| MigrateError::ReferenceLoad { kind, source })?;
            let map = ReferenceMap::new(kind, entries);
            log::info!("loaded {} {kind} reference entries", map.len());
            if map.is_empty() {
                log::warn!("{kind} reference table is empty; every {kind} will be dropped");
            }
            Ok(map)
        };

        Ok(Self {
            languages: load_kind(ReferenceKind::Language)?,
            roles: load_kind(ReferenceKind::Role)?,
            conditions: load_kind(ReferenceKind::Condition)?,
            bindings: load_kind(ReferenceKind::Binding)?,
        })
    }

    pub fn get(&self, kind: ReferenceKind) -> &ReferenceMap {
        match kind {
            ReferenceKind::Language => &self.languages,
            ReferenceKind::Role => &self.roles,
            ReferenceKind::Condition => &self.conditions,
            ReferenceKind::Binding => &self.bindings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[test]
    fn names_are_case_insensitive_codes_are_not() {
        let langs = ReferenceMap::new(
            ReferenceKind::Language,
            vec![ReferenceEntry::new("1", "English"), ReferenceEntry::new("2", " French ")],
        );
        assert_eq!(langs.lookup("ENGLISH ").map(|id| id.as_str()), Some("1"));
        assert_eq!(langs.lookup("french").map(|id| id.as_str()), Some("2"));

        let roles = ReferenceMap::new(ReferenceKind::Role, vec![ReferenceEntry::new("9", "aut")]);
        assert!(roles.lookup("aut").is_some());
        assert!(roles.lookup("AUT").is_none());
    }

    #[test]
    fn entries_sorted_by_numeric_id() {
        let map = ReferenceMap::new(
            ReferenceKind::Condition,
            vec![
                ReferenceEntry::new("10", "fine"),
                ReferenceEntry::new("2", "good"),
                ReferenceEntry::new("1", "worn"),
            ],
        );
        let ids: Vec<&str> = map.entries().map(|(_, id)| id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn duplicate_names_resolve_to_lowest_id() {
        let map = ReferenceMap::new(
            ReferenceKind::Binding,
            vec![ReferenceEntry::new("7", "Cloth"), ReferenceEntry::new("3", "cloth")],
        );
        assert_eq!(map.lookup("cloth").map(|id| id.as_str()), Some("3"));
    }

    #[test]
    fn load_failure_is_fatal() {
        let mut store = MemoryStore::seeded();
        store.fail_reference_load = true;
        let err = ReferenceCatalog::load(&mut store).unwrap_err();
        assert!(matches!(err, MigrateError::ReferenceLoad { kind: ReferenceKind::Language, .. }));
    }

    #[test]
    fn load_builds_all_four_maps() {
        let mut store = MemoryStore::seeded();
        let catalog = ReferenceCatalog::load(&mut store).unwrap();
        assert!(!catalog.get(ReferenceKind::Language).is_empty());
        assert!(catalog.roles.lookup("aut").is_some());
        assert!(catalog.conditions.lookup("worn").is_some());
        assert!(catalog.bindings.lookup("hardcover").is_some());
    }
}
