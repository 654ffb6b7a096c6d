use crate::model::InternalId;
use crate::reference::ReferenceMap;
use crate::vocabulary::{normalize_label, AliasTable};

/// How far to go when the exact label is not in the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Closed vocabularies (languages): exact name only.
    Exact,
    /// Free-text descriptions (conditions, bindings): fall back to
    /// bidirectional substring containment.
    Containment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No label to resolve.
    Blank,
    Matched(InternalId),
    /// An alias entry says this label has no single mapping.
    IntentionallyUnmapped,
    Unmatched,
}

impl Resolution {
    pub fn id(self) -> Option<InternalId> {
        match self {
            Self::Matched(id) => Some(id),
            _ => None,
        }
    }
}

/// Resolve a free-text label to a reference id, or `None`.
pub fn resolve(
    raw_label: Option<&str>,
    reference: &ReferenceMap,
    aliases: &AliasTable,
    mode: MatchMode,
) -> Option<InternalId> {
    resolve_detailed(raw_label, reference, aliases, mode).id()
}

/// Order: alias table, exact name, then (containment mode only) the first
/// entry in ascending id order whose name contains the label or is
/// contained in it.
pub fn resolve_detailed(
    raw_label: Option<&str>,
    reference: &ReferenceMap,
    aliases: &AliasTable,
    mode: MatchMode,
) -> Resolution {
    let label = match raw_label.map(normalize_label) {
        Some(l) if !l.is_empty() => l,
        _ => return Resolution::Blank,
    };

    if let Some(target) = aliases.get(&label) {
        return match target {
            Some(name) => reference
                .lookup(name)
                .cloned()
                .map_or(Resolution::Unmatched, Resolution::Matched),
            None => Resolution::IntentionallyUnmapped,
        };
    }

    if let Some(id) = reference.lookup(&label) {
        return Resolution::Matched(id.clone());
    }

    if mode == MatchMode::Containment {
        let hit = reference
            .entries()
            .filter(|(name, _)| !name.is_empty())
            .find(|(name, _)| label.contains(name) || name.contains(label.as_str()));
        if let Some((_, id)) = hit {
            return Resolution::Matched(id.clone());
        }
    }

    Resolution::Unmatched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferenceEntry, ReferenceKind};

    fn conditions() -> ReferenceMap {
        ReferenceMap::new(
            ReferenceKind::Condition,
            vec![
                ReferenceEntry::new("3", "Very Good"),
                ReferenceEntry::new("1", "Worn"),
                ReferenceEntry::new("2", "Good"),
                ReferenceEntry::new("4", "Fine"),
            ],
        )
    }

    fn languages() -> ReferenceMap {
        ReferenceMap::new(
            ReferenceKind::Language,
            vec![
                ReferenceEntry::new("10", "Dutch"),
                ReferenceEntry::new("11", "Spanish"),
                ReferenceEntry::new("12", "English"),
            ],
        )
    }

    #[test]
    fn containment_resolves_slightly_worn() {
        let id = resolve(Some("slightly worn"), &conditions(), &AliasTable::new(), MatchMode::Containment);
        assert_eq!(id.unwrap().as_str(), "1");
    }

    #[test]
    fn containment_first_match_follows_id_order() {
        // "very good" contains "good" (id 2) and equals "very good" (id 3);
        // exact wins. "good copy, very good spine" hits "good" first by id.
        let refs = conditions();
        let aliases = AliasTable::new();
        let exact = resolve(Some("Very Good"), &refs, &aliases, MatchMode::Containment);
        assert_eq!(exact.unwrap().as_str(), "3");
        let fuzzy = resolve(Some("good copy, very good spine"), &refs, &aliases, MatchMode::Containment);
        assert_eq!(fuzzy.unwrap().as_str(), "2");
    }

    #[test]
    fn label_contained_in_name() {
        let id = resolve(Some("ne"), &conditions(), &AliasTable::new(), MatchMode::Containment);
        assert_eq!(id.unwrap().as_str(), "4");
    }

    #[test]
    fn exact_mode_skips_containment() {
        let r = resolve_detailed(Some("slightly worn"), &conditions(), &AliasTable::new(), MatchMode::Exact);
        assert_eq!(r, Resolution::Unmatched);
    }

    #[test]
    fn aliases_take_precedence() {
        let aliases: AliasTable = [
            ("español", Some("spanish")),
            ("dutch & french", Some("dutch")),
            ("multiple languages", None),
            ("old norse", Some("norse")),
        ]
        .into_iter()
        .collect();
        let refs = languages();
        assert_eq!(resolve(Some(" Español "), &refs, &aliases, MatchMode::Exact).unwrap().as_str(), "11");
        assert_eq!(resolve(Some("Dutch & French"), &refs, &aliases, MatchMode::Exact).unwrap().as_str(), "10");
        assert_eq!(
            resolve_detailed(Some("Multiple languages"), &refs, &aliases, MatchMode::Exact),
            Resolution::IntentionallyUnmapped
        );
        // alias pointing at a name the store does not have
        assert_eq!(resolve_detailed(Some("Old Norse"), &refs, &aliases, MatchMode::Exact), Resolution::Unmatched);
    }

    #[test]
    fn blank_labels() {
        let refs = languages();
        let aliases = AliasTable::new();
        assert_eq!(resolve_detailed(None, &refs, &aliases, MatchMode::Exact), Resolution::Blank);
        assert_eq!(resolve_detailed(Some("  "), &refs, &aliases, MatchMode::Containment), Resolution::Blank);
    }

    #[test]
    fn empty_reference_names_never_match() {
        let refs = ReferenceMap::new(
            ReferenceKind::Binding,
            vec![ReferenceEntry::new("1", ""), ReferenceEntry::new("2", "Cloth")],
        );
        let id = resolve(Some("publisher's cloth"), &refs, &AliasTable::new(), MatchMode::Containment);
        assert_eq!(id.unwrap().as_str(), "2");
    }

    #[test]
    fn repeated_calls_agree() {
        let refs = conditions();
        let aliases = AliasTable::new();
        let labels = ["slightly worn", "good+", "mint", "", "FINE copy"];
        for label in labels {
            let first = resolve_detailed(Some(label), &refs, &aliases, MatchMode::Containment);
            for _ in 0..5 {
                assert_eq!(resolve_detailed(Some(label), &refs, &aliases, MatchMode::Containment), first);
            }
        }
    }
}
