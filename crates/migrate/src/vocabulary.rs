//! Static translation tables from legacy labels to destination vocabulary.
//!
//! Defaults reproduce the labels seen in the FileMaker export; the run
//! config can extend or override any of them.

use std::collections::HashMap;

use crate::config::MigrateConfig;
use crate::model::BookStatus;

/// Known synonyms for a categorical label.
///
/// A target of `None` marks a label that is deliberately left unmapped
/// (multi-valued or unclassifiable), as opposed to one nobody thought of.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, Option<String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, target: Option<&str>) {
        self.entries.insert(normalize_label(label), target.map(str::to_string));
    }

    /// `Some(target)` when the label has an alias entry.
    pub fn get(&self, label: &str) -> Option<Option<&str>> {
        self.entries.get(&normalize_label(label)).map(|t| t.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, Option<&'a str>)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, Option<&'a str>)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (label, target) in iter {
            table.insert(label, target);
        }
        table
    }
}

pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

const LANGUAGE_ALIASES: &[(&str, Option<&str>)] = &[
    ("dutch", Some("dutch")),
    ("english", Some("english")),
    ("french", Some("french")),
    ("german", Some("german")),
    ("italian", Some("italian")),
    ("spanish", Some("spanish")),
    ("español", Some("spanish")),
    ("latin", Some("latin")),
    ("norwegian", Some("norwegian")),
    ("esperanto", Some("esperanto")),
    ("limba română", Some("romanian")),
    ("flimba română", Some("romanian")),
    ("romanian", Some("romanian")),
    // Compound labels keep only the primary language.
    ("dutch & french", Some("dutch")),
    ("german & english", Some("german")),
    ("multiple languages", None),
];

const ROLE_CODES: &[(&str, &str)] = &[
    ("Author", "aut"),
    ("Co-Author", "aut"),
    ("Lead Author", "aut"),
    ("Translator", "trl"),
    ("Illustrator", "ill"),
    ("Editor", "edt"),
    ("Photographer", "pht"),
    ("Cover Artist", "cov"),
    ("Artist", "art"),
    ("Forward", "wpr"),
    ("Compilor", "com"),
    ("Pseudonym of", "oth"),
];

const STATUSES: &[(&str, BookStatus)] = &[
    ("Unk.", BookStatus::InCollection),
    ("On Sale", BookStatus::ForSale),
    ("Sold", BookStatus::Sold),
    ("Pending", BookStatus::InCollection),
    ("Lost", BookStatus::Lost),
    ("To Do", BookStatus::InCollection),
    ("In Collection", BookStatus::InCollection),
];

/// Legacy role label → destination role code. Labels match exactly after
/// trimming, the way the export spells them.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    codes: HashMap<String, String>,
}

impl RoleTable {
    pub fn insert(&mut self, label: &str, code: &str) {
        self.codes.insert(label.trim().to_string(), code.trim().to_string());
    }

    pub fn code_for(&self, label: &str) -> Option<&str> {
        self.codes.get(label.trim()).map(String::as_str)
    }
}

/// Legacy status label → [`BookStatus`]; unknown labels fall back to
/// `in_collection`.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    statuses: HashMap<String, BookStatus>,
}

impl StatusTable {
    pub fn insert(&mut self, label: &str, status: BookStatus) {
        self.statuses.insert(label.trim().to_string(), status);
    }

    pub fn status_for(&self, label: Option<&str>) -> BookStatus {
        label
            .and_then(|l| self.statuses.get(l.trim()))
            .copied()
            .unwrap_or(BookStatus::InCollection)
    }
}

/// Every translation table a run needs, owned by the run.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub language_aliases: AliasTable,
    pub condition_aliases: AliasTable,
    pub binding_aliases: AliasTable,
    pub roles: RoleTable,
    pub statuses: StatusTable,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let mut roles = RoleTable::default();
        for (label, code) in ROLE_CODES {
            roles.insert(label, code);
        }
        let mut statuses = StatusTable::default();
        for (label, status) in STATUSES {
            statuses.insert(label, *status);
        }
        Self {
            language_aliases: LANGUAGE_ALIASES.iter().copied().collect(),
            condition_aliases: AliasTable::new(),
            binding_aliases: AliasTable::new(),
            roles,
            statuses,
        }
    }
}

impl Vocabulary {
    /// Built-in tables with the config's entries layered on top. An empty
    /// alias target in the config means "leave unmapped".
    pub fn from_config(config: &MigrateConfig) -> Self {
        let mut vocab = Self::default();
        let layer = |table: &mut AliasTable, entries: &HashMap<String, String>| {
            for (label, target) in entries {
                let target = target.trim();
                table.insert(label, (!target.is_empty()).then_some(target));
            }
        };
        layer(&mut vocab.language_aliases, &config.aliases.language);
        layer(&mut vocab.condition_aliases, &config.aliases.condition);
        layer(&mut vocab.binding_aliases, &config.aliases.binding);
        for (label, code) in &config.roles {
            vocab.roles.insert(label, code);
        }
        for (label, status) in &config.statuses {
            vocab.statuses.insert(label, *status);
        }
        vocab
    }
}
