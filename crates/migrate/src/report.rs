use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::identity::IdentityMode;
use crate::model::{EntityType, OwnerId};
use crate::store::StoreTotals;
use crate::upsert::UpsertOutcome;

// ---------------------------------------------------------------------------
// Soft failures
// ---------------------------------------------------------------------------

/// Expected, per-row problems. Counted and reported, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftFailure {
    // Entity rows (row dropped)
    MissingLegacyKey,
    MissingName,
    DuplicateLegacyKey,

    // Categorical fields (field dropped, row kept)
    UnmatchedLanguage,
    UnmatchedOriginalLanguage,
    UnmatchedCondition,
    UnmatchedBinding,
    IntentionallyUnmapped,

    // Linking rows (relationship dropped)
    MissingLinkKey,
    MissingRole,
    UnmappedRole,
    UnknownRoleCode,
    UnknownBook,
    UnknownContributor,
}

impl SoftFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingLegacyKey => "missing_legacy_key",
            Self::MissingName => "missing_name",
            Self::DuplicateLegacyKey => "duplicate_legacy_key",
            Self::UnmatchedLanguage => "unmatched_language",
            Self::UnmatchedOriginalLanguage => "unmatched_original_language",
            Self::UnmatchedCondition => "unmatched_condition",
            Self::UnmatchedBinding => "unmatched_binding",
            Self::IntentionallyUnmapped => "intentionally_unmapped",
            Self::MissingLinkKey => "missing_link_key",
            Self::MissingRole => "missing_role",
            Self::UnmappedRole => "unmapped_role",
            Self::UnknownRoleCode => "unknown_role_code",
            Self::UnknownBook => "unknown_book",
            Self::UnknownContributor => "unknown_contributor",
        }
    }
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind counters, ordered for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SoftFailureCounts {
    counts: BTreeMap<SoftFailure, usize>,
}

impl SoftFailureCounts {
    pub fn record(&mut self, failure: SoftFailure) {
        *self.counts.entry(failure).or_insert(0) += 1;
    }

    pub fn get(&self, failure: SoftFailure) -> usize {
        self.counts.get(&failure).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SoftFailure, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }

    pub fn log_summary(&self, entity: EntityType) {
        for (failure, count) in self.iter() {
            log::warn!("{entity}: {count} x {failure}");
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EntityReport {
    pub entity: EntityType,
    pub mode: IdentityMode,
    pub source_rows: usize,
    /// Rows whose legacy key was already committed by an earlier run.
    pub already_imported: usize,
    pub attempted: usize,
    pub inserted: usize,
    pub conflicts_skipped: usize,
    pub batches: usize,
    pub soft_failures: SoftFailureCounts,
}

impl EntityReport {
    pub fn new(
        entity: EntityType,
        mode: IdentityMode,
        source_rows: usize,
        already_imported: usize,
        outcome: UpsertOutcome,
        soft_failures: SoftFailureCounts,
    ) -> Self {
        Self {
            entity,
            mode,
            source_rows,
            already_imported,
            attempted: outcome.attempted,
            inserted: outcome.inserted,
            conflicts_skipped: outcome.conflicts_skipped(),
            batches: outcome.batches,
            soft_failures,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub source_rows: usize,
    pub resolved: usize,
    pub skipped: usize,
    pub inserted: usize,
    pub conflicts_skipped: usize,
    pub batches: usize,
    pub soft_failures: SoftFailureCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub name: String,
    pub engine_version: String,
    pub run_at: String,
    pub owner: OwnerId,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub meta: RunMeta,
    pub contributors: EntityReport,
    pub books: EntityReport,
    pub links: LinkReport,
    /// Rows owned by the importing user after the run.
    pub totals: StoreTotals,
}

impl MigrationReport {
    pub fn inserted(&self) -> usize {
        self.contributors.inserted + self.books.inserted + self.links.inserted
    }

    pub fn soft_failures(&self) -> usize {
        self.contributors.soft_failures.total()
            + self.books.soft_failures.total()
            + self.links.soft_failures.total()
    }
}
