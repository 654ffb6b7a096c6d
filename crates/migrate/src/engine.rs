use crate::columns;
use crate::config::MigrateConfig;
use crate::entities::{build_book, build_contributor, BuildContext};
use crate::error::MigrateError;
use crate::identity::{IdentityRegistry, Origin};
use crate::model::{EntityType, ExternalRecord, InternalId, LegacyKey, OwnerId};
use crate::reference::ReferenceCatalog;
use crate::relations::RelationshipResolver;
use crate::report::{EntityReport, LinkReport, MigrationReport, RunMeta, SoftFailure, SoftFailureCounts};
use crate::store::Store;
use crate::upsert::{BatchUpserter, Persist};
use crate::vocabulary::Vocabulary;

/// The three legacy exports, already read into records.
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub books: Vec<ExternalRecord>,
    pub contributors: Vec<ExternalRecord>,
    pub book_contributors: Vec<ExternalRecord>,
}

/// Run the migration: contributors, then books, then the links between
/// them. Safe to re-run against the same store; rows committed by an
/// earlier (possibly interrupted) run are not imported twice.
pub fn run<S: Store + ?Sized>(
    config: &MigrateConfig,
    sources: &SourceData,
    store: &mut S,
) -> Result<MigrationReport, MigrateError> {
    let owner = resolve_owner(config, store)?;
    log::info!("importing as user {owner}");

    let catalog = ReferenceCatalog::load(store)?;
    let vocabulary = Vocabulary::from_config(config);
    let upserter = BatchUpserter::new(config.import.batch_size);
    let mut registry = IdentityRegistry::new();

    let ctx = BuildContext {
        owner: &owner,
        catalog: &catalog,
        vocabulary: &vocabulary,
        default_size_unit: &config.import.default_size_unit,
    };

    let contributors = import_entities(
        store,
        &mut registry,
        &upserter,
        &owner,
        &sources.contributors,
        columns::contributor::KEY,
        |record, key, id, failures| match build_contributor(record, key, id, &ctx) {
            Ok(contributor) => Some(contributor),
            Err(failure) => {
                log::debug!("contributor row {}: {failure}", record.row());
                failures.record(failure);
                None
            }
        },
    )?;

    let books = import_entities(
        store,
        &mut registry,
        &upserter,
        &owner,
        &sources.books,
        columns::book::KEY,
        |record, key, id, failures| Some(build_book(record, key, id, &ctx, failures)),
    )?;

    let links = import_links(store, &registry, &upserter, &vocabulary, &catalog, &sources.book_contributors)?;

    let totals = store.totals(&owner)?;
    log::info!(
        "done: {} books, {} contributors, {} links owned by {owner}",
        totals.books,
        totals.contributors,
        totals.book_contributors
    );

    Ok(MigrationReport {
        meta: RunMeta {
            name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            owner,
            batch_size: upserter.batch_size(),
        },
        contributors,
        books,
        links,
        totals,
    })
}

fn resolve_owner<S: Store + ?Sized>(config: &MigrateConfig, store: &mut S) -> Result<OwnerId, MigrateError> {
    let requested = config.store.owner.as_deref();
    match store.resolve_owner(requested)? {
        Some(owner) => Ok(owner),
        None => match requested {
            Some(id) => Err(MigrateError::UnknownOwner(id.to_string())),
            None => Err(MigrateError::NoOwner),
        },
    }
}

/// Map, build and upsert one entity type.
///
/// Rows whose key an earlier run already committed are skipped; every other
/// keyed row gets a fresh id, registered before the upsert so the link
/// phase can see it.
fn import_entities<S, T, F>(
    store: &mut S,
    registry: &mut IdentityRegistry,
    upserter: &BatchUpserter,
    owner: &OwnerId,
    rows: &[ExternalRecord],
    key_column: &str,
    mut build: F,
) -> Result<EntityReport, MigrateError>
where
    S: Store + ?Sized,
    T: Persist,
    F: FnMut(&ExternalRecord, LegacyKey, InternalId, &mut SoftFailureCounts) -> Option<T>,
{
    let entity = T::ENTITY;
    log::info!("{entity}: {} source rows", rows.len());
    let mode = registry.prepare(store, entity, owner)?;

    let mut failures = SoftFailureCounts::default();
    let mut already_imported = 0;
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(key) = row.legacy_key(key_column) else {
            log::debug!("{entity} row {}: no legacy key", row.row());
            failures.record(SoftFailure::MissingLegacyKey);
            continue;
        };

        match registry.lookup(entity, &key) {
            Some((_, Origin::Reloaded)) => {
                already_imported += 1;
                continue;
            }
            Some((_, Origin::Minted)) => {
                log::debug!("{entity} row {}: legacy key '{key}' repeated", row.row());
                failures.record(SoftFailure::DuplicateLegacyKey);
                continue;
            }
            None => {}
        }

        let id = InternalId::mint();
        if let Some(record) = build(row, key.clone(), id.clone(), &mut failures) {
            registry.register(entity, key, id)?;
            records.push(record);
        }
    }

    if already_imported > 0 {
        log::info!("{entity}: {already_imported} rows already imported by an earlier run");
    }

    let outcome = upserter.upsert(store, &records)?;
    failures.log_summary(entity);
    log::info!(
        "{entity}: {} inserted, {} conflicts skipped, {} soft failures",
        outcome.inserted,
        outcome.conflicts_skipped(),
        failures.total()
    );

    Ok(EntityReport::new(entity, mode, rows.len(), already_imported, outcome, failures))
}

fn import_links<S: Store + ?Sized>(
    store: &mut S,
    registry: &IdentityRegistry,
    upserter: &BatchUpserter,
    vocabulary: &Vocabulary,
    catalog: &ReferenceCatalog,
    rows: &[ExternalRecord],
) -> Result<LinkReport, MigrateError> {
    let entity = EntityType::BookContributor;
    log::info!("{entity}: {} source rows", rows.len());

    let resolver = RelationshipResolver::new(registry, &vocabulary.roles, &catalog.roles);
    let (links, failures) = resolver.resolve(rows);
    let outcome = upserter.upsert(store, &links)?;

    failures.log_summary(entity);
    log::info!(
        "{entity}: {} resolved, {} inserted, {} conflicts skipped, {} skipped",
        links.len(),
        outcome.inserted,
        outcome.conflicts_skipped(),
        failures.total()
    );

    Ok(LinkReport {
        source_rows: rows.len(),
        resolved: links.len(),
        skipped: failures.total(),
        inserted: outcome.inserted,
        conflicts_skipped: outcome.conflicts_skipped(),
        batches: outcome.batches,
        soft_failures: failures,
    })
}
