//! `shelvd-migrate` — Legacy catalog reconciliation engine.
//!
//! Pure engine crate: receives pre-read source records, talks to the
//! destination through the [`Store`] trait, returns a run report.
//! No file-format or database dependencies.

pub mod columns;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod identity;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod reference;
pub mod relations;
pub mod report;
pub mod store;
pub mod upsert;
pub mod vocabulary;

#[cfg(test)]
mod testing;

pub use config::MigrateConfig;
pub use engine::{run, SourceData};
pub use error::{MigrateError, StoreError};
pub use model::{ExternalRecord, InternalId, LegacyKey, OwnerId, RawValue};
pub use report::MigrationReport;
pub use store::Store;
