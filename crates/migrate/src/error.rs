use std::fmt;

use crate::model::{EntityType, LegacyKey};
use crate::reference::ReferenceKind;

/// Failure reported by a [`crate::Store`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug)]
pub enum MigrateError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (zero batch size, blank source path, etc.).
    ConfigValidation(String),
    /// Destination store failed outside of a batch (unreachable, bad query).
    Store(StoreError),
    /// A reference table could not be loaded. Fatal: nothing can be matched.
    ReferenceLoad { kind: ReferenceKind, source: StoreError },
    /// No user exists to attribute imported rows to.
    NoOwner,
    /// The configured owner id does not exist in the store.
    UnknownOwner(String),
    /// A legacy key was bound twice for the same entity type.
    IdentityConflict { entity: EntityType, key: LegacyKey },
    /// The store rejected a batch. Batches before `batch_index` are committed.
    Batch {
        entity: EntityType,
        batch_index: usize,
        committed_batches: usize,
        source: StoreError,
    },
}

impl fmt::Display for MigrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Store(err) => write!(f, "store error: {err}"),
            Self::ReferenceLoad { kind, source } => {
                write!(f, "cannot load {kind} reference data: {source}")
            }
            Self::NoOwner => write!(f, "no user found to own imported records"),
            Self::UnknownOwner(id) => write!(f, "configured owner '{id}' does not exist"),
            Self::IdentityConflict { entity, key } => {
                write!(f, "{entity} legacy key '{key}' is already mapped")
            }
            Self::Batch { entity, batch_index, committed_batches, source } => write!(
                f,
                "{entity} batch {batch_index} failed ({committed_batches} batch(es) committed before it): {source}"
            ),
        }
    }
}

impl std::error::Error for MigrateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::ReferenceLoad { source, .. } | Self::Batch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for MigrateError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
