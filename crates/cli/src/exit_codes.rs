//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success                                                    |
//! | 1    | General error (unspecified)                                |
//! | 2    | CLI usage error (bad args, missing config file)            |
//! | 3    | Invalid config (parse or validation)                       |
//! | 4    | A source export could not be read                          |
//! | 5    | Fatal store error (unreachable, reference data, no owner)  |
//! | 6    | A batch failed; earlier batches are committed, re-run      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `migrate_exit_code` or the command's error handling

use shelvd_migrate::MigrateError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable config path.
pub const EXIT_USAGE: u8 = 2;

/// Config did not parse or failed validation.
pub const EXIT_CONFIG: u8 = 3;

/// A source export is missing, unreadable, or in an unsupported format.
pub const EXIT_SOURCE: u8 = 4;

/// The destination could not be used: cannot open, reference tables
/// unreadable, no owning user. Nothing was imported.
pub const EXIT_STORE: u8 = 5;

/// A batch was rejected mid-import. Committed batches stand; re-running
/// resumes where the run stopped.
pub const EXIT_BATCH: u8 = 6;

/// Map an engine error to its exit code.
pub fn migrate_exit_code(err: &MigrateError) -> u8 {
    match err {
        MigrateError::ConfigParse(_) | MigrateError::ConfigValidation(_) => EXIT_CONFIG,
        MigrateError::Store(_)
        | MigrateError::ReferenceLoad { .. }
        | MigrateError::NoOwner
        | MigrateError::UnknownOwner(_) => EXIT_STORE,
        MigrateError::Batch { .. } => EXIT_BATCH,
        MigrateError::IdentityConflict { .. } => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelvd_migrate::model::EntityType;
    use shelvd_migrate::StoreError;

    #[test]
    fn engine_errors_map_to_codes() {
        assert_eq!(migrate_exit_code(&MigrateError::ConfigValidation("x".into())), EXIT_CONFIG);
        assert_eq!(migrate_exit_code(&MigrateError::NoOwner), EXIT_STORE);
        let batch = MigrateError::Batch {
            entity: EntityType::Book,
            batch_index: 3,
            committed_batches: 3,
            source: StoreError::new("disk full"),
        };
        assert_eq!(migrate_exit_code(&batch), EXIT_BATCH);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_CONFIG, EXIT_SOURCE, EXIT_STORE, EXIT_BATCH];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
