//! `shelvd-import run|validate|init`: config-driven legacy catalog import.

use std::path::{Path, PathBuf};

use shelvd_io::SqliteStore;
use shelvd_migrate::identity::IdentityMode;
use shelvd_migrate::report::{EntityReport, SoftFailureCounts};
use shelvd_migrate::{MigrateConfig, MigrationReport};

use crate::exit_codes::{EXIT_ERROR, EXIT_SOURCE, EXIT_STORE, EXIT_USAGE};
use crate::CliError;

fn read_config(config_path: &Path) -> Result<MigrateConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::new(EXIT_USAGE, format!("cannot read config {}: {e}", config_path.display()))
    })?;
    MigrateConfig::from_toml(&config_str).map_err(CliError::migrate)
}

/// Source and store paths in the config are relative to the config file.
fn base_dir(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

pub fn cmd_run(config_path: PathBuf, json_output: bool, output_file: Option<PathBuf>) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let base_dir = base_dir(&config_path);

    let db_path = base_dir.join(&config.store.path);
    if !db_path.exists() {
        return Err(CliError::new(EXIT_STORE, format!("database {} does not exist", db_path.display()))
            .with_hint(format!("create it with `shelvd-import init {}`", db_path.display())));
    }

    let sources = shelvd_io::read_sources(&config.sources, base_dir).map_err(|e| CliError::new(EXIT_SOURCE, e))?;
    let mut store = SqliteStore::open(&db_path).map_err(|e| CliError::new(EXIT_STORE, e.to_string()))?;

    log::info!("running '{}' against {}", config.name, db_path.display());
    let report = shelvd_migrate::run(&config, &sources, &mut store).map_err(CliError::migrate)?;

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &MigrationReport) {
    eprintln!("{} ({} as {})", report.meta.name, report.meta.run_at, report.meta.owner);
    print_entity("contributors", &report.contributors);
    print_entity("books", &report.books);

    let links = &report.links;
    eprintln!(
        "links: {} rows, {} inserted, {} already present, {} unresolved",
        links.source_rows, links.inserted, links.conflicts_skipped, links.skipped,
    );
    print_failures(&links.soft_failures);

    let t = &report.totals;
    eprintln!(
        "store now holds {} books, {} contributors, {} links for this user",
        t.books, t.contributors, t.book_contributors,
    );
}

fn print_entity(label: &str, r: &EntityReport) {
    let mode = match r.mode {
        IdentityMode::Fresh => "fresh",
        IdentityMode::Resume => "resume",
    };
    eprintln!(
        "{label} ({mode}): {} rows, {} inserted, {} already imported, {} conflicts skipped",
        r.source_rows, r.inserted, r.already_imported, r.conflicts_skipped,
    );
    print_failures(&r.soft_failures);
}

fn print_failures(failures: &SoftFailureCounts) {
    for (kind, count) in failures.iter() {
        eprintln!("  {kind}: {count}");
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let base_dir = base_dir(&config_path);

    eprintln!(
        "valid: '{}' (batch size {}, default size unit {})",
        config.name, config.import.batch_size, config.import.default_size_unit,
    );
    for (label, path) in [
        ("books", &config.sources.books),
        ("contributors", &config.sources.contributors),
        ("book_contributors", &config.sources.book_contributors),
    ] {
        let resolved = base_dir.join(path);
        let status = if resolved.exists() { "" } else { " (missing)" };
        eprintln!("  {label}: {}{status}", resolved.display());
    }
    Ok(())
}

pub fn cmd_init(db_path: PathBuf) -> Result<(), CliError> {
    let store = SqliteStore::open(&db_path).map_err(|e| CliError::new(EXIT_STORE, e.to_string()))?;
    store.init_schema().map_err(|e| CliError::new(EXIT_STORE, e.to_string()))?;
    eprintln!("initialized {}", db_path.display());
    eprintln!("populate users, languages, contributor_roles, conditions and bindings before importing");
    Ok(())
}
