// Format dispatch for legacy exports

use std::path::Path;

use shelvd_migrate::config::SourcesConfig;
use shelvd_migrate::{ExternalRecord, SourceData};

/// Read one export, choosing the reader from the file extension.
pub fn read_source(path: &Path) -> Result<Vec<ExternalRecord>, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let records = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => crate::xlsx::read(path)?,
        "tsv" | "tab" => crate::csv::read_tsv(path)?,
        "csv" | "txt" => crate::csv::read(path)?,
        other => {
            return Err(format!(
                "{}: unsupported source format '{other}' (expected xlsx, xls, xlsb, ods, csv or tsv)",
                path.display()
            ))
        }
    };

    log::info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Read the three exports named by `sources`, resolving relative paths
/// against `base_dir`.
pub fn read_sources(sources: &SourcesConfig, base_dir: &Path) -> Result<SourceData, String> {
    let read = |relative: &str| {
        let path = base_dir.join(relative);
        read_source(&path).map_err(|e| format!("cannot read {}: {e}", path.display()))
    };

    Ok(SourceData {
        contributors: read(&sources.contributors)?,
        books: read(&sources.books)?,
        book_contributors: read(&sources.book_contributors)?,
    })
}
