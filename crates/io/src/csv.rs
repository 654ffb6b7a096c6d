// CSV/TSV source reading

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use shelvd_migrate::{ExternalRecord, RawValue};

pub fn read(path: &Path) -> Result<Vec<ExternalRecord>, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    read_from_string(&content, delimiter)
}

pub fn read_tsv(path: &Path) -> Result<Vec<ExternalRecord>, String> {
    let content = read_file_as_utf8(path)?;
    read_from_string(&content, b'\t')
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header's field count, weighted by that count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (FileMaker exports on Windows are cp1252)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| format!("{}: {e}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{}: not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}

/// First record is the header. Rows with no non-blank field are skipped.
pub fn read_from_string(content: &str, delimiter: u8) -> Result<Vec<ExternalRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = reader.records();
    let header: Vec<String> = match rows.next() {
        Some(record) => record
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for (idx, result) in rows.enumerate() {
        let record = result.map_err(|e| format!("row {}: {e}", idx + 1))?;
        let fields: HashMap<&str, RawValue> = header
            .iter()
            .zip(record.iter())
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, field)| (name.as_str(), parse_field(field)))
            .collect();

        if fields.values().all(RawValue::is_blank) {
            continue;
        }
        records.push(ExternalRecord::new(idx + 1, fields));
    }

    Ok(records)
}

/// Text stays text (the normalizer parses numbers); ISO dates become dates.
fn parse_field(field: &str) -> RawValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return RawValue::Empty;
    }
    match parse_iso_date(trimmed) {
        Some(dt) => RawValue::Date(dt),
        None => RawValue::Text(field.to_string()),
    }
}

pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)
}
