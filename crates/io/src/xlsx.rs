// Excel source reading (xlsx, xls, xlsb, ods)

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use shelvd_migrate::{ExternalRecord, RawValue};

use crate::csv::parse_iso_date;

/// Largest serial Excel accepts (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Read the first sheet. The first row is the header; rows with no
/// non-blank cell are skipped.
pub fn read(path: &Path) -> Result<Vec<ExternalRecord>, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(sheet_name) = sheet_names.first() else {
        return Err("Excel file contains no sheets".to_string());
    };
    if sheet_names.len() > 1 {
        log::warn!(
            "{}: {} sheets, reading only '{sheet_name}'",
            path.display(),
            sheet_names.len()
        );
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(header_label).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let fields: HashMap<&str, RawValue> = header
            .iter()
            .zip(row.iter())
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, cell)| (name.as_str(), cell_value(cell)))
            .collect();

        if fields.values().all(RawValue::is_blank) {
            continue;
        }
        records.push(ExternalRecord::new(idx + 1, fields));
    }

    log::debug!("{}: {} records from '{sheet_name}'", path.display(), records.len());
    Ok(records)
}

fn header_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(n) => RawValue::Float(*n),
        Data::Int(n) => RawValue::Int(*n),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::Error(e) => {
            log::debug!("cell error {e:?} read as empty");
            RawValue::Empty
        }
        // calamine does not expose the 1904 flag; the 1900 system is assumed
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_datetime(serial).map_or(RawValue::Float(serial), RawValue::Date)
        }
        Data::DateTimeIso(s) => parse_iso_date(s).map_or_else(|| RawValue::Text(s.clone()), RawValue::Date),
        Data::DurationIso(s) => RawValue::Text(s.clone()),
    }
}

/// Excel 1900-system serial to a date-time. Exact from serial 61
/// (1900-03-01) on; earlier serials land a day early because of Excel's
/// phantom 1900-02-29.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}
