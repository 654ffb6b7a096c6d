use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Source side
// ---------------------------------------------------------------------------

/// An untyped cell value as produced by a source reader.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A value the reader knows to be a date (workbook date cell, ISO text).
    Date(NaiveDateTime),
}

impl RawValue {
    /// True for `Empty` and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A single row from a legacy export, keyed by column label.
///
/// Built once by the reader and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ExternalRecord {
    row: usize,
    fields: HashMap<String, RawValue>,
}

impl ExternalRecord {
    pub fn new<K, I>(row: usize, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        Self {
            row,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// 1-based row number in the source (header excluded).
    pub fn row(&self) -> usize {
        self.row
    }

    /// Field value, or `None` when the column is missing or blank.
    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.fields.get(column).filter(|v| !v.is_blank())
    }

    pub fn legacy_key(&self, column: &str) -> Option<LegacyKey> {
        self.get(column).and_then(LegacyKey::from_raw)
    }
}

/// Canonical string form of a legacy primary key.
///
/// Workbooks hand numeric keys back as floats, so `12.0` and `"12"` must
/// compare equal across the book, contributor and link exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LegacyKey(String);

impl LegacyKey {
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn from_raw(value: &RawValue) -> Option<Self> {
        match value {
            RawValue::Text(s) => Self::new(s.as_str()),
            RawValue::Int(n) => Self::new(n.to_string()),
            RawValue::Float(n) if n.is_finite() => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Self::new((*n as i64).to_string())
                } else {
                    Self::new(n.to_string())
                }
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LegacyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Destination side
// ---------------------------------------------------------------------------

/// Opaque destination identifier. Minted ids are UUID v4 strings; ids read
/// back from the store are taken as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InternalId(String);

impl InternalId {
    pub fn mint() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for InternalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InternalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user every imported row is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Book,
    Contributor,
    BookContributor,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Book => write!(f, "book"),
            Self::Contributor => write!(f, "contributor"),
            Self::BookContributor => write!(f, "book_contributor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    InCollection,
    ForSale,
    Sold,
    Lost,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InCollection => "in_collection",
            Self::ForSale => "for_sale",
            Self::Sold => "sold",
            Self::Lost => "lost",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contributor {
    pub id: InternalId,
    /// Always `person` for legacy contributors.
    pub kind: &'static str,
    pub canonical_name: String,
    pub sort_name: String,
    pub display_name: String,
    pub given_names: Option<String>,
    pub family_name: Option<String>,
    pub created_by_user_id: OwnerId,
    pub filemaker_id: LegacyKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: InternalId,
    pub user_id: OwnerId,
    pub title: String,
    pub subtitle: Option<String>,
    pub original_title: Option<String>,
    pub language_id: Option<InternalId>,
    pub original_language_id: Option<InternalId>,
    pub series: Option<String>,
    pub status: BookStatus,

    // Imprint
    pub publication_place: Option<String>,
    pub publication_year: Option<i64>,
    pub printer: Option<String>,
    pub printing_place: Option<String>,

    // Edition
    pub edition: Option<String>,
    pub impression: Option<String>,
    pub issue_state: Option<String>,
    pub edition_notes: Option<String>,

    // Physical description
    pub page_count: Option<i64>,
    pub pagination_description: Option<String>,
    pub volumes: Option<String>,
    pub height_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub weight_grams: Option<f64>,
    pub cover_type: Option<String>,
    pub binding_id: Option<InternalId>,
    pub has_dust_jacket: bool,
    pub is_signed: bool,
    pub condition_id: Option<InternalId>,
    pub condition_notes: Option<String>,

    // Identifiers
    pub isbn_13: Option<String>,
    pub isbn_10: Option<String>,
    pub oclc_number: Option<String>,
    pub lccn: Option<String>,
    pub user_catalog_id: Option<String>,
    pub ddc: Option<String>,
    pub topic: Option<String>,

    // Storage
    pub storage_location: Option<String>,
    pub shelf: Option<String>,
    pub shelf_section: Option<String>,

    // Value
    pub acquired_from: Option<String>,
    pub acquired_date: Option<String>,
    pub acquired_price: Option<f64>,
    pub acquired_currency: Option<String>,
    pub lowest_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub estimated_value: Option<f64>,
    pub sales_price: Option<f64>,
    pub price_currency: Option<String>,

    // Notes
    pub illustrations_description: Option<String>,
    pub signatures_description: Option<String>,
    pub provenance: Option<String>,
    pub bibliography: Option<String>,
    pub summary: Option<String>,
    pub catalog_entry: Option<String>,
    pub internal_notes: Option<String>,

    pub filemaker_id: LegacyKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookContributor {
    pub id: InternalId,
    pub book_id: InternalId,
    pub contributor_id: InternalId,
    pub role_id: InternalId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_key_normalizes_numeric_forms() {
        assert_eq!(LegacyKey::from_raw(&RawValue::Float(12.0)), LegacyKey::new("12"));
        assert_eq!(LegacyKey::from_raw(&RawValue::Int(12)), LegacyKey::new("12"));
        assert_eq!(LegacyKey::from_raw(&RawValue::from(" 12 ")), LegacyKey::new("12"));
        assert_eq!(LegacyKey::from_raw(&RawValue::Float(f64::NAN)), None);
        assert_eq!(LegacyKey::from_raw(&RawValue::from("   ")), None);
    }

    #[test]
    fn blank_fields_read_as_absent() {
        let record = ExternalRecord::new(
            1,
            [("A", RawValue::from("  ")), ("B", RawValue::Empty), ("C", RawValue::from("x"))],
        );
        assert!(record.get("A").is_none());
        assert!(record.get("B").is_none());
        assert!(record.get("missing").is_none());
        assert_eq!(record.get("C"), Some(&RawValue::from("x")));
    }

    #[test]
    fn minted_ids_are_unique() {
        assert_ne!(InternalId::mint(), InternalId::mint());
    }
}
