// SQLite destination store

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use shelvd_migrate::model::{Book, BookContributor, Contributor, EntityType};
use shelvd_migrate::reference::{ReferenceEntry, ReferenceKind};
use shelvd_migrate::store::{EntityBatch, Store, StoreTotals};
use shelvd_migrate::{InternalId, LegacyKey, OwnerId, StoreError};

/// Bootstrap schema: just enough of the destination for the importer to
/// run against. Reference tables are expected to be populated separately.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT
);

CREATE TABLE IF NOT EXISTS languages (
    id INTEGER PRIMARY KEY,
    code TEXT,
    name_en TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contributor_roles (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT
);

CREATE TABLE IF NOT EXISTS conditions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bindings (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contributors (
    id TEXT PRIMARY KEY,
    type TEXT NOT NULL DEFAULT 'person',
    canonical_name TEXT NOT NULL,
    sort_name TEXT NOT NULL,
    display_name TEXT NOT NULL,
    given_names TEXT,
    family_name TEXT,
    created_by_user_id TEXT NOT NULL REFERENCES users(id),
    filemaker_id TEXT,
    UNIQUE (created_by_user_id, filemaker_id)
);

CREATE TABLE IF NOT EXISTS books (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    title TEXT NOT NULL,
    subtitle TEXT,
    original_title TEXT,
    language_id INTEGER REFERENCES languages(id),
    original_language_id INTEGER REFERENCES languages(id),
    series TEXT,
    status TEXT NOT NULL DEFAULT 'in_collection',
    publication_place TEXT,
    publication_year INTEGER,
    printer TEXT,
    printing_place TEXT,
    edition TEXT,
    impression TEXT,
    issue_state TEXT,
    edition_notes TEXT,
    page_count INTEGER,
    pagination_description TEXT,
    volumes TEXT,
    height_mm REAL,
    width_mm REAL,
    weight_grams REAL,
    cover_type TEXT,
    binding_id INTEGER REFERENCES bindings(id),
    has_dust_jacket INTEGER NOT NULL DEFAULT 0,
    is_signed INTEGER NOT NULL DEFAULT 0,
    condition_id INTEGER REFERENCES conditions(id),
    condition_notes TEXT,
    isbn_13 TEXT,
    isbn_10 TEXT,
    oclc_number TEXT,
    lccn TEXT,
    user_catalog_id TEXT,
    ddc TEXT,
    topic TEXT,
    storage_location TEXT,
    shelf TEXT,
    shelf_section TEXT,
    acquired_from TEXT,
    acquired_date TEXT,
    acquired_price REAL,
    acquired_currency TEXT,
    lowest_price REAL,
    highest_price REAL,
    estimated_value REAL,
    sales_price REAL,
    price_currency TEXT,
    illustrations_description TEXT,
    signatures_description TEXT,
    provenance TEXT,
    bibliography TEXT,
    summary TEXT,
    catalog_entry TEXT,
    internal_notes TEXT,
    filemaker_id TEXT,
    UNIQUE (user_id, filemaker_id)
);

CREATE TABLE IF NOT EXISTS book_contributors (
    id TEXT PRIMARY KEY,
    book_id TEXT NOT NULL REFERENCES books(id),
    contributor_id TEXT NOT NULL REFERENCES contributors(id),
    role_id INTEGER NOT NULL REFERENCES contributor_roles(id),
    UNIQUE (book_id, contributor_id, role_id)
);
"#;

const CONTRIBUTOR_COLUMNS: &[&str] = &[
    "id",
    "type",
    "canonical_name",
    "sort_name",
    "display_name",
    "given_names",
    "family_name",
    "created_by_user_id",
    "filemaker_id",
];

const BOOK_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "title",
    "subtitle",
    "original_title",
    "language_id",
    "original_language_id",
    "series",
    "status",
    "publication_place",
    "publication_year",
    "printer",
    "printing_place",
    "edition",
    "impression",
    "issue_state",
    "edition_notes",
    "page_count",
    "pagination_description",
    "volumes",
    "height_mm",
    "width_mm",
    "weight_grams",
    "cover_type",
    "binding_id",
    "has_dust_jacket",
    "is_signed",
    "condition_id",
    "condition_notes",
    "isbn_13",
    "isbn_10",
    "oclc_number",
    "lccn",
    "user_catalog_id",
    "ddc",
    "topic",
    "storage_location",
    "shelf",
    "shelf_section",
    "acquired_from",
    "acquired_date",
    "acquired_price",
    "acquired_currency",
    "lowest_price",
    "highest_price",
    "estimated_value",
    "sales_price",
    "price_currency",
    "illustrations_description",
    "signatures_description",
    "provenance",
    "bibliography",
    "summary",
    "catalog_entry",
    "internal_notes",
    "filemaker_id",
];

const LINK_COLUMNS: &[&str] = &["id", "book_id", "contributor_id", "role_id"];

/// `INSERT ... ON CONFLICT DO NOTHING`: any unique-constraint collision
/// (primary key or legacy key) skips the row.
fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn store_err(e: rusqlite::Error) -> StoreError {
    StoreError::new(e.to_string())
}

/// Column as text whatever its storage class; ids may be INTEGER or TEXT.
fn column_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(n) => n.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    })
}

fn opt_id(id: &Option<InternalId>) -> Option<&str> {
    id.as_ref().map(InternalId::as_str)
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file with foreign keys enforced.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::new(format!("cannot open {}: {e}", path.display())))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory().map_err(store_err)?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(store_err)?;
        Ok(Self { conn })
    }

    /// Create the bootstrap tables if they do not exist.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA).map_err(store_err)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn count(&self, sql: &str, owner: &OwnerId) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row(sql, params![owner.as_str()], |r| r.get(0))
            .map_err(store_err)?;
        Ok(n.max(0) as u64)
    }

    fn identities(&self, sql: &str, owner: &OwnerId) -> Result<Vec<(LegacyKey, InternalId)>, StoreError> {
        let mut stmt = self.conn.prepare(sql).map_err(store_err)?;
        let rows = stmt
            .query_map(params![owner.as_str()], |r| Ok((column_text(r, 0)?, column_text(r, 1)?)))
            .map_err(store_err)?;

        let mut pairs = Vec::new();
        for row in rows {
            let (key, id) = row.map_err(store_err)?;
            if let Some(key) = LegacyKey::new(key) {
                pairs.push((key, InternalId::from(id)));
            }
        }
        Ok(pairs)
    }
}

fn insert_contributors(tx: &Transaction<'_>, rows: &[Contributor]) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare_cached(&insert_sql("contributors", CONTRIBUTOR_COLUMNS))?;
    let mut inserted = 0;
    for c in rows {
        inserted += stmt.execute(params![
            c.id.as_str(),
            c.kind,
            c.canonical_name,
            c.sort_name,
            c.display_name,
            c.given_names,
            c.family_name,
            c.created_by_user_id.as_str(),
            c.filemaker_id.as_str(),
        ])?;
    }
    Ok(inserted)
}

fn insert_books(tx: &Transaction<'_>, rows: &[Book]) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare_cached(&insert_sql("books", BOOK_COLUMNS))?;
    let mut inserted = 0;
    for b in rows {
        inserted += stmt.execute(params![
            b.id.as_str(),
            b.user_id.as_str(),
            b.title,
            b.subtitle,
            b.original_title,
            opt_id(&b.language_id),
            opt_id(&b.original_language_id),
            b.series,
            b.status.as_str(),
            b.publication_place,
            b.publication_year,
            b.printer,
            b.printing_place,
            b.edition,
            b.impression,
            b.issue_state,
            b.edition_notes,
            b.page_count,
            b.pagination_description,
            b.volumes,
            b.height_mm,
            b.width_mm,
            b.weight_grams,
            b.cover_type,
            opt_id(&b.binding_id),
            b.has_dust_jacket,
            b.is_signed,
            opt_id(&b.condition_id),
            b.condition_notes,
            b.isbn_13,
            b.isbn_10,
            b.oclc_number,
            b.lccn,
            b.user_catalog_id,
            b.ddc,
            b.topic,
            b.storage_location,
            b.shelf,
            b.shelf_section,
            b.acquired_from,
            b.acquired_date,
            b.acquired_price,
            b.acquired_currency,
            b.lowest_price,
            b.highest_price,
            b.estimated_value,
            b.sales_price,
            b.price_currency,
            b.illustrations_description,
            b.signatures_description,
            b.provenance,
            b.bibliography,
            b.summary,
            b.catalog_entry,
            b.internal_notes,
            b.filemaker_id.as_str(),
        ])?;
    }
    Ok(inserted)
}

fn insert_links(tx: &Transaction<'_>, rows: &[BookContributor]) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare_cached(&insert_sql("book_contributors", LINK_COLUMNS))?;
    let mut inserted = 0;
    for l in rows {
        inserted += stmt.execute(params![
            l.id.as_str(),
            l.book_id.as_str(),
            l.contributor_id.as_str(),
            l.role_id.as_str(),
        ])?;
    }
    Ok(inserted)
}

impl Store for SqliteStore {
    fn resolve_owner(&mut self, requested: Option<&str>) -> Result<Option<OwnerId>, StoreError> {
        let id: Option<String> = match requested {
            Some(id) => self
                .conn
                .query_row("SELECT id FROM users WHERE id = ?1", params![id], |r| column_text(r, 0))
                .optional(),
            None => self
                .conn
                .query_row("SELECT id FROM users ORDER BY rowid LIMIT 1", [], |r| column_text(r, 0))
                .optional(),
        }
        .map_err(store_err)?;
        Ok(id.map(OwnerId::new))
    }

    fn reference_entries(&mut self, kind: ReferenceKind) -> Result<Vec<ReferenceEntry>, StoreError> {
        let sql = match kind {
            ReferenceKind::Language => "SELECT id, name_en FROM languages",
            ReferenceKind::Role => "SELECT id, code FROM contributor_roles",
            ReferenceKind::Condition => "SELECT id, name FROM conditions",
            ReferenceKind::Binding => "SELECT id, name FROM bindings",
        };
        let mut stmt = self.conn.prepare(sql).map_err(store_err)?;
        let rows = stmt
            .query_map([], |r| Ok(ReferenceEntry::new(column_text(r, 0)?, column_text(r, 1)?)))
            .map_err(store_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(store_err)
    }

    fn count_owned(&mut self, entity: EntityType, owner: &OwnerId) -> Result<u64, StoreError> {
        let sql = match entity {
            EntityType::Book => "SELECT COUNT(*) FROM books WHERE user_id = ?1",
            EntityType::Contributor => "SELECT COUNT(*) FROM contributors WHERE created_by_user_id = ?1",
            EntityType::BookContributor => {
                "SELECT COUNT(*) FROM book_contributors bc JOIN books b ON b.id = bc.book_id WHERE b.user_id = ?1"
            }
        };
        self.count(sql, owner)
    }

    fn load_identities(
        &mut self,
        entity: EntityType,
        owner: &OwnerId,
    ) -> Result<Vec<(LegacyKey, InternalId)>, StoreError> {
        match entity {
            EntityType::Book => self.identities(
                "SELECT filemaker_id, id FROM books WHERE user_id = ?1 AND filemaker_id IS NOT NULL",
                owner,
            ),
            EntityType::Contributor => self.identities(
                "SELECT filemaker_id, id FROM contributors WHERE created_by_user_id = ?1 AND filemaker_id IS NOT NULL",
                owner,
            ),
            EntityType::BookContributor => Err(StoreError::new("book_contributors carry no legacy key")),
        }
    }

    fn insert_batch(&mut self, batch: EntityBatch<'_>) -> Result<usize, StoreError> {
        // Dropping the transaction on error rolls the whole batch back.
        let tx = self.conn.transaction().map_err(store_err)?;
        let inserted = match batch {
            EntityBatch::Books(rows) => insert_books(&tx, rows),
            EntityBatch::Contributors(rows) => insert_contributors(&tx, rows),
            EntityBatch::BookContributors(rows) => insert_links(&tx, rows),
        }
        .map_err(store_err)?;
        tx.commit().map_err(store_err)?;
        Ok(inserted)
    }

    fn totals(&mut self, owner: &OwnerId) -> Result<StoreTotals, StoreError> {
        Ok(StoreTotals {
            books: self.count_owned(EntityType::Book, owner)?,
            contributors: self.count_owned(EntityType::Contributor, owner)?,
            book_contributors: self.count_owned(EntityType::BookContributor, owner)?,
        })
    }
}
