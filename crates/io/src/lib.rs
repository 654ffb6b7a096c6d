// Source readers and the SQLite destination store

pub mod csv;
pub mod source;
pub mod sqlite;
pub mod xlsx;

pub use source::{read_source, read_sources};
pub use sqlite::SqliteStore;
