//! End-to-end tests for the `shelvd-import` binary.
//!
//! Each test builds a scratch directory holding a config, three CSV
//! exports and an initialized database, then drives the binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use rusqlite::Connection;
use tempfile::TempDir;

fn shelvd_import() -> Command {
    Command::new(env!("CARGO_BIN_EXE_shelvd-import"))
}

fn run(args: &[&str]) -> Output {
    shelvd_import().args(args).output().expect("failed to run shelvd-import")
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

const CONFIG: &str = r#"
name = "Test catalog"

[sources]
books = "books.csv"
contributors = "contributors.csv"
book_contributors = "links.csv"

[store]
path = "shelvd.db"

[import]
batch_size = 2
"#;

const CONTRIBUTORS: &str = "\
PrimaryKey,Full Name,First Names,Last Name
1,Willem Elsschot,Willem,Elsschot
2,Hella Haasse,Hella,Haasse
3,,,
";

const BOOKS: &str = "\
PrimaryKey,Main » Title,Main » Language,Description » Condition,Description » Binding,Value » Purchase Date
10,Kaas,Dutch,fine copy,Hardcover,2001-06-30
11,Het woud der verwachting,Dutch,,,
12,Oeroeg,Klingon,,,
";

const LINKS: &str = "\
ID_Books,ID_Contributors,Role
10,1,Author
11,2,Author
12,2,Author
12,9,Translator
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("migrate.toml"), CONFIG).unwrap();
        fs::write(dir.path().join("contributors.csv"), CONTRIBUTORS).unwrap();
        fs::write(dir.path().join("books.csv"), BOOKS).unwrap();
        fs::write(dir.path().join("links.csv"), LINKS).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> String {
        self.path("migrate.toml").display().to_string()
    }

    fn init_db(&self) {
        let out = run(&["init", self.path("shelvd.db").to_str().unwrap()]);
        assert!(out.status.success(), "init failed: {}", stderr(&out));
    }

    fn seed(&self, with_user: bool) {
        let conn = Connection::open(self.path("shelvd.db")).unwrap();
        if with_user {
            conn.execute("INSERT INTO users (id, email) VALUES ('user-1', 'reader@example.org')", [])
                .unwrap();
        }
        conn.execute_batch(
            "INSERT INTO languages (id, code, name_en) VALUES (1, 'en', 'English'), (2, 'nl', 'Dutch');
             INSERT INTO contributor_roles (id, code, name) VALUES (1, 'aut', 'Author'), (2, 'trl', 'Translator');
             INSERT INTO conditions (id, name) VALUES (1, 'Fine'), (2, 'Good');
             INSERT INTO bindings (id, name) VALUES (1, 'Hardcover'), (2, 'Paperback');",
        )
        .unwrap();
    }

    fn ready() -> Self {
        let fx = Self::new();
        fx.init_db();
        fx.seed(true);
        fx
    }

    fn count(&self, table: &str) -> i64 {
        let conn = Connection::open(self.path("shelvd.db")).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0)).unwrap()
    }
}

fn report(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout is not a JSON report")
}

#[test]
fn no_subcommand_prints_usage() {
    let out = run(&[]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("Usage: shelvd-import"));
}

#[test]
fn validate_accepts_good_config() {
    let fx = Fixture::new();
    let out = run(&["validate", &fx.config()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("valid: 'Test catalog'"));
}

#[test]
fn validate_rejects_zero_batch_size() {
    let fx = Fixture::new();
    fs::write(fx.path("migrate.toml"), CONFIG.replace("batch_size = 2", "batch_size = 0")).unwrap();
    let out = run(&["validate", &fx.config()]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn missing_config_is_usage_error() {
    let fx = Fixture::new();
    let out = run(&["run", fx.path("nope.toml").to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn missing_database_suggests_init() {
    let fx = Fixture::new();
    let out = run(&["run", &fx.config()]);
    assert_eq!(out.status.code(), Some(5));
    assert!(stderr(&out).contains("shelvd-import init"));
}

#[test]
fn missing_source_exits_4() {
    let fx = Fixture::ready();
    fs::remove_file(fx.path("links.csv")).unwrap();
    let out = run(&["run", &fx.config()]);
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("links.csv"));
    assert_eq!(fx.count("books"), 0);
}

#[test]
fn no_user_exits_5_before_writing() {
    let fx = Fixture::new();
    fx.init_db();
    fx.seed(false);
    let out = run(&["run", &fx.config()]);
    assert_eq!(out.status.code(), Some(5));
    assert!(stderr(&out).contains("hint:"));
    assert_eq!(fx.count("contributors"), 0);
}

#[test]
fn run_imports_and_reports_json() {
    let fx = Fixture::ready();
    let out = run(&["run", &fx.config(), "--json", "--quiet"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let r = report(&out);
    assert_eq!(r["meta"]["owner"], "user-1");
    assert_eq!(r["contributors"]["inserted"], 2);
    assert_eq!(r["contributors"]["soft_failures"]["missing_name"], 1);
    assert_eq!(r["books"]["inserted"], 3);
    assert_eq!(r["books"]["mode"], "fresh");
    assert_eq!(r["books"]["soft_failures"]["unmatched_language"], 1);
    assert_eq!(r["links"]["inserted"], 3);
    assert_eq!(r["links"]["soft_failures"]["unknown_contributor"], 1);
    assert_eq!(r["totals"]["book_contributors"], 3);

    assert_eq!(fx.count("books"), 3);
    assert_eq!(fx.count("book_contributors"), 3);
}

#[test]
fn rerun_changes_nothing() {
    let fx = Fixture::ready();
    assert!(run(&["run", &fx.config()]).status.success());

    let out = run(&["run", &fx.config(), "--json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let r = report(&out);
    assert_eq!(r["books"]["mode"], "resume");
    assert_eq!(r["books"]["inserted"], 0);
    assert_eq!(r["books"]["already_imported"], 3);
    assert_eq!(r["links"]["inserted"], 0);
    assert_eq!(r["links"]["conflicts_skipped"], 3);

    assert_eq!(fx.count("books"), 3);
    assert_eq!(fx.count("contributors"), 2);
    assert_eq!(fx.count("book_contributors"), 3);
}

#[test]
fn output_writes_report_file() {
    let fx = Fixture::ready();
    let report_path = fx.path("report.json");
    let out = run(&["run", &fx.config(), "--output", report_path.to_str().unwrap()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(out.stdout.is_empty());

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["meta"]["name"], "Test catalog");
}

#[test]
fn summary_goes_to_stderr() {
    let fx = Fixture::ready();
    let out = run(&["run", &fx.config()]);
    assert!(out.status.success());
    let err = stderr(&out);
    assert!(err.contains("books (fresh): 3 rows, 3 inserted"));
    assert!(err.contains("unknown_contributor: 1"));
}

#[test]
fn relative_config_path_resolves_sources() {
    let fx = Fixture::ready();
    let out = shelvd_import()
        .current_dir(fx.dir.path())
        .args(["run", "migrate.toml"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(fx.count("books"), 3);
}

#[test]
fn init_is_repeatable() {
    let fx = Fixture::ready();
    let db = fx.path("shelvd.db");
    let out = run(&["init", db.to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(fx.count("languages"), 2);
}
