//! Integration tests for the `biblio` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `biblio` command isolated in `tmp`: its own data file and no user
/// config.
fn biblio(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("biblio").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg-config"))
        .env("XDG_DATA_HOME", tmp.path().join("xdg-data"))
        .env_remove("RUST_LOG")
        .env_remove("BIBLIO_DATA")
        .env_remove("BIBLIO_API_TOKEN")
        .arg("--data")
        .arg(data_file(tmp));
    cmd
}

fn data_file(tmp: &TempDir) -> PathBuf {
    tmp.path().join("library.json")
}

fn add_book(tmp: &TempDir, title: &str) {
    biblio(tmp).args(["book", "add", title]).assert().success();
}

fn add_member(tmp: &TempDir, name: &str) {
    biblio(tmp)
        .args(["member", "add", name])
        .assert()
        .success();
}

#[test]
fn help_lists_the_main_commands() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("book"))
        .stdout(predicate::str::contains("loan"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn version_flag() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn books_are_stored_in_the_data_file() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args([
            "book",
            "add",
            "Rayuela",
            "--isbn",
            "978-84-204-1214-6",
            "--author",
            "Julio Cortázar",
            "--pages",
            "736",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added book 1 \"Rayuela\""));
    assert!(data_file(&tmp).exists());

    biblio(&tmp)
        .args(["book", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rayuela"))
        .stdout(predicate::str::contains("9788420412146"));

    biblio(&tmp)
        .args(["book", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Julio Cortázar"))
        .stdout(predicate::str::contains("736"));
}

#[test]
fn book_list_as_json() {
    let tmp = TempDir::new().unwrap();
    add_book(&tmp, "Ficciones");

    let out = biblio(&tmp)
        .args(["--output-format", "json", "book", "list"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let books: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(books[0]["name"], "Ficciones");
    assert_eq!(books[0]["available"], true);
}

#[test]
fn status_change_is_reported() {
    let tmp = TempDir::new().unwrap();
    add_book(&tmp, "Ficciones");
    biblio(&tmp)
        .args(["book", "status", "1", "mantenimiento"])
        .assert()
        .success()
        .stdout(predicate::str::contains("maintenance"));

    biblio(&tmp)
        .args(["book", "list", "--available"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No books found"));
}

#[test]
fn isbn_check_normalizes() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["book", "isbn-check", "0-8044-2957-x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("080442957X"));
}

#[test]
fn members_get_card_numbers() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["member", "add", "Ana García", "--email", "ana@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MBR-0001"));

    biblio(&tmp)
        .args(["member", "show", "mbr-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ana@example.com"))
        .stdout(predicate::str::contains("0 open, 0 total"));
}

#[test]
fn checkout_and_return() {
    let tmp = TempDir::new().unwrap();
    add_book(&tmp, "Rayuela");
    add_member(&tmp, "Ana García");

    biblio(&tmp)
        .args(["loan", "checkout", "1", "MBR-0001", "--days", "21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loan 1"));

    biblio(&tmp)
        .args(["book", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loaned"));

    biblio(&tmp)
        .args(["loan", "list", "--state", "active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MBR-0001 - Ana García"));

    biblio(&tmp)
        .args(["loan", "return", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("returned"));

    biblio(&tmp)
        .args(["book", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("available"));
}

#[test]
fn sixth_open_loan_is_refused() {
    let tmp = TempDir::new().unwrap();
    add_member(&tmp, "Luis Pérez");
    for n in 1..=6 {
        add_book(&tmp, &format!("Libro {n}"));
    }
    for book in 1..=5 {
        biblio(&tmp)
            .args(["loan", "checkout", &book.to_string(), "1"])
            .assert()
            .success();
    }

    biblio(&tmp)
        .args(["loan", "checkout", "6", "1"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already has 5 active loans"));
}

#[test]
fn import_from_template_then_read_the_log() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["import", "template", "books", "-o", "books.csv"])
        .assert()
        .success();
    assert!(tmp.path().join("books.csv").exists());

    biblio(&tmp)
        .args(["import", "books", "books.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed: 3"))
        .stdout(predicate::str::contains("Created:   3"));

    biblio(&tmp)
        .args(["import", "logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("books.csv"));

    biblio(&tmp)
        .args(["book", "list", "--search", "rayuela"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rayuela"));
}

#[test]
fn import_rejects_bad_rows_but_keeps_the_rest() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("books.csv"),
        "name,isbn,autor,editorial,paginas,precio\n\
         Rayuela,978-84-204-1214-6,Julio Cortázar,Alfaguara,736,22.50\n\
         Roto,123,Nadie,,10,1\n",
    )
    .unwrap();

    biblio(&tmp)
        .args(["import", "books", "books.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created:   1"))
        .stdout(predicate::str::contains("Failed:    1"))
        .stderr(predicate::str::contains("1 row(s) rejected"));
}

#[test]
fn export_writes_a_csv_file() {
    let tmp = TempDir::new().unwrap();
    add_book(&tmp, "Ficciones");
    biblio(&tmp)
        .args(["export", "book", "-o", "out/books.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 record(s)"));

    let text = fs::read_to_string(tmp.path().join("out/books.csv")).unwrap();
    assert!(text.contains("Ficciones"));
    assert!(text.contains(';'));
}

#[test]
fn export_lists_fields() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["export", "member", "--list-fields"])
        .assert()
        .success()
        .stdout(predicate::str::contains("email"));
}

#[test]
fn loan_report_renders_totals() {
    let tmp = TempDir::new().unwrap();
    add_book(&tmp, "Rayuela");
    add_member(&tmp, "Ana García");
    biblio(&tmp)
        .args(["loan", "checkout", "1", "1"])
        .assert()
        .success();

    biblio(&tmp)
        .args(["report", "loans", "--group-by", "member"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LOAN REPORT"))
        .stdout(predicate::str::contains("Active: 1"));
}

#[test]
fn inventory_tracks_loaned_copies() {
    let tmp = TempDir::new().unwrap();
    add_book(&tmp, "Rayuela");
    add_member(&tmp, "Ana García");
    biblio(&tmp)
        .args(["inventory", "init", "1", "--stock", "3"])
        .assert()
        .success();
    biblio(&tmp)
        .args(["loan", "checkout", "1", "1"])
        .assert()
        .success();

    let out = biblio(&tmp)
        .args(["--output-format", "json", "inventory", "show", "1"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let view: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(view["snapshot"]["total"], 3);
    assert_eq!(view["snapshot"]["loaned"], 1);
    assert_eq!(view["snapshot"]["available"], 2);
}

#[test]
fn categories_attach_to_books() {
    let tmp = TempDir::new().unwrap();
    add_book(&tmp, "Rayuela");
    biblio(&tmp)
        .args(["category", "add", "Novela"])
        .assert()
        .success();
    biblio(&tmp)
        .args(["category", "assign", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Novela"));
    biblio(&tmp)
        .args(["category", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed from 1 book(s)"));
}

#[test]
fn config_init_set_get() {
    let tmp = TempDir::new().unwrap();
    let cfg = tmp.path().join("biblio.toml");
    let cfg = cfg.to_str().unwrap();

    biblio(&tmp).args(["-c", cfg, "init"]).assert().success();
    assert!(tmp.path().join("biblio.toml").exists());

    biblio(&tmp)
        .args(["-c", cfg, "config", "set", "library.max_active_loans", "3"])
        .assert()
        .success();

    biblio(&tmp)
        .args(["-c", cfg, "config", "get", "library.max_active_loans"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));

    biblio(&tmp)
        .args(["-c", cfg, "config", "get", "import.delimiter"])
        .assert()
        .success()
        .stdout(predicate::str::diff(",\n"));
}

#[test]
fn configured_loan_limit_applies() {
    let tmp = TempDir::new().unwrap();
    let cfg = tmp.path().join("biblio.toml");
    fs::write(&cfg, "[library]\nmax_active_loans = 1\n").unwrap();
    let cfg = cfg.to_str().unwrap();

    add_member(&tmp, "Ana García");
    add_book(&tmp, "Uno");
    add_book(&tmp, "Dos");
    biblio(&tmp)
        .args(["-c", cfg, "loan", "checkout", "1", "1"])
        .assert()
        .success();
    biblio(&tmp)
        .args(["-c", cfg, "loan", "checkout", "2", "1"])
        .assert()
        .code(2);
}

#[test]
fn completions_for_bash() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("biblio"));
}
