//! Tests for error messages, suggestions and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn biblio(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("biblio").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg-config"))
        .env_remove("BIBLIO_DATA")
        .arg("--data")
        .arg(tmp.path().join("library.json"));
    cmd
}

#[test]
fn test_invalid_isbn_is_a_user_error() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["book", "isbn-check", "123"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid ISBN"));
}

#[test]
fn test_unknown_book_is_not_found() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["book", "show", "99"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_unknown_card_suggests_member_list() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["loan", "checkout", "1", "MBR-0042"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("MBR-0042"))
        .stderr(predicate::str::contains("biblio member list"));
}

#[test]
fn test_bad_arguments_exit_2() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["loan", "list", "--state", "lost"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_empty_update_is_rejected() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp).args(["book", "add", "Rayuela"]).assert().success();
    biblio(&tmp)
        .args(["book", "update", "1"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("nothing to update"));
}

#[test]
fn test_missing_config_file_is_a_config_error() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["-c", "missing.toml", "book", "list"])
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp).args(["-c", "cfg.toml", "init"]).assert().success();
    biblio(&tmp)
        .args(["-c", "cfg.toml", "init"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("--force"));
    biblio(&tmp)
        .args(["-c", "cfg.toml", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_unknown_config_key() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["config", "get", "does.not.exist"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_verbose_shows_no_hint() {
    let tmp = TempDir::new().unwrap();
    biblio(&tmp)
        .args(["book", "show", "99"])
        .assert()
        .stderr(predicate::str::contains("--verbose"));
    biblio(&tmp)
        .args(["-v", "book", "show", "99"])
        .assert()
        .stderr(predicate::str::contains("Use -v / --verbose").not());
}
