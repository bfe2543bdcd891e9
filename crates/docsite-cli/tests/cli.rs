use std::fs;

use assert_cmd::Command;
use docsite_test_support::{canonical_root, sample_site, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

fn docsite() -> Command {
    Command::cargo_bin("docsite").expect("binary")
}

#[test]
fn slug_prints_one_slug_per_argument() {
    let temp = TempDir::new().expect("tempdir");
    docsite()
        .current_dir(temp.path())
        .args(["slug", "Hello World", "  Leading and trailing  ", "Café Menu"])
        .assert()
        .success()
        .stdout("hello-world\nleading-and-trailing\ncaf-menu\n");
}

#[test]
fn slug_unicode_keeps_accented_letters() {
    docsite()
        .args(["slug", "--unicode", "Café Menu"])
        .assert()
        .success()
        .stdout("café-menu\n");
}

#[test]
fn slug_reads_stdin_without_arguments() {
    docsite()
        .arg("slug")
        .write_stdin("Getting Started\nC++ & Rust: A Comparison!\n!!!\n")
        .assert()
        .success()
        .stdout("getting-started\nc-rust-a-comparison\n\n");
}

#[test]
fn slug_json_pairs_text_with_slug() {
    let output = docsite()
        .args(["slug", "--format", "json", "API Reference (v2)"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout is json");
    assert_eq!(value[0]["text"], "API Reference (v2)");
    assert_eq!(value[0]["slug"], "api-reference-v2");
}

#[test]
fn slug_does_not_need_a_config() {
    let temp = TempDir::new().expect("tempdir");
    write_file(temp.path(), ".docsite.toml", "[site\nbroken");

    docsite()
        .current_dir(temp.path())
        .args(["slug", "Setup"])
        .assert()
        .success()
        .stdout("setup\n");
}

#[test]
fn slug_follows_configured_word_chars() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path(),
        ".docsite.toml",
        "[markdown.anchor]\nword_chars = \"unicode\"\n",
    );

    docsite()
        .current_dir(temp.path())
        .args(["slug", "Café Menu"])
        .assert()
        .success()
        .stdout("café-menu\n");
}

#[test]
fn check_sample_site_succeeds() {
    let (_temp, root) = sample_site();

    docsite()
        .current_dir(&root)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found in 3 page(s)."));
}

#[test]
fn check_reports_broken_links_with_exit_code_one() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_root(&temp);
    write_file(
        &root,
        "docs/source.md",
        "# Source\n\nSee [missing](missing.md).\n",
    );

    docsite()
        .current_dir(&root)
        .args(["check", "--path", "docs"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "docs/source.md:3 [broken-links] Broken link to 'missing.md'",
        ));
}

#[test]
fn routes_honour_cwd_flag() {
    let (_temp, root) = sample_site();
    let elsewhere = TempDir::new().expect("tempdir");

    let output = docsite()
        .current_dir(elsewhere.path())
        .arg("--cwd")
        .arg(&root)
        .args(["routes", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).expect("stdout is json");
    assert_eq!(value["pages"][0]["route"], "/");
    assert_eq!(value["sidebar"][3]["resolved"], "memory-bank/projectbrief.md");
}

#[test]
fn anchors_lists_headings() {
    let (_temp, root) = sample_site();

    docsite()
        .current_dir(&root)
        .args(["anchors", "--path", "docs/openwebui-configuration.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#environment-variables  Environment Variables"))
        .stdout(predicate::str::contains("openwebui-configuration.md -> /openwebui-configuration"));
}

#[test]
fn anchors_with_unknown_path_exits_one() {
    let (_temp, root) = sample_site();

    docsite()
        .current_dir(&root)
        .args(["anchors", "--path", "docs/nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no pages found under docs/nope"));
}

#[test]
fn invalid_config_exits_two() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_root(&temp);
    write_file(&root, ".docsite.toml", "[markdown.anchor]\nmin_level = 9\n");
    fs::create_dir_all(root.join("docs")).expect("create docs");

    docsite()
        .current_dir(&root)
        .arg("routes")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("docsite error:"));
}

#[test]
fn missing_override_config_exits_two() {
    let (_temp, root) = sample_site();

    docsite()
        .current_dir(&root)
        .args(["--config", "missing.toml", "check"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.toml"));
}
