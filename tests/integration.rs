//! End-to-end tests driving the `pricegrid` binary.
//!
//! The fixture configures two stores: a flyer store backed by OCR text
//! fixtures on disk (fully offline) and a catalog store pointing at an
//! unroutable endpoint, which exercises store-failure isolation without
//! any network dependency.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn pricegrid_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("pricegrid");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // OCR text fixtures: one file per flyer page, blank-line separated
    // blocks, one deliberately ambiguous block.
    let flyer_dir = root.join("flyers");
    fs::create_dir_all(&flyer_dir).unwrap();
    fs::write(
        flyer_dir.join("page1.txt"),
        "PASTA INTEGRALE BIO\n500 g\n2,49\n\nLATTE UHT INTERO\n1 l\n1,09\n",
    )
    .unwrap();
    fs::write(
        flyer_dir.join("page2.txt"),
        "OLIO EXTRAVERGINE\n750 ml\n5,99\n\nPREZZO SHOCK\n9,99\n8,88\n",
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{0}/data/prices.sqlite"

[ingest]
throttle_ms = 0
fetch_timeout_secs = 5

[server]
bind = "127.0.0.1:7410"

[stores.aldi-monza]
label = "Aldi Monza (volantino)"
adapter = "flyer"
dir = "{0}/flyers"

[stores."2024"]
label = "Esselunga Monza"
adapter = "catalog"
endpoint = "http://127.0.0.1:1/graphql"
keyword = "integrale"
"#,
        root.display()
    );

    let config_path = config_dir.join("pricegrid.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_pricegrid(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = pricegrid_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run pricegrid binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_pricegrid(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("prices.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_pricegrid(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_pricegrid(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_stores_lists_configuration() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_pricegrid(&config_path, &["stores"]);
    assert!(success);
    assert!(stdout.contains("aldi-monza"));
    assert!(stdout.contains("flyer"));
    assert!(stdout.contains("2024"));
    assert!(stdout.contains("catalog"));
}

#[test]
fn test_ingest_isolates_failed_store() {
    let (_tmp, config_path) = setup_test_env();

    run_pricegrid(&config_path, &["init"]);
    let (stdout, stderr, success) = run_pricegrid(&config_path, &["ingest"]);
    assert!(
        success,
        "ingest must not fail as a whole: stdout={}, stderr={}",
        stdout, stderr
    );

    // The flyer store completes: 4 blocks on disk, 1 ambiguous one skipped
    // at the adapter and accounted for in the summary, 3 records persisted.
    assert!(
        stdout.contains(
            "aldi-monza: fetched 3 / normalized 3 / persisted 3 / duplicate 0 / skipped 1 / failed 0"
        ),
        "unexpected flyer store report: {}",
        stdout
    );
    // The unroutable catalog store is reported failed, not fatal.
    assert!(stdout.contains("2024: FAILED"));
    assert!(stdout.contains("completed: 1, failed: 1"));
}

#[test]
fn test_ingest_twice_dedups_snapshot() {
    let (_tmp, config_path) = setup_test_env();

    run_pricegrid(&config_path, &["init"]);
    run_pricegrid(&config_path, &["ingest", "--store", "aldi-monza"]);
    let (stdout, _, _) = run_pricegrid(&config_path, &["ingest", "--store", "aldi-monza"]);

    // Two runs in quick succession: every record either lands in a new
    // snapshot bucket or dedups against the first run; the sum is stable.
    assert!(
        stdout.contains("persisted 3 / duplicate 0") || stdout.contains("persisted 0 / duplicate 3"),
        "unexpected second-run report: {}",
        stdout
    );
}

#[test]
fn test_ingest_store_filter() {
    let (_tmp, config_path) = setup_test_env();

    run_pricegrid(&config_path, &["init"]);
    let (stdout, _, success) =
        run_pricegrid(&config_path, &["ingest", "--store", "aldi-monza"]);
    assert!(success);
    assert!(stdout.contains("aldi-monza"));
    assert!(!stdout.contains("2024: FAILED"));
    assert!(stdout.contains("completed: 1, failed: 0"));
}

#[test]
fn test_search_finds_latest_snapshot() {
    let (_tmp, config_path) = setup_test_env();

    run_pricegrid(&config_path, &["init"]);
    run_pricegrid(&config_path, &["ingest", "--store", "aldi-monza"]);

    let (stdout, _, success) = run_pricegrid(&config_path, &["search", "integrale"]);
    assert!(success, "search failed");
    assert!(
        stdout.contains("PASTA INTEGRALE BIO"),
        "Expected flyer product in results, got: {}",
        stdout
    );
    // Per-unit price of 2,49 for 500 g is 4.98/kg.
    assert!(stdout.contains("4.98/kg"), "got: {}", stdout);
}

#[test]
fn test_search_case_insensitive() {
    let (_tmp, config_path) = setup_test_env();

    run_pricegrid(&config_path, &["init"]);
    run_pricegrid(&config_path, &["ingest", "--store", "aldi-monza"]);

    let (stdout1, _, _) = run_pricegrid(&config_path, &["search", "latte"]);
    let (stdout2, _, _) = run_pricegrid(&config_path, &["search", "LATTE"]);
    assert!(stdout1.contains("LATTE UHT INTERO"));
    assert_eq!(stdout1, stdout2);
}

#[test]
fn test_search_blank_query_rejected() {
    let (_tmp, config_path) = setup_test_env();

    run_pricegrid(&config_path, &["init"]);

    // Same contract as the HTTP surface: a blank query is an input error,
    // not an empty result set.
    let (_, stderr, success) = run_pricegrid(&config_path, &["search", "   "]);
    assert!(!success, "blank search query must be rejected");
    assert!(stderr.contains("must not be empty"), "got: {}", stderr);
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();

    run_pricegrid(&config_path, &["init"]);
    run_pricegrid(&config_path, &["ingest", "--store", "aldi-monza"]);

    let (stdout, _, success) = run_pricegrid(&config_path, &["search", "xyznonexistent"]);
    assert!(success);
    assert!(stdout.contains("No results"));
}

#[test]
fn test_compare_unknown_gtin_is_empty() {
    let (_tmp, config_path) = setup_test_env();

    run_pricegrid(&config_path, &["init"]);
    run_pricegrid(&config_path, &["ingest", "--store", "aldi-monza"]);

    // Flyer records carry no gtin, so compare finds nothing for any id.
    let (stdout, _, success) = run_pricegrid(&config_path, &["compare", "8001234567890"]);
    assert!(success, "compare on unknown gtin should not fail");
    assert!(stdout.contains("No price history"));
}

#[test]
fn test_missing_config_fails() {
    let (tmp, _) = setup_test_env();
    let bogus = tmp.path().join("nope.toml");

    let (_, stderr, success) = run_pricegrid(&bogus, &["init"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
