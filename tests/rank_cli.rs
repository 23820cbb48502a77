// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn write_file(path: &std::path::Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write file");
}

/// Seeds a collection directory: rc file pinning the hash backend, a
/// manifest, and two extracted text documents with form-feed pages.
fn seed_collection(dir: &TempDir) {
    write_file(
        &dir.path().join(".docrankrc.toml"),
        "[embeddings]\nbackend = \"hash\"\n",
    );

    write_file(
        &dir.path().join("collection.json"),
        r#"{
            "persona": { "role": "Travel Planner" },
            "job_to_be_done": { "task": "Plan a trip for college friends" },
            "documents": [
                { "filename": "guide.txt", "title": "City Guide" },
                { "filename": "manual.txt", "title": "Printer Manual" }
            ]
        }"#,
    );

    let guide = "\
PACKING CHECKLIST AND GEAR
Pack light layers for the trip and bring comfortable walking shoes for long sightseeing days in the city.
NIGHTLIFE AND ENTERTAINMENT
The old town offers bars and live music venues that groups of college friends on vacation tend to enjoy.
BUDGET ACCOMMODATION ADVICE
Hostels near the station offer group booking discounts and shared rooms that keep the trip affordable.\u{c}\
DAY TRIPS AND EXCURSIONS
Coastal villages within an hour by train make excellent day trips with beaches and seafood restaurants.
LOCAL TRANSPORT TIPS
Buy a multi day transit pass on arrival because single tickets add up quickly for a group itinerary.";
    write_file(&dir.path().join("guide.txt"), guide);

    let manual = "\
TONER CARTRIDGE REPLACEMENT
Open the front cover and slide the cartridge out along the rails before inserting the replacement unit.
NETWORK CONFIGURATION STEPS
Connect the printer to the wireless network through the panel menu and print the confirmation page.";
    write_file(&dir.path().join("manual.txt"), manual);
}

#[test]
fn rank_with_manifest_emits_json_report() {
    let dir = TempDir::new().expect("tempdir");
    seed_collection(&dir);

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docrank"));
    let assert = cmd
        .current_dir(dir.path())
        .args(["--format", "json", "rank", "--collection", "collection.json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let json: Value = serde_json::from_str(&stdout).expect("json report");

    assert_eq!(json["metadata"]["persona"], "Travel Planner");
    assert_eq!(
        json["metadata"]["job_to_be_done"],
        "Plan a trip for college friends"
    );
    assert_eq!(
        json["metadata"]["input_documents"]
            .as_array()
            .expect("input_documents")
            .len(),
        2
    );

    let sections = json["extracted_sections"]
        .as_array()
        .expect("extracted_sections");
    assert!(!sections.is_empty());
    for (idx, section) in sections.iter().enumerate() {
        assert_eq!(section["importance_rank"], idx as u64 + 1);
        assert!(section["similarity_score"].is_number());
        assert_eq!(section["section_type"], "heading");
    }

    // The travel guide should outrank the printer manual for this persona.
    assert_eq!(sections[0]["document"], "guide.txt");

    let analysis = json["subsection_analysis"]
        .as_array()
        .expect("subsection_analysis");
    assert_eq!(analysis.len(), sections.len());
    assert!(analysis[0]["refined_text"].as_str().expect("refined").len() > 0);
}

#[test]
fn rank_top_n_limits_consolidated_output() {
    let dir = TempDir::new().expect("tempdir");
    seed_collection(&dir);

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docrank"));
    let assert = cmd
        .current_dir(dir.path())
        .args([
            "--format",
            "json",
            "rank",
            "--collection",
            "collection.json",
            "-n",
            "3",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let json: Value = serde_json::from_str(&stdout).expect("json report");
    assert!(
        json["extracted_sections"]
            .as_array()
            .expect("extracted_sections")
            .len()
            <= 3
    );
}

#[test]
fn rank_docs_dir_with_persona_flags_renders_text() {
    let dir = TempDir::new().expect("tempdir");
    seed_collection(&dir);

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docrank"));
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .args([
            "rank",
            "--docs",
            ".",
            "--persona",
            "Travel Planner",
            "--job",
            "Plan a trip for college friends",
            "--backend",
            "hash",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Travel Planner"))
        .stdout(predicate::str::contains("guide.txt"));
}

#[test]
fn rank_writes_json_report_to_output_file() {
    let dir = TempDir::new().expect("tempdir");
    seed_collection(&dir);

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docrank"));
    cmd.current_dir(dir.path())
        .args([
            "rank",
            "--collection",
            "collection.json",
            "--output",
            "report.json",
        ])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("report.json")).expect("report file");
    let json: Value = serde_json::from_str(&written).expect("valid json");
    assert!(json["metadata"]["sections_ranked"].as_u64().expect("ranked") > 0);
}

#[test]
fn rank_without_inputs_fails_with_usage_hint() {
    let dir = TempDir::new().expect("tempdir");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docrank"));
    cmd.current_dir(dir.path())
        .arg("rank")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--collection"));
}

#[test]
fn rank_docs_dir_requires_persona_and_job() {
    let dir = TempDir::new().expect("tempdir");
    seed_collection(&dir);

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docrank"));
    cmd.current_dir(dir.path())
        .args(["rank", "--docs", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--persona"));
}

#[test]
fn completions_generates_shell_script() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docrank"));
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docrank"));
}
