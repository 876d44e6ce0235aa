mod support;

use assert_cmd::Command;
use predicates::prelude::*;

use support::{corrupt_clip, silent_clip, tone_clip};

#[test]
fn extract_builds_dataset_and_skips_bad_files() {
    let input = tempfile::tempdir().unwrap();
    silent_clip(input.path(), "a.wav");
    tone_clip(input.path(), "b.wav", 440.0);
    corrupt_clip(input.path(), "broken.wav");
    let out = input.path().join("dataset.csv");

    Command::cargo_bin("genrefeat")
        .unwrap()
        .args(["extract", "--label", "zouk"])
        .arg(input.path())
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 rows"))
        .stdout(predicate::str::contains("1 files skipped"));

    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.lines().skip(1).all(|line| line.ends_with(",zouk")));
}

#[test]
fn append_requires_existing_dataset() {
    let input = tempfile::tempdir().unwrap();
    silent_clip(input.path(), "a.wav");

    Command::cargo_bin("genrefeat")
        .unwrap()
        .arg("extract")
        .arg(input.path())
        .arg(input.path().join("missing.csv"))
        .arg("--append")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open dataset"));
}

#[test]
fn no_clobber_protects_existing_dataset() {
    let input = tempfile::tempdir().unwrap();
    let out = input.path().join("dataset.csv");
    std::fs::write(&out, "filename,label\nx.wav,zouk\n").unwrap();

    Command::cargo_bin("genrefeat")
        .unwrap()
        .arg("extract")
        .arg(input.path())
        .arg(&out)
        .arg("--no-clobber")
        .assert()
        .failure();

    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "filename,label\nx.wav,zouk\n"
    );
}
