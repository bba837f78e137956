use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

fn create_test_files(dir: &TempDir, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        fs::write(dir.path().join(name), content)?;
    }
    Ok(())
}

fn linetally() -> Result<Command> {
    let mut cmd = Command::cargo_bin("linetally-cli")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_count_directory() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(
        &temp_dir,
        &[
            ("file1.txt", "Hello world\nTODO: Fix this\nGoodbye\n"),
            ("file2.txt", "Another TODO here\nSome text\nTODO again\n"),
            ("file3.txt", "nothing to do\n"),
        ],
    )?;

    linetally()?
        .current_dir(temp_dir.path())
        .args(["count", "-p", "TODO", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 matching lines in 2 files"));
    Ok(())
}

#[test]
fn test_count_missing_file_contributes_zero() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(&temp_dir, &[("present.txt", "TODO\nTODO\n")])?;

    linetally()?
        .current_dir(temp_dir.path())
        .args(["count", "-p", "TODO", "present.txt", "absent.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 matching lines in 1 files"))
        .stdout(predicate::str::contains("1 files could not be read"));
    Ok(())
}

#[test]
fn test_count_per_file() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(&temp_dir, &[("a.txt", "x\nx\n"), ("b.txt", "y\n")])?;

    linetally()?
        .current_dir(temp_dir.path())
        .args(["count", "-p", "x", "--per-file", "a.txt", "b.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt"))
        .stdout(predicate::str::contains("b.txt"))
        .stdout(predicate::str::contains("Found 2 matching lines in 1 files"));
    Ok(())
}

#[test]
fn test_count_json() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(&temp_dir, &[("a.txt", "needle\nhay\nneedle\n")])?;

    let output = linetally()?
        .current_dir(temp_dir.path())
        .args(["count", "-p", "needle", "--json", "a.txt", "gone.txt"])
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["total"], 2);
    assert_eq!(value["files_scanned"], 2);
    assert_eq!(value["files_failed"], 1);
    Ok(())
}

#[test]
fn test_extension_filter() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(
        &temp_dir,
        &[("keep.rs", "TODO\n"), ("skip.txt", "TODO\nTODO\n")],
    )?;

    linetally()?
        .current_dir(temp_dir.path())
        .args(["count", "-p", "TODO", "-e", "rs", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 matching lines in 1 files"));
    Ok(())
}

#[test]
fn test_pattern_from_config_file() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(
        &temp_dir,
        &[
            ("notes.txt", "FIXME one\nfine\nFIXME two\n"),
            ("custom.yaml", "pattern: \"FIXME\"\n"),
        ],
    )?;

    linetally()?
        .current_dir(temp_dir.path())
        .args(["count", "-c", "custom.yaml", "notes.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 matching lines in 1 files"));
    Ok(())
}

#[test]
fn test_missing_pattern_fails() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(&temp_dir, &[("a.txt", "x\n")])?;

    linetally()?
        .current_dir(temp_dir.path())
        .args(["count", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MissingPattern"));
    Ok(())
}

#[test]
fn test_invalid_ignore_pattern_fails() -> Result<()> {
    let temp_dir = tempdir()?;

    linetally()?
        .current_dir(temp_dir.path())
        .args(["count", "-p", "x", "-i", "[", "."])
        .assert()
        .failure();
    Ok(())
}
