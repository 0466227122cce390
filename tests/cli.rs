use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn generates_svg_from_sg_file() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/input/classroom.sg");
    assert!(fixture.exists(), "fixture sociogram should exist");

    let tmp = tempdir()?;
    let output_path = tmp.path().join("classroom.svg");

    let mut cmd = Command::cargo_bin("sociograph")?;
    cmd.arg("--input")
        .arg(&fixture)
        .arg("--output")
        .arg(&output_path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sociogram"));

    let svg_contents = fs::read_to_string(&output_path)?;
    assert!(
        svg_contents.contains("<svg"),
        "output should contain an <svg> element"
    );

    Ok(())
}

#[test]
fn rejects_a_malformed_definition() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input_path = tmp.path().join("broken.sg");
    fs::write(&input_path, "sociogram\nA ->|7| B\n")?;

    let mut cmd = Command::cargo_bin("sociograph")?;
    cmd.arg("--input")
        .arg(&input_path)
        .arg("--output")
        .arg(tmp.path().join("broken.svg"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error"));

    Ok(())
}
