use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use predicates::prelude::*;
use tempfile::TempDir;

fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        b"q 0 0 0 rg 0 0 100 100 re f Q".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => Dictionary::new(),
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Run the binary against a config file inside `dir`, never the user's.
fn eyesaver(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("eyesaver").unwrap();
    cmd.arg("--config").arg(dir.path().join("config.json"));
    cmd
}

fn init_config(dir: &TempDir) {
    eyesaver(dir).args(["config", "init"]).assert().success();
}

#[test]
fn test_recolor_writes_prefixed_file() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = write_pdf(dir.path(), "scan.pdf");

    eyesaver(&dir)
        .arg("recolor")
        .arg(&input)
        .args(["-C", "#E0F0FF"])
        .assert()
        .success()
        .stdout(predicate::str::contains("colored_scan.pdf"));

    let output = dir.path().join("colored_scan.pdf");
    let document = Document::load(&output).unwrap();
    assert_eq!(document.get_pages().len(), 1);
}

#[test]
fn test_recolor_overlay_to_explicit_output() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = write_pdf(dir.path(), "scan.pdf");
    let output = dir.path().join("out").join("tinted.pdf");
    fs::create_dir_all(output.parent().unwrap()).unwrap();

    eyesaver(&dir)
        .arg("recolor")
        .arg(&input)
        .args(["--overlay", "--intensity", "0.5", "--compress", "-o"])
        .arg(&output)
        .assert()
        .success();

    assert!(Document::load(&output).is_ok());
    assert!(!dir.path().join("colored_scan.pdf").exists());
}

#[test]
fn test_bad_color_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = write_pdf(dir.path(), "scan.pdf");

    eyesaver(&dir)
        .arg("recolor")
        .arg(&input)
        .args(["--color", "#12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("found 5"));

    assert!(!dir.path().join("colored_scan.pdf").exists());
}

#[test]
fn test_intensity_must_be_exclusive() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = write_pdf(dir.path(), "scan.pdf");

    eyesaver(&dir)
        .arg("recolor")
        .arg(&input)
        .args(["--overlay", "--intensity", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 1"));
}

#[test]
fn test_non_pdf_input_fails() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = dir.path().join("notes.pdf");
    fs::write(&input, "just some text").unwrap();

    eyesaver(&dir).arg("recolor").arg(&input).assert().failure();
    assert!(!dir.path().join("colored_notes.pdf").exists());
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);

    eyesaver(&dir)
        .arg("recolor")
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_preview_writes_png() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = write_pdf(dir.path(), "scan.pdf");

    eyesaver(&dir)
        .arg("preview")
        .arg(&input)
        .args(["--dpi", "36"])
        .assert()
        .success();

    let png = fs::read(dir.path().join("scan_preview.png")).unwrap();
    assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();

    eyesaver(&dir)
        .args(["config", "set", "render.color", "#EEDDCC"])
        .assert()
        .success();

    eyesaver(&dir)
        .args(["config", "get", "render.color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#EEDDCC"));

    eyesaver(&dir)
        .args(["config", "set", "render.intensity", "0"])
        .assert()
        .failure();
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);

    eyesaver(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    eyesaver(&dir)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_backup_without_endpoint_only_warns() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"backup": {"enabled": true}}"#).unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");

    eyesaver(&dir)
        .arg("recolor")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Backup skipped"));

    assert!(dir.path().join("colored_scan.pdf").exists());
}

#[test]
fn test_standard_and_overlay_conflict() {
    let dir = TempDir::new().unwrap();
    init_config(&dir);
    let input = write_pdf(dir.path(), "scan.pdf");

    eyesaver(&dir)
        .arg("recolor")
        .arg(&input)
        .args(["--overlay", "--standard"])
        .assert()
        .failure();
}

#[test]
fn test_preview_dpi_is_capped() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"preview": {"dpi": 5000}}"#).unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");

    eyesaver(&dir)
        .arg("preview")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("preview.dpi"));

    eyesaver(&dir)
        .arg("preview")
        .arg(&input)
        .args(["--dpi", "1201"])
        .assert()
        .failure();
}
