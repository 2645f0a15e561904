//! Integration tests for the `pdf-to-text` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pdf-to-text").unwrap();
    // Keep stray doctools.toml files in the caller's directory out of the run.
    cmd.current_dir(dir);
    cmd
}

/// Multi-page PDF with one line of Helvetica text per non-empty entry.
fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
    use lopdf::{dictionary, Object, Stream};

    let mut doc = lopdf::Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ];

    let mut page_ids = Vec::new();
    for text in texts {
        // An empty entry produces a page with an empty content stream.
        let content = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET")
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_dict = dictionary! {
            "Type" => "Page",
            "MediaBox" => media_box.clone(),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        };
        page_ids.push(doc.add_object(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(texts.len() as i64),
    });

    for &page_id in &page_ids {
        if let Ok(page_obj) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page_obj.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn write_pdf(dir: &Path, name: &str, texts: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_with_pages(texts)).unwrap();
    path
}

#[test]
fn converts_to_sibling_txt_with_page_banners() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "ledger.pdf", &["Opening balance", "Closing balance"]);

    cmd(dir.path())
        .arg(&pdf)
        .args(["--backend", "lopdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Converting: ledger.pdf"))
        .stdout(predicate::str::contains("Using library: lopdf"))
        .stdout(predicate::str::contains("Processing 2 pages..."))
        .stdout(predicate::str::contains("Output file size:"));

    let text = std::fs::read_to_string(dir.path().join("ledger.txt")).unwrap();
    let separator = "=".repeat(80);
    assert!(text.starts_with(&format!("\n{separator}\nPAGE 1\n{separator}\n\n")));

    let page_one = text.find("PAGE 1").unwrap();
    let page_two = text.find("PAGE 2").unwrap();
    assert!(page_one < page_two);
    assert_eq!(text.matches(&separator).count(), 4);

    let opening = text.find("Opening balance").unwrap();
    let closing = text.find("Closing balance").unwrap();
    assert!(page_one < opening && opening < page_two && page_two < closing);
}

#[test]
fn output_override_is_honoured() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "source.pdf", &["Hello"]);
    let out_dir = dir.path().join("exports");
    std::fs::create_dir(&out_dir).unwrap();
    let target = out_dir.join("renamed.txt");

    cmd(dir.path())
        .arg(&pdf)
        .arg("-o")
        .arg(&target)
        .args(["--backend", "lopdf", "--quiet"])
        .assert()
        .success();

    assert!(target.exists());
    assert!(!dir.path().join("source.txt").exists());
}

#[test]
fn uppercase_extension_is_accepted() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "SCAN.PDF", &["Upper"]);

    cmd(dir.path())
        .arg(&pdf)
        .args(["--backend", "lopdf", "-q"])
        .assert()
        .success();

    assert!(dir.path().join("SCAN.txt").exists());
}

#[test]
fn existing_output_is_overwritten() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "notes.pdf", &["Fresh"]);
    let target = dir.path().join("notes.txt");
    std::fs::write(&target, "stale").unwrap();

    cmd(dir.path())
        .arg(&pdf)
        .args(["--backend", "lopdf", "-q"])
        .assert()
        .success();

    let text = std::fs::read_to_string(&target).unwrap();
    assert!(!text.contains("stale"));
    assert!(text.contains("PAGE 1"));
}

#[test]
fn missing_file_fails_without_output() {
    let dir = TempDir::new().unwrap();

    cmd(dir.path())
        .arg("absent.pdf")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));

    assert!(!dir.path().join("absent.txt").exists());
}

#[test]
fn non_pdf_extension_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let docx = dir.path().join("report.docx");
    std::fs::write(&docx, pdf_with_pages(&["Hidden"])).unwrap();

    cmd(dir.path())
        .arg(&docx)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a PDF file"));

    assert!(!dir.path().join("report.txt").exists());
}

#[test]
fn corrupt_pdf_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("broken.pdf");
    std::fs::write(&pdf, b"%PDF-1.4\nnot really a pdf").unwrap();

    cmd(dir.path())
        .arg(&pdf)
        .args(["--backend", "lopdf"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Conversion failed"));

    assert!(!dir.path().join("broken.txt").exists());
}

#[test]
fn unknown_backend_is_a_usage_error() {
    let dir = TempDir::new().unwrap();

    cmd(dir.path())
        .args(["input.pdf", "--backend", "pypdf2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown backend"));
}

#[test]
fn json_report() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "summary.pdf", &["One", "Two", "Three"]);

    cmd(dir.path())
        .arg(&pdf)
        .args(["--backend", "lopdf", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_pages\": 3"))
        .stdout(predicate::str::contains("\"backend\": \"lopdf\""));
}

#[test]
fn default_backend_skips_empty_pages() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "chapters.pdf", &["Alpha", "", "Gamma"]);

    cmd(dir.path())
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("Using library: pdf-extract"))
        .stdout(predicate::str::contains("Processing 3 pages..."));

    let text = std::fs::read_to_string(dir.path().join("chapters.txt")).unwrap();
    let separator = "=".repeat(80);
    assert_eq!(text.matches(&separator).count(), 4);
    assert_eq!(text.matches("PAGE ").count(), 2);
    assert!(!text.contains("PAGE 2"));

    let page_one = text.find(&format!("\n{separator}\nPAGE 1\n{separator}\n\n")).unwrap();
    let page_three = text.find(&format!("\n{separator}\nPAGE 3\n{separator}\n\n")).unwrap();
    assert_eq!(page_one, 0);

    let alpha = text.find("Alpha").unwrap();
    let gamma = text.find("Gamma").unwrap();
    assert!(page_one < alpha && alpha < page_three && page_three < gamma);
}

#[test]
fn layout_backend_rejects_corrupt_pdf() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("mangled.pdf");
    std::fs::write(&pdf, b"%PDF-1.7\n1 0 obj << /Type /Catalog >>\n%%EOF").unwrap();

    cmd(dir.path())
        .arg(&pdf)
        .args(["--backend", "pdf-extract"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Conversion failed"));

    assert!(!dir.path().join("mangled.txt").exists());
}

#[test]
fn pdf_argument_is_required() {
    let dir = TempDir::new().unwrap();

    cmd(dir.path())
        .args(["-o", "out.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PDF_FILE"));
}
