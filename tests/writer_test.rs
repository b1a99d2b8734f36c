//! Tests for OutputWriter

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use flexitex::application::{ApplicationError, OutputWriter};
use flexitex::domain::Artifact;
use flexitex::infrastructure::traits::RealFileSystem;

fn artifact(path: PathBuf, content: &str) -> Artifact {
    Artifact {
        path,
        content: content.to_string(),
    }
}

fn writer() -> OutputWriter {
    OutputWriter::new(Arc::new(RealFileSystem))
}

#[test]
fn given_artifacts_when_write_then_files_and_parents_created() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let artifacts = vec![
        artifact(out.join("chapters/one.tex"), "\\chapter{One}"),
        artifact(out.join("main.tex"), "\\input{chapters/one.tex}\n"),
    ];

    // Act
    writer().write(&artifacts, &out, true).unwrap();

    // Assert
    assert_eq!(
        fs::read_to_string(out.join("chapters/one.tex")).unwrap(),
        "\\chapter{One}"
    );
    assert_eq!(
        fs::read_to_string(out.join("main.tex")).unwrap(),
        "\\input{chapters/one.tex}\n"
    );
}

#[test]
fn given_clear_when_write_then_stale_files_removed() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("stale.tex"), "old").unwrap();

    writer()
        .write(&[artifact(out.join("main.tex"), "new")], &out, true)
        .unwrap();

    assert!(!out.join("stale.tex").exists());
    assert!(out.join("main.tex").exists());
}

#[test]
fn given_no_clear_when_write_then_existing_files_kept() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("keep.tex"), "old").unwrap();

    writer()
        .write(&[artifact(out.join("main.tex"), "new")], &out, false)
        .unwrap();

    assert!(out.join("keep.tex").exists());
}

#[test]
fn given_duplicate_paths_when_write_then_rejected_before_any_write() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("keep.tex"), "old").unwrap();
    let artifacts = vec![
        artifact(out.join("sec.tex"), "a"),
        artifact(out.join("main.tex"), "m"),
        artifact(out.join("sec.tex"), "b"),
    ];

    // Act
    let result = writer().write(&artifacts, &out, true);

    // Assert
    match result {
        Err(ApplicationError::DuplicateOutputs(paths)) => {
            assert_eq!(paths, vec![out.join("sec.tex")])
        }
        other => panic!("expected duplicate error, got {other:?}"),
    }
    assert!(out.join("keep.tex").exists(), "output folder must stay untouched");
    assert!(!out.join("main.tex").exists());
}
