//! Integration tests for a full run over a directory tree

use csproj_version::error::UpdateError;
use csproj_version::parsers::WalkOptions;
use csproj_version::runner;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <Version>1.0.0.0</Version>
    <AssemblyVersion>1.0.0.0</AssemblyVersion>
  </PropertyGroup>
</Project>
"#;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Tree with two valid projects, one without version fields and one malformed
fn create_tree() -> (TempDir, Vec<PathBuf>) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let files = vec![
        root.join("a").join("A.csproj"),
        root.join("b").join("Broken.csproj"),
        root.join("c").join("C.csproj"),
        root.join("d").join("NoVersion.csproj"),
    ];
    write_file(&files[0], PROJECT);
    write_file(&files[1], "<Project><PropertyGroup><Version>1.0.0.0</Version></Project>");
    write_file(&files[2], PROJECT);
    write_file(&files[3], "<Project><PropertyGroup /></Project>");
    write_file(&root.join("readme.txt"), "Version 1.0.0.0");
    (temp_dir, files)
}

#[test]
fn test_run_updates_tree_and_isolates_failures() {
    let (temp_dir, files) = create_tree();

    let mut events = Vec::new();
    let report = runner::run(temp_dir.path(), "2.0.0.0", &WalkOptions::default(), |path, outcome| {
        events.push((path.to_path_buf(), outcome.is_failed()));
    })
    .unwrap();

    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.updated(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 1);

    // the malformed file sits between the two good ones in walk order
    assert_eq!(events.iter().map(|(p, _)| p.clone()).collect::<Vec<_>>(), files);
    assert_eq!(events[1], (files[1].clone(), true));

    for updated in [&files[0], &files[2]] {
        let content = fs::read_to_string(updated).unwrap();
        assert_eq!(content, PROJECT.replace("1.0.0.0", "2.0.0.0"));
    }
    assert_eq!(
        fs::read_to_string(&files[1]).unwrap(),
        "<Project><PropertyGroup><Version>1.0.0.0</Version></Project>"
    );
    assert_eq!(fs::read_to_string(temp_dir.path().join("readme.txt")).unwrap(), "Version 1.0.0.0");
}

#[test]
fn test_run_with_invalid_version_touches_nothing() {
    let (temp_dir, files) = create_tree();
    let before: Vec<_> = files
        .iter()
        .map(|f| (fs::read(f).unwrap(), fs::metadata(f).unwrap().modified().unwrap()))
        .collect();

    let mut calls = 0;
    for invalid in ["1.2.3", "1.2.3.a", "1..3.4", "", "2.0.0.0.0"] {
        let result = runner::run(temp_dir.path(), invalid, &WalkOptions::default(), |_, _| calls += 1);
        assert!(matches!(result, Err(UpdateError::InvalidVersionFormat(ref v)) if v == invalid));
    }
    assert_eq!(calls, 0);

    let after: Vec<_> = files
        .iter()
        .map(|f| (fs::read(f).unwrap(), fs::metadata(f).unwrap().modified().unwrap()))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_run_on_empty_tree() {
    let temp_dir = TempDir::new().unwrap();

    let report = runner::run(temp_dir.path(), "1.0.0.0", &WalkOptions::default(), |_, _| {}).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.failed(), 0);
}

#[test]
fn test_run_twice_reports_updated_again() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("App.csproj");
    write_file(&project, PROJECT);

    let first = runner::run(temp_dir.path(), "3.0.0.0", &WalkOptions::default(), |_, _| {}).unwrap();
    let content = fs::read(&project).unwrap();
    let second = runner::run(temp_dir.path(), "3.0.0.0", &WalkOptions::default(), |_, _| {}).unwrap();

    assert_eq!(first.updated(), 1);
    assert_eq!(second.updated(), 1);
    assert_eq!(fs::read(&project).unwrap(), content);
}

#[test]
fn test_run_keeps_leading_zeros() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("App.csproj");
    write_file(&project, PROJECT);

    runner::run(temp_dir.path(), "01.02.0003.0", &WalkOptions::default(), |_, _| {}).unwrap();
    assert!(fs::read_to_string(&project).unwrap().contains("<Version>01.02.0003.0</Version>"));
}
