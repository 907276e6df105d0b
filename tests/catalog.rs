//! Catalog Integration Tests
//!
//! Scanning course folders, snapshot persistence and watched counters
//! across a tracker restart.

use std::fs;
use std::path::{Path, PathBuf};

use coursetrack::core::{ProgressAggregator, Tracker};
use coursetrack::library::CanonicalPath;
use coursetrack::domain::{ItemKey, ItemKind};
use coursetrack::library::{CatalogError, CourseCatalog, ScanOptions};
use tempfile::TempDir;

/// Create the files of a course below `root`
fn make_course(root: &Path, files: &[&str]) -> PathBuf {
    for file in files {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"x").unwrap();
    }
    root.to_path_buf()
}

fn open_tracker(state: &TempDir) -> Tracker {
    Tracker::open(
        state.path().join("catalog.json"),
        state.path().join("progress.json"),
        ScanOptions::default(),
    )
}

#[test]
fn test_scan_builds_naturally_ordered_sections() {
    let temp = TempDir::new().unwrap();
    let root = make_course(
        &temp.path().join("rust"),
        &[
            "10 Final/a.mp4",
            "2 Advanced/c.mp4",
            "2 Advanced/b.MOV",
            "1 Intro/10 wrap.mp4",
            "1 Intro/2 setup.mp4",
            "1 Intro/notes.txt",
            "readme.html",
        ],
    );

    let catalog = CourseCatalog::new(temp.path().join("catalog.json"), ScanOptions::default());
    let course = catalog.scan_root(&root).unwrap();

    let sections: Vec<&str> = course.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(sections, vec!["1 Intro", "2 Advanced", "10 Final", "Principal"]);

    let intro: Vec<&str> = course.sections[0].items.iter().map(|i| i.name.as_str()).collect();
    // Files of unsupported kinds are left out of the tree
    assert_eq!(intro, vec!["2 setup.mp4", "10 wrap.mp4"]);
    assert_eq!(course.sections[3].items[0].kind, ItemKind::Document);

    assert_eq!(course.id, "rust");
    assert_eq!(course.total_items, 6);
    assert_eq!(course.watched_count, 0);
}

#[test]
fn test_scan_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let root = make_course(
        &temp.path().join("go"),
        &["b/1.mp4", "a/2.mp4", "a/1.mp4", "x.mp4"],
    );
    let catalog = CourseCatalog::new(temp.path().join("catalog.json"), ScanOptions::default());

    let first = catalog.scan_root(&root).unwrap();
    let second = catalog.scan_root(&root).unwrap();
    assert_eq!(first.sections, second.sections);
}

#[test]
fn test_missing_root_rejected() {
    let temp = TempDir::new().unwrap();
    let mut catalog = CourseCatalog::new(temp.path().join("catalog.json"), ScanOptions::default());

    let result = catalog.add_course(&temp.path().join("nope"));
    assert!(matches!(result, Err(CatalogError::RootNotFound(_))));
    assert!(catalog.is_empty());
    assert!(!temp.path().join("catalog.json").exists());
}

#[test]
fn test_duplicate_course_rejected() {
    let temp = TempDir::new().unwrap();
    let root = make_course(&temp.path().join("rust"), &["a.mp4"]);
    let mut catalog = CourseCatalog::new(temp.path().join("catalog.json"), ScanOptions::default());

    catalog.add_course(&root).unwrap();
    let result = catalog.add_course(&root);
    assert!(matches!(result, Err(CatalogError::DuplicateCourse(id)) if id == "rust"));
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_snapshot_round_trip() {
    let temp = TempDir::new().unwrap();
    let root = make_course(&temp.path().join("rust"), &["1 Intro/a.mp4", "notes.html"]);
    let path = temp.path().join("state").join("catalog.json");

    let mut catalog = CourseCatalog::new(path.clone(), ScanOptions::default());
    catalog.add_course(&root).unwrap();
    catalog.set_icon("rust", "brands/SiRust").unwrap();

    let loaded = CourseCatalog::load(path.clone(), ScanOptions::default()).unwrap();
    assert_eq!(loaded.courses(), catalog.courses());
    assert_eq!(loaded.get("rust").unwrap().icon, "brands/SiRust");

    // Writing back what was read changes nothing
    loaded.persist().unwrap();
    let again = CourseCatalog::load(path, ScanOptions::default()).unwrap();
    assert_eq!(again.courses(), catalog.courses());
}

#[test]
fn test_corrupt_snapshot_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalog.json");
    fs::write(&path, b"{ not json").unwrap();

    let result = CourseCatalog::load(path.clone(), ScanOptions::default());
    assert!(matches!(result, Err(CatalogError::Corrupt { .. })));

    let fallback = CourseCatalog::load_or_empty(path, ScanOptions::default());
    assert!(fallback.is_empty());
}

#[test]
fn test_watched_flags_survive_restart() {
    let courses = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let root = make_course(
        &courses.path().join("rust"),
        &["1 Intro/a.mp4", "2 Advanced/b.mp4", "notes.html"],
    );

    {
        let mut tracker = open_tracker(&state);
        tracker.add_course(&root).unwrap();
        tracker
            .toggle_item("rust", &ItemKey::new("1 Intro", "a.mp4"), true)
            .unwrap();
    }

    let tracker = open_tracker(&state);
    let course = tracker.open_course("rust").unwrap();
    assert_eq!(course.watched_count, 1);
    assert!(course.item(&ItemKey::new("1 Intro", "a.mp4")).unwrap().watched);
    assert!(!course.item(&ItemKey::new("2 Advanced", "b.mp4")).unwrap().watched);

    let percent = tracker.completion_percentage("rust").unwrap();
    assert_eq!((percent * 100.0).round() / 100.0, 33.33);
}

#[test]
fn test_rescan_keeps_watched_flags() {
    let courses = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let root = make_course(&courses.path().join("rust"), &["1 Intro/a.mp4", "1 Intro/b.mp4"]);

    let mut tracker = open_tracker(&state);
    tracker.add_course(&root).unwrap();
    tracker
        .toggle_item("rust", &ItemKey::new("1 Intro", "b.mp4"), true)
        .unwrap();

    fs::write(root.join("1 Intro").join("c.mp4"), b"x").unwrap();
    fs::remove_file(root.join("1 Intro").join("a.mp4")).unwrap();

    let course = tracker.rescan_course("rust").unwrap();
    let names: Vec<&str> = course.sections[0].items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["b.mp4", "c.mp4"]);
    assert_eq!(course.total_items, 2);
    assert_eq!(course.watched_count, 1);
}

#[test]
fn test_import_root_adds_each_folder() {
    let courses = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    make_course(&courses.path().join("rust"), &["a.mp4"]);
    make_course(&courses.path().join("go"), &["b.mp4"]);
    fs::write(courses.path().join("stray.mp4"), b"x").unwrap();

    let mut tracker = open_tracker(&state);
    let first = tracker.import_root(courses.path()).unwrap();
    assert_eq!(first.added, vec!["go".to_string(), "rust".to_string()]);
    assert!(first.errors.is_empty());

    let second = tracker.import_root(courses.path()).unwrap();
    assert!(second.added.is_empty());
    assert_eq!(second.skipped.len(), 2);

    let ids: Vec<&str> = tracker.list_courses().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["go", "rust"]);
}

/// Replace a state directory by a regular file so snapshot writes fail
fn make_unwritable(state: &Path) {
    fs::remove_dir_all(state).unwrap();
    fs::write(state, b"").unwrap();
}

#[test]
fn test_failed_add_leaves_catalog_unchanged() {
    let temp = TempDir::new().unwrap();
    let root = make_course(&temp.path().join("rust"), &["a.mp4"]);
    fs::write(temp.path().join("blocker"), b"").unwrap();

    let mut catalog = CourseCatalog::new(
        temp.path().join("blocker").join("catalog.json"),
        ScanOptions::default(),
    );

    assert!(matches!(catalog.add_course(&root), Err(CatalogError::Io(_))));
    assert!(catalog.is_empty());

    // Retrying reports the write failure again, not a duplicate
    assert!(matches!(catalog.add_course(&root), Err(CatalogError::Io(_))));
    assert!(matches!(catalog.import_root(temp.path()), Err(CatalogError::Io(_))));
    assert!(catalog.is_empty());
}

#[test]
fn test_failed_writes_revert_changes() {
    let temp = TempDir::new().unwrap();
    let root = make_course(&temp.path().join("rust"), &["1 Intro/a.mp4", "1 Intro/b.mp4"]);
    let state = temp.path().join("state");

    let mut catalog = CourseCatalog::new(state.join("catalog.json"), ScanOptions::default());
    catalog.add_course(&root).unwrap();
    let before = catalog.get("rust").unwrap().clone();

    make_unwritable(&state);

    assert!(catalog.set_icon("rust", "brands/SiRust").is_err());
    assert!(catalog.rescan_course("rust").is_err());
    assert!(catalog.remove_course("rust").is_err());

    let aggregator = ProgressAggregator::new();
    let item = ItemKey::new("1 Intro", "a.mp4");
    assert!(aggregator.toggle_item(&mut catalog, "rust", &item, true).is_err());
    let path: CanonicalPath = before.item_path("1 Intro", "b.mp4");
    assert!(aggregator.on_playback_completed(&mut catalog, "rust", &path).is_err());

    assert_eq!(catalog.get("rust"), Some(&before));
    assert_eq!(catalog.get("rust").unwrap().watched_count, 0);
}

#[test]
fn test_root_files_end_to_end() {
    let courses = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let root = make_course(
        &courses.path().join("rust"),
        &["2 Advanced.mp4", "notes.html", "1 Intro.mp4"],
    );

    let mut tracker = open_tracker(&state);
    let course = tracker.add_course(&root).unwrap();

    assert_eq!(course.sections.len(), 1);
    assert_eq!(course.sections[0].name, "Principal");
    let names: Vec<&str> = course.sections[0].items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["1 Intro.mp4", "2 Advanced.mp4", "notes.html"]);
    assert_eq!(course.total_items, 3);

    let intro = course.item_path("Principal", "1 Intro.mp4");
    assert!(tracker.on_playback_completed("rust", &intro).unwrap().changed());

    let course = tracker.open_course("rust").unwrap();
    assert_eq!(course.watched_count, 1);
    assert!(course.item(&ItemKey::new("Principal", "1 Intro.mp4")).unwrap().watched);

    let percent = tracker.completion_percentage("rust").unwrap();
    assert_eq!((percent * 100.0).round() / 100.0, 33.33);
}
