use std::fs;
use std::path::Path;

use folio::settings::{
    FitSetting, LastSession, Settings, SettingsError, SettingsStore, WindowGeometry, ZoomSetting,
};
use folio::theme::Theme;

fn reload(path: &Path) -> Settings {
    SettingsStore::load(path).settings().clone()
}

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let mut store = SettingsStore::load(&path);
    assert!(store.take_load_error().is_none());
    assert_eq!(store.settings(), &Settings::default());
    assert_eq!(store.path(), Some(path.as_path()));
    assert!(path.exists());

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# folio settings"));
    assert_eq!(reload(&path), Settings::default());
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "theme: [unterminated\n  - : :").unwrap();

    let mut store = SettingsStore::load(&path);
    assert_eq!(store.settings(), &Settings::default());
    assert!(matches!(
        store.take_load_error(),
        Some(SettingsError::Parse { .. })
    ));
    // Taken once
    assert!(store.take_load_error().is_none());

    // The broken file is left alone until something changes
    assert!(fs::read_to_string(&path).unwrap().contains("unterminated"));
}

#[test]
fn wrong_value_types_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "brightness: very bright\n").unwrap();

    let mut store = SettingsStore::load(&path);
    assert!(store.take_load_error().is_some());
    assert_eq!(store.settings().brightness, 1.0);
}

#[test]
fn unknown_keys_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "version: 1\ntheme: dark\ndefault_zoom: fit_width\nwindow_opacity: 0.5\n",
    )
    .unwrap();

    let mut store = SettingsStore::load(&path);
    assert!(store.take_load_error().is_none());
    assert_eq!(store.settings().theme, Theme::Dark);
    assert_eq!(
        store.settings().default_zoom,
        ZoomSetting::Fit(FitSetting::FitWidth)
    );
}

#[test]
fn empty_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "   \n").unwrap();

    let mut store = SettingsStore::load(&path);
    assert!(store.take_load_error().is_none());
    assert_eq!(store.settings(), &Settings::default());
}

#[test]
fn out_of_range_values_are_clamped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let recent: String = (0..15).map(|i| format!("  - /docs/{i}.pdf\n")).collect();
    fs::write(
        &path,
        format!("brightness: 0.0\nrecent_files_limit: 10\nrecent_files:\n{recent}"),
    )
    .unwrap();

    let settings = reload(&path);
    assert_eq!(settings.brightness, folio::render::adjust::MIN_BRIGHTNESS);
    assert_eq!(settings.recent_files.len(), 10);
    assert_eq!(
        settings.recent_files.most_recent(),
        Some(Path::new("/docs/0.pdf"))
    );
}

#[test]
fn every_mutation_is_written_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let doc = dir.path().join("paper.pdf");

    let mut store = SettingsStore::load(&path);
    store.cycle_theme();
    assert_eq!(reload(&path).theme, Theme::Dark);

    store.toggle_night_mode();
    store.adjust_brightness(-0.25);
    let settings = reload(&path);
    assert!(settings.night_mode);
    assert_eq!(settings.brightness, 0.75);

    store.add_recent_file(&doc);
    store.add_bookmark(&doc, 4, Some("Results".into()));
    store.set_window_geometry(WindowGeometry {
        width: 120,
        height: 40,
    });
    store.record_session(Some(LastSession {
        path: doc.clone(),
        page: 4,
    }));
    store.set_default_directory(Some(dir.path().to_path_buf()));

    let settings = reload(&path);
    assert_eq!(settings.recent_files.most_recent(), Some(doc.as_path()));
    assert_eq!(settings.bookmarks.len(), 1);
    let bookmark = settings.bookmarks.iter().next().unwrap();
    assert_eq!((bookmark.page, bookmark.title()), (4, "Results".to_string()));
    assert_eq!((settings.window.width, settings.window.height), (120, 40));
    assert_eq!(
        settings.last_session,
        Some(LastSession {
            path: doc.clone(),
            page: 4
        })
    );
    assert_eq!(settings.default_directory.as_deref(), Some(dir.path()));
}

#[test]
fn recent_files_are_bounded_and_most_recent_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let mut store = SettingsStore::load(&path);

    for i in 0..12 {
        store.add_recent_file(Path::new(&format!("/docs/{i}.docx")));
    }
    // Reopening moves an entry to the front without duplicating it
    store.add_recent_file(Path::new("/docs/5.docx"));

    let settings = reload(&path);
    let recent: Vec<_> = settings.recent_files.iter().collect();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0], Path::new("/docs/5.docx"));
    assert_eq!(recent[1], Path::new("/docs/11.docx"));
    assert!(!recent.contains(&Path::new("/docs/0.docx")));
    assert_eq!(recent.iter().filter(|p| **p == Path::new("/docs/5.docx")).count(), 1);

    store.remove_recent_file(Path::new("/docs/5.docx"));
    assert_eq!(reload(&path).recent_files.len(), 9);
}

#[test]
fn bookmarks_toggle_and_are_kept_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let a = Path::new("/docs/a.pdf");
    let b = Path::new("/docs/b.pdf");
    let mut store = SettingsStore::load(&path);

    assert!(store.toggle_bookmark(a, 0));
    assert!(store.add_bookmark(a, 3, None));
    assert!(!store.add_bookmark(a, 3, Some("Again".into())));
    assert!(store.add_bookmark(b, 3, None));

    let settings = reload(&path);
    assert_eq!(settings.bookmarks.len(), 3);
    assert_eq!(store.bookmarks_for(a).len(), 2);
    assert_eq!(store.bookmarks_for(b)[0].title(), "Page 4");

    assert!(!store.toggle_bookmark(a, 0));
    assert!(store.remove_bookmark(b, 3));
    assert!(!store.remove_bookmark(b, 3));
    assert_eq!(reload(&path).bookmarks.len(), 1);
}

#[test]
fn default_zoom_and_recent_limit_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let mut store = SettingsStore::load(&path);

    store.set_default_zoom(ZoomSetting::Factor(1.5));
    for i in 0..5 {
        store.add_recent_file(Path::new(&format!("/docs/{i}.pptx")));
    }
    store.set_recent_files_limit(3);

    let settings = reload(&path);
    assert_eq!(settings.default_zoom, ZoomSetting::Factor(1.5));
    assert_eq!(settings.default_zoom.to_zoom().percent(), 150);
    assert_eq!(settings.recent_files_limit, 3);
    assert_eq!(settings.recent_files.len(), 3);
    assert!(fs::read_to_string(&path).unwrap().contains("default_zoom: 1.5"));

    store.clear_recent_files();
    assert!(reload(&path).recent_files.is_empty());
}

#[test]
fn window_geometry_from_older_files_keeps_the_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "window:\n  width: 100\n  height: 30\n  x: 40\n  y: 20\n  maximized: true\n",
    )
    .unwrap();

    let mut store = SettingsStore::load(&path);
    assert!(store.take_load_error().is_none());
    assert_eq!(
        store.settings().window,
        WindowGeometry {
            width: 100,
            height: 30
        }
    );

    store.set_window_geometry(WindowGeometry {
        width: 80,
        height: 24,
    });
    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("maximized"));
}
