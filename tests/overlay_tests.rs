//! Resolution-order tests against real directories

use enginevfs::fs::{EntryKind, OverlayFileSystem};
use enginevfs::{Error, VfsConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Build a temp directory holding the given files
fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn overlay_of(roots: &[&Path]) -> OverlayFileSystem {
    let mut overlay = OverlayFileSystem::new();
    for root in roots {
        overlay.mount(*root).unwrap();
    }
    overlay
}

fn contents(overlay: &OverlayFileSystem, path: &str) -> Option<String> {
    overlay
        .open_for_input(Path::new(path))
        .unwrap()
        .map(|mut stream| stream.read_to_string().unwrap())
}

#[test]
fn base_and_override_scenario() {
    let base = tree(&[("a.txt", "base")]);
    let over = tree(&[("a.txt", "override"), ("b.txt", "only-override")]);
    let overlay = overlay_of(&[base.path(), over.path()]);

    let a = overlay.stat(Path::new("a.txt")).unwrap().unwrap();
    assert_eq!(a.kind, EntryKind::File);
    assert_eq!(a.size, 4);
    assert_eq!(
        overlay.containing_dir(Path::new("a.txt")).unwrap().as_deref(),
        Some(base.path())
    );
    assert_eq!(contents(&overlay, "a.txt").as_deref(), Some("base"));

    assert_eq!(
        overlay.containing_dir(Path::new("b.txt")).unwrap().as_deref(),
        Some(over.path())
    );
    assert_eq!(contents(&overlay, "b.txt").as_deref(), Some("only-override"));

    assert!(overlay.stat(Path::new("missing.txt")).unwrap().is_none());
    assert!(contents(&overlay, "missing.txt").is_none());
}

#[test]
fn reversing_mount_order_flips_winner() {
    let a = tree(&[("config.txt", "from A")]);
    let b = tree(&[("config.txt", "from B")]);

    let ab = overlay_of(&[a.path(), b.path()]);
    let ba = overlay_of(&[b.path(), a.path()]);

    assert_eq!(contents(&ab, "config.txt").as_deref(), Some("from A"));
    assert_eq!(contents(&ba, "config.txt").as_deref(), Some("from B"));
}

#[test]
fn earliest_holder_wins_among_many() {
    let m1 = tree(&[("other.txt", "1")]);
    let m2 = tree(&[("other.txt", "2")]);
    let m3 = tree(&[("deep/asset.bin", "three")]);
    let m4 = tree(&[("deep/asset.bin", "four")]);
    let overlay = overlay_of(&[m1.path(), m2.path(), m3.path(), m4.path()]);

    assert_eq!(
        overlay.containing_dir(Path::new("deep/asset.bin")).unwrap(),
        Some(m3.path().to_path_buf())
    );
    assert_eq!(contents(&overlay, "deep/asset.bin").as_deref(), Some("three"));
    // Leading slash resolves the same way
    assert_eq!(contents(&overlay, "/deep/asset.bin").as_deref(), Some("three"));
}

#[test]
fn duplicate_mount_changes_nothing_observable() {
    let a = tree(&[("x", "a")]);
    let b = tree(&[("x", "b"), ("y", "b")]);

    let once = overlay_of(&[a.path(), b.path()]);
    let twice = overlay_of(&[a.path(), a.path(), b.path()]);

    assert_eq!(twice.len(), once.len() + 1);
    for path in ["x", "y", "z"] {
        assert_eq!(contents(&once, path), contents(&twice, path));
        assert_eq!(
            once.containing_dir(Path::new(path)).unwrap(),
            twice.containing_dir(Path::new(path)).unwrap()
        );
    }
}

#[test]
fn missing_path_for_any_mount_count() {
    let roots: Vec<TempDir> = (0..4).map(|i| tree(&[("present", i.to_string().as_str())])).collect();

    for n in 0..=roots.len() {
        let paths: Vec<&Path> = roots[..n].iter().map(|d| d.path()).collect();
        let overlay = overlay_of(&paths);
        assert!(overlay.stat(Path::new("absent")).unwrap().is_none());
        assert!(!overlay.exists(Path::new("absent")).unwrap());
    }
}

#[test]
fn directory_is_not_a_file() {
    let base = tempdir().unwrap();
    fs::create_dir(base.path().join("levels")).unwrap();
    let overlay = overlay_of(&[base.path()]);

    assert!(overlay.stat(Path::new("levels")).unwrap().unwrap().is_dir());
    let err = overlay.open_for_input(Path::new("levels")).unwrap_err();
    assert!(err.is_access());
    assert!(!err.is_not_found());
}

#[test]
fn teardown_then_lookup_is_usage_error() {
    let base = tree(&[("a.txt", "base")]);
    let mut overlay = overlay_of(&[base.path(), base.path()]);

    assert_eq!(overlay.close(), 2);
    assert_eq!(overlay.close(), 0);
    assert!(overlay.is_empty());
    assert!(matches!(overlay.stat(Path::new("a.txt")), Err(Error::Closed)));
}

#[test]
fn overlay_from_config_file() {
    let base = tree(&[("shader.glsl", "base")]);
    let mods = tree(&[("shader.glsl", "mod"), ("extra.glsl", "mod")]);
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("vfs.json");

    let config = VfsConfig {
        mounts: vec![mods.path().to_path_buf(), base.path().to_path_buf()],
        follow_symlinks: true,
    };
    config.save(&config_path).unwrap();

    let overlay = OverlayFileSystem::from_config(&VfsConfig::load(&config_path).unwrap()).unwrap();
    assert_eq!(contents(&overlay, "shader.glsl").as_deref(), Some("mod"));
    assert_eq!(
        overlay.mount_roots()[..2],
        [PathBuf::from(mods.path()), PathBuf::from(base.path())]
    );
}

#[test]
fn union_listing_across_mounts() {
    let a = tree(&[("sfx/jump.wav", "a"), ("sfx/land.wav", "a")]);
    let b = tree(&[("sfx/land.wav", "b"), ("sfx/hurt.wav", "b")]);
    let overlay = overlay_of(&[a.path(), b.path()]);

    let names: Vec<String> = overlay
        .list_union(Path::new("sfx"))
        .unwrap()
        .into_iter()
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["hurt.wav", "jump.wav", "land.wav"]);

    let first: Vec<String> = overlay
        .open_directory(Path::new("sfx"))
        .unwrap()
        .unwrap()
        .collect_names()
        .unwrap()
        .into_iter()
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(first, ["jump.wav", "land.wav"]);
}
