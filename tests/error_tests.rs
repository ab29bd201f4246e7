use dedoopsie::duplicates::{DuplicateFinder, FinderError};
use dedoopsie::scanner::{ScanError, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_scan_non_existent_path() {
    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates_in(
        std::path::Path::new("/non/existent/path/12345"),
        &WalkerConfig::default(),
    );

    match result {
        Err(FinderError::PathNotFound(path)) => {
            assert!(path.to_string_lossy().contains("non/existent/path/12345"));
        }
        other => panic!("Expected PathNotFound error, got {:?}", other.map(|(g, _)| g)),
    }
}

#[test]
fn test_scan_file_instead_of_directory() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("file.txt");
    File::create(&file_path).unwrap();

    let result = DuplicateFinder::with_defaults().find_duplicates_in(&file_path, &WalkerConfig::default());

    match result {
        Err(FinderError::NotADirectory(path)) => {
            assert!(path.to_string_lossy().contains("file.txt"));
        }
        other => panic!("Expected NotADirectory error, got {:?}", other.map(|(g, _)| g)),
    }
}

#[test]
fn test_file_disappearing_before_grouping() {
    let dir = tempdir().unwrap();
    let vanish = dir.path().join("vanish.txt");
    let dup = dir.path().join("dup.txt");
    let other = dir.path().join("other.txt");
    for path in [&vanish, &dup, &other] {
        File::create(path).unwrap().write_all(b"gone soon").unwrap();
    }

    let files = vec![vanish.clone(), dup, other];
    fs::remove_file(&vanish).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults().find_duplicates(files);

    assert_eq!(groups.len(), 1);
    assert!(!groups[0].contains(&vanish));
    assert_eq!(summary.warnings.len(), 1);
    assert!(matches!(&summary.warnings[0], ScanError::NotFound(p) if *p == vanish));
}

#[cfg(unix)]
#[test]
fn test_permission_denied_continues() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let sub = dir.path().join("no_access");
    fs::create_dir(&sub).unwrap();
    File::create(sub.join("hidden.txt"))
        .unwrap()
        .write_all(b"public")
        .unwrap();
    File::create(dir.path().join("ok.txt"))
        .unwrap()
        .write_all(b"public")
        .unwrap();

    fs::set_permissions(&sub, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read anyway; nothing to observe then.
    if fs::read_dir(&sub).is_err() {
        let (groups, summary) = DuplicateFinder::with_defaults()
            .find_duplicates_in(dir.path(), &WalkerConfig::default())
            .unwrap();

        assert_eq!(summary.total_files, 1);
        assert!(groups.is_empty());
        assert!(summary.has_warnings());
    }

    fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_invalid_utf8_path() {
    use std::os::unix::ffi::OsStrExt;
    let dir = tempdir().unwrap();
    let invalid_name = std::ffi::OsStr::from_bytes(&[0xff, 0xfe, 0xfd]);
    let file_path = dir.path().join(invalid_name);

    if let Ok(mut f) = File::create(&file_path) {
        f.write_all(b"invalid utf8").unwrap();
        File::create(dir.path().join("valid"))
            .unwrap()
            .write_all(b"invalid utf8")
            .unwrap();

        let (groups, summary) = DuplicateFinder::with_defaults()
            .find_duplicates_in(dir.path(), &WalkerConfig::default())
            .unwrap();

        assert_eq!(summary.total_files, 2);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].contains(&file_path));
    }
}
