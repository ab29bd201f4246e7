use dedoopsie::actions::{
    generate_safe_path, safe_move, RelocateProgressCallback, RelocationOutcome, Relocator,
};
use dedoopsie::scanner::{hash_file, HashAlgorithm};
use filetime::FileTime;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_collision_naming_skips_existing_suffixes() {
    let dest = tempdir().unwrap();
    for name in ["dupe.txt", "dupe-00001.txt", "dupe-00002.txt"] {
        fs::write(dest.path().join(name), name).unwrap();
    }

    let path = generate_safe_path(dest.path(), OsStr::new("dupe.txt"));

    assert_eq!(path, dest.path().join("dupe-00003.txt"));
    assert!(!path.exists());
}

#[test]
fn test_round_trip_preserves_content_and_times() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    let source = src.path().join("report.pdf");
    fs::write(&source, b"%PDF-1.7 not really").unwrap();
    let atime = FileTime::from_unix_time(1_650_000_000, 0);
    let mtime = FileTime::from_unix_time(1_600_000_000, 0);
    filetime::set_file_times(&source, atime, mtime).unwrap();
    let before = hash_file(&source, HashAlgorithm::Sha256).unwrap();

    let result = Relocator::new(true)
        .with_algorithm(HashAlgorithm::Sha256)
        .relocate(&source, dest.path());

    let RelocationOutcome::Success { destination } = &result.outcome else {
        panic!("expected success, got {:?}", result.outcome);
    };
    assert!(!source.exists());

    // Read times before hashing, which would bump the access time
    let metadata = fs::metadata(destination).unwrap();
    assert_eq!(FileTime::from_last_access_time(&metadata), atime);
    assert_eq!(FileTime::from_last_modification_time(&metadata), mtime);
    assert_eq!(hash_file(destination, HashAlgorithm::Sha256).unwrap(), before);
}

#[test]
fn test_moving_many_same_named_files() {
    let dest = tempdir().unwrap();
    let mut destinations = Vec::new();

    for i in 0..3 {
        let src = tempdir().unwrap();
        let source = src.path().join("IMG_0001.jpg");
        fs::write(&source, format!("frame {i}")).unwrap();
        let result = safe_move(&source, dest.path(), true);
        assert!(result.is_success());
        destinations.push(result.destination().to_path_buf());
    }

    assert_eq!(destinations[0], dest.path().join("IMG_0001.jpg"));
    assert_eq!(destinations[1], dest.path().join("IMG_0001-00001.jpg"));
    assert_eq!(destinations[2], dest.path().join("IMG_0001-00002.jpg"));
    assert_eq!(fs::read_to_string(&destinations[2]).unwrap(), "frame 2");
}

struct Scribbler;

impl RelocateProgressCallback for Scribbler {
    fn on_copied(&self, _source: &Path, destination: &Path) {
        let mut bytes = fs::read(destination).unwrap();
        bytes[0] ^= 0xff;
        fs::write(destination, bytes).unwrap();
    }
}

#[test]
fn test_no_loss_when_copy_is_corrupted() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    let source = src.path().join("only-copy.dat");
    fs::write(&source, b"irreplaceable").unwrap();

    let result = Relocator::new(true).relocate_with(&source, dest.path(), Some(&Scribbler));

    match &result.outcome {
        RelocationOutcome::Failure { destination, cause } => {
            assert_eq!(cause, "hash mismatch after copy");
            assert_eq!(destination, &dest.path().join("only-copy.dat"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(fs::read(&source).unwrap(), b"irreplaceable");
}

#[test]
fn test_failure_never_panics_or_errors() {
    let dest = tempdir().unwrap();
    let result = safe_move(Path::new("/definitely/not/here.txt"), dest.path(), true);

    assert!(!result.is_success());
    assert!(result.cause().is_some());
    assert_eq!(result.destination(), dest.path().join("here.txt"));
}
