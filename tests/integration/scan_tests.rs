use dedoopsie::duplicates::{find_duplicates, DuplicateFinder, FinderConfig};
use dedoopsie::scanner::{scan, HashAlgorithm, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_unique_file_and_three_duplicates() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("unique.txt"), b"I am unique");
    write(&dir.path().join("dupe1.txt"), b"same content");
    write(&dir.path().join("dupe2.txt"), b"same content");
    write(&dir.path().join("dupe3.txt"), b"same content");

    let report = scan(dir.path(), &WalkerConfig::default()).unwrap();
    assert_eq!(report.files.len(), 4);

    let groups = find_duplicates(report.files, false);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0].size, 12);
    for group in &groups {
        assert!(!group.contains(&dir.path().join("unique.txt")));
    }
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder
        .find_duplicates_in(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_zero_byte_duplicates() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1")).unwrap();
    File::create(dir.path().join("empty2")).unwrap();
    write(&dir.path().join("full"), b"x");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_in(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 0);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(groups[0].digest.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_duplicates_across_subdirectories() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("a").join("b").join("c");
    fs::create_dir_all(&deep).unwrap();
    write(&dir.path().join("top.bin"), b"payload");
    write(&deep.join("bottom.bin"), b"payload");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_in(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 7);
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"abcd");
    write(&dir.path().join("b"), b"abce");
    write(&dir.path().join("c"), b"abcf");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_in(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.hashed_files, 3);
    assert_eq!(summary.eliminated_by_size, 0);
}

#[test]
fn test_skip_hidden_excludes_dotfiles() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("visible.txt"), b"twin");
    write(&dir.path().join(".hidden.txt"), b"twin");

    let finder = DuplicateFinder::with_defaults();

    let (groups, _) = finder
        .find_duplicates_in(dir.path(), &WalkerConfig::default())
        .unwrap();
    assert_eq!(groups.len(), 1);

    let (groups, _) = finder
        .find_duplicates_in(dir.path(), &WalkerConfig::new(false, true))
        .unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_every_algorithm_agrees_on_grouping() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("x1"), b"xxxxxxxx");
    write(&dir.path().join("x2"), b"xxxxxxxx");
    write(&dir.path().join("y1"), b"yyyyyyyy");
    write(&dir.path().join("y2"), b"yyyyyyyy");
    write(&dir.path().join("z"), b"zzzzzzzz");

    for algorithm in [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Blake3,
    ] {
        let finder = DuplicateFinder::new(
            FinderConfig::default()
                .with_algorithm(algorithm)
                .with_chunk_size(3),
        );
        let (groups, _) = finder
            .find_duplicates_in(dir.path(), &WalkerConfig::default())
            .unwrap();

        assert_eq!(groups.len(), 2, "{algorithm}");
        assert!(groups.iter().all(|g| g.len() == 2));
    }
}

#[test]
fn test_groups_follow_traversal_order() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a_second"), b"22");
    write(&dir.path().join("b_first"), b"1");
    write(&dir.path().join("c_second"), b"22");
    write(&dir.path().join("d_first"), b"1");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates_in(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert!(groups[0].files[0].ends_with("a_second"));
    assert!(groups[0].files[1].ends_with("c_second"));
    assert!(groups[1].files[0].ends_with("b_first"));
}
