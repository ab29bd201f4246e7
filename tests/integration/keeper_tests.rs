use dedoopsie::duplicates::{find_duplicates, select_keeper, DuplicateGroup, KeeperStrategy};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const T0: i64 = 1_700_000_000;

/// Three identical files stamped T-2, T0 and T-1 (in that encounter order).
fn stamped_group() -> (TempDir, DuplicateGroup, [PathBuf; 3]) {
    let dir = tempdir().unwrap();
    let oldest = dir.path().join("a_oldest.txt");
    let newest = dir.path().join("b_newest.txt");
    let middle = dir.path().join("c_middle.txt");

    for (path, offset) in [(&oldest, -2 * 3600), (&newest, 0), (&middle, -3600)] {
        fs::write(path, "identical").unwrap();
        filetime::set_file_mtime(path, FileTime::from_unix_time(T0 + offset, 0)).unwrap();
    }

    let mut groups = find_duplicates(vec![oldest.clone(), newest.clone(), middle.clone()], false);
    assert_eq!(groups.len(), 1);
    let group = groups.remove(0);
    (dir, group, [oldest, newest, middle])
}

#[test]
fn test_oldest_and_newest_follow_mtime() {
    let (_dir, group, [oldest, newest, _]) = stamped_group();

    assert_eq!(select_keeper(&group, KeeperStrategy::Oldest), oldest.as_path());
    assert_eq!(select_keeper(&group, KeeperStrategy::Newest), newest.as_path());
}

#[test]
fn test_first_is_encounter_order() {
    let (_dir, group, [oldest, _, _]) = stamped_group();
    assert_eq!(select_keeper(&group, KeeperStrategy::First), oldest.as_path());
}

#[test]
fn test_equal_mtimes_keep_first_encountered() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = ["x", "y", "z"]
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, "same").unwrap();
            filetime::set_file_mtime(&path, FileTime::from_unix_time(T0, 0)).unwrap();
            path
        })
        .collect();

    let groups = find_duplicates(paths.clone(), false);

    assert_eq!(select_keeper(&groups[0], KeeperStrategy::Oldest), paths[0].as_path());
    assert_eq!(select_keeper(&groups[0], KeeperStrategy::Newest), paths[0].as_path());
}

#[test]
fn test_longest_path_wins() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("much").join("deeper");
    fs::create_dir_all(&nested).unwrap();
    let short = dir.path().join("f");
    let long = nested.join("f");
    fs::write(&short, "twin").unwrap();
    fs::write(&long, "twin").unwrap();

    let groups = find_duplicates(vec![short, long.clone()], false);

    assert_eq!(select_keeper(&groups[0], KeeperStrategy::Longest), long.as_path());
}

#[test]
fn test_vanished_member_is_not_preferred() {
    let (_dir, group, [oldest, newest, middle]) = stamped_group();
    fs::remove_file(&oldest).unwrap();

    assert_eq!(select_keeper(&group, KeeperStrategy::Oldest), middle.as_path());
    assert_eq!(select_keeper(&group, KeeperStrategy::Newest), newest.as_path());
}

#[test]
fn test_selection_is_repeatable() {
    let (_dir, group, _) = stamped_group();
    for strategy in [
        KeeperStrategy::First,
        KeeperStrategy::Oldest,
        KeeperStrategy::Newest,
        KeeperStrategy::Longest,
    ] {
        let first: &Path = select_keeper(&group, strategy);
        assert_eq!(select_keeper(&group, strategy), first);
        assert!(group.contains(first));
    }
}
