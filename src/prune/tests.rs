use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use proptest::prelude::*;
use tempfile::TempDir;

use super::{PrefixClass, PrefixPolicy, PruneAction, PruneSpec, TreePruner};
use crate::report::Severity;

const DAY: u64 = 24 * 60 * 60;

fn set_age(path: &Path, now: SystemTime, age_days: u64) {
    let mtime = now - Duration::from_secs(age_days * DAY);
    filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
}

/// Create `relative` under `root` and back-date it. Call deepest-first, as
/// creating a child updates the parent's mtime.
fn make_dir(root: &Path, relative: &str, now: SystemTime, age_days: u64) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(&path).unwrap();
    set_age(&path, now, age_days);
    path
}

fn prune(root: &Path, now: SystemTime) -> super::PruneOutcome {
    TreePruner::builder()
        .now(now)
        .build()
        .prune(&PruneSpec::new(root, PrefixPolicy::default()))
}

fn actions(outcome: &super::PruneOutcome, root: &Path) -> Vec<(String, PruneAction)> {
    outcome
        .report
        .prunes()
        .map(|d| {
            let relative = d
                .directory_path
                .strip_prefix(root)
                .unwrap()
                .display()
                .to_string();
            (relative, d.action)
        })
        .collect()
}

#[test]
fn test_prefix_classes() {
    assert_eq!(PrefixClass::of("3xyz"), Some(PrefixClass::LongLived));
    assert_eq!(PrefixClass::of("4"), Some(PrefixClass::LongLived));
    assert_eq!(PrefixClass::of("0abc"), Some(PrefixClass::Standard));
    assert_eq!(PrefixClass::of("9abc"), Some(PrefixClass::Standard));
    assert_eq!(PrefixClass::of("textname"), None);
    assert_eq!(PrefixClass::of("_3"), None);
    assert_eq!(PrefixClass::of(""), None);
}

#[test]
fn test_policy_thresholds() {
    let policy = PrefixPolicy::default();
    assert_eq!(policy.threshold(PrefixClass::LongLived), 365);
    assert_eq!(policy.threshold(PrefixClass::Standard), 30);
    assert_eq!(policy.classify("3abc"), Some((PrefixClass::LongLived, 365)));
    assert_eq!(policy.classify("abc"), None);

    let policy = PrefixPolicy::new(90, 7).with_threshold(PrefixClass::Standard, 14);
    assert_eq!(policy.threshold(PrefixClass::LongLived), 90);
    assert_eq!(policy.threshold(PrefixClass::Standard), 14);
}

#[test]
fn test_aged_children_by_prefix_class() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let now = SystemTime::now();
    make_dir(root, "3xyz", now, 400);
    make_dir(root, "9abc", now, 400);
    make_dir(root, "textname", now, 400);

    let outcome = prune(root, now);
    assert_eq!(
        actions(&outcome, root),
        vec![
            (String::new(), PruneAction::SkipRoot),
            ("3xyz".to_string(), PruneAction::Prune),
            ("9abc".to_string(), PruneAction::Prune),
            ("textname".to_string(), PruneAction::Descend),
        ]
    );
    assert_eq!(outcome.pruned, vec![root.join("3xyz"), root.join("9abc")]);
    assert!(!root.join("3xyz").exists());
    assert!(!root.join("9abc").exists());
    assert!(root.join("textname").is_dir());
    assert!(root.is_dir());
}

#[test]
fn test_young_parent_descends_into_aged_grandchild() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let now = SystemTime::now();
    make_dir(root, "3xyz/3sub", now, 400);
    set_age(&root.join("3xyz"), now, 10);

    let outcome = prune(root, now);
    assert_eq!(
        actions(&outcome, root),
        vec![
            (String::new(), PruneAction::SkipRoot),
            ("3xyz".to_string(), PruneAction::Descend),
            ("3xyz/3sub".to_string(), PruneAction::Prune),
        ]
    );
    assert!(root.join("3xyz").is_dir());
    assert!(!root.join("3xyz/3sub").exists());
}

#[test]
fn test_pruned_subtree_is_not_visited() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let now = SystemTime::now();
    make_dir(root, "3xyz/3sub", now, 400);
    set_age(&root.join("3xyz"), now, 400);

    let outcome = prune(root, now);
    assert_eq!(
        actions(&outcome, root),
        vec![
            (String::new(), PruneAction::SkipRoot),
            ("3xyz".to_string(), PruneAction::Prune),
        ]
    );
    assert_eq!(outcome.pruned, vec![root.join("3xyz")]);
    assert!(!outcome.report.has_errors());
}

#[test]
fn test_thresholds_must_be_exceeded() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let now = SystemTime::now();
    make_dir(root, "3exact", now, 365);
    make_dir(root, "4young", now, 200);
    make_dir(root, "5exact", now, 30);
    make_dir(root, "6old", now, 31);

    let outcome = prune(root, now);
    assert_eq!(
        actions(&outcome, root),
        vec![
            (String::new(), PruneAction::SkipRoot),
            ("3exact".to_string(), PruneAction::Descend),
            ("4young".to_string(), PruneAction::Descend),
            ("5exact".to_string(), PruneAction::Descend),
            ("6old".to_string(), PruneAction::Prune),
        ]
    );
}

#[test]
fn test_root_is_never_pruned() {
    let temp_dir = TempDir::new().unwrap();
    let root = make_dir(temp_dir.path(), "1root", SystemTime::now(), 0);
    let now = SystemTime::now();
    set_age(&root, now, 1_000);

    let outcome = prune(&root, now);
    let decisions: Vec<_> = outcome.report.prunes().collect();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].action, PruneAction::SkipRoot);
    assert!(root.is_dir());
}

#[test]
fn test_decision_counts_children() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let now = SystemTime::now();
    fs::create_dir_all(root.join("name/a")).unwrap();
    fs::create_dir_all(root.join("name/b")).unwrap();
    fs::write(root.join("name/file.txt"), "x").unwrap();
    fs::write(root.join("top.txt"), "x").unwrap();

    let outcome = prune(root, now);
    let by_path: BTreeMap<_, _> = outcome
        .report
        .prunes()
        .map(|d| (d.directory_path.clone(), d.clone()))
        .collect();

    let root_decision = &by_path[root];
    assert_eq!(root_decision.child_dir_count, 1);
    assert_eq!(root_decision.child_file_count, 1);

    let named = &by_path[&root.join("name")];
    assert_eq!(named.child_dir_count, 2);
    assert_eq!(named.child_file_count, 1);
    assert_eq!(named.prefix_class, None);
    assert_eq!(named.action, PruneAction::Descend);
}

#[test]
fn test_files_are_not_pruned() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let now = SystemTime::now();
    let file = root.join("3old.tar");
    fs::write(&file, "x").unwrap();
    set_age(&file, now, 1_000);

    let outcome = prune(root, now);
    assert!(file.exists());
    assert_eq!(outcome.report.prunes().count(), 1);
}

#[test]
fn test_missing_root_is_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    let outcome = prune(&temp_dir.path().join("missing"), SystemTime::now());
    assert!(outcome.pruned.is_empty());
    assert_eq!(outcome.report.count(Severity::Warning), 1);
    assert_eq!(outcome.report.prunes().count(), 0);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directories_are_not_followed() {
    use std::os::unix::fs::symlink;

    let temp_dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let now = SystemTime::now();
    let target = make_dir(elsewhere.path(), "1target", now, 400);
    symlink(&target, temp_dir.path().join("1link")).unwrap();

    let outcome = prune(temp_dir.path(), now);
    assert_eq!(outcome.report.prunes().count(), 1);
    assert!(target.is_dir());
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_uninspectable_node_is_skipped_and_siblings_visited() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let now = SystemTime::now();
    let locked = make_dir(root, "1locked", now, 400);
    make_dir(root, "7old", now, 40);
    set_mode(&locked, 0o000);

    // Permission bits do not restrict root
    if fs::read_dir(&locked).is_ok() {
        set_mode(&locked, 0o700);
        return;
    }

    let outcome = prune(root, now);
    set_mode(&locked, 0o700);

    assert_eq!(
        actions(&outcome, root),
        vec![
            (String::new(), PruneAction::SkipRoot),
            ("7old".to_string(), PruneAction::Prune),
        ]
    );
    assert_eq!(outcome.report.count(Severity::Error), 1);
    let failure = outcome
        .report
        .entries()
        .iter()
        .find(|e| e.severity == Severity::Error)
        .unwrap();
    assert_eq!(failure.path.as_deref(), Some(locked.as_path()));
    assert!(locked.is_dir());
    assert_eq!(outcome.pruned, vec![root.join("7old")]);
}

#[cfg(unix)]
#[test]
fn test_partially_removed_tree_is_reported_not_listed() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let now = SystemTime::now();
    let inner = root.join("7old/inner");
    fs::create_dir_all(&inner).unwrap();
    let stuck = inner.join("stuck.dat");
    fs::write(&stuck, "x").unwrap();
    set_mode(&inner, 0o500);
    set_age(&root.join("7old"), now, 40);

    // Permission bits do not restrict root
    if fs::write(inner.join("probe-write"), "x").is_ok() {
        set_mode(&inner, 0o700);
        return;
    }

    let outcome = prune(root, now);
    set_mode(&inner, 0o700);

    assert_eq!(
        actions(&outcome, root),
        vec![
            (String::new(), PruneAction::SkipRoot),
            ("7old".to_string(), PruneAction::Prune),
        ]
    );
    assert!(outcome.report.count(Severity::Error) >= 1);
    assert!(
        outcome
            .report
            .entries()
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .all(|e| e.message.starts_with("Failed to delete"))
    );
    assert!(outcome.pruned.is_empty());
    assert!(stuck.exists());
}

/// Two-level tree: child name -> (age, grandchild name -> age)
type Tree = BTreeMap<String, (u64, BTreeMap<String, u64>)>;

fn tree_strategy() -> impl Strategy<Value = Tree> {
    let name = "[0-9a-c][a-z0-9]{0,4}";
    let age = 0u64..500;
    prop::collection::btree_map(
        name,
        (age.clone(), prop::collection::btree_map(name, age, 0..4)),
        0..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_walk_never_revisits_or_enters_pruned(tree in tree_strategy()) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let now = SystemTime::now();
        for (child, (child_age, grandchildren)) in &tree {
            for (grandchild, age) in grandchildren {
                make_dir(root, &format!("{child}/{grandchild}"), now, *age);
            }
            make_dir(root, child, now, *child_age);
        }

        let outcome = prune(root, now);
        let decisions: Vec<_> = outcome.report.prunes().cloned().collect();

        let mut seen = HashSet::new();
        for decision in &decisions {
            prop_assert!(seen.insert(decision.directory_path.clone()));
        }

        for pruned in decisions.iter().filter(|d| d.action == PruneAction::Prune) {
            let below = decisions.iter().filter(|d| {
                d.directory_path != pruned.directory_path
                    && d.directory_path.starts_with(&pruned.directory_path)
            });
            prop_assert_eq!(below.count(), 0);
            prop_assert!(!pruned.directory_path.exists());
        }

        for decision in &decisions {
            let name = decision.directory_path.file_name().unwrap().to_string_lossy();
            if decision.directory_path != root && PrefixClass::of(&name).is_none() {
                prop_assert_eq!(decision.action, PruneAction::Descend);
            }
        }

        for (child, (child_age, grandchildren)) in &tree {
            let child_path = root.join(child);
            let child_pruned = PrefixPolicy::default()
                .classify(child)
                .is_some_and(|(_, threshold)| *child_age > threshold);
            prop_assert_eq!(child_pruned, !child_path.exists());
            if !child_pruned {
                for grandchild in grandchildren.keys() {
                    prop_assert!(seen.contains(&child_path.join(grandchild)));
                }
            }
        }
    }
}
