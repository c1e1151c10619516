use super::*;
use crate::session::Options;
use crate::test_support::{DAY, EPOCH, Scenario, TESTER, TestRepo};

fn session(t: &TestRepo) -> Session {
    Session::open(t.path(), &Options::default()).unwrap()
}

fn statuses(f: &FileLifecycle) -> Vec<FileStatus> {
    f.history.iter().map(|s| s.status).collect()
}

#[test]
fn tracks_growth_shrinkage_and_deletion() {
    let t = TestRepo::new();
    t.commit(&[("a.rs", "1\n2\n")], "create", EPOCH);
    t.commit(&[("a.rs", "1\n2\n3\n4\n")], "grow", EPOCH + DAY);
    t.commit(&[("a.rs", "1\n")], "shrink", EPOCH + 2 * DAY);
    t.commit(&[("a.rs", "one\n")], "rewrite", EPOCH + 3 * DAY);
    t.commit(&[("b.rs", "x\n")], "unrelated", EPOCH + 4 * DAY);
    t.remove(&["a.rs"], "delete", EPOCH + 5 * DAY);

    let report = compute(&session(&t), &["a.rs".to_string()]).unwrap();
    let a = &report.files[0];
    assert_eq!(
        statuses(a),
        [
            FileStatus::Deleted,
            FileStatus::Modified,
            FileStatus::Shrunk,
            FileStatus::Grown,
            FileStatus::Created,
        ]
    );
    assert!(!a.exists);
    assert_eq!(a.current_lines, None);

    let lines: Vec<Option<usize>> = a.history.iter().map(|s| s.lines).collect();
    assert_eq!(lines, [None, Some(1), Some(1), Some(4), Some(2)]);
    assert_eq!(a.history[2].net_change, -3);
    assert_eq!(a.history[3].net_change, 2);
    assert_eq!(a.history[4].message, "create");
    assert_eq!(a.history[4].date, "2023-11-14");
}

#[test]
fn surviving_file_reports_current_lines() {
    let t = TestRepo::new();
    t.commit(&[("a.rs", "1\n2\n3\n")], "create", EPOCH);
    let report = compute(&session(&t), &["a.rs".to_string(), "nope.rs".to_string()]).unwrap();
    assert_eq!(report.files.len(), 2);
    assert!(report.files[0].exists);
    assert_eq!(report.files[0].current_lines, Some(3));
    assert!(!report.files[1].exists);
    assert!(report.files[1].history.is_empty());
}

#[test]
fn file_merged_from_branch_is_not_recreated() {
    let s = Scenario::build();
    let session = Session::open(s.repo.path(), &Options::default()).unwrap();
    let report = compute(&session, &["docs/guide.md".to_string()]).unwrap();
    let guide = &report.files[0];
    // merge first (newest), then the branch commit that created it
    assert_eq!(statuses(guide), [FileStatus::Grown, FileStatus::Created]);
    assert!(guide.exists);
}

#[test]
fn reverted_file_ends_deleted() {
    let s = Scenario::build();
    let session = Session::open(s.repo.path(), &Options::default()).unwrap();
    let report = compute(&session, &["src/parser.rs".to_string()]).unwrap();
    let parser = &report.files[0];
    assert_eq!(statuses(parser), [FileStatus::Deleted, FileStatus::Created]);
    assert!(!parser.exists);
}

#[test]
fn non_utf8_file_is_modified_not_deleted() {
    let t = TestRepo::new();
    t.commit_bytes(TESTER, &[("latin1.txt", &b"caf\xe9\n"[..])], "add", EPOCH);
    t.commit_bytes(TESTER, &[("latin1.txt", &b"caf\xe9\nna\xefve\n"[..])], "edit", EPOCH + DAY);

    let report = compute(&session(&t), &["latin1.txt".to_string()]).unwrap();
    let f = &report.files[0];
    assert!(f.exists);
    assert_eq!(f.current_lines, Some(2));
    assert_eq!(statuses(f), [FileStatus::Grown, FileStatus::Created]);
    assert_eq!(f.history[0].lines, Some(2));
}

#[test]
fn bom_prefixed_file_still_exists() {
    // UTF-16 BOM makes libgit2 treat the diff as binary
    let t = TestRepo::new();
    t.commit_bytes(TESTER, &[("bom.txt", &b"\xff\xfe\n"[..])], "add", EPOCH);
    t.commit_bytes(TESTER, &[("bom.txt", &b"\xff\xfe\n\xe9\n"[..])], "edit", EPOCH + DAY);

    let report = compute(&session(&t), &["bom.txt".to_string()]).unwrap();
    let f = &report.files[0];
    assert!(f.exists);
    assert_eq!(f.current_lines, Some(2));
    let s = statuses(f);
    assert_eq!(s.len(), 2);
    assert_ne!(s[0], FileStatus::Deleted);
    assert_eq!(s[1], FileStatus::Created);
}

#[test]
fn rename_ends_old_path_and_starts_new_one() {
    let t = TestRepo::new();
    t.commit(&[("a.rs", "1\n2\n3\n")], "create", EPOCH);
    t.rename("a.rs", "b.rs", "move", EPOCH + DAY);

    let files = ["a.rs".to_string(), "b.rs".to_string()];
    let report = compute(&session(&t), &files).unwrap();

    let old = &report.files[0];
    assert!(!old.exists);
    assert_eq!(statuses(old), [FileStatus::Deleted, FileStatus::Created]);
    assert_eq!(old.history[0].deletions, 3);
    assert_eq!(old.history[0].net_change, -3);
    assert_eq!(old.history[0].lines, None);

    let new = &report.files[1];
    assert!(new.exists);
    assert_eq!(new.current_lines, Some(3));
    assert_eq!(statuses(new), [FileStatus::Created]);
    assert_eq!(new.history[0].message, "move");
}
