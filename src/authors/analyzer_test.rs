use super::*;
use crate::test_support::{EPOCH, classified_by};

const ALICE: (&str, &str) = ("Alice", "alice@x.com");
const BOB: (&str, &str) = ("Bob", "bob@x.com");
const CAROL: (&str, &str) = ("Carol", "carol@x.com");

#[test]
fn test_bus_factor() {
    assert_eq!(bus_factor(&[]), 0);
    assert_eq!(bus_factor(&[0, 0]), 0);
    assert_eq!(bus_factor(&[10]), 1);
    assert_eq!(bus_factor(&[6, 4]), 1);
    // exactly half is not a majority
    assert_eq!(bus_factor(&[5, 5]), 2);
    assert_eq!(bus_factor(&[1, 1, 1, 1]), 3);
    // input order does not matter
    assert_eq!(bus_factor(&[1, 2, 7]), 1);
}

#[test]
fn test_critical_single_owner() {
    assert_eq!(classify_risk(&[100.0]), RiskLevel::Critical);
    assert_eq!(classify_risk(&[85.0, 15.0]), RiskLevel::Critical);
}

#[test]
fn test_high_risk() {
    assert_eq!(classify_risk(&[70.0, 30.0]), RiskLevel::High);
}

#[test]
fn test_medium_risk() {
    assert_eq!(classify_risk(&[50.0, 40.0, 10.0]), RiskLevel::Medium);
}

#[test]
fn test_low_risk() {
    assert_eq!(classify_risk(&[25.0, 25.0, 25.0, 25.0]), RiskLevel::Low);
    assert_eq!(classify_risk(&[]), RiskLevel::Low);
}

#[test]
fn test_risk_order() {
    assert!(RiskLevel::Critical.sort_key() < RiskLevel::High.sort_key());
    assert!(RiskLevel::Medium.sort_key() < RiskLevel::Low.sort_key());
}

fn history() -> Vec<ClassifiedCommit> {
    vec![
        classified_by(ALICE, "a1", EPOCH, "x", &[("src/a.rs", 10, 0), ("src/b.rs", 5, 1)]),
        classified_by(ALICE, "a2", EPOCH + 1, "x", &[("src/a.rs", 1, 1)]),
        classified_by(ALICE, "a3", EPOCH + 2, "x", &[("src/a.rs", 1, 1)]),
        classified_by(BOB, "b1", EPOCH + 3, "x", &[("docs/a.md", 4, 0)]),
        classified_by(CAROL, "c1", EPOCH + 4, "x", &[("docs/b.md", 2, 0), ("src/c.rs", 3, 0)]),
    ]
}

#[test]
fn test_author_stats_ranked() {
    let authors = author_stats(&history());
    let names: Vec<&str> = authors.iter().map(|a| a.name.as_str()).collect();
    // Bob and Carol tie on one commit, ordered by key
    assert_eq!(names, ["Alice", "Bob", "Carol"]);
    assert_eq!(authors[0].commits, 3);
    assert_eq!(authors[0].lines_added, 17);
    assert_eq!(authors[0].lines_deleted, 3);
    assert_eq!(authors[2].lines_added, 5);
}

#[test]
fn test_directory_authors() {
    let dirs = directory_authors(&history(), 1);
    assert_eq!(dirs.len(), 2);

    // src: Alice 3 of 4 commits -> 75% -> high
    let src = &dirs[0];
    assert_eq!(src.path, "src");
    assert_eq!(src.total_commits, 4);
    assert_eq!(src.top_contributor, "Alice");
    assert_eq!(src.top_share, 75.0);
    assert_eq!(src.bus_factor, 1);
    assert_eq!(src.risk, RiskLevel::High);
    assert_eq!(src.authors[0].lines_added, 17);
    assert_eq!(src.authors[1].name, "Carol");
    assert_eq!(src.authors[1].lines_added, 3);

    // docs: Bob and Carol split evenly -> medium
    let docs = &dirs[1];
    assert_eq!(docs.path, "docs");
    assert_eq!(docs.total_commits, 2);
    assert_eq!(docs.bus_factor, 2);
    assert_eq!(docs.risk, RiskLevel::Medium);
}

#[test]
fn test_same_person_under_one_key() {
    let commits = vec![
        classified_by(("alice", "Alice@X.com"), "a1", EPOCH, "x", &[("a", 1, 0)]),
        classified_by(ALICE, "a2", EPOCH, "x", &[("a", 1, 0)]),
    ];
    let authors = author_stats(&commits);
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].commits, 2);
}

#[test]
fn test_empty() {
    assert!(author_stats(&[]).is_empty());
    assert!(directory_authors(&[], 1).is_empty());
}
