use std::cell::Cell;

use super::*;
use crate::classify::{CommitKind, RuleSource};
use crate::error::Error;
use crate::test_support::{DAY, EPOCH, TestRepo};

fn open(t: &TestRepo, options: Options) -> Session {
    Session::open(t.path(), &options).unwrap()
}

#[test]
fn commits_are_classified_newest_first() {
    let t = TestRepo::new();
    t.commit(&[("a.rs", "1")], "feat: add a", EPOCH);
    t.commit(&[("a.rs", "2")], "fix: [CORE-9] broken a", EPOCH + DAY);

    let session = open(&t, Options::default());
    let commits = session.commits(TimeRange::all(), Detail::Files).unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].kind(), CommitKind::Fix);
    assert_eq!(commits[0].class.ticket.as_deref(), Some("CORE-9"));
    assert_eq!(commits[1].kind(), CommitKind::Feat);
    assert_eq!(commits[1].class.source, RuleSource::Conventional);
    assert_eq!(commits[1].author.key, "test@test.com");
}

#[test]
fn authors_go_through_mailmap() {
    let t = TestRepo::new();
    t.commit_by(("al", "al@old.io"), &[("a.rs", "1")], "init", EPOCH);
    t.write_mailmap("Alice <alice@new.io> <al@old.io>\n");

    let session = open(&t, Options::default());
    let commits = session.commits(TimeRange::all(), Detail::Files).unwrap();
    assert_eq!(commits[0].author.name, "Alice");
    assert_eq!(commits[0].author.key, "alice@new.io");
}

#[test]
fn invalid_date_is_an_input_error() {
    let t = TestRepo::new();
    let options = Options {
        since: Some("yesterday".into()),
        ..Options::default()
    };
    let err = Session::open(t.path(), &options).err().unwrap();
    assert!(matches!(err, Error::InvalidDate { flag: "since", .. }));
}

#[test]
fn inverted_range_is_rejected() {
    let t = TestRepo::new();
    let options = Options {
        since: Some("2024-02-01".into()),
        until: Some("2024-01-01".into()),
        ..Options::default()
    };
    let err = Session::open(t.path(), &options).err().unwrap();
    assert!(matches!(err, Error::InvertedRange));
}

#[test]
fn malformed_config_is_an_input_error() {
    let t = TestRepo::new();
    std::fs::write(t.path().join(crate::config::CONFIG_FILE), "[patterns\n").unwrap();
    let err = Session::open(t.path(), &Options::default()).err().unwrap();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn ml_without_model_dir_is_rules_only() {
    let t = TestRepo::new();
    let options = Options {
        ml: true,
        ..Options::default()
    };
    let session = open(&t, options);
    assert_eq!(session.classifier().mode(), "rules");
}

#[test]
fn cached_computes_once_per_head() {
    let t = TestRepo::new();
    t.commit(&[("a.rs", "1")], "init", EPOCH);
    let session = open(&t, Options::default());
    let calls = Cell::new(0);
    let compute = |_: &Session| {
        calls.set(calls.get() + 1);
        Ok(vec![1u32, 2, 3])
    };

    let key = CacheKey::new("test", TimeRange::all());
    assert_eq!(session.cached(key.clone(), compute).unwrap(), vec![1, 2, 3]);
    assert_eq!(session.cached(key.clone(), compute).unwrap(), vec![1, 2, 3]);
    assert_eq!(calls.get(), 1, "second call is served from the cache");

    t.commit(&[("a.rs", "2")], "next", EPOCH + DAY);
    session.cached(key, compute).unwrap();
    assert_eq!(calls.get(), 2, "new HEAD invalidates the entry");
}

#[test]
fn no_cache_always_computes() {
    let t = TestRepo::new();
    t.commit(&[("a.rs", "1")], "init", EPOCH);
    let session = open(
        &t,
        Options {
            no_cache: true,
            ..Options::default()
        },
    );
    let calls = Cell::new(0);
    let compute = |_: &Session| {
        calls.set(calls.get() + 1);
        Ok(0u8)
    };
    let key = CacheKey::new("test", TimeRange::all());
    session.cached(key.clone(), compute).unwrap();
    session.cached(key, compute).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn unborn_head_skips_cache() {
    let t = TestRepo::new();
    let session = open(&t, Options::default());
    let calls = Cell::new(0);
    let compute = |_: &Session| {
        calls.set(calls.get() + 1);
        Ok(0u8)
    };
    let key = CacheKey::new("test", TimeRange::all());
    session.cached(key.clone(), compute).unwrap();
    session.cached(key, compute).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn limit_truncates() {
    let mut v = vec![1, 2, 3, 4];
    apply_limit(&mut v, Some(2));
    assert_eq!(v, vec![1, 2]);
    apply_limit(&mut v, None);
    assert_eq!(v, vec![1, 2]);
}
