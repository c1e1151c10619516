//! Temporary git repositories for tests. Trees are built in the object
//! database directly, the working directory is never touched.

use std::path::Path;

use git2::build::TreeUpdateBuilder;
use git2::{FileMode, Oid, Repository, Signature, Time, Tree};

pub const DAY: i64 = 86_400;
pub const HOUR: i64 = 3_600;
pub const MINUTE: i64 = 60;

/// 2023-11-14 22:13:20 UTC
pub const EPOCH: i64 = 1_700_000_000;

pub const TESTER: (&str, &str) = ("Test", "test@test.com");

pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", TESTER.0).unwrap();
        config.set_str("user.email", TESTER.1).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit on HEAD as the default tester.
    pub fn commit(&self, files: &[(&str, &str)], message: &str, epoch: i64) -> Oid {
        self.commit_by(TESTER, files, message, epoch)
    }

    pub fn commit_by(
        &self,
        author: (&str, &str),
        files: &[(&str, &str)],
        message: &str,
        epoch: i64,
    ) -> Oid {
        let files: Vec<(&str, &[u8])> = files.iter().map(|(p, c)| (*p, c.as_bytes())).collect();
        self.commit_bytes(author, &files, message, epoch)
    }

    /// Commit raw file contents on HEAD.
    pub fn commit_bytes(
        &self,
        author: (&str, &str),
        files: &[(&str, &[u8])],
        message: &str,
        epoch: i64,
    ) -> Oid {
        let parents: Vec<Oid> = self.head().into_iter().collect();
        self.write(Some("HEAD"), &parents, author, files, &[], message, epoch)
    }

    /// Commit on HEAD moving `from` to `to` unchanged.
    pub fn rename(&self, from: &str, to: &str, message: &str, epoch: i64) -> Oid {
        let head = self.head().expect("rename needs a HEAD commit");
        let tree = self.repo.find_commit(head).unwrap().tree().unwrap();
        let blob = self
            .repo
            .find_blob(tree.get_path(Path::new(from)).unwrap().id())
            .unwrap();
        let content = blob.content().to_vec();
        self.write(Some("HEAD"), &[head], TESTER, &[(to, content.as_slice())], &[from], message, epoch)
    }

    /// Commit on HEAD deleting `paths`.
    pub fn remove(&self, paths: &[&str], message: &str, epoch: i64) -> Oid {
        let parents: Vec<Oid> = self.head().into_iter().collect();
        self.write(Some("HEAD"), &parents, TESTER, &[], paths, message, epoch)
    }

    /// Commit on top of `parent` without moving HEAD.
    pub fn side_commit(
        &self,
        parent: Oid,
        files: &[(&str, &str)],
        message: &str,
        epoch: i64,
    ) -> Oid {
        let files: Vec<(&str, &[u8])> = files.iter().map(|(p, c)| (*p, c.as_bytes())).collect();
        self.write(None, &[parent], TESTER, &files, &[], message, epoch)
    }

    /// Merge `theirs` into HEAD. The merge takes `theirs`' tree, so `theirs`
    /// must descend from the current HEAD.
    pub fn merge(&self, theirs: Oid, message: &str, epoch: i64) -> Oid {
        let ours = self.head().expect("merge needs a HEAD commit");
        let tree = self.repo.find_commit(theirs).unwrap().tree().unwrap();
        let parents = [ours, theirs];
        self.create(Some("HEAD"), &parents, TESTER, &tree, message, epoch)
    }

    pub fn head(&self) -> Option<Oid> {
        self.repo.head().ok().and_then(|h| h.target())
    }

    pub fn write_mailmap(&self, content: &str) {
        std::fs::write(self.path().join(".mailmap"), content).unwrap();
    }

    #[allow(clippy::too_many_arguments)]
    fn write(
        &self,
        update_ref: Option<&str>,
        parents: &[Oid],
        author: (&str, &str),
        upserts: &[(&str, &[u8])],
        removals: &[&str],
        message: &str,
        epoch: i64,
    ) -> Oid {
        let base = match parents.first() {
            Some(p) => self.repo.find_commit(*p).unwrap().tree().unwrap(),
            None => self.empty_tree(),
        };
        let mut builder = TreeUpdateBuilder::new();
        for (path, content) in upserts {
            let blob = self.repo.blob(content).unwrap();
            builder.upsert(*path, blob, FileMode::Blob);
        }
        for path in removals {
            builder.remove(*path);
        }
        let tree_oid = builder.create_updated(&self.repo, &base).unwrap();
        let tree = self.repo.find_tree(tree_oid).unwrap();
        self.create(update_ref, parents, author, &tree, message, epoch)
    }

    fn create(
        &self,
        update_ref: Option<&str>,
        parents: &[Oid],
        author: (&str, &str),
        tree: &Tree<'_>,
        message: &str,
        epoch: i64,
    ) -> Oid {
        let sig = Signature::new(author.0, author.1, &Time::new(epoch, 0)).unwrap();
        let parent_commits: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|p| self.repo.find_commit(*p).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();
        self.repo
            .commit(update_ref, &sig, &sig, message, tree, &parent_refs)
            .unwrap()
    }

    fn empty_tree(&self) -> Tree<'_> {
        let oid = self.repo.treebuilder(None).unwrap().write().unwrap();
        self.repo.find_tree(oid).unwrap()
    }
}

/// Ten-commit history: one merge, one revert, two feats followed within an
/// hour by two fixes on the same file, four unrelated commits.
pub struct Scenario {
    pub repo: TestRepo,
    pub feat_lexer: Oid,
    pub fixes: [Oid; 2],
}

impl Scenario {
    pub fn build() -> Self {
        let t = TestRepo::new();
        let d0 = EPOCH;
        t.commit(&[("README.md", "# demo\n")], "initial commit", d0);
        t.commit(&[("README.md", "# demo\n\nusage\n")], "update readme", d0 + DAY);
        t.commit(&[("src/parser.rs", "pub fn parse() {}\n")], "feat: add parser", d0 + 2 * DAY);
        let feat = d0 + 2 * DAY + 2 * HOUR;
        let feat_lexer = t.commit(&[("src/lexer.rs", "pub fn lex() {}\n")], "feat: add lexer", feat);
        let fix1 = t.commit(
            &[("src/lexer.rs", "pub fn lex() {}\nfn eof() {}\n")],
            "fix: lexer handles eof",
            feat + 20 * MINUTE,
        );
        let fix2 = t.commit(
            &[("src/lexer.rs", "pub fn lex() {}\nfn eof() {}\nfn utf8() {}\n")],
            "fix: lexer handles unicode",
            feat + 40 * MINUTE,
        );
        let docs = t.side_commit(fix2, &[("docs/guide.md", "guide\n")], "tweak docs", d0 + 3 * DAY);
        t.merge(docs, "Merge branch 'docs'", d0 + 4 * DAY);
        t.remove(&["src/parser.rs"], "Revert \"feat: add parser\"", d0 + 5 * DAY);
        t.commit(&[("README.md", "# demo\n\nusage:\n")], "tidy up formatting", d0 + 6 * DAY);
        Self {
            repo: t,
            feat_lexer,
            fixes: [fix1, fix2],
        }
    }

    pub fn short(oid: Oid) -> String {
        crate::git::short_id(&oid)
    }
}

/// A classified commit built in memory, for analyzers that never touch git.
/// `files` are `(path, additions, deletions)`.
pub fn classified(
    id: &str,
    time: i64,
    message: &str,
    files: &[(&str, usize, usize)],
) -> crate::classify::ClassifiedCommit {
    classified_by(TESTER, id, time, message, files)
}

pub fn classified_by(
    author: (&str, &str),
    id: &str,
    time: i64,
    message: &str,
    files: &[(&str, usize, usize)],
) -> crate::classify::ClassifiedCommit {
    use crate::git::{ChangeStatus, CommitRecord, FileChange};

    let record = CommitRecord {
        id: format!("{id:0<40}"),
        short_id: id.to_string(),
        author_name: author.0.to_string(),
        author_email: author.1.to_string(),
        time,
        message: message.to_string(),
        parents: vec!["0".repeat(40)],
        files: files
            .iter()
            .map(|&(path, additions, deletions)| FileChange {
                path: path.to_string(),
                old_path: None,
                status: ChangeStatus::Modified,
                additions,
                deletions,
                created: false,
            })
            .collect(),
    };
    crate::classify::ClassifiedCommit {
        class: crate::classify::Classifier::rules_only().classify(&record.message, 1),
        author: crate::git::authors::AuthorResolver::identity().resolve(author.0, author.1),
        record,
    }
}
