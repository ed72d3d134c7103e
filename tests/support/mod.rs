#![allow(dead_code)]

use std::path::Path;

use git2::{Commit, Oid, Repository, Signature, Time};
use tempfile::TempDir;

use verdiff::shell::{Shell, ShellConfig};
use verdiff::store::{self, BotIdentity};

/// Upstream repository standing in for the hosted origin: it holds branch
/// refs and PR-head refs, and receives version pushes.
pub struct UpstreamRepo {
    dir: TempDir,
    repo: Repository,
}

impl UpstreamRepo {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init upstream repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn url(&self) -> String {
        self.dir.path().display().to_string()
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Create a commit without touching HEAD or any working tree.
    ///
    /// `files` maps paths to contents; `None` removes the path from the
    /// first parent's tree. Uses a fixed timestamp so shas are stable.
    pub fn commit(&self, parents: &[Oid], files: &[(&str, Option<&str>)], message: &str) -> Oid {
        let parent_commits: Vec<Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("parent commit"))
            .collect();
        let base_tree = parent_commits
            .first()
            .map(|commit| commit.tree().expect("parent tree"));

        let mut builder = self
            .repo
            .treebuilder(base_tree.as_ref())
            .expect("treebuilder");
        for (path, contents) in files {
            match contents {
                Some(text) => {
                    let blob = self.repo.blob(text.as_bytes()).expect("blob");
                    builder.insert(*path, blob, 0o100644).expect("insert");
                }
                None => {
                    builder.remove(*path).expect("remove");
                }
            }
        }
        let tree_id = builder.write().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");

        let sig = Signature::new(
            "upstream",
            "upstream@example.com",
            &Time::new(1_700_000_000, 0),
        )
        .expect("signature");
        let parent_refs: Vec<&Commit> = parent_commits.iter().collect();
        self.repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .expect("commit")
    }

    pub fn set_branch(&self, name: &str, target: Oid) {
        self.repo
            .reference(&format!("refs/heads/{name}"), target, true, "test branch")
            .expect("set branch");
    }

    pub fn set_pr_head(&self, pr: u64, target: Oid) {
        self.repo
            .reference(&format!("refs/pull/{pr}/head"), target, true, "test pr head")
            .expect("set pr head");
    }

    pub fn find_ref(&self, name: &str) -> Option<String> {
        self.repo
            .find_reference(name)
            .ok()
            .and_then(|reference| reference.target())
            .map(|oid| oid.to_string())
    }

    pub fn tree_of(&self, sha: &str) -> String {
        tree_of(&self.repo, sha)
    }
}

/// Scratch work repository driven through the real git binary.
pub struct ScratchRepo {
    dir: TempDir,
    pub shell: Shell,
}

impl ScratchRepo {
    /// Initialize a scratch work repository off `upstream`, fetching its
    /// branches and PR-version namespace.
    pub fn init_from(upstream: &UpstreamRepo) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let work = dir.path().join("work");
        std::fs::create_dir_all(&work).expect("create scratch dir");

        let shell = Shell::new(ShellConfig::new(work));
        store::init_work_repo(&shell, &upstream.url(), &BotIdentity::default())
            .expect("init work repo");
        Self { dir, shell }
    }

    pub fn workdir(&self) -> &Path {
        self.shell.workdir()
    }

    pub fn repo(&self) -> Repository {
        Repository::open(self.workdir()).expect("open scratch repo")
    }

    pub fn head_sha(&self) -> String {
        let raw = self
            .shell
            .check_output("git", &["rev-parse", "HEAD"])
            .expect("rev-parse HEAD");
        raw.trim().to_string()
    }

    pub fn checkout_detached(&self, sha: &str) {
        self.shell
            .check_call("git", &["checkout", "--detach", sha])
            .expect("checkout");
    }

    pub fn tree_of(&self, sha: &str) -> String {
        tree_of(&self.repo(), sha)
    }

    /// Contents of `path` in `sha`'s tree, or None when absent.
    pub fn blob_in_tree(&self, sha: &str, path: &str) -> Option<String> {
        let repo = self.repo();
        let commit = repo
            .find_commit(Oid::from_str(sha).expect("sha"))
            .expect("commit");
        let tree = commit.tree().expect("tree");
        let entry = tree.get_name(path)?;
        let object = entry.to_object(&repo).expect("object");
        let blob = object.as_blob().expect("blob");
        Some(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

fn tree_of(repo: &Repository, sha: &str) -> String {
    repo.find_commit(Oid::from_str(sha).expect("sha"))
        .expect("commit")
        .tree_id()
        .to_string()
}
