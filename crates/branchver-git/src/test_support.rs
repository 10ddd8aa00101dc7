//! Helpers for tests against real repositories

use std::path::Path;

use git2::{Repository, RepositoryInitOptions, Signature, Time};
use tempfile::TempDir;

use crate::repository::GitRepo;

/// Fresh repository whose initial branch is `main`
pub fn init_repo() -> (TempDir, GitRepo) {
    let temp = TempDir::new().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(temp.path(), &opts).unwrap();
    let repo = GitRepo::open(temp.path()).unwrap();
    (temp, repo)
}

/// Write `file` and commit it on HEAD at `seconds`, returning the sha
pub fn commit_file(temp: &TempDir, repo: &GitRepo, file: &str, message: &str, seconds: i64) -> String {
    let inner = repo.inner();
    let path = temp.path().join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, message).unwrap();

    let mut index = inner.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree = inner.find_tree(index.write_tree().unwrap()).unwrap();

    let sig = Signature::new("Test", "test@example.com", &Time::new(seconds, 0)).unwrap();
    let parents = match inner.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<_> = parents.iter().collect();

    inner
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
        .to_string()
}
