//! Manager façade: the single entry point. Owns the credential bundle
//! and the progress registry, and dispatches the clone engine and the
//! GitHub domain fetchers. Every batch operation returns a URL-keyed map
//! where per-target failures are values, not propagated errors — only
//! programmer errors (bad state filter, uninitialized runtime) raise
//! through the `Result` itself.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use gradelib_core::{
    ensure_initialized, CloneState, CloneTaskView, Credentials, GradelibError, ProgressRegistry,
};
use gradelib_git::records::{BlameLineRecord, BranchRecord, CommitRecord};
use gradelib_git::{bulk_blame, list_branches, walk_commits, CloneEngine};
use gradelib_github::types::{CodeReviewRecord, CollaboratorRecord, CommentRecord, CommentType, IssueRecord, PullRequestRecord};
use gradelib_github::{collaborators, comments, issues, pull_requests, reviews, GitHubFetcher};
use tokio::sync::Mutex;

pub struct Manager {
    credentials: Credentials,
    progress: ProgressRegistry,
    clone_engine: CloneEngine,
    fetcher: GitHubFetcher,
    scratch_base: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Manager {
    /// Constructs a manager over `urls`, requiring `gradelib_core::setup_async()`
    /// to have already run.
    pub fn new<I, S>(urls: I, credentials: Credentials) -> Result<Self, GradelibError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ensure_initialized()?;

        let fetcher = GitHubFetcher::new(&credentials)
            .map_err(|e| GradelibError::Programmer(e.to_string()))?;

        let progress = ProgressRegistry::new();
        for url in urls {
            progress.register(&url.into());
        }

        Ok(Self {
            credentials,
            progress,
            clone_engine: CloneEngine::new(gradelib_git::default_clone_concurrency()),
            fetcher,
            scratch_base: std::env::temp_dir().join("gradelib-scratch"),
            locks: DashMap::new(),
        })
    }

    /// Overrides the default temp-dir scratch base (test hook, and
    /// generally useful for embedders that want clones under a specific
    /// workspace directory).
    pub fn with_scratch_base(mut self, base: PathBuf) -> Self {
        self.scratch_base = base;
        self
    }

    pub fn register<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for url in urls {
            self.progress.register(&url.into());
        }
    }

    fn lock_for(&self, op: &str, url: &str) -> Arc<Mutex<()>> {
        let key = format!("{op}:{url}");
        self.locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn clone(&self, url: &str) -> Result<PathBuf, GradelibError> {
        ensure_initialized()?;
        self.progress.register(url);
        let lock = self.lock_for("clone", url);
        let _guard = lock.lock().await;

        if let Some(CloneState::Completed { scratch_path }) = self.progress.get(url) {
            return Ok(scratch_path);
        }

        self.progress.reset(url);
        self.clone_engine
            .clone(url, &self.credentials, &self.progress, &self.scratch_base)
            .await
            .map_err(GradelibError::from)
    }

    pub async fn clone_all(&self) {
        let urls = self.progress.known_urls();
        join_all(urls.iter().map(|url| self.clone(url))).await;
    }

    pub fn fetch_clone_tasks(&self) -> Vec<CloneTaskView> {
        self.progress.snapshot()
    }

    fn scratch_path_for(&self, url: &str) -> Result<PathBuf, GradelibError> {
        match self.progress.get(url) {
            Some(CloneState::Completed { scratch_path }) => Ok(scratch_path),
            Some(other) => Err(GradelibError::Programmer(format!(
                "repository {url} is not cloned (state: {})",
                other.status_type()
            ))),
            None => Err(GradelibError::Programmer(format!("unknown repository {url}"))),
        }
    }

    pub async fn analyze_commits(&self, url: &str) -> Result<Vec<CommitRecord>, GradelibError> {
        ensure_initialized()?;
        let scratch = self.scratch_path_for(url)?;
        let lock = self.lock_for("analyze_commits", url);
        let _guard = lock.lock().await;
        walk_commits(&scratch, url).await.map_err(GradelibError::from)
    }

    pub async fn bulk_blame(
        &self,
        url: &str,
        paths: &[String],
    ) -> Result<HashMap<String, Result<Vec<BlameLineRecord>, GradelibError>>, GradelibError> {
        ensure_initialized()?;
        let scratch = self.scratch_path_for(url)?;
        let lock = self.lock_for("bulk_blame", url);
        let _guard = lock.lock().await;
        let results = bulk_blame(&scratch, paths).await;
        Ok(results
            .into_iter()
            .map(|(path, result)| (path, result.map_err(GradelibError::from)))
            .collect())
    }

    pub async fn analyze_branches(
        &self,
        urls: &[String],
    ) -> HashMap<String, Result<Vec<BranchRecord>, GradelibError>> {
        let mut out = HashMap::with_capacity(urls.len());
        for url in urls {
            let result = match self.scratch_path_for(url) {
                Ok(scratch) => list_branches(&scratch).await.map_err(GradelibError::from),
                Err(e) => Err(e),
            };
            out.insert(url.clone(), result);
        }
        out
    }

    pub async fn fetch_collaborators(
        &self,
        urls: &[String],
        max_pages: Option<u32>,
    ) -> HashMap<String, Result<Vec<CollaboratorRecord>, GradelibError>> {
        let max_pages = max_pages.or(self.credentials.default_max_pages());
        collaborators::fetch_collaborators(&self.fetcher, urls, max_pages)
            .await
            .into_iter()
            .map(|(k, v)| (k, v.map_err(GradelibError::from)))
            .collect()
    }

    pub async fn fetch_issues(
        &self,
        urls: &[String],
        state: Option<&str>,
        max_pages: Option<u32>,
    ) -> Result<HashMap<String, Result<Vec<IssueRecord>, GradelibError>>, GradelibError> {
        let max_pages = max_pages.or(self.credentials.default_max_pages());
        let map = issues::fetch_issues(&self.fetcher, urls, state, max_pages)
            .await
            .map_err(GradelibError::from)?;
        Ok(map
            .into_iter()
            .map(|(k, v)| (k, v.map_err(GradelibError::from)))
            .collect())
    }

    pub async fn fetch_pull_requests(
        &self,
        urls: &[String],
        state: Option<&str>,
        max_pages: Option<u32>,
    ) -> Result<HashMap<String, Result<Vec<PullRequestRecord>, GradelibError>>, GradelibError> {
        let max_pages = max_pages.or(self.credentials.default_max_pages());
        let map = pull_requests::fetch_pull_requests(&self.fetcher, urls, state, max_pages)
            .await
            .map_err(GradelibError::from)?;
        Ok(map
            .into_iter()
            .map(|(k, v)| (k, v.map_err(GradelibError::from)))
            .collect())
    }

    pub async fn fetch_code_reviews(
        &self,
        urls: &[String],
        max_pages: Option<u32>,
    ) -> HashMap<String, Result<HashMap<u64, Vec<CodeReviewRecord>>, GradelibError>> {
        let max_pages = max_pages.or(self.credentials.default_max_pages());
        reviews::fetch_code_reviews(&self.fetcher, urls, max_pages)
            .await
            .into_iter()
            .map(|(k, v)| (k, v.map_err(GradelibError::from)))
            .collect()
    }

    pub async fn fetch_comments(
        &self,
        urls: &[String],
        comment_types: Option<&[CommentType]>,
        max_pages: Option<u32>,
    ) -> HashMap<String, Result<Vec<CommentRecord>, GradelibError>> {
        let max_pages = max_pages.or(self.credentials.default_max_pages());
        comments::fetch_comments(&self.fetcher, urls, comment_types, max_pages)
            .await
            .into_iter()
            .map(|(k, v)| (k, v.map_err(GradelibError::from)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradelib_core::setup_async;

    fn creds() -> Credentials {
        Credentials::new("test-token")
    }

    #[tokio::test]
    async fn unknown_repository_analysis_is_a_programmer_error() {
        setup_async();
        let manager = Manager::new(Vec::<String>::new(), creds()).unwrap();
        let err = manager.analyze_commits("https://example.test/unknown.git").await;
        assert!(matches!(err, Err(GradelibError::Programmer(_))));
    }

    #[tokio::test]
    async fn clone_all_reaches_terminal_states_for_every_known_url() {
        setup_async();
        let src = tempfile::tempdir().unwrap();
        gradelib_git::process::run_git_blocking(src.path(), &["init", "-q"]).unwrap();
        gradelib_git::process::run_git_blocking(
            src.path(),
            &["config", "user.email", "t@example.test"],
        )
        .unwrap();
        gradelib_git::process::run_git_blocking(src.path(), &["config", "user.name", "T"])
            .unwrap();
        std::fs::write(src.path().join("a.txt"), "x\n").unwrap();
        gradelib_git::process::run_git_blocking(src.path(), &["add", "."]).unwrap();
        gradelib_git::process::run_git_blocking(src.path(), &["commit", "-q", "-m", "init"])
            .unwrap();

        let url = src.path().to_string_lossy().to_string();
        let scratch_base = tempfile::tempdir().unwrap();
        let manager = Manager::new(vec![url.clone()], creds())
            .unwrap()
            .with_scratch_base(scratch_base.path().to_path_buf());

        manager.clone_all().await;

        let tasks = manager.fetch_clone_tasks();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].state.is_terminal());
    }
}
