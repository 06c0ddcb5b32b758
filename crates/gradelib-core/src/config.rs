//! Credentials and per-instance options, built once at manager-construction
//! time. Unlike `gh-pr-config`'s `AppConfig`, this is never loaded from a
//! TOML file or environment variable by the core — that plumbing belongs
//! to whatever driver embeds this crate.

/// Credentials and per-instance options shared by every clone and every
/// outbound HTTP request a [`crate::runtime`]-gated manager issues.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Bearer token used both for GitHub API auth and, rewritten into the
    /// clone URL, for authenticating `git clone` over HTTPS.
    token: String,

    /// Optional username, used for basic-auth fallback when present and
    /// for HTTPS URL credential rewriting in the `user:token@host` form.
    username: Option<String>,

    /// When true, callers asked that no cross-call API response cache be
    /// consulted or populated. The core already never caches beyond a
    /// single call's pagination loop, so this only disables an HTTP
    /// fetcher behavior that would otherwise be opt-in for an embedder.
    no_cache: bool,

    /// Default page cap applied to paginated HTTP fetches when a call
    /// site does not supply its own.
    max_pages: Option<u32>,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: None,
            no_cache: false,
            max_pages: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    pub fn default_max_pages(&self) -> Option<u32> {
        self.max_pages
    }
}

impl std::fmt::Display for Credentials {
    /// Never prints the token. Every call site that might log a
    /// [`Credentials`] value relies on this redaction.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.username {
            Some(u) => write!(f, "Credentials(user={u}, token=***)"),
            None => write!(f, "Credentials(token=***)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_never_leaks_token() {
        let creds = Credentials::new("supersecret").with_username("octocat");
        let shown = creds.to_string();
        assert!(!shown.contains("supersecret"));
        assert!(shown.contains("octocat"));
    }

    #[test]
    fn builders_compose() {
        let creds = Credentials::new("t").with_no_cache(true).with_max_pages(Some(3));
        assert!(creds.no_cache());
        assert_eq!(creds.default_max_pages(), Some(3));
        assert_eq!(creds.token(), "t");
    }
}
