//! Configuration for the Ramona client

use ramona_core::retry::{DEFAULT_MAX_RETRIES, ExponentialBackoff, WaitMode};
use secrecy::SecretString;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default backoff slot length
pub const DEFAULT_BACKOFF_SLOT: Duration = Duration::from_secs(1);

/// Configuration for the Ramona client.
///
/// Endpoints left as `None` fall back to the public Twingly URLs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent as the `apikey` query parameter
    pub api_key: Option<SecretString>,

    /// Blog search endpoint
    pub blog_url: Option<String>,

    /// Forum search endpoint
    pub forum_url: Option<String>,

    /// Origin that relative forum `next` links resolve against
    pub forum_site_url: Option<String>,

    /// Social search endpoint
    pub social_url: Option<String>,

    /// Value of the `User-Agent` header
    pub user_agent: Option<String>,

    /// Timeout for a single attempt
    pub timeout: Duration,

    /// Retry behaviour on server errors
    pub backoff: BackoffConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            blog_url: None,
            forum_url: None,
            forum_site_url: None,
            social_url: None,
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            backoff: BackoffConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with an API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first; variables
    /// already set in the process win over it.
    ///
    /// This will look for:
    /// - `API_KEY` for authentication
    /// - `BLOG_BASE_URL`, `FORUM_BASE_URL` and `SOCIAL_BASE_URL` for endpoints
    /// - `FORUM_SITE_URL` for the origin of relative forum `next` links
    /// - `RAMONA_USER_AGENT` for the user agent
    /// - `RAMONA_TIMEOUT` for the per-attempt timeout (in seconds)
    /// - `RAMONA_MAX_RETRIES` for the retry ceiling
    /// - `RAMONA_SHARED_BACKOFF` (`true`/`1`) to share one collision counter
    ///   across all requests
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::Error> {
        use std::env;

        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(api_key) = env::var("API_KEY") {
            config.api_key = Some(SecretString::new(api_key.into_boxed_str()));
        }

        if let Ok(url) = env::var("BLOG_BASE_URL") {
            config.blog_url = Some(url);
        }
        if let Ok(url) = env::var("FORUM_BASE_URL") {
            config.forum_url = Some(url);
        }
        if let Ok(url) = env::var("FORUM_SITE_URL") {
            config.forum_site_url = Some(url);
        }
        if let Ok(url) = env::var("SOCIAL_BASE_URL") {
            config.social_url = Some(url);
        }

        if let Ok(user_agent) = env::var("RAMONA_USER_AGENT") {
            config.user_agent = Some(user_agent);
        }

        if let Ok(timeout_str) = env::var("RAMONA_TIMEOUT")
            && let Ok(timeout_secs) = timeout_str.parse::<u64>()
        {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(max_retries_str) = env::var("RAMONA_MAX_RETRIES")
            && let Ok(max_retries) = max_retries_str.parse::<u32>()
        {
            config.backoff.max_retries = max_retries;
        }

        if let Ok(shared) = env::var("RAMONA_SHARED_BACKOFF") {
            config.backoff.shared = matches!(
                shared.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence.
    ///
    /// Fields of `other` that still hold their default value do not override.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.blog_url.is_some() {
            self.blog_url = other.blog_url;
        }
        if other.forum_url.is_some() {
            self.forum_url = other.forum_url;
        }
        if other.forum_site_url.is_some() {
            self.forum_site_url = other.forum_site_url;
        }
        if other.social_url.is_some() {
            self.social_url = other.social_url;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
        if other.timeout != DEFAULT_TIMEOUT {
            self.timeout = other.timeout;
        }
        self.backoff = self.backoff.merge(other.backoff);

        self
    }
}

/// Retry settings for server errors.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Highest collision count that still earns a retry
    pub max_retries: u32,

    /// Length of one backoff slot
    pub slot: Duration,

    /// Upper bound on a single wait; `None` leaves waits uncapped
    pub max_delay: Option<Duration>,

    /// How a wait is picked from the slot range
    pub wait_mode: WaitMode,

    /// Share one collision counter between every request of the client
    pub shared: bool,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            slot: DEFAULT_BACKOFF_SLOT,
            max_delay: None,
            wait_mode: WaitMode::Expected,
            shared: false,
        }
    }
}

impl BackoffConfig {
    /// Build the backoff strategy these settings describe.
    pub fn strategy(&self) -> ExponentialBackoff {
        let mut builder = ExponentialBackoff::builder()
            .max_retries(self.max_retries)
            .slot(self.slot)
            .wait_mode(self.wait_mode);
        if let Some(max_delay) = self.max_delay {
            builder = builder.max_delay(max_delay);
        }
        builder.build()
    }

    fn merge(mut self, other: BackoffConfig) -> Self {
        let defaults = BackoffConfig::default();
        if other.max_retries != defaults.max_retries {
            self.max_retries = other.max_retries;
        }
        if other.slot != defaults.slot {
            self.slot = other.slot;
        }
        if other.max_delay.is_some() {
            self.max_delay = other.max_delay;
        }
        if other.wait_mode != defaults.wait_mode {
            self.wait_mode = other.wait_mode;
        }
        if other.shared {
            self.shared = true;
        }
        self
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(api_key.into().into_boxed_str()));
        self
    }

    /// Set the blog search endpoint.
    pub fn blog_url(mut self, url: impl Into<String>) -> Self {
        self.config.blog_url = Some(url.into());
        self
    }

    /// Set the forum search endpoint.
    pub fn forum_url(mut self, url: impl Into<String>) -> Self {
        self.config.forum_url = Some(url.into());
        self
    }

    /// Set the origin for relative forum `next` links.
    pub fn forum_site_url(mut self, url: impl Into<String>) -> Self {
        self.config.forum_site_url = Some(url.into());
        self
    }

    /// Set the social search endpoint.
    pub fn social_url(mut self, url: impl Into<String>) -> Self {
        self.config.social_url = Some(url.into());
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry ceiling.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.backoff.max_retries = max_retries;
        self
    }

    /// Set the backoff slot length.
    pub fn backoff_slot(mut self, slot: Duration) -> Self {
        self.config.backoff.slot = slot;
        self
    }

    /// Cap every backoff wait at `max_delay`.
    pub fn max_backoff(mut self, max_delay: Duration) -> Self {
        self.config.backoff.max_delay = Some(max_delay);
        self
    }

    /// Set how waits are picked.
    pub fn wait_mode(mut self, wait_mode: WaitMode) -> Self {
        self.config.backoff.wait_mode = wait_mode;
        self
    }

    /// Share one collision counter across every request of the client.
    pub fn shared_backoff(mut self, shared: bool) -> Self {
        self.config.backoff.shared = shared;
        self
    }

    /// Replace all backoff settings.
    pub fn backoff(mut self, backoff: BackoffConfig) -> Self {
        self.config.backoff = backoff;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
