//! Main client implementation for the Twingly search APIs

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use ramona_core::retry::{SharedBackoff, WaitMode};
use ramona_transport::{
    BackoffScope, CancellationToken, HttpRequest, HttpTransport, HttpTransportConfig,
    RetryExecutor, RetryObserver, Transport,
};
use secrecy::SecretString;
use url::Url;

use crate::{
    config::{ClientConfig, ClientConfigBuilder},
    error::{Error, Result},
    http::{SearchRequest, SearchResponse},
    observability::{RequestMetadata, RequestTimer, ResponseMetadata},
    query::SearchQuery,
    resources::{Blog, Forum, Social},
};

/// Main client for the Twingly blog, forum and social search APIs.
///
/// Every search goes through one retrying executor: server errors are
/// retried with exponential backoff, everything else ends the call.
///
/// # Example
///
/// ```rust,no_run
/// use ramona::{Client, query::BlogQuery};
///
/// # async fn example() -> ramona::Result<()> {
/// let client = Client::new("your-api-key")?;
/// let xml = client.blog().search(&BlogQuery::new().q("rust")).await?;
/// println!("{}", xml.text()?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    context: Arc<SearchContext>,

    // Lazy-initialized resources
    blog: OnceLock<Blog>,
    forum: OnceLock<Forum>,
    social: OnceLock<Social>,
}

/// What resources need to send a search.
pub(crate) struct SearchContext {
    executor: RetryExecutor,
    api_key: SecretString,
    user_agent: String,
    pub(crate) endpoints: Endpoints,
}

/// Parsed endpoint URLs.
#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    pub(crate) blog: Url,
    pub(crate) forum: Url,
    pub(crate) forum_site: Url,
    pub(crate) social: Url,
}

impl Client {
    /// Create a client with an API key and default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client from environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`] if `API_KEY` is unset, or any error
    /// from [`Client::from_config`].
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from a configuration object.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No API key is configured
    /// - An endpoint URL is empty, malformed or not http(s)
    /// - The HTTP client cannot be initialized
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = http_transport(&config)?;
        Self::with_transport(config, transport)
    }

    /// Create a client that sends every attempt through `transport`.
    ///
    /// The configured timeout only applies to transports that honour it;
    /// everything else in `config` is used as usual.
    ///
    /// # Errors
    ///
    /// As [`Client::from_config`], minus HTTP client initialization.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::assemble(config, transport, None)
    }

    fn assemble(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        observer: Option<Arc<dyn RetryObserver>>,
    ) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::MissingConfig(
                "API key. Set the API_KEY environment variable or provide it explicitly"
                    .to_string(),
            )
        })?;

        let endpoints = Endpoints {
            blog: parse_endpoint("blog", config.blog_url.as_deref(), crate::DEFAULT_BLOG_URL)?,
            forum: parse_endpoint("forum", config.forum_url.as_deref(), crate::DEFAULT_FORUM_URL)?,
            forum_site: parse_endpoint(
                "forum site",
                config.forum_site_url.as_deref(),
                crate::FORUM_SITE_URL,
            )?,
            social: parse_endpoint(
                "social",
                config.social_url.as_deref(),
                crate::DEFAULT_SOCIAL_URL,
            )?,
        };

        let scope = if config.backoff.shared {
            BackoffScope::Shared(Arc::new(SharedBackoff::new()))
        } else {
            BackoffScope::PerOperation
        };

        let mut executor = RetryExecutor::new(transport)
            .with_strategy(config.backoff.strategy())
            .with_scope(scope);
        if let Some(observer) = observer {
            executor = executor.with_observer(observer);
        }

        let context = Arc::new(SearchContext {
            executor,
            api_key,
            user_agent: user_agent(&config),
            endpoints,
        });

        Ok(Self {
            inner: Arc::new(ClientInner {
                context,
                blog: OnceLock::new(),
                forum: OnceLock::new(),
                social: OnceLock::new(),
            }),
        })
    }

    /// Access the blog search endpoint.
    pub fn blog(&self) -> &Blog {
        self.inner
            .blog
            .get_or_init(|| Blog::new(self.inner.context.clone()))
    }

    /// Access the forum search endpoint.
    pub fn forum(&self) -> &Forum {
        self.inner
            .forum
            .get_or_init(|| Forum::new(self.inner.context.clone()))
    }

    /// Access the social search endpoint.
    pub fn social(&self) -> &Social {
        self.inner
            .social
            .get_or_init(|| Social::new(self.inner.context.clone()))
    }

    /// Send an arbitrary GET request through the retrying executor.
    ///
    /// The request is sent as given; no API key or headers are added.
    ///
    /// # Errors
    ///
    /// [`Error::ClientError`], [`Error::ExhaustedRetries`] or
    /// [`Error::Transport`], as for any search.
    pub async fn execute(&self, request: &HttpRequest) -> Result<SearchResponse> {
        self.execute_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), but stops once `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`Error::Cancelled`].
    pub async fn execute_with_cancel(
        &self,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        self.inner.context.send("custom", request, cancel).await
    }

    /// Collision counter shared by every request, when enabled.
    pub fn shared_backoff(&self) -> Option<&Arc<SharedBackoff>> {
        match self.inner.context.executor.scope() {
            BackoffScope::Shared(shared) => Some(shared),
            BackoffScope::PerOperation => None,
        }
    }

    /// Blog search endpoint in use.
    pub fn blog_url(&self) -> &Url {
        &self.inner.context.endpoints.blog
    }

    /// Forum search endpoint in use.
    pub fn forum_url(&self) -> &Url {
        &self.inner.context.endpoints.forum
    }

    /// Social search endpoint in use.
    pub fn social_url(&self) -> &Url {
        &self.inner.context.endpoints.social
    }
}

impl SearchContext {
    /// Build the request for `query` against `endpoint`.
    pub(crate) fn search_request(
        &self,
        endpoint: &Url,
        query: &impl SearchQuery,
    ) -> Result<HttpRequest> {
        Ok(SearchRequest::new(endpoint.clone())
            .api_key(&self.api_key)
            .query(query)?
            .user_agent(self.user_agent.as_str())
            .build())
    }

    /// Build a request for a pagination link, sent as given.
    pub(crate) fn page_request(&self, url: Url, accept: &str) -> HttpRequest {
        SearchRequest::new(url)
            .accept(accept)
            .user_agent(self.user_agent.as_str())
            .build()
    }

    /// Render `query` against `endpoint` and send it.
    pub(crate) async fn search(
        &self,
        resource: &'static str,
        endpoint: &Url,
        query: &impl SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        let request = self.search_request(endpoint, query)?;
        self.send(resource, &request, cancel).await
    }

    /// Run `request` through the executor with start and end logging.
    pub(crate) async fn send(
        &self,
        resource: &'static str,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        let metadata = RequestMetadata::new(resource, request.redacted_url());
        metadata.log_request();
        let timer = RequestTimer::start();

        match self.executor.execute_with_cancel(request, cancel).await {
            Ok(body) => {
                ResponseMetadata::new(timer.elapsed())
                    .with_body_size(body.len())
                    .log_success(&metadata);
                Ok(SearchResponse::new(body))
            }
            Err(err) => {
                let err = Error::from(err);
                ResponseMetadata::new(timer.elapsed()).log_error(&metadata, &err.to_string());
                Err(err)
            }
        }
    }
}

fn user_agent(config: &ClientConfig) -> String {
    config
        .user_agent
        .clone()
        .unwrap_or_else(|| crate::DEFAULT_USER_AGENT.to_string())
}

fn http_transport(config: &ClientConfig) -> Result<Arc<dyn Transport>> {
    let transport = HttpTransport::with_config(HttpTransportConfig {
        timeout: config.timeout,
        user_agent: user_agent(config),
        ..Default::default()
    })
    .map_err(|e| Error::HttpClient(e.to_string()))?;
    Ok(Arc::new(transport))
}

fn parse_endpoint(name: &str, configured: Option<&str>, default: &str) -> Result<Url> {
    let raw = configured.unwrap_or(default);

    if raw.trim().is_empty() {
        return Err(Error::InvalidUrl(format!("{} URL cannot be empty", name)));
    }

    let url: Url = raw
        .trim()
        .parse()
        .map_err(|e| Error::InvalidUrl(format!("{} URL '{}': {}", name, raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!(
            "Invalid {} URL scheme '{}'. Only 'http' and 'https' are supported.",
            name, scheme
        ))),
    }
}

/// Builder for creating a configured Client.
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfigBuilder,
    transport: Option<Arc<dyn Transport>>,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl ClientBuilder {
    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config = self.config.api_key(api_key);
        self
    }

    /// Set the blog search endpoint.
    pub fn blog_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.blog_url(url);
        self
    }

    /// Set the forum search endpoint.
    pub fn forum_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.forum_url(url);
        self
    }

    /// Set the origin for relative forum `next` links.
    pub fn forum_site_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.forum_site_url(url);
        self
    }

    /// Set the social search endpoint.
    pub fn social_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.social_url(url);
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the retry ceiling.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config = self.config.max_retries(max_retries);
        self
    }

    /// Set the backoff slot length.
    pub fn backoff_slot(mut self, slot: Duration) -> Self {
        self.config = self.config.backoff_slot(slot);
        self
    }

    /// Cap every backoff wait.
    pub fn max_backoff(mut self, max_delay: Duration) -> Self {
        self.config = self.config.max_backoff(max_delay);
        self
    }

    /// Set how waits are picked.
    pub fn wait_mode(mut self, wait_mode: WaitMode) -> Self {
        self.config = self.config.wait_mode(wait_mode);
        self
    }

    /// Share one collision counter across every request.
    pub fn shared_backoff(mut self, shared: bool) -> Self {
        self.config = self.config.shared_backoff(shared);
        self
    }

    /// Send attempts through `transport` instead of the built-in HTTP client.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Report retries to `observer`.
    pub fn observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the client with the configured options.
    pub fn build(self) -> Result<Client> {
        let config = self.config.build();
        let transport = match self.transport {
            Some(transport) => transport,
            None => http_transport(&config)?,
        };
        Client::assemble(config, transport, self.observer)
    }
}
