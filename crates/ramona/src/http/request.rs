//! Search request builder

use crate::error::Result;
use crate::query::SearchQuery;
use ramona_transport::HttpRequest;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Builder for one search GET request.
///
/// Query parameters are percent-encoded as they are appended, so values
/// can contain spaces, quotes and `&`.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    url: Url,
    accept: Option<String>,
    user_agent: Option<String>,
}

impl SearchRequest {
    /// Start a request against `url`, keeping any query it already has.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            accept: None,
            user_agent: None,
        }
    }

    /// Append the `apikey` parameter.
    pub fn api_key(mut self, api_key: &SecretString) -> Self {
        self.url
            .query_pairs_mut()
            .append_pair("apikey", api_key.expose_secret());
        self
    }

    /// Append `(name, value)` parameters in order.
    pub fn params<'a, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        {
            let mut pairs = self.url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, &value);
            }
        }
        self
    }

    /// Append the rendered query and take its `Accept` type.
    ///
    /// # Errors
    ///
    /// Whatever rendering the query returns.
    pub fn query(self, query: &impl SearchQuery) -> Result<Self> {
        let params = query.params()?;
        Ok(self.accept(query.accept()).params(params))
    }

    /// Set the `Accept` header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// The URL as built so far.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Finish into a transport request.
    pub fn build(self) -> HttpRequest {
        let mut request = HttpRequest::get(self.url.as_str());
        if let Some(accept) = self.accept {
            request = request.with_header("Accept", accept);
        }
        if let Some(user_agent) = self.user_agent {
            request = request.with_header("User-Agent", user_agent);
        }
        request
    }
}
