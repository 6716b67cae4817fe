//! Social search endpoint

use std::sync::Arc;

use url::Url;

use crate::{
    client::SearchContext,
    error::{Error, Result},
    http::{CancellationToken, HttpRequest, SearchResponse},
    query::{SearchQuery, SocialQuery},
};

/// Social search resource.
///
/// Results come back as JSON, with an absolute `paging.next` URL when more
/// postings are available.
#[derive(Clone)]
pub struct Social {
    context: Arc<SearchContext>,
}

impl Social {
    pub(crate) fn new(context: Arc<SearchContext>) -> Self {
        Self { context }
    }

    /// Search social postings.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuery`] for an empty query or an out-of-range size,
    /// otherwise whatever ended the retried request.
    pub async fn search(&self, query: &SocialQuery) -> Result<SearchResponse> {
        self.search_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Search social postings, stopping once `cancel` fires.
    pub async fn search_with_cancel(
        &self,
        query: &SocialQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        self.context
            .search("social", &self.context.endpoints.social, query, cancel)
            .await
    }

    /// The request [`search`](Self::search) would send.
    pub fn request(&self, query: &SocialQuery) -> Result<HttpRequest> {
        self.context
            .search_request(&self.context.endpoints.social, query)
    }

    /// Fetch the page behind a `paging.next` URL, sent unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] unless `url` is an absolute http(s) URL,
    /// otherwise whatever ended the retried request.
    pub async fn next(&self, url: &str) -> Result<SearchResponse> {
        self.next_with_cancel(url, &CancellationToken::new())
            .await
    }

    /// Fetch the page behind a `paging.next` URL, stopping once `cancel`
    /// fires.
    pub async fn next_with_cancel(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        let url = Url::parse(url.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "paging URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        let request = self
            .context
            .page_request(url, SocialQuery::new().accept());
        self.context.send("social", &request, cancel).await
    }
}
