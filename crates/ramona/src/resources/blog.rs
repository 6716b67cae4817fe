//! Blog search endpoint

use std::sync::Arc;

use crate::{
    client::SearchContext,
    error::Result,
    http::{CancellationToken, HttpRequest, SearchResponse},
    query::BlogQuery,
};

/// Blog search resource.
///
/// Results come back as Twingly XML.
#[derive(Clone)]
pub struct Blog {
    context: Arc<SearchContext>,
}

impl Blog {
    pub(crate) fn new(context: Arc<SearchContext>) -> Self {
        Self { context }
    }

    /// Search blog posts.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuery`](crate::Error::InvalidQuery) for an empty
    /// query, otherwise whatever ended the retried request.
    pub async fn search(&self, query: &BlogQuery) -> Result<SearchResponse> {
        self.search_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Search blog posts, stopping once `cancel` fires.
    pub async fn search_with_cancel(
        &self,
        query: &BlogQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        self.context
            .search("blog", &self.context.endpoints.blog, query, cancel)
            .await
    }

    /// The request [`search`](Self::search) would send.
    pub fn request(&self, query: &BlogQuery) -> Result<HttpRequest> {
        self.context
            .search_request(&self.context.endpoints.blog, query)
    }
}
