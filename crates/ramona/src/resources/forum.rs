//! Forum search endpoint

use std::sync::Arc;

use url::Url;

use crate::{
    client::SearchContext,
    error::Result,
    http::{CancellationToken, HttpRequest, SearchResponse},
    query::{ForumQuery, SearchQuery},
};

/// Forum search resource.
///
/// Results come back as JSON. A page that has more results carries a
/// relative `next` link; pass it to [`next`](Self::next) for the following
/// page.
#[derive(Clone)]
pub struct Forum {
    context: Arc<SearchContext>,
}

impl Forum {
    pub(crate) fn new(context: Arc<SearchContext>) -> Self {
        Self { context }
    }

    /// Search forum posts.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuery`](crate::Error::InvalidQuery) for an empty
    /// query or an out-of-range size, otherwise whatever ended the retried
    /// request.
    pub async fn search(&self, query: &ForumQuery) -> Result<SearchResponse> {
        self.search_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Search forum posts, stopping once `cancel` fires.
    pub async fn search_with_cancel(
        &self,
        query: &ForumQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        self.context
            .search("forum", &self.context.endpoints.forum, query, cancel)
            .await
    }

    /// The request [`search`](Self::search) would send.
    pub fn request(&self, query: &ForumQuery) -> Result<HttpRequest> {
        self.context
            .search_request(&self.context.endpoints.forum, query)
    }

    /// Fetch the page behind a `next` link.
    ///
    /// The link already carries its own credentials and filters and is sent
    /// unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`](crate::Error::InvalidUrl) if the link does not
    /// resolve, otherwise whatever ended the retried request.
    pub async fn next(&self, link: &str) -> Result<SearchResponse> {
        self.next_with_cancel(link, &CancellationToken::new())
            .await
    }

    /// Fetch the page behind a `next` link, stopping once `cancel` fires.
    pub async fn next_with_cancel(
        &self,
        link: &str,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        let url = self.next_url(link)?;
        let request = self
            .context
            .page_request(url, ForumQuery::new().accept());
        self.context.send("forum", &request, cancel).await
    }

    /// Resolve a `next` link against the forum site.
    pub fn next_url(&self, link: &str) -> Result<Url> {
        Ok(self.context.endpoints.forum_site.join(link.trim())?)
    }
}

#[cfg(test)]
mod tests {
    use crate::Client;

    #[test]
    fn test_next_url_resolves_relative_links() {
        let client = Client::new("test-key").unwrap();

        let url = client
            .forum()
            .next_url("/forum/a/search?token=abc&ts=1500000000000")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://data.twingly.net/forum/a/search?token=abc&ts=1500000000000"
        );

        let url = client.forum().next_url("forum/a/search?token=abc").unwrap();
        assert_eq!(url.as_str(), "https://data.twingly.net/forum/a/search?token=abc");
    }

    #[test]
    fn test_next_url_keeps_absolute_links() {
        let client = Client::new("test-key").unwrap();
        let url = client
            .forum()
            .next_url("https://mirror.example.com/forum/a/search?token=abc")
            .unwrap();
        assert_eq!(url.host_str(), Some("mirror.example.com"));
    }

    #[test]
    fn test_request_url() {
        let client = Client::new("KEY").unwrap();
        let request = client
            .forum()
            .request(
                &crate::query::ForumQuery::new()
                    .q("rust")
                    .language("english")
                    .size(10),
            )
            .unwrap();

        assert_eq!(
            request.url,
            "https://data.twingly.net/forum/a/search?apikey=KEY&q=rust+language%3Aenglish&size=10"
        );
        assert_eq!(
            request.headers.get("Accept"),
            Some(&"application/json".to_string())
        );
    }
}
