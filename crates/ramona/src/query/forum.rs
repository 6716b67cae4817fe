//! Forum search query
//!
//! Filters go into the `q` parameter as space-separated `name:value`
//! pairs after the free text; paging and sorting options are separate URL
//! parameters.

use super::{SearchQuery, SortOrder, non_empty, set_param};
use crate::error::{Error, Result};

/// Largest page the forum endpoint serves.
pub const MAX_FORUM_PAGE_SIZE: u8 = 100;

/// Forum result ordering.
///
/// Without a sort the API orders by crawl date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForumSort {
    /// Relevancy to the query
    Relevancy,
    /// Facebook likes
    FacebookLikes,
    /// Facebook shares
    FacebookShares,
    /// Facebook comments
    FacebookComments,
    /// Google+ shares
    GplusShares,
    /// Pinterest shares
    PinterestShares,
    /// LinkedIn shares
    LinkedinShares,
    /// StumbleUpon shares
    StumbleuponShares,
    /// VK shares
    VkShares,
    /// Replies in the thread
    RepliesCount,
    /// Participants in the thread
    ParticipantsCount,
    /// Spam score
    SpamScore,
    /// Performance score
    PerformanceScore,
    /// Domain rank
    DomainRank,
    /// Position in the thread
    OrdInThread,
    /// Rating
    Rating,
}

impl ForumSort {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ForumSort::Relevancy => "relevancy",
            ForumSort::FacebookLikes => "social.facebook.likes",
            ForumSort::FacebookShares => "social.facebook.shares",
            ForumSort::FacebookComments => "social.facebook.comments",
            ForumSort::GplusShares => "social.gplus.shares",
            ForumSort::PinterestShares => "social.pinterest.shares",
            ForumSort::LinkedinShares => "social.linkedin.shares",
            ForumSort::StumbleuponShares => "social.stumbledupon.shares",
            ForumSort::VkShares => "social.vk.shares",
            ForumSort::RepliesCount => "replies_count",
            ForumSort::ParticipantsCount => "participants_count",
            ForumSort::SpamScore => "spam_score",
            ForumSort::PerformanceScore => "performance_score",
            ForumSort::DomainRank => "domain_rank",
            ForumSort::OrdInThread => "ord_in_thread",
            ForumSort::Rating => "rating",
        }
    }
}

/// Builder for forum searches.
///
/// # Examples
///
/// ```
/// use ramona::query::{ForumQuery, ForumSort, SearchQuery};
///
/// let query = ForumQuery::new()
///     .q("stackoverflow.com")
///     .language("spanish")
///     .sort(ForumSort::Relevancy)
///     .size(20);
///
/// let params = query.params().unwrap();
/// assert_eq!(params[0], ("q", "stackoverflow.com language:spanish".to_string()));
/// assert_eq!(params[1], ("sort", "relevancy".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForumQuery {
    text: Option<String>,
    filters: Vec<String>,
    params: Vec<(&'static str, String)>,
    size: Option<u8>,
}

impl ForumQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Boolean text query selecting the posts.
    pub fn q(mut self, text: impl AsRef<str>) -> Self {
        self.text = non_empty(text);
        self
    }

    /// Post language, e.g. `english`.
    pub fn language(self, language: impl AsRef<str>) -> Self {
        self.filter("language", language)
    }

    /// Posts from `site`.
    pub fn site(self, site: impl AsRef<str>) -> Self {
        self.filter("site", site)
    }

    /// Posts by `author`.
    pub fn author(self, author: impl AsRef<str>) -> Self {
        self.filter("author", author)
    }

    /// Threads from sites attributed to `country_code`.
    ///
    /// Site country is a heuristic and often unset, so this matches less
    /// than [`language`](Self::language).
    pub fn country(self, country_code: impl AsRef<str>) -> Self {
        self.filter("thread.country", country_code)
    }

    /// Sites with this suffix, e.g. `se`.
    pub fn site_suffix(self, suffix: impl AsRef<str>) -> Self {
        self.filter("site_suffix", suffix)
    }

    /// Sites in this category, e.g. `tech`.
    pub fn site_category(self, category: impl AsRef<str>) -> Self {
        self.filter("site_category", category)
    }

    /// Only the first post of each thread, no comments.
    pub fn first_post_only(self) -> Self {
        self.filter("is_first", "true")
    }

    /// Only posts with a video.
    pub fn has_video(self) -> Self {
        self.filter("has_video", "true")
    }

    /// Boolean text query on the thread title.
    pub fn thread_title(self, title: impl AsRef<str>) -> Self {
        self.filter("thread.title", title)
    }

    /// Posts linking to `link`.
    pub fn external_links(self, link: impl AsRef<str>) -> Self {
        self.filter("external_links", link)
    }

    /// All posts of the thread at `url`.
    ///
    /// The URL is escaped, so `http://a.com/t` becomes
    /// `http:\/\/a\.com\/t`.
    pub fn thread_url(self, url: impl AsRef<str>) -> Self {
        match non_empty(url) {
            Some(url) => {
                let escaped = regex::escape(&url).replace('/', "\\/");
                self.filter("thread.url", escaped)
            }
            None => self,
        }
    }

    /// Spam score condition, e.g. `<=0.8`.
    pub fn spam_score(self, condition: impl AsRef<str>) -> Self {
        self.filter("spam_score", condition)
    }

    /// Domain rank condition, e.g. `<1000`.
    pub fn domain_rank(self, condition: impl AsRef<str>) -> Self {
        self.filter("domain_rank", condition)
    }

    /// Order results by `by`.
    pub fn sort(self, by: ForumSort) -> Self {
        self.param("sort", by.as_str())
    }

    /// Sort direction; the API defaults to descending.
    pub fn order(self, order: SortOrder) -> Self {
        self.param("order", order.as_str())
    }

    /// Offset of the first result.
    pub fn from(self, offset: u64) -> Self {
        self.param("from", offset.to_string())
    }

    /// Only posts crawled after this Unix timestamp in milliseconds.
    pub fn ts(self, crawled_after: u64) -> Self {
        self.param("ts", crawled_after.to_string())
    }

    /// Results per request, 1 to 100.
    ///
    /// Checked when the query is rendered.
    pub fn size(mut self, size: u8) -> Self {
        self.size = Some(size);
        self
    }

    /// Wrap matched keywords in `<em>` tags.
    pub fn highlight(self) -> Self {
        self.param("highlight", "true")
    }

    /// The latest 100 crawled posts matching the query.
    pub fn latest(self) -> Self {
        self.param("latest", "true")
    }

    /// The rendered `q` value.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuery`] if neither text nor filters were added.
    pub fn render(&self) -> Result<String> {
        let parts: Vec<&str> = self
            .text
            .iter()
            .chain(self.filters.iter())
            .map(String::as_str)
            .collect();

        if parts.is_empty() {
            return Err(Error::InvalidQuery("forum query is empty".to_string()));
        }
        Ok(parts.join(" "))
    }

    fn filter(mut self, name: &str, value: impl AsRef<str>) -> Self {
        if let Some(value) = non_empty(value) {
            self.filters.push(format!("{}:{}", name, value));
        }
        self
    }

    fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        set_param(&mut self.params, name, value.into());
        self
    }
}

impl SearchQuery for ForumQuery {
    fn accept(&self) -> &'static str {
        "application/json"
    }

    fn params(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = vec![("q", self.render()?)];
        params.extend(self.params.iter().cloned());

        if let Some(size) = self.size {
            if !(1..=MAX_FORUM_PAGE_SIZE).contains(&size) {
                return Err(Error::InvalidQuery(format!(
                    "forum size must be between 1 and {}, got {}",
                    MAX_FORUM_PAGE_SIZE, size
                )));
            }
            params.push(("size", size.to_string()));
        }

        Ok(params)
    }
}
