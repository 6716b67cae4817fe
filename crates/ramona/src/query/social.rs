//! Social search query
//!
//! Every option is its own URL parameter; list options are space-joined.

use super::{SearchQuery, join, non_empty, set_param, timestamp};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Largest page the social endpoint serves.
pub const MAX_SOCIAL_PAGE_SIZE: u8 = 249;

/// Where matches are searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialScope {
    /// Postings, comments and attachments
    All,
    /// Posting text only
    Posting,
    /// Comments only
    Comment,
    /// Attachment link, title and description
    PostAttachment,
}

impl SocialScope {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialScope::All => "all",
            SocialScope::Posting => "posting",
            SocialScope::Comment => "comment",
            SocialScope::PostAttachment => "post_attachment",
        }
    }
}

/// Media type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostType {
    /// Any type
    All,
    /// Photo
    Photo,
    /// Video
    Video,
    /// Link
    Link,
    /// Status update
    Status,
}

impl PostType {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::All => "all",
            PostType::Photo => "photo",
            PostType::Video => "video",
            PostType::Link => "link",
            PostType::Status => "status",
        }
    }
}

/// Timestamp that orders results, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBase {
    /// Index time
    Indexed,
    /// Creation time
    Created,
    /// Last update; a posting reappears whenever its data changes
    Updated,
}

impl TimeBase {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBase::Indexed => "indexed",
            TimeBase::Created => "created",
            TimeBase::Updated => "updated",
        }
    }
}

/// Social result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialSort {
    /// By time
    Time,
    /// By relevance
    Relevance,
}

impl SocialSort {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialSort::Time => "time",
            SocialSort::Relevance => "relevance",
        }
    }
}

/// Builder for social searches.
///
/// # Examples
///
/// ```
/// use ramona::query::{SearchQuery, SocialQuery};
///
/// let query = SocialQuery::new().all("ted talk").hashtags(["radio"]).size(20);
///
/// assert_eq!(
///     query.params().unwrap(),
///     vec![
///         ("all", "ted talk".to_string()),
///         ("hashtags", "radio".to_string()),
///         ("size", "20".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialQuery {
    params: Vec<(&'static str, String)>,
    size: Option<u8>,
}

impl SocialQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Words or phrases that must all appear.
    pub fn all(self, words: impl AsRef<str>) -> Self {
        self.text("all", words)
    }

    /// Words or phrases of which at least one must appear.
    pub fn one(self, words: impl AsRef<str>) -> Self {
        self.text("one", words)
    }

    /// Words or phrases that must not appear.
    pub fn none(self, words: impl AsRef<str>) -> Self {
        self.text("none", words)
    }

    /// Hashtags that must all appear.
    pub fn hashtags<I>(self, hashtags: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("hashtags", hashtags)
    }

    /// Where to look for matches.
    pub fn scope(self, scope: SocialScope) -> Self {
        self.param("scope", scope.as_str())
    }

    /// Media type of the postings.
    pub fn post_type(self, post_type: PostType) -> Self {
        self.param("post_type", post_type.as_str())
    }

    /// Posting language.
    pub fn lang(self, language: impl AsRef<str>) -> Self {
        self.text("lang", language)
    }

    /// Postings by these page IDs or usernames.
    pub fn authors<I>(self, authors: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("authors", authors)
    }

    /// Leave out postings by these page IDs or usernames.
    pub fn excluded_authors<I>(self, authors: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("excluded_authors", authors)
    }

    /// Postings written on these pages.
    pub fn pages<I>(self, pages: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("pages", pages)
    }

    /// Leave out postings written on these pages.
    pub fn excluded_pages<I>(self, pages: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("excluded_pages", pages)
    }

    /// Postings mentioning any of these pages.
    pub fn mentioned_pages<I>(self, pages: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("mentioned_pages", pages)
    }

    /// Postings generated after `at`.
    pub fn since(self, at: DateTime<Utc>) -> Self {
        self.param("since", timestamp(&at))
    }

    /// Postings generated before `at`.
    pub fn until(self, at: DateTime<Utc>) -> Self {
        self.param("until", timestamp(&at))
    }

    /// Timestamp that orders the results.
    pub fn time_base(self, base: TimeBase) -> Self {
        self.param("time_base", base.as_str())
    }

    /// Time zone name for output and aggregations, e.g. `Europe/Stockholm`.
    pub fn tz(self, time_zone: impl AsRef<str>) -> Self {
        self.text("tz", time_zone)
    }

    /// Postings from pages of this country.
    pub fn country(self, country_code: impl AsRef<str>) -> Self {
        self.text("country", country_code)
    }

    /// Order results by `by`.
    pub fn sort(self, by: SocialSort) -> Self {
        self.param("sort", by.as_str())
    }

    /// Postings per response, 1 to 249.
    ///
    /// Checked when the query is rendered.
    pub fn size(mut self, size: u8) -> Self {
        self.size = Some(size);
        self
    }

    fn text(self, name: &'static str, value: impl AsRef<str>) -> Self {
        match non_empty(value) {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    fn list<I>(self, name: &'static str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        match join(values, " ") {
            Some(values) => self.param(name, values),
            None => self,
        }
    }

    fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        set_param(&mut self.params, name, value.into());
        self
    }
}

impl SearchQuery for SocialQuery {
    fn accept(&self) -> &'static str {
        "application/json"
    }

    fn params(&self) -> Result<Vec<(&'static str, String)>> {
        if self.params.is_empty() {
            return Err(Error::InvalidQuery("social query is empty".to_string()));
        }

        let mut params = self.params.clone();
        if let Some(size) = self.size {
            if !(1..=MAX_SOCIAL_PAGE_SIZE).contains(&size) {
                return Err(Error::InvalidQuery(format!(
                    "social size must be between 1 and {}, got {}",
                    MAX_SOCIAL_PAGE_SIZE, size
                )));
            }
            params.push(("size", size.to_string()));
        }

        Ok(params)
    }
}
