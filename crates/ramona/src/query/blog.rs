//! Blog search query
//!
//! The blog endpoint takes everything in a single `q` parameter written in
//! the Twingly search language, e.g.
//! `rust fields:title async tag:tokio,tracing lang:en|sv tspan:w`.

use super::{Match, SearchQuery, SortOrder, join, non_empty, timestamp};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Relative time window for blog posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpan {
    /// Last hour
    Hour,
    /// Last 12 hours
    HalfDay,
    /// Last 24 hours
    Day,
    /// Last week
    Week,
    /// Last month
    Month,
    /// Last three months
    ThreeMonths,
}

impl TimeSpan {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSpan::Hour => "h",
            TimeSpan::HalfDay => "12h",
            TimeSpan::Day => "24h",
            TimeSpan::Week => "w",
            TimeSpan::Month => "m",
            TimeSpan::ThreeMonths => "3m",
        }
    }
}

/// Blog result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogSort {
    /// Publication time
    Published,
    /// Index time
    Created,
    /// Number of inlinks to the post
    Inlinks,
    /// TwinglyRank
    TwinglyRank,
}

impl BlogSort {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogSort::Published => "published",
            BlogSort::Created => "created",
            BlogSort::Inlinks => "inlinks",
            BlogSort::TwinglyRank => "twinglyrank",
        }
    }
}

/// Builder for blog searches.
///
/// Terms render in the order they were added, after the free text.
/// Blank inputs are ignored.
///
/// # Examples
///
/// ```
/// use ramona::query::{BlogQuery, Match, TimeSpan};
///
/// let query = BlogQuery::new()
///     .q("rust")
///     .tag(["async", "tokio"], Match::Any)
///     .lang(["en"])
///     .tspan(TimeSpan::Week);
///
/// assert_eq!(query.render().unwrap(), "rust tag:async|tokio lang:en tspan:w");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogQuery {
    text: Option<String>,
    terms: Vec<String>,
}

impl BlogQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Free text in the search language, e.g. `twingly AND (blog OR blogs)`.
    ///
    /// Replaces earlier free text; other terms are kept.
    pub fn q(mut self, text: impl AsRef<str>) -> Self {
        self.text = non_empty(text);
        self
    }

    /// Match `text` in the post summary.
    pub fn content(self, text: impl AsRef<str>) -> Self {
        self.field("summary", text)
    }

    /// Match `text` in the post title.
    pub fn title(self, text: impl AsRef<str>) -> Self {
        self.field("title", text)
    }

    /// Match `text` in the blog name.
    pub fn blogname(self, text: impl AsRef<str>) -> Self {
        self.field("blogname", text)
    }

    /// Posts linking to the given sites.
    ///
    /// Link filters are expensive for the API; many of them can time out.
    pub fn link<I>(self, links: I, how: Match) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("link", links, how.separator())
    }

    /// Posts carrying the given tags.
    pub fn tag<I>(self, tags: I, how: Match) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("tag", tags, how.separator())
    }

    /// Posts by `name`.
    pub fn author(self, name: impl AsRef<str>) -> Self {
        self.term("author", name)
    }

    /// Leave out posts by `name`.
    pub fn exclude_author(self, name: impl AsRef<str>) -> Self {
        self.term("-author", name)
    }

    /// Leave out posts linking to `link`.
    pub fn exclude_link(self, link: impl AsRef<str>) -> Self {
        self.term("-link", link)
    }

    /// Leave out posts tagged `tag`.
    pub fn exclude_tag(self, tag: impl AsRef<str>) -> Self {
        self.term("-tag", tag)
    }

    /// Posts on any of the given domains, subdomains included.
    pub fn domain<I>(self, domains: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("site", domains, "|")
    }

    /// Posts on any of the given blogs.
    pub fn blog<I>(self, blogs: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("blog", blogs, "|")
    }

    /// Posts in any of the given language codes.
    pub fn lang<I>(self, languages: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("lang", languages, "|")
    }

    /// Posts from any of the given locations.
    pub fn location<I>(self, locations: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.list("location", locations, "|")
    }

    /// A single post by ID.
    pub fn id(self, post_id: impl AsRef<str>) -> Self {
        self.term("id", post_id)
    }

    /// Posts published within the last `span`.
    pub fn tspan(self, span: TimeSpan) -> Self {
        self.term("tspan", span.as_str())
    }

    /// Posts indexed after `from`, and before `to` if given.
    pub fn created(self, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Self {
        let query = self.quoted("start-created", &from);
        match to {
            Some(to) => query.quoted("end-created", &to),
            None => query,
        }
    }

    /// Posts published between `start` and `end`.
    pub fn published(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.quoted("start-date", &start).quoted("end-date", &end)
    }

    /// Order results by `by`.
    pub fn sort(self, by: BlogSort) -> Self {
        self.term("sort", by.as_str())
    }

    /// Sort direction.
    pub fn sort_order(self, order: SortOrder) -> Self {
        self.term("sort-order", order.as_str())
    }

    /// Results per page.
    pub fn page_size(self, size: u32) -> Self {
        self.term("page-size", size.to_string())
    }

    /// Page to fetch; use with [`page_size`](Self::page_size).
    pub fn page(self, page: u32) -> Self {
        self.term("page", page.to_string())
    }

    /// The rendered `q` value.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuery`] if nothing was added.
    pub fn render(&self) -> Result<String> {
        let rendered = join(self.text.iter().chain(self.terms.iter()), " ")
            .ok_or_else(|| Error::InvalidQuery("blog query is empty".to_string()))?;
        Ok(rendered)
    }

    fn field(self, field: &str, text: impl AsRef<str>) -> Self {
        match non_empty(text) {
            Some(text) => self.push(format!("fields:{} {}", field, text)),
            None => self,
        }
    }

    fn term(self, name: &str, value: impl AsRef<str>) -> Self {
        match non_empty(value) {
            Some(value) => self.push(format!("{}:{}", name, value)),
            None => self,
        }
    }

    fn list<I>(self, name: &str, values: I, separator: &str) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        match join(values, separator) {
            Some(values) => self.push(format!("{}:{}", name, values)),
            None => self,
        }
    }

    fn quoted(self, name: &str, at: &DateTime<Utc>) -> Self {
        self.push(format!("{}:\"{}\"", name, timestamp(at)))
    }

    fn push(mut self, term: String) -> Self {
        self.terms.push(term);
        self
    }
}

impl SearchQuery for BlogQuery {
    fn accept(&self) -> &'static str {
        "text/xml"
    }

    fn params(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![("q", self.render()?)])
    }
}
