//! Search query builders
//!
//! Each builder collects filters and renders them into URL query
//! parameters when a request is made. Builders never touch the network,
//! and rendering never mutates them, so one query can be sent any number
//! of times.
//!
//! | Builder         | Endpoint | Response format |
//! |-----------------|----------|-----------------|
//! | [`BlogQuery`]   | blog     | XML             |
//! | [`ForumQuery`]  | forum    | JSON            |
//! | [`SocialQuery`] | social   | JSON            |

pub mod blog;
pub mod forum;
pub mod social;

pub use blog::{BlogQuery, BlogSort, TimeSpan};
pub use forum::{ForumQuery, ForumSort};
pub use social::{PostType, SocialQuery, SocialScope, SocialSort, TimeBase};

use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};

/// A query that renders into URL parameters for one search endpoint.
pub trait SearchQuery {
    /// Value of the `Accept` header for this endpoint.
    fn accept(&self) -> &'static str;

    /// Render the query into `(name, value)` parameters, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`](crate::Error::InvalidQuery) when the
    /// query is empty or a value is out of range.
    fn params(&self) -> Result<Vec<(&'static str, String)>>;
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending
    Ascending,
    /// Descending
    Descending,
}

impl SortOrder {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// How the values of a list filter combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Match {
    /// Every value must match
    #[default]
    All,
    /// At least one value must match
    Any,
}

impl Match {
    fn separator(&self) -> &'static str {
        match self {
            Match::All => ",",
            Match::Any => "|",
        }
    }
}

/// Trim and join non-empty values; `None` when nothing is left.
pub(crate) fn join<I>(values: I, separator: &str) -> Option<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let parts: Vec<String> = values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}

/// Trimmed value, or `None` if blank.
pub(crate) fn non_empty(value: impl AsRef<str>) -> Option<String> {
    let value = value.as_ref().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// RFC 3339 in UTC with a `Z` suffix; fractional seconds only when present.
pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Set `name`, replacing any earlier value.
pub(crate) fn set_param(params: &mut Vec<(&'static str, String)>, name: &'static str, value: String) {
    match params.iter_mut().find(|(n, _)| *n == name) {
        Some(slot) => slot.1 = value,
        None => params.push((name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_join_skips_blank_values() {
        assert_eq!(join(["a", " ", "b "], ","), Some("a,b".to_string()));
        assert_eq!(join(Vec::<String>::new(), ","), None);
        assert_eq!(join(["", "  "], "|"), None);
    }

    #[test]
    fn test_match_separators() {
        assert_eq!(Match::All.separator(), ",");
        assert_eq!(Match::Any.separator(), "|");
        assert_eq!(Match::default(), Match::All);
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2016, 1, 16, 0, 0, 0).unwrap();
        assert_eq!(timestamp(&at), "2016-01-16T00:00:00Z");

        let at = at + chrono::Duration::milliseconds(250);
        assert_eq!(timestamp(&at), "2016-01-16T00:00:00.250Z");
    }

    #[test]
    fn test_set_param_replaces() {
        let mut params = Vec::new();
        set_param(&mut params, "size", "10".to_string());
        set_param(&mut params, "sort", "time".to_string());
        set_param(&mut params, "size", "20".to_string());
        assert_eq!(
            params,
            vec![("size", "20".to_string()), ("sort", "time".to_string())]
        );
    }
}
