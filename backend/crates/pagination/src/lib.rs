//! Offset and limit page windows shared by list endpoints.
//!
//! Callers hand raw query-string values to [`PageWindow::resolve`]. Values
//! that are missing, unparsable, or out of range fall back to the defaults
//! instead of failing the request; every fallback is reported so the inbound
//! adapter can log it.
//!
//! # Examples
//! ```
//! use pagination::{PageQuery, PageWindow};
//!
//! let query = PageQuery {
//!     limit: Some("25".to_owned()),
//!     offset: Some("-3".to_owned()),
//! };
//! let resolved = PageWindow::resolve(&query);
//! assert_eq!(resolved.window.limit(), 25);
//! assert_eq!(resolved.window.offset(), 0);
//! assert_eq!(resolved.fallbacks.len(), 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when the caller supplies none or an invalid one.
pub const DEFAULT_LIMIT: i64 = 10;
/// Exclusive upper bound for the page size.
pub const LIMIT_UPPER_BOUND: i64 = 100;
/// Offset used when the caller supplies none or an invalid one.
pub const DEFAULT_OFFSET: i64 = 0;

/// Raw paging parameters as they arrive on the query string.
///
/// Values stay as strings so that garbage input degrades to defaults rather
/// than a deserialisation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// Requested page size.
    pub limit: Option<String>,
    /// Requested number of rows to skip.
    pub offset: Option<String>,
}

impl PageQuery {
    /// Collect paging values from decoded query-string pairs.
    ///
    /// The first occurrence of each key wins and unrelated keys are ignored,
    /// so a repeated parameter never fails the request.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageQuery;
    ///
    /// let query = PageQuery::from_pairs([("limit", "5"), ("limit", "7")]);
    /// assert_eq!(query.limit.as_deref(), Some("5"));
    /// assert_eq!(query.offset, None);
    /// ```
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.as_ref().to_owned());
            }
        }
        query
    }
}

/// Identifies which paging parameter a fallback applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageParam {
    /// The `limit` parameter.
    Limit,
    /// The `offset` parameter.
    Offset,
}

impl fmt::Display for PageParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => f.write_str("limit"),
            Self::Offset => f.write_str("offset"),
        }
    }
}

/// Reasons a paging parameter was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageWindowError {
    /// The value is not an integer.
    #[error("{param} must be an integer, got {value:?}")]
    NotAnInteger {
        /// Parameter that failed to parse.
        param: PageParam,
        /// Raw value supplied by the caller.
        value: String,
    },
    /// The limit lies outside `(0, LIMIT_UPPER_BOUND)`.
    #[error("limit must be between 1 and {max}, got {limit}", max = LIMIT_UPPER_BOUND - 1)]
    LimitOutOfRange {
        /// Rejected limit.
        limit: i64,
    },
    /// The offset is negative.
    #[error("offset must not be negative, got {offset}")]
    NegativeOffset {
        /// Rejected offset.
        offset: i64,
    },
}

/// A validated offset/limit window.
///
/// ## Invariants
/// - `0 < limit < LIMIT_UPPER_BOUND`
/// - `offset >= 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    limit: i64,
    offset: i64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

/// Result of resolving raw query values into a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWindow {
    /// Window to apply to the query.
    pub window: PageWindow,
    /// Parameters that were replaced by their default, in `limit`, `offset`
    /// order.
    pub fallbacks: Vec<PageWindowError>,
}

impl PageWindow {
    /// Build a window, rejecting out-of-range values.
    ///
    /// # Errors
    /// Returns [`PageWindowError::LimitOutOfRange`] or
    /// [`PageWindowError::NegativeOffset`] when an invariant is violated.
    pub const fn new(limit: i64, offset: i64) -> Result<Self, PageWindowError> {
        if limit <= 0 || limit >= LIMIT_UPPER_BOUND {
            return Err(PageWindowError::LimitOutOfRange { limit });
        }
        if offset < 0 {
            return Err(PageWindowError::NegativeOffset { offset });
        }
        Ok(Self { limit, offset })
    }

    /// Resolve raw query values, substituting defaults for anything invalid.
    pub fn resolve(query: &PageQuery) -> ResolvedWindow {
        let mut fallbacks = Vec::new();

        let limit = match parse_limit(query.limit.as_deref()) {
            Ok(limit) => limit,
            Err(err) => {
                fallbacks.push(err);
                DEFAULT_LIMIT
            }
        };
        let offset = match parse_offset(query.offset.as_deref()) {
            Ok(offset) => offset,
            Err(err) => {
                fallbacks.push(err);
                DEFAULT_OFFSET
            }
        };

        ResolvedWindow {
            window: Self { limit, offset },
            fallbacks,
        }
    }

    /// Maximum number of rows in the page.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }
}

fn parse_integer(param: PageParam, raw: &str) -> Result<i64, PageWindowError> {
    raw.parse::<i64>()
        .map_err(|_| PageWindowError::NotAnInteger {
            param,
            value: raw.to_owned(),
        })
}

fn parse_limit(raw: Option<&str>) -> Result<i64, PageWindowError> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return Ok(DEFAULT_LIMIT);
    };
    let limit = parse_integer(PageParam::Limit, raw)?;
    if limit <= 0 || limit >= LIMIT_UPPER_BOUND {
        return Err(PageWindowError::LimitOutOfRange { limit });
    }
    Ok(limit)
}

fn parse_offset(raw: Option<&str>) -> Result<i64, PageWindowError> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return Ok(DEFAULT_OFFSET);
    };
    let offset = parse_integer(PageParam::Offset, raw)?;
    if offset < 0 {
        return Err(PageWindowError::NegativeOffset { offset });
    }
    Ok(offset)
}
