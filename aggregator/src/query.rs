//! Validation of the `/api/posts` query string.

use crate::errors::AggregatorError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Raw query parameters, exactly as the client sent them
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PostsParams {
    pub tags: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

/// Numeric post field used as the sort key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Id,
    Reads,
    Likes,
    Popularity,
}

impl SortBy {
    pub const fn field_name(&self) -> &'static str {
        match self {
            SortBy::Id => "id",
            SortBy::Reads => "reads",
            SortBy::Likes => "likes",
            SortBy::Popularity => "popularity",
        }
    }
}

impl FromStr for SortBy {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortBy::Id),
            "reads" => Ok(SortBy::Reads),
            "likes" => Ok(SortBy::Likes),
            "popularity" => Ok(SortBy::Popularity),
            _ => Err(AggregatorError::InvalidSortBy),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(AggregatorError::InvalidDirection),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// A validated posts query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostsQuery {
    /// Tags in request order. Duplicates and empty segments are kept as given.
    pub tags: Vec<String>,
    pub sort_by: SortBy,
    pub direction: Direction,
}

impl TryFrom<PostsParams> for PostsQuery {
    type Error = AggregatorError;

    /// Checks `tags`, then `sortBy`, then `direction`; the first failure is returned.
    fn try_from(params: PostsParams) -> Result<Self, Self::Error> {
        let tags = match params.tags.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.split(',').map(String::from).collect(),
            _ => return Err(AggregatorError::TagsRequired),
        };

        let sort_by = params
            .sort_by
            .as_deref()
            .map(SortBy::from_str)
            .transpose()?
            .unwrap_or_default();

        let direction = params
            .direction
            .as_deref()
            .map(Direction::from_str)
            .transpose()?
            .unwrap_or_default();

        Ok(PostsQuery {
            tags,
            sort_by,
            direction,
        })
    }
}
