//! Blog post records and the ordering applied to a merged result set.

use crate::query::{Direction, SortBy};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A single upstream post.
///
/// Only the numeric sort fields are interpreted; every other field is passed
/// through untouched, in the order the upstream sent it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Post(IndexMap<String, Value>);

impl Post {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Numeric value of the sort field, if present and numeric
    pub fn sort_key(&self, sort_by: SortBy) -> Option<f64> {
        self.field(sort_by.field_name()).and_then(Value::as_f64)
    }
}

/// Body shape of both the upstream response and our own `/api/posts` response
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

// Posts without a numeric key order after every numbered post.
fn compare_keys(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by `sort_by`. Equal keys keep their input order in both directions.
pub fn sort_posts(posts: &mut [Post], sort_by: SortBy, direction: Direction) {
    posts.sort_by(|a, b| {
        let ordering = compare_keys(a.sort_key(sort_by), b.sort_key(sort_by));
        match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
}

/// True if every adjacent pair is monotonic in `sort_by` for `direction`.
pub fn is_sorted(posts: &[Post], sort_by: SortBy, direction: Direction) -> bool {
    posts.windows(2).all(|pair| {
        let ordering = compare_keys(pair[0].sort_key(sort_by), pair[1].sort_key(sort_by));
        match direction {
            Direction::Asc => ordering != Ordering::Greater,
            Direction::Desc => ordering != Ordering::Less,
        }
    })
}
