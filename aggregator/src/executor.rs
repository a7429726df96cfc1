use crate::config::ExecutionMode;
use crate::errors::AggregatorError;
use crate::posts::{Post, is_sorted, sort_posts};
use crate::query::PostsQuery;
use crate::upstream::PostSource;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fetches every requested tag, concatenates the results in tag order, and sorts them.
#[derive(Clone)]
pub struct Executor {
    source: Arc<dyn PostSource>,
    mode: ExecutionMode,
}

impl Executor {
    pub fn new(source: Arc<dyn PostSource>, mode: ExecutionMode) -> Self {
        Self { source, mode }
    }

    pub async fn execute(&self, query: &PostsQuery) -> Result<Vec<Post>, AggregatorError> {
        let mut posts = match self.mode {
            ExecutionMode::Parallel => self.fetch_parallel(&query.tags).await?,
            ExecutionMode::Sequential => self.fetch_sequential(&query.tags).await?,
        };

        sort_posts(&mut posts, query.sort_by, query.direction);

        if is_sorted(&posts, query.sort_by, query.direction) {
            tracing::debug!(
                sort_by = %query.sort_by,
                direction = %query.direction,
                count = posts.len(),
                "Sorted posts"
            );
        } else {
            tracing::warn!(
                sort_by = %query.sort_by,
                direction = %query.direction,
                "Sorted posts are not monotonic in the sort field"
            );
        }

        Ok(posts)
    }

    /// Fetch tags one after another, stopping at the first failure
    async fn fetch_sequential(&self, tags: &[String]) -> Result<Vec<Post>, AggregatorError> {
        let mut posts = Vec::new();
        for tag in tags {
            posts.extend(self.source.fetch_posts(tag).await?);
        }
        Ok(posts)
    }

    /// Fetch all tags concurrently and reassemble the results by tag index.
    ///
    /// If several tags fail, the error of the earliest tag is returned.
    async fn fetch_parallel(&self, tags: &[String]) -> Result<Vec<Post>, AggregatorError> {
        let mut join_set = JoinSet::new();

        for (index, tag) in tags.iter().enumerate() {
            let source = self.source.clone();
            let tag = tag.clone();
            join_set.spawn(async move {
                let result = source.fetch_posts(&tag).await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<Vec<Post>, AggregatorError>>> =
            (0..tags.len()).map(|_| None).collect();

        while let Some(join_result) = join_set.join_next().await {
            match join_result {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => {
                    tracing::error!("Upstream task panicked: {}", e);
                    return Err(AggregatorError::InternalError(format!(
                        "upstream task failed: {e}"
                    )));
                }
            }
        }

        let mut posts = Vec::new();
        for (tag, slot) in tags.iter().zip(slots) {
            let result = slot.ok_or_else(|| {
                AggregatorError::InternalError(format!("no result for tag {tag}"))
            })?;
            posts.extend(result?);
        }

        Ok(posts)
    }
}
