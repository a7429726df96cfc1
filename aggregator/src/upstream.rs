use crate::config::UpstreamConfig;
use crate::errors::AggregatorError;
use crate::metrics_defs::{UPSTREAM_DURATION, UPSTREAM_REQUESTS};
use crate::posts::{Post, PostsResponse};
use async_trait::async_trait;
use reqwest::Url;
use shared::{counter, histogram};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// A source of blog posts, queried one tag at a time
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self, tag: &str) -> Result<Vec<Post>, AggregatorError>;
}

/// Fetches posts over HTTP from `<url>?tag=<tag>`
pub struct HttpPostSource {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpPostSource {
    pub fn new(config: &UpstreamConfig) -> Self {
        HttpPostSource {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn request(&self, tag: &str) -> Result<Vec<Post>, AggregatorError> {
        let response = self
            .client
            .get(self.url.clone())
            .query(&[("tag", tag)])
            .send()
            .await
            .map_err(|e| AggregatorError::UpstreamRequestFailed {
                tag: tag.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::UpstreamStatus {
                tag: tag.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AggregatorError::UpstreamRequestFailed {
                tag: tag.to_string(),
                reason: e.to_string(),
            })?;

        let parsed: PostsResponse =
            serde_json::from_slice(&body).map_err(|e| AggregatorError::UpstreamMalformedBody {
                tag: tag.to_string(),
                reason: e.to_string(),
            })?;

        Ok(parsed.posts)
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    /// The timeout covers connecting, sending, and collecting the whole body.
    async fn fetch_posts(&self, tag: &str) -> Result<Vec<Post>, AggregatorError> {
        let start = Instant::now();

        let result = timeout(self.timeout, self.request(tag))
            .await
            .map_err(|_| AggregatorError::UpstreamTimeout(tag.to_string()))
            .and_then(|inner| inner);

        let outcome = match &result {
            Ok(_) => "success",
            Err(AggregatorError::UpstreamTimeout(_)) => "timeout",
            Err(_) => "failure",
        };
        counter!(UPSTREAM_REQUESTS, "outcome" => outcome).increment(1);
        histogram!(UPSTREAM_DURATION).record(start.elapsed().as_secs_f64());

        match &result {
            Ok(posts) => tracing::debug!(tag, count = posts.len(), "Fetched posts"),
            Err(e) => tracing::warn!(tag, error = %e, "Upstream fetch failed"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::testutils::{MockUpstream, tagged_post};
    use serde_json::Value;

    fn source_for(url: Url, timeout_secs: u64) -> HttpPostSource {
        HttpPostSource::new(&UpstreamConfig {
            url,
            timeout_secs,
            execution_mode: ExecutionMode::Parallel,
        })
    }

    #[tokio::test]
    async fn test_fetch_posts_success() {
        let upstream = MockUpstream::start(vec![
            ("tech", vec![tagged_post(1, "tech", 5), tagged_post(2, "tech", 10)]),
            ("health", vec![tagged_post(3, "health", 7)]),
        ])
        .await;

        let source = source_for(upstream.url(), 5);
        let posts = source.fetch_posts("tech").await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].field("id"), Some(&Value::from(1)));

        // Unknown tags return an empty list, like the real upstream
        let posts = source.fetch_posts("science").await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_tag_is_query_encoded() {
        let upstream = MockUpstream::start(vec![("a&b", vec![tagged_post(1, "a&b", 1)])]).await;

        let source = source_for(upstream.url(), 5);
        let posts = source.fetch_posts("a&b").await.unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let upstream = MockUpstream::start(vec![]).await;

        let source = source_for(upstream.url().join("/missing").unwrap(), 5);
        let err = source.fetch_posts("tech").await.unwrap_err();
        assert!(matches!(
            err,
            AggregatorError::UpstreamStatus { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let upstream = MockUpstream::start(vec![]).await;

        let source = source_for(upstream.url().join("/malformed").unwrap(), 5);
        let err = source.fetch_posts("tech").await.unwrap_err();
        assert!(matches!(err, AggregatorError::UpstreamMalformedBody { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Grab a free port and release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/posts")).unwrap();
        let source = source_for(url, 5);
        let err = source.fetch_posts("tech").await.unwrap_err();
        assert!(matches!(err, AggregatorError::UpstreamRequestFailed { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let upstream = MockUpstream::start(vec![]).await;

        let source = source_for(upstream.url().join("/slow").unwrap(), 1);
        let err = source.fetch_posts("tech").await.unwrap_err();
        assert!(matches!(err, AggregatorError::UpstreamTimeout(tag) if tag == "tech"));
    }
}
