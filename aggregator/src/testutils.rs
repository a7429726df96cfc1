use crate::errors::AggregatorError;
use crate::posts::{Post, PostsResponse};
use crate::upstream::PostSource;
use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

pub fn tagged_post(id: u64, tag: &str, likes: u64) -> Post {
    serde_json::from_value(json!({
        "author": "Test Author",
        "authorId": 1,
        "id": id,
        "likes": likes,
        "popularity": (id as f64) / 100.0,
        "reads": id * 10,
        "tags": [tag],
    }))
    .unwrap()
}

type PostsByTag = Arc<HashMap<String, Vec<Post>>>;

#[derive(Deserialize)]
struct TagParams {
    tag: String,
}

/// Local stand-in for the blog post API.
///
/// `/posts?tag=..` serves the configured posts, `/malformed` returns a body
/// that is not JSON, and `/slow` never answers within a test timeout.
pub struct MockUpstream {
    addr: std::net::SocketAddr,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start(posts: Vec<(&str, Vec<Post>)>) -> Self {
        let posts: PostsByTag = Arc::new(
            posts
                .into_iter()
                .map(|(tag, posts)| (tag.to_string(), posts))
                .collect(),
        );

        let app = Router::new()
            .route("/posts", get(serve_posts))
            .route("/malformed", get(|| async { "<html>not json</html>" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    Json(PostsResponse::default())
                }),
            )
            .with_state(posts);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream { addr, handle }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/posts", self.addr)).unwrap()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_posts(
    State(posts): State<PostsByTag>,
    Query(params): Query<TagParams>,
) -> Json<PostsResponse> {
    Json(PostsResponse {
        posts: posts.get(&params.tag).cloned().unwrap_or_default(),
    })
}

/// In-memory post source. Tags can be made to fail or to answer late.
#[derive(Default)]
pub struct StaticPostSource {
    posts: HashMap<String, Vec<Post>>,
    failing: HashMap<String, fn(String) -> AggregatorError>,
    delays: HashMap<String, Duration>,
}

impl StaticPostSource {
    pub fn new(posts: Vec<(&str, Vec<Post>)>) -> Self {
        StaticPostSource {
            posts: posts
                .into_iter()
                .map(|(tag, posts)| (tag.to_string(), posts))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_failure(mut self, tag: &str, make_error: fn(String) -> AggregatorError) -> Self {
        self.failing.insert(tag.to_string(), make_error);
        self
    }

    pub fn with_delay(mut self, tag: &str, delay: Duration) -> Self {
        self.delays.insert(tag.to_string(), delay);
        self
    }
}

#[async_trait]
impl PostSource for StaticPostSource {
    async fn fetch_posts(&self, tag: &str) -> Result<Vec<Post>, AggregatorError> {
        if let Some(delay) = self.delays.get(tag) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(make_error) = self.failing.get(tag) {
            return Err(make_error(tag.to_string()));
        }

        Ok(self.posts.get(tag).cloned().unwrap_or_default())
    }
}
