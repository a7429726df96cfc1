use crate::errors::AggregatorError;
use crate::executor::Executor;
use crate::metrics_defs::{POSTS_RETURNED, REQUEST_DURATION};
use crate::posts::PostsResponse;
use crate::query::{PostsParams, PostsQuery};
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use shared::histogram;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Builds the public `/api` router
pub fn router(executor: Executor) -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/posts", get(posts))
        .with_state(executor)
        .layer(TraceLayer::new_for_http())
}

/// JSON body pretty-printed with four-space indentation
struct PrettyJson<T>(StatusCode, T);

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buf)
}

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match to_pretty_json(&self.1) {
            Ok(body) => (
                self.0,
                [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Serialize)]
struct PingResponse {
    success: bool,
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: String,
}

impl IntoResponse for AggregatorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Posts request failed");
        } else {
            tracing::debug!(error = %self, "Rejected posts request");
        }

        PrettyJson(
            status,
            ApiErrorResponse {
                error: self.public_message(),
            },
        )
        .into_response()
    }
}

async fn ping() -> PrettyJson<PingResponse> {
    PrettyJson(StatusCode::OK, PingResponse { success: true })
}

async fn posts(
    State(executor): State<Executor>,
    params: Result<Query<PostsParams>, QueryRejection>,
) -> Response {
    let start = Instant::now();

    let result = match params {
        Ok(Query(params)) => match PostsQuery::try_from(params) {
            Ok(query) => executor.execute(&query).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(AggregatorError::InvalidQuery(rejection.body_text())),
    };

    let response = match result {
        Ok(posts) => {
            histogram!(POSTS_RETURNED).record(posts.len() as f64);
            PrettyJson(StatusCode::OK, PostsResponse { posts }).into_response()
        }
        Err(e) => e.into_response(),
    };

    histogram!(
        REQUEST_DURATION,
        "endpoint" => "posts",
        "status" => response.status().as_u16().to_string()
    )
    .record(start.elapsed().as_secs_f64());

    response
}
