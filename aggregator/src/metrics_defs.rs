//! Metrics definitions for the aggregator.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with endpoint, status.",
};

pub const UPSTREAM_REQUESTS: MetricDef = MetricDef {
    name: "upstream.requests",
    metric_type: MetricType::Counter,
    description: "Number of per-tag upstream requests. Tagged with outcome.",
};

pub const UPSTREAM_DURATION: MetricDef = MetricDef {
    name: "upstream.duration",
    metric_type: MetricType::Histogram,
    description: "Duration of a single per-tag upstream request in seconds",
};

pub const POSTS_RETURNED: MetricDef = MetricDef {
    name: "posts.returned",
    metric_type: MetricType::Histogram,
    description: "Number of posts in a successful /api/posts response",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    UPSTREAM_REQUESTS,
    UPSTREAM_DURATION,
    POSTS_RETURNED,
];
