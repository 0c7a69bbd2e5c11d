use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUESTS: MetricDef = MetricDef {
    name: "gateway.requests",
    metric_type: MetricType::Counter,
    description: "Requests routed. Tagged with route, status.",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "gateway.request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with route.",
};

pub const AUTH_FAILURES: MetricDef = MetricDef {
    name: "gateway.auth.failures",
    metric_type: MetricType::Counter,
    description: "Requests rejected for a missing or mismatched bearer token",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUESTS, REQUEST_DURATION, AUTH_FAILURES];
