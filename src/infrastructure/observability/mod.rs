//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use self::metrics::{
    DispatchOutcome, PrometheusMetrics, create_metrics_router, init_metrics, record_http_request,
    record_simulation_dispatch, record_simulation_result,
};
