use std::time::Duration;
use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::HttpMakeClassifier;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

pub type HttpStack = ServiceBuilder<
    Stack<
        TimeoutLayer,
        Stack<
            RequestBodyLimitLayer,
            Stack<
                MapResponseBodyLayer<fn(LimitBody) -> axum::body::Body>,
                Stack<CorsLayer, Stack<TraceLayer<HttpMakeClassifier>, Identity>>,
            >,
        >,
    >,
>;

type LimitBody = tower_http::limit::ResponseBody<axum::body::Body>;

/// Request tracing, permissive CORS, a body limit sized for large instances and
/// a timeout on synchronous endpoints (solving itself runs as a job).
pub fn stack(body_limit: usize, timeout: Duration) -> HttpStack {
    let trace = TraceLayer::new_for_http();
    let cors = CorsLayer::permissive();
    let limit = RequestBodyLimitLayer::new(body_limit);

    ServiceBuilder::new()
        .layer(trace)
        .layer(cors)
        // Type adapter only: CORS needs a `Default` response body, which the
        // body-limit wrapper lacks.
        .layer(MapResponseBodyLayer::new(axum::body::Body::new as fn(LimitBody) -> axum::body::Body))
        .layer(limit)
        .layer(TimeoutLayer::new(timeout))
}
