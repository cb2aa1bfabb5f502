use axum::http::{Request, Response};
use axum::Router;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::Span;

pub trait HttpLoggingExt<S> {
    fn with_http_logging(self) -> Self;
}

impl<S> HttpLoggingExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// One span per request carrying the method, path and acting user.
    fn with_http_logging(self) -> Router<S> {
        self.layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let acting_user = request
                        .headers()
                        .get("x-user-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        target: "tower_http::trace",
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        acting_user,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {
                    tracing::debug!(target: "tower_http::trace", "started");
                })
                .on_response(|response: &Response<_>, latency: Duration, _span: &Span| {
                    tracing::info!(
                        target: "tower_http::trace",
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis() as u64,
                        "finished"
                    )
                }),
        )
    }
}
