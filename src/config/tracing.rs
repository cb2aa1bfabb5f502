use tracing::Level;
use tracing_subscriber::{filter, prelude::*};

/// Log verbosity per target: request traces and service events are kept,
/// connection pool chatter is not.
pub fn service_targets() -> filter::Targets {
    filter::Targets::new()
        .with_target("tower_http::trace", Level::DEBUG)
        .with_target("blog_service", Level::DEBUG)
        .with_target("diesel_async", Level::WARN)
        .with_target("deadpool", Level::WARN)
        .with_default(Level::INFO)
}

pub trait HttpTracingExt: tracing::Subscriber {
    fn with_http_tracing(self) -> tracing_subscriber::layer::Layered<filter::Targets, Self>
    where
        Self: Sized,
    {
        self.with(service_targets())
    }
}

impl<S: tracing::Subscriber> HttpTracingExt for S {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_events_pass_pool_noise_does_not() {
        let t = service_targets();
        assert!(t.would_enable("blog_service::services::posts", &Level::DEBUG));
        assert!(t.would_enable("tower_http::trace::on_response", &Level::DEBUG));
        assert!(!t.would_enable("diesel_async::pooled_connection", &Level::INFO));
        assert!(!t.would_enable("hyper::proto", &Level::DEBUG));
    }
}
