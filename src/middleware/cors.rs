use axum::http::Method;
use axum::Router;
use tower_http::cors::{self, CorsLayer};

pub trait CorsExt<S> {
    fn with_cors(self, allowed_origins: &[String]) -> Router<S>;
}

impl<S> CorsExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Add CORS to Router. Only the configured origins are allowed.
    fn with_cors(self, allowed_origins: &[String]) -> Router<S> {
        let origins = allowed_origins.to_vec();
        let cors_layer = CorsLayer::new()
            .allow_origin(cors::AllowOrigin::predicate(move |origin, _| {
                origins.iter().any(|o| o.as_bytes() == origin.as_bytes())
            }))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(cors::Any);

        self.layer(cors_layer)
    }
}
