use axum::http::{HeaderName, HeaderValue};
use axum_extra::extract::WithRejection;
use axum_extra::headers::{self, Header};
use axum_extra::TypedHeader;
use uuid::Uuid;

use crate::error::AppError;

static X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// Caller identity set by the upstream authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub Uuid);

/// Extractor for handlers that act on behalf of a user. A missing or
/// malformed header is answered with a JSON 400.
pub type ActingUserHeader = WithRejection<TypedHeader<ActingUser>, AppError>;

impl Header for ActingUser {
    fn name() -> &'static HeaderName {
        &X_USER_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let id = value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(headers::Error::invalid)?;
        Ok(ActingUser(id))
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        if let Ok(v) = HeaderValue::from_str(&self.0.to_string()) {
            values.extend(std::iter::once(v));
        }
    }
}
