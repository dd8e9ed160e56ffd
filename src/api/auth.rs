//! Acting-user resolution from the `Authorization` header.

use super::AppState;
use crate::error::ServiceError;
use crate::types::User;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

/// Accepts `Token <key>` and `Bearer <key>`, case-insensitively.
fn parse_authorization(value: &str) -> Option<&str> {
    let (scheme, rest) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let key = rest.trim();
    if key.is_empty() {
        return None;
    }
    Some(key)
}

/// The authenticated user a request acts as.
#[derive(Debug, Clone)]
pub struct ActingUser(pub User);

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(key) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_authorization)
        else {
            return Err(ServiceError::unauthorized());
        };

        match state.engine.db().user_for_token(key)? {
            Some(user) => Ok(ActingUser(user)),
            None => {
                debug!("Rejected unknown token");
                Err(ServiceError::unauthorized())
            }
        }
    }
}
