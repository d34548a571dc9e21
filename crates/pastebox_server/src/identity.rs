//! Request identity resolution from the authenticating proxy header.

use crate::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use pastebox_core::{Config, Identity};
use std::convert::Infallible;

/// Identity of the caller, taken from the configured auth header.
///
/// A missing, empty, or non-UTF-8 header yields [`Identity::Anonymous`].
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

/// Resolve an identity from request headers under `config`.
pub fn identity_from_headers(config: &Config, headers: &axum::http::HeaderMap) -> Identity {
    let Some(username) = headers
        .get(config.auth_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        return Identity::Anonymous;
    };

    if config.is_admin(username) {
        Identity::admin(username)
    } else {
        Identity::user(username)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(identity_from_headers(&state.config, &parts.headers)))
    }
}
