// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token middleware.

use crate::config::TOKEN_COOKIE;
use crate::services::AccessToken;
use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

/// Middleware that requires a Strava access token.
///
/// The token is read from the `strava_token` cookie, falling back to an
/// `Authorization: Bearer` header, and stored as an `AccessToken` request
/// extension for the handlers.
pub async fn require_auth(
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_token(&jar, request.headers()).ok_or_else(|| {
        tracing::debug!(path = %request.uri().path(), "Request without access token");
        StatusCode::UNAUTHORIZED
    })?;

    request.extensions_mut().insert(token);

    Ok(next.run(request).await)
}

/// Cookie first, then header. Empty values count as missing.
pub fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Option<AccessToken> {
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(AccessToken::new(cookie.value()));
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(AccessToken::new)
}
