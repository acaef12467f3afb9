//! Request identity signals
//!
//! Reads the origin signal and client token off an HTTP request, and builds
//! the `Set-Cookie` value for newly issued tokens. No verification happens
//! here: the forwarded-for header is client-controllable.

use axum::extract::ConnectInfo;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use std::net::SocketAddr;

/// Cookie carrying the client token
pub const TOKEN_COOKIE: &str = "cookieId";

static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Origin signal: first `X-Forwarded-For` entry, else the peer address
pub fn origin_signal<B>(request: &Request<B>) -> Option<String> {
    forwarded_for(request.headers()).or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    })
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(&X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Value of the `cookieId` cookie, searching every Cookie header
pub fn client_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` header for a freshly issued token, expiring with the cooldown window
pub fn token_cookie(token: &str, max_age_secs: u64) -> Option<(HeaderName, HeaderValue)> {
    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        TOKEN_COOKIE, token, max_age_secs
    );
    HeaderValue::from_str(&cookie)
        .ok()
        .map(|value| (SET_COOKIE, value))
}
