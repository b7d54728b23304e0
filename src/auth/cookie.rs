//! Reading and writing the `admin-token` cookie.

use axum::http::{header, HeaderMap, HeaderValue};

use super::TOKEN_TTL_HOURS;

pub const ADMIN_COOKIE: &str = "admin-token";

/// Attributes shared by the set and clear variants of the admin cookie.
#[derive(Debug, Clone)]
pub struct AdminCookie {
    value: String,
    max_age: i64,
    secure: bool,
}

impl AdminCookie {
    pub fn session(token: &str, secure: bool) -> Self {
        Self {
            value: token.to_string(),
            max_age: TOKEN_TTL_HOURS * 3600,
            secure,
        }
    }

    pub fn cleared(secure: bool) -> Self {
        Self {
            value: String::new(),
            max_age: 0,
            secure,
        }
    }

    pub fn build(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
            ADMIN_COOKIE, self.value, self.max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn header_value(&self) -> HeaderValue {
        // Token values are base64url and dots, always valid header bytes.
        HeaderValue::from_str(&self.build()).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

/// Find a cookie by name across all `Cookie` headers.
pub fn get_cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

pub fn admin_token(headers: &HeaderMap) -> Option<&str> {
    get_cookie_value(headers, ADMIN_COOKIE).filter(|token| !token.is_empty())
}
