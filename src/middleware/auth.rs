use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::auth::{cookie, AuthError, TokenService};
use crate::error::ApiError;

pub const ADMIN_PAGES_PREFIX: &str = "/admin";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const ADMIN_API_PREFIX: &str = "/api/admin";

/// What a guarded route answers when the credential is missing or bad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// 307 to the login page, for browser navigation.
    Redirect(String),
    /// 401 JSON error, for API clients.
    Unauthorized,
}

impl Rejection {
    fn respond(&self, reason: AuthError) -> Response {
        match self {
            Rejection::Redirect(target) => Redirect::temporary(target).into_response(),
            Rejection::Unauthorized => ApiError::from(reason).into_response(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRule {
    pub prefix: String,
    /// Always reachable, along with anything beneath it.
    pub login_path: Option<String>,
    pub rejection: Rejection,
}

impl GuardRule {
    pub fn pages(prefix: &str, login_path: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            login_path: Some(login_path.to_string()),
            rejection: Rejection::Redirect(login_path.to_string()),
        }
    }

    pub fn api(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            login_path: None,
            rejection: Rejection::Unauthorized,
        }
    }

    fn covers(&self, path: &str) -> bool {
        is_under(path, &self.prefix)
    }

    fn is_login(&self, path: &str) -> bool {
        self.login_path.as_deref().is_some_and(|login| is_under(path, login))
    }
}

/// `path` equals `prefix` or continues it with a `/`.
fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// The path the router and the static file service will actually resolve:
/// percent-decoded, empty and `.` segments dropped, `..` applied.
fn canonical_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// No rule covers the path.
    Bypass,
    /// Login entry of a guarded section.
    Open,
    Authorized,
    Denied { rejection: Rejection, reason: AuthError },
}

impl GateDecision {
    pub fn forwards(&self) -> bool {
        !matches!(self, GateDecision::Denied { .. })
    }
}

/// Guards route prefixes with the admin credential carried in the
/// `admin-token` cookie. The first rule covering a path decides.
pub struct AccessGate {
    tokens: Arc<TokenService>,
    rules: Vec<GuardRule>,
}

impl AccessGate {
    pub fn new(tokens: Arc<TokenService>, rules: Vec<GuardRule>) -> Self {
        Self { tokens, rules }
    }

    /// Admin pages redirect to their login page; the admin API answers 401.
    pub fn for_site(tokens: Arc<TokenService>) -> Self {
        Self::new(
            tokens,
            vec![
                GuardRule::pages(ADMIN_PAGES_PREFIX, ADMIN_LOGIN_PATH),
                GuardRule::api(ADMIN_API_PREFIX),
            ],
        )
    }

    pub fn evaluate(&self, path: &str, token: Option<&str>) -> GateDecision {
        let path = canonical_path(path);
        let Some(rule) = self.rules.iter().find(|rule| rule.covers(&path)) else {
            return GateDecision::Bypass;
        };
        if rule.is_login(&path) {
            return GateDecision::Open;
        }
        match self.tokens.verify(token) {
            Ok(_) => GateDecision::Authorized,
            Err(reason) => GateDecision::Denied {
                rejection: rule.rejection.clone(),
                reason,
            },
        }
    }
}

/// Access gate middleware. Forwarded requests pass through untouched.
pub async fn access_gate(State(gate): State<Arc<AccessGate>>, request: Request, next: Next) -> Response {
    let decision = gate.evaluate(request.uri().path(), cookie::admin_token(request.headers()));
    match decision {
        GateDecision::Denied { rejection, reason } => {
            debug!(path = %request.uri().path(), reason = %reason, "Access gate rejected request");
            rejection.respond(reason)
        }
        _ => next.run(request).await,
    }
}
