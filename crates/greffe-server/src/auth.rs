//! Bearer-token admin authentication.
//!
//! The whole admin surface sits behind one middleware: a missing or
//! malformed Authorization header is 401, a token that does not carry the
//! admin role is 403. Either way the request dies before any pipeline
//! state is read.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use secrecy::{ExposeSecret, SecretString};

use crate::error::AppError;

/// The configured admin credential.
#[derive(Clone)]
pub struct AdminAuth {
    token: Arc<SecretString>,
}

impl AdminAuth {
    pub fn new(token: SecretString) -> Self {
        Self {
            token: Arc::new(token),
        }
    }

    /// Does the presented token carry the admin role?
    pub fn is_admin(&self, presented: &str) -> bool {
        presented == self.token.expose_secret()
    }
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The token itself must never reach logs.
        f.debug_struct("AdminAuth").finish_non_exhaustive()
    }
}

/// Middleware gating every admin route.
pub async fn require_admin(req: Request, next: Next) -> Response {
    let Some(auth) = req.extensions().get::<AdminAuth>().cloned() else {
        return AppError::Internal("auth configuration missing".to_string()).into_response();
    };

    let header = match req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return AppError::Unauthorized.into_response(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) if !t.is_empty() => t,
        _ => return AppError::Unauthorized.into_response(),
    };

    if !auth.is_admin(token) {
        return AppError::Forbidden.into_response();
    }

    next.run(req).await
}
