//! Session lookup and role checks, applied once per route group as axum
//! middleware instead of inside each handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Director,
    Teacher,
    Parent,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Director => "director",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
        }
    }

    /// Roles allowed to read classroom ratios.
    pub const RATIO_READERS: &'static [Role] = &[Role::Administrator, Role::Director, Role::Teacher];
    /// Roles allowed to record check-ins and sign-ins.
    pub const ATTENDANCE_WRITERS: &'static [Role] =
        &[Role::Administrator, Role::Director, Role::Teacher];
    /// Roles allowed to change staff-to-classroom assignments.
    pub const ASSIGNMENT_WRITERS: &'static [Role] = &[Role::Administrator, Role::Director];
}

/// Profile row resolved for an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

/// Request extension inserted by [`require_roles`] once the caller is authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserProfile);

/// Resolves bearer tokens to user profiles.
pub trait ProfileDirectory: Send + Sync {
    fn profile_for_token(&self, token: &str) -> Result<Option<UserProfile>, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingCredentials,
    #[error("session is not recognized")]
    UnknownSession,
    #[error("role {} may not access this resource", .0.label())]
    Forbidden(Role),
    #[error("profile directory unavailable: {0}")]
    Directory(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingCredentials | AuthError::UnknownSession => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Middleware state: where to look sessions up and which roles pass.
pub struct RoleGate<D> {
    directory: Arc<D>,
    allowed: Arc<[Role]>,
}

impl<D> Clone for RoleGate<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            allowed: Arc::clone(&self.allowed),
        }
    }
}

impl<D> RoleGate<D>
where
    D: ProfileDirectory + 'static,
{
    pub fn new(directory: Arc<D>, allowed: &[Role]) -> Self {
        Self {
            directory,
            allowed: Arc::from(allowed),
        }
    }

    pub fn authorize(&self, authorization: Option<&str>) -> Result<UserProfile, AuthError> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let profile = self
            .directory
            .profile_for_token(token)?
            .ok_or(AuthError::UnknownSession)?;

        if self.allowed.contains(&profile.role) {
            Ok(profile)
        } else {
            Err(AuthError::Forbidden(profile.role))
        }
    }
}

/// Rejects the request unless the bearer token maps to a profile whose role
/// is in the gate's allowed set.
pub async fn require_roles<D>(
    State(gate): State<RoleGate<D>>,
    mut request: Request,
    next: Next,
) -> Response
where
    D: ProfileDirectory + 'static,
{
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match gate.authorize(authorization) {
        Ok(profile) => {
            debug!(user_id = %profile.user_id, role = profile.role.label(), "request authorized");
            request.extensions_mut().insert(AuthenticatedUser(profile));
            next.run(request).await
        }
        Err(err) => {
            warn!(path = %request.uri().path(), error = %err, "request rejected");
            err.into_response()
        }
    }
}

/// Token table held in memory; suitable for demos and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticProfileDirectory {
    sessions: HashMap<String, UserProfile>,
}

impl StaticProfileDirectory {
    pub fn new<I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = (String, UserProfile)>,
    {
        Self {
            sessions: sessions.into_iter().collect(),
        }
    }

    pub fn sessions(&self) -> impl Iterator<Item = (&str, &UserProfile)> {
        self.sessions
            .iter()
            .map(|(token, profile)| (token.as_str(), profile))
    }
}

impl ProfileDirectory for StaticProfileDirectory {
    fn profile_for_token(&self, token: &str) -> Result<Option<UserProfile>, AuthError> {
        Ok(self.sessions.get(token).cloned())
    }
}
