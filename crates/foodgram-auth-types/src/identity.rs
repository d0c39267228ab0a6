//! Gateway-injected identity headers extractor.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use http::request::Parts;

use foodgram_core::error::AppError;

pub const USER_ID_HEADER: &str = "x-foodgram-user-id";
pub const USER_ROLE_HEADER: &str = "x-foodgram-user-role";

/// Lowest role value that counts as staff.
pub const STAFF_ROLE: u8 = 1;

/// User identity injected by the gateway via `x-foodgram-user-id` and
/// `x-foodgram-user-role` headers.
///
/// As a required extractor it returns 401 when `x-foodgram-user-id` is absent or
/// malformed. As `Option<IdentityHeaders>` an absent id yields `None` (anonymous
/// caller) while a malformed one is still rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub user_id: i32,
    pub user_role: u8,
}

impl IdentityHeaders {
    pub fn is_staff(&self) -> bool {
        self.user_role >= STAFF_ROLE
    }
}

enum HeaderState {
    Absent,
    Invalid,
    Present(IdentityHeaders),
}

fn read_identity(parts: &Parts) -> HeaderState {
    let Some(raw_id) = parts.headers.get(USER_ID_HEADER) else {
        return HeaderState::Absent;
    };
    let user_id = raw_id
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<i32>().ok());
    // Role is optional; missing means a regular user.
    let user_role = match parts.headers.get(USER_ROLE_HEADER) {
        None => Some(0),
        Some(v) => v.to_str().ok().and_then(|s| s.trim().parse::<u8>().ok()),
    };
    match (user_id, user_role) {
        (Some(user_id), Some(user_role)) => HeaderState::Present(IdentityHeaders {
            user_id,
            user_role,
        }),
        _ => HeaderState::Invalid,
    }
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = AppError;

    // axum-core 0.5 declares `fn -> impl Future + Send`; read the headers
    // synchronously and hand back a 'static future.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let state = read_identity(parts);
        async move {
            match state {
                HeaderState::Present(identity) => Ok(identity),
                HeaderState::Absent | HeaderState::Invalid => Err(AppError::Unauthorized),
            }
        }
    }
}

impl<S> OptionalFromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let state = read_identity(parts);
        async move {
            match state {
                HeaderState::Present(identity) => Ok(Some(identity)),
                HeaderState::Absent => Ok(None),
                HeaderState::Invalid => Err(AppError::Unauthorized),
            }
        }
    }
}
