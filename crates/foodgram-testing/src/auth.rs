//! Mock auth helpers for integration tests.
//!
//! Services behind the gateway receive `x-foodgram-user-id` + `x-foodgram-user-role`
//! headers. In tests, `MockAuth` produces these headers directly so no real
//! gateway is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use foodgram_auth_types::identity::{STAFF_ROLE, USER_ID_HEADER, USER_ROLE_HEADER};

/// Configurable identity injected into test requests.
#[derive(Debug, Clone, Copy)]
pub struct MockAuth {
    pub user_id: i32,
    pub user_role: u8,
}

impl MockAuth {
    pub fn new(user_id: i32, user_role: u8) -> Self {
        Self { user_id, user_role }
    }

    pub fn user(user_id: i32) -> Self {
        Self::new(user_id, 0)
    }

    pub fn staff(user_id: i32) -> Self {
        Self::new(user_id, STAFF_ROLE)
    }

    /// Header pairs in the order the gateway sets them.
    pub fn header_pairs(&self) -> [(HeaderName, HeaderValue); 2] {
        [
            (
                HeaderName::from_static(USER_ID_HEADER),
                HeaderValue::from(self.user_id),
            ),
            (
                HeaderName::from_static(USER_ROLE_HEADER),
                HeaderValue::from(u16::from(self.user_role)),
            ),
        ]
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        self.header_pairs().into_iter().collect()
    }
}
