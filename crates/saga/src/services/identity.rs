//! Identity lookup trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;
use domain::Role;

use super::ServiceUnavailable;

/// A user resolved from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    /// Creates a client-role user.
    pub fn client(id: impl Into<UserId>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role: Role::Client,
        }
    }

    /// Creates an admin-role user.
    pub fn admin(id: impl Into<UserId>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role: Role::Admin,
        }
    }
}

/// Trait for resolving bearer credentials to users.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Validates a bearer token. `None` means invalid or expired.
    async fn validate(&self, token: &str) -> Result<Option<AuthUser>, ServiceUnavailable>;
}

#[derive(Debug, Default)]
struct IdentityState {
    tokens: HashMap<String, AuthUser>,
    unavailable: bool,
}

/// In-memory identity service for tests and the demo server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityService {
    state: Arc<RwLock<IdentityState>>,
}

impl InMemoryIdentityService {
    /// Creates a new identity service with no known tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token for a user.
    pub fn register(&self, token: impl Into<String>, user: AuthUser) {
        self.state.write().unwrap().tokens.insert(token.into(), user);
    }

    /// Simulates the identity service being unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentityService {
    async fn validate(&self, token: &str) -> Result<Option<AuthUser>, ServiceUnavailable> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(ServiceUnavailable::new("identity", "connection refused"));
        }
        Ok(state.tokens.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_token_resolves() {
        let identity = InMemoryIdentityService::new();
        identity.register("tok-1", AuthUser::client("user-1", "u@example.com", "User One"));

        let user = identity.validate("tok-1").await.unwrap().unwrap();
        assert_eq!(user.id.as_str(), "user-1");
        assert_eq!(user.role, Role::Client);
    }

    #[tokio::test]
    async fn test_unknown_token_is_invalid() {
        let identity = InMemoryIdentityService::new();
        let result = identity.validate("nope").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_identity_errors() {
        let identity = InMemoryIdentityService::new();
        identity.set_unavailable(true);
        assert!(identity.validate("tok-1").await.is_err());
    }
}
