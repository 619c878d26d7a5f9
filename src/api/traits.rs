use crate::error::Result;
use crate::models::{AuthSession, Credentials, PropertyDraft, Registration, UserUpdate};
use async_trait::async_trait;
use serde_json::Value;

/// Property service. Responses are returned raw so the store can normalize
/// whichever envelope the endpoint happens to use.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn list_properties(&self) -> Result<Value>;

    /// Listings owned by the authenticated user
    async fn list_user_properties(&self) -> Result<Value>;

    async fn create_property(&self, draft: &PropertyDraft) -> Result<Value>;

    async fn update_property(&self, id: &str, draft: &PropertyDraft) -> Result<Value>;

    async fn delete_property(&self, id: &str) -> Result<()>;

    async fn list_favorites(&self) -> Result<Value>;

    /// Flip the favorite flag; returns the server's new state
    async fn toggle_favorite(&self, id: &str) -> Result<bool>;
}

/// Authentication service
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession>;

    async fn register(&self, registration: &Registration) -> Result<AuthSession>;

    async fn logout(&self) -> Result<()>;

    /// Fetch the session's user; fails with `Error::Unauthorized` on an expired token
    async fn current_user(&self) -> Result<Value>;

    async fn update_user(&self, update: &UserUpdate) -> Result<Value>;

    /// Bearer token attached to subsequent requests
    fn set_token(&self, token: Option<String>);
}
