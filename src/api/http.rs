use crate::api::traits::{AuthApi, PropertyApi};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{AuthSession, Credentials, PropertyDraft, Registration, UserUpdate};
use crate::normalize::{flag_at, text_at, unwrap_user};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("property-hub/", env!("CARGO_PKG_VERSION"));

/// REST client implementing both the property and auth services
pub struct HttpApi {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpApi {
    /// Create a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(&config.api_url, config.timeout)
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let request = self.client.request(method, url).header(ACCEPT, "application/json");
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode the JSON body; empty bodies decode to `Value::Null`
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("API rejected credentials (401)");
            return Err(Error::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
            warn!("API returned status: {} ({})", status, message);
            return Err(Error::Status {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PropertyApi for HttpApi {
    async fn list_properties(&self) -> Result<Value> {
        self.send(self.request(Method::GET, "properties")).await
    }

    async fn list_user_properties(&self) -> Result<Value> {
        self.send(self.request(Method::GET, "user/properties")).await
    }

    async fn create_property(&self, draft: &PropertyDraft) -> Result<Value> {
        self.send(self.request(Method::POST, "properties").json(draft)).await
    }

    async fn update_property(&self, id: &str, draft: &PropertyDraft) -> Result<Value> {
        let path = format!("properties/{}", id);
        self.send(self.request(Method::PUT, &path).json(draft)).await
    }

    async fn delete_property(&self, id: &str) -> Result<()> {
        let path = format!("properties/{}", id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn list_favorites(&self) -> Result<Value> {
        self.send(self.request(Method::GET, "favorites")).await
    }

    async fn toggle_favorite(&self, id: &str) -> Result<bool> {
        let path = format!("properties/{}/favorite", id);
        let body = self.send(self.request(Method::POST, &path)).await?;
        parse_favorite_state(&body)
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession> {
        let body = self.send(self.request(Method::POST, "login").json(credentials)).await?;
        let session = parse_session(&body)?;
        self.set_token(Some(session.token.clone()));
        info!("Logged in as {}", credentials.email);
        Ok(session)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthSession> {
        let body = self
            .send(self.request(Method::POST, "register").json(registration))
            .await?;
        let session = parse_session(&body)?;
        self.set_token(Some(session.token.clone()));
        info!("Registered {}", registration.email);
        Ok(session)
    }

    async fn logout(&self) -> Result<()> {
        let result = self.send(self.request(Method::POST, "logout")).await;
        // Drop the token even when the server call fails
        self.set_token(None);
        result.map(|_| ())
    }

    async fn current_user(&self) -> Result<Value> {
        self.send(self.request(Method::GET, "user")).await
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<Value> {
        self.send(self.request(Method::PUT, "user").json(update)).await
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }
}

/// Pull the token and user payload out of a login/register response
pub fn parse_session(body: &Value) -> Result<AuthSession> {
    let token = text_at(body, &["token", "access_token", "data.token", "data.access_token"])
        .ok_or_else(|| Error::InvalidResponse("missing auth token".to_string()))?;

    let user = body
        .pointer("/user")
        .or_else(|| body.pointer("/data/user"))
        .filter(|user| user.is_object())
        .unwrap_or_else(|| unwrap_user(body))
        .clone();

    Ok(AuthSession { token, user })
}

/// Read the new favorite state from a toggle response
pub fn parse_favorite_state(body: &Value) -> Result<bool> {
    flag_at(
        body,
        &[
            "is_favorite",
            "favorited",
            "is_favorited",
            "data.is_favorite",
            "data.favorited",
            "data.is_favorited",
        ],
    )
    .ok_or_else(|| Error::InvalidResponse("missing favorite state".to_string()))
}

/// `message` or `error` field of an error body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    text_at(&value, &["message", "error"])
}
