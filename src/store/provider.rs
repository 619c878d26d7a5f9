use crate::api::{AuthApi, HttpApi, PropertyApi};
use crate::error::{Error, Result};
use crate::filter;
use crate::models::{Credentials, Property, PropertyDraft, Registration, SearchFilters, User, UserUpdate};
use crate::normalize::{normalize_favorite_ids, normalize_properties, normalize_property, normalize_user, unwrap_property};
use crate::storage::{read_json, write_json, KeyValueStore, AUTH_TOKEN_KEY, FAVORITES_KEY, LANGUAGE_KEY, USER_KEY};
use crate::store::state::{reduce, Action, AppState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Messages stored in `AppState::error` when an action fails
pub mod messages {
    pub const LOAD_PROPERTIES: &str = "Failed to load properties";
    pub const LOAD_USER_PROPERTIES: &str = "Failed to load your properties";
    pub const LOAD_FAVORITES: &str = "Failed to load favorites";
    pub const ADD_PROPERTY: &str = "Failed to add property";
    pub const UPDATE_PROPERTY: &str = "Failed to update property";
    pub const DELETE_PROPERTY: &str = "Failed to delete property";
    pub const TOGGLE_FAVORITE: &str = "Failed to update favorites";
    pub const LOGIN: &str = "Login failed. Please check your credentials.";
    pub const REGISTER: &str = "Registration failed";
    pub const UPDATE_USER: &str = "Failed to update profile";
}

/// Single source of truth for UI-visible data.
///
/// Action methods call the API adapters, normalize whatever shape comes back
/// and write the result through [`reduce`]. Failures are logged, recorded in
/// `state.error` and returned to the caller.
pub struct AppProvider {
    properties_api: Arc<dyn PropertyApi>,
    auth_api: Arc<dyn AuthApi>,
    storage: Arc<dyn KeyValueStore>,
    state: AppState,
}

impl AppProvider {
    pub fn new(
        properties_api: Arc<dyn PropertyApi>,
        auth_api: Arc<dyn AuthApi>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            properties_api,
            auth_api,
            storage,
            state: AppState::default(),
        }
    }

    /// Provider backed by one HTTP client for both services
    pub fn with_http(api: Arc<HttpApi>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(api.clone(), api, storage)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        reduce(&mut self.state, action);
    }

    /// Hydrate from local storage, revalidate the stored session, then load
    /// properties and favorites concurrently
    pub async fn initialize(&mut self) -> Result<()> {
        let has_session = self.hydrate();

        if has_session {
            match self.auth_api.current_user().await {
                Ok(body) => {
                    let user = normalize_user(&body);
                    debug!("Session revalidated for user {}", user.id);
                    self.persist(USER_KEY, &user);
                    self.dispatch(Action::SetUser(Some(user)));
                }
                Err(Error::Unauthorized) => {
                    warn!("Stored session is no longer valid, clearing credentials");
                    self.clear_session();
                    self.dispatch(Action::SetUser(None));
                }
                Err(e) => warn!("Could not revalidate session, keeping cached user: {}", e),
            }
        }

        self.dispatch(Action::SetLoading(true));

        let api = Arc::clone(&self.properties_api);
        let logged_in = self.state.is_authenticated();
        let (properties, favorites) = tokio::join!(api.list_properties(), async {
            if logged_in {
                Some(api.list_favorites().await)
            } else {
                None
            }
        });

        match favorites {
            Some(Ok(body)) => self.apply_favorites(normalize_favorite_ids(&body)),
            Some(Err(e)) => warn!("Failed to load favorites: {}", e),
            None => {}
        }

        match properties {
            Ok(body) => {
                let properties = normalize_properties(&body);
                info!("Loaded {} properties", properties.len());
                self.dispatch(Action::SetProperties(properties));
                self.dispatch(Action::SetLoading(false));
                Ok(())
            }
            Err(e) => Err(self.fail(messages::LOAD_PROPERTIES, e)),
        }
    }

    /// Fetch the full listing and overwrite both property lists
    pub async fn load_properties(&mut self) -> Result<()> {
        self.dispatch(Action::SetLoading(true));

        match self.properties_api.list_properties().await {
            Ok(body) => {
                let properties = normalize_properties(&body);
                info!("Loaded {} properties", properties.len());
                self.dispatch(Action::SetProperties(properties));
                self.dispatch(Action::SetLoading(false));
                Ok(())
            }
            Err(e) => Err(self.fail(messages::LOAD_PROPERTIES, e)),
        }
    }

    /// Fetch the logged-in user's own listings
    pub async fn load_user_properties(&mut self) -> Result<()> {
        if !self.state.is_authenticated() {
            return Err(Error::NotLoggedIn);
        }

        match self.properties_api.list_user_properties().await {
            Ok(body) => {
                let properties = normalize_properties(&body);
                debug!("Loaded {} user properties", properties.len());
                self.dispatch(Action::SetUserProperties(properties));
                Ok(())
            }
            Err(e) => Err(self.fail(messages::LOAD_USER_PROPERTIES, e)),
        }
    }

    /// Replace the favorite set with the server's copy
    pub async fn load_favorites(&mut self) -> Result<()> {
        if !self.state.is_authenticated() {
            return Err(Error::NotLoggedIn);
        }

        match self.properties_api.list_favorites().await {
            Ok(body) => {
                self.apply_favorites(normalize_favorite_ids(&body));
                Ok(())
            }
            Err(e) => Err(self.fail(messages::LOAD_FAVORITES, e)),
        }
    }

    /// Re-filter the loaded properties; the full list is rescanned every call
    pub fn filter_properties(&mut self, filters: SearchFilters) -> &[Property] {
        let filtered = filter::filter_properties(&self.state.properties, &filters);
        debug!("Filter kept {} of {} properties", filtered.len(), self.state.properties.len());
        self.dispatch(Action::SetFilters(filters));
        self.dispatch(Action::SetFilteredProperties(filtered));
        &self.state.filtered_properties
    }

    pub async fn add_property(&mut self, draft: &PropertyDraft) -> Result<Property> {
        self.dispatch(Action::SetLoading(true));

        let body = match self.properties_api.create_property(draft).await {
            Ok(body) => body,
            Err(e) => return Err(self.fail(messages::ADD_PROPERTY, e)),
        };

        let property = normalize_property(unwrap_property(&body));
        info!("Added property {} ({})", property.id, property.title);
        self.dispatch(Action::AddProperty(property.clone()));
        self.dispatch(Action::SetLoading(false));

        // Keep "my listings" consistent with the server
        if self.state.is_authenticated() {
            if let Err(e) = self.load_user_properties().await {
                warn!("Property added but reloading user properties failed: {}", e);
            }
        }

        Ok(property)
    }

    pub async fn update_property(&mut self, id: &str, draft: &PropertyDraft) -> Result<Property> {
        self.dispatch(Action::SetLoading(true));

        match self.properties_api.update_property(id, draft).await {
            Ok(body) => {
                let mut property = normalize_property(unwrap_property(&body));
                if property.id.is_empty() {
                    property.id = id.to_string();
                }
                info!("Updated property {}", property.id);
                self.dispatch(Action::UpdateProperty(property.clone()));
                self.dispatch(Action::SetLoading(false));
                Ok(property)
            }
            Err(e) => Err(self.fail(messages::UPDATE_PROPERTY, e)),
        }
    }

    pub async fn delete_property(&mut self, id: &str) -> Result<()> {
        self.dispatch(Action::SetLoading(true));

        match self.properties_api.delete_property(id).await {
            Ok(()) => {
                info!("Deleted property {}", id);
                self.dispatch(Action::DeleteProperty(id.to_string()));
                self.dispatch(Action::SetLoading(false));
                self.persist(FAVORITES_KEY, &self.state.favorites);
                Ok(())
            }
            Err(e) => Err(self.fail(messages::DELETE_PROPERTY, e)),
        }
    }

    /// Flip a favorite; the server decides the resulting state
    pub async fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
        if !self.state.is_authenticated() {
            warn!("Favorite toggle for {} without a logged-in user", id);
            return Err(Error::NotLoggedIn);
        }

        match self.properties_api.toggle_favorite(id).await {
            Ok(is_favorite) => {
                let action = if is_favorite {
                    Action::AddFavorite(id.to_string())
                } else {
                    Action::RemoveFavorite(id.to_string())
                };
                self.dispatch(action);
                self.persist(FAVORITES_KEY, &self.state.favorites);
                Ok(is_favorite)
            }
            Err(e) => Err(self.fail(messages::TOGGLE_FAVORITE, e)),
        }
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<User> {
        self.dispatch(Action::SetLoading(true));
        self.dispatch(Action::ClearError);

        let session = match self.auth_api.login(credentials).await {
            Ok(session) => session,
            Err(e) => return Err(self.fail(messages::LOGIN, e)),
        };

        let user = self.start_session(&session.token, &session.user);
        self.load_session_data().await;
        self.dispatch(Action::SetLoading(false));
        Ok(user)
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<User> {
        self.dispatch(Action::SetLoading(true));
        self.dispatch(Action::ClearError);

        let session = match self.auth_api.register(registration).await {
            Ok(session) => session,
            Err(e) => return Err(self.fail(messages::REGISTER, e)),
        };

        let user = self.start_session(&session.token, &session.user);
        self.load_session_data().await;
        self.dispatch(Action::SetLoading(false));
        Ok(user)
    }

    /// Drop the session locally even if the server call fails
    pub async fn logout(&mut self) {
        if let Err(e) = self.auth_api.logout().await {
            warn!("Logout request failed: {}", e);
        }
        self.clear_session();
        self.forget(FAVORITES_KEY);
        self.dispatch(Action::Logout);
        info!("Logged out");
    }

    pub async fn update_user(&mut self, update: &UserUpdate) -> Result<User> {
        if !self.state.is_authenticated() {
            return Err(Error::NotLoggedIn);
        }

        self.dispatch(Action::SetLoading(true));

        match self.auth_api.update_user(update).await {
            Ok(body) => {
                let user = normalize_user(&body);
                self.persist(USER_KEY, &user);
                self.dispatch(Action::UpdateUser(user.clone()));
                self.dispatch(Action::SetLoading(false));
                Ok(user)
            }
            Err(e) => Err(self.fail(messages::UPDATE_USER, e)),
        }
    }

    pub fn change_language(&mut self, language: &str) {
        let language = language.trim().to_string();
        self.persist(LANGUAGE_KEY, &language);
        self.dispatch(Action::SetLanguage(language));
    }

    pub fn clear_error(&mut self) {
        self.dispatch(Action::ClearError);
    }

    /// Load language, favorites and cached session; true when a session was found
    fn hydrate(&mut self) -> bool {
        if let Some(language) = self.restore::<String>(LANGUAGE_KEY) {
            self.dispatch(Action::SetLanguage(language));
        }

        if let Some(favorites) = self.restore::<BTreeSet<String>>(FAVORITES_KEY) {
            self.dispatch(Action::SetFavorites(favorites));
        }

        let token = self.restore::<String>(AUTH_TOKEN_KEY);
        let has_token = token.is_some();
        self.auth_api.set_token(token);

        let user = self.restore::<User>(USER_KEY);
        let has_user = user.is_some();
        if has_user {
            self.dispatch(Action::SetUser(user));
        }

        has_token || has_user
    }

    fn start_session(&mut self, token: &str, payload: &serde_json::Value) -> User {
        let user = normalize_user(payload);
        self.auth_api.set_token(Some(token.to_string()));
        self.persist(AUTH_TOKEN_KEY, token);
        self.persist(USER_KEY, &user);
        info!("Signed in as {}", user.display_name());
        self.dispatch(Action::SetUser(Some(user.clone())));
        user
    }

    /// Properties, favorites and own listings after login/register
    async fn load_session_data(&mut self) {
        let api = Arc::clone(&self.properties_api);
        let (properties, favorites, own) = tokio::join!(
            api.list_properties(),
            api.list_favorites(),
            api.list_user_properties()
        );

        match properties {
            Ok(body) => self.dispatch(Action::SetProperties(normalize_properties(&body))),
            Err(e) => {
                error!("{}: {}", messages::LOAD_PROPERTIES, e);
                self.dispatch(Action::SetError(messages::LOAD_PROPERTIES.to_string()));
            }
        }

        match favorites {
            Ok(body) => self.apply_favorites(normalize_favorite_ids(&body)),
            Err(e) => warn!("Failed to load favorites: {}", e),
        }

        match own {
            Ok(body) => self.dispatch(Action::SetUserProperties(normalize_properties(&body))),
            Err(e) => warn!("Failed to load user properties: {}", e),
        }
    }

    fn apply_favorites(&mut self, ids: Vec<String>) {
        let favorites: BTreeSet<String> = ids.into_iter().collect();
        debug!("Loaded {} favorites", favorites.len());
        self.persist(FAVORITES_KEY, &favorites);
        self.dispatch(Action::SetFavorites(favorites));
    }

    fn clear_session(&mut self) {
        self.auth_api.set_token(None);
        self.forget(AUTH_TOKEN_KEY);
        self.forget(USER_KEY);
    }

    fn fail(&mut self, message: &str, err: Error) -> Error {
        error!("{}: {}", message, err);
        self.dispatch(Action::SetError(message.to_string()));
        err
    }

    fn restore<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match read_json(self.storage.as_ref(), key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding unreadable {} from storage: {}", key, e);
                self.forget(key);
                None
            }
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = write_json(self.storage.as_ref(), key, value) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }

    fn forget(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!("Failed to remove {} from storage: {}", key, e);
        }
    }
}
