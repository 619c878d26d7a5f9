use crate::filter::filter_properties;
use crate::models::{Property, SearchFilters, User};
use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_LANGUAGE: &str = "en";

/// Everything the UI renders from
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppState {
    pub properties: Vec<Property>,
    pub filtered_properties: Vec<Property>,
    /// Listings owned by the logged-in user
    pub user_properties: Vec<Property>,
    pub user: Option<User>,
    pub favorites: BTreeSet<String>,
    pub filters: SearchFilters,
    pub loading: bool,
    pub error: Option<String>,
    pub language: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            filtered_properties: Vec::new(),
            user_properties: Vec::new(),
            user: None,
            favorites: BTreeSet::new(),
            filters: SearchFilters::default(),
            loading: false,
            error: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl AppState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_favorite(&self, property_id: &str) -> bool {
        self.favorites.contains(property_id)
    }

    pub fn property(&self, property_id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == property_id)
    }

    /// Favorited properties that are present in the loaded list
    pub fn favorite_properties(&self) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|p| self.favorites.contains(&p.id))
            .collect()
    }
}

/// State transitions; every write to `AppState` goes through one of these
#[derive(Debug, Clone)]
pub enum Action {
    SetLoading(bool),
    SetError(String),
    ClearError,
    /// Replaces both `properties` and `filtered_properties`
    SetProperties(Vec<Property>),
    SetFilteredProperties(Vec<Property>),
    SetFilters(SearchFilters),
    SetUserProperties(Vec<Property>),
    AddProperty(Property),
    UpdateProperty(Property),
    DeleteProperty(String),
    SetUser(Option<User>),
    UpdateUser(User),
    SetFavorites(BTreeSet<String>),
    AddFavorite(String),
    RemoveFavorite(String),
    SetLanguage(String),
    Logout,
}

/// Apply an action to the state
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetLoading(loading) => state.loading = loading,
        Action::SetError(message) => {
            state.error = Some(message);
            state.loading = false;
        }
        Action::ClearError => state.error = None,
        Action::SetProperties(properties) => {
            state.filtered_properties = properties.clone();
            state.properties = properties;
        }
        Action::SetFilteredProperties(properties) => state.filtered_properties = properties,
        Action::SetFilters(filters) => state.filters = filters,
        Action::SetUserProperties(properties) => state.user_properties = properties,
        Action::AddProperty(property) => {
            state.properties.insert(0, property);
            state.filtered_properties = filter_properties(&state.properties, &state.filters);
        }
        Action::UpdateProperty(property) => {
            for list in [&mut state.properties, &mut state.user_properties] {
                if let Some(slot) = list.iter_mut().find(|p| p.id == property.id) {
                    *slot = property.clone();
                }
            }
            state.filtered_properties = filter_properties(&state.properties, &state.filters);
        }
        Action::DeleteProperty(id) => {
            state.properties.retain(|p| p.id != id);
            state.filtered_properties.retain(|p| p.id != id);
            state.user_properties.retain(|p| p.id != id);
            state.favorites.remove(&id);
        }
        Action::SetUser(user) => state.user = user,
        Action::UpdateUser(user) => state.user = Some(user),
        Action::SetFavorites(favorites) => state.favorites = favorites,
        Action::AddFavorite(id) => {
            state.favorites.insert(id);
        }
        Action::RemoveFavorite(id) => {
            state.favorites.remove(&id);
        }
        Action::SetLanguage(language) => state.language = language,
        Action::Logout => {
            state.user = None;
            state.favorites.clear();
            state.user_properties.clear();
        }
    }
}
