use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logged-in account
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    /// Ids of properties this user owns
    pub properties: Vec<String>,
    pub favorites: Vec<String>,
    pub is_verified: bool,
    pub user_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.first_name.is_empty() {
            &self.first_name
        } else {
            &self.email
        }
    }

    pub fn owns(&self, property_id: &str) -> bool {
        self.properties.iter().any(|id| id == property_id)
    }
}
