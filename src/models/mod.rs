mod requests;
mod user;

pub use requests::{AuthSession, Credentials, PropertyDraft, Registration, UserUpdate};
pub use user::User;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a listing is for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    #[default]
    Sale,
    Rent,
}

impl ListingType {
    /// Parse the loose spellings the API uses ("rent", "for_rent", "Rental", ...)
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        if raw.is_empty() {
            None
        } else if raw.contains("rent") {
            Some(ListingType::Rent)
        } else if raw.contains("sale") || raw.contains("sell") || raw.contains("buy") {
            Some(ListingType::Sale)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "sale",
            ListingType::Rent => "rent",
        }
    }
}

/// Geographic position of a property
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Image or video attached to a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Media {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub is_featured: bool,
}

/// Who to contact about a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Flattened property record, whatever shape the API returned it in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub property_type: String,
    pub listing_type: ListingType,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub square_feet: f64,
    pub year_built: Option<u32>,
    pub status: String,
    pub is_featured: bool,
    pub features: Vec<String>,
    pub media: Vec<Media>,
    pub coordinates: Option<Coordinates>,
    pub contact: ContactInfo,
    pub owner_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Property {
    /// URL of the featured image, falling back to the first one
    pub fn cover_image(&self) -> Option<&str> {
        self.media
            .iter()
            .find(|m| m.is_featured)
            .or_else(|| self.media.first())
            .map(|m| m.url.as_str())
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features
            .iter()
            .any(|f| f.eq_ignore_ascii_case(feature.trim()))
    }
}

/// Client-side search criteria, recomputed per filter action
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    pub search: Option<String>,
    pub listing_type: Option<ListingType>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Minimum number of bedrooms
    pub bedrooms: Option<u32>,
    /// Minimum number of bathrooms
    pub bathrooms: Option<u32>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub features: Vec<String>,
    pub location: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        *self == SearchFilters::default()
    }
}
