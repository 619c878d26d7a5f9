//! Mapping from the API's loosely shaped JSON into flat `Property` / `User` records.
//!
//! Collections come back in one of three envelopes (bare array, `{data: [...]}`,
//! paginated `{data: {data: [...]}}`) and individual fields move around between
//! endpoints, so every field is read through a fallback chain of paths.

use crate::models::{ContactInfo, Coordinates, ListingType, Media, Property, User};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

/// Extract the record list from any of the known collection envelopes
pub fn unwrap_collection(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items.as_slice()),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => Some(items.as_slice()),
            Some(Value::Object(page)) => match page.get("data") {
                Some(Value::Array(items)) => Some(items.as_slice()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

/// Extract a property from `{data: {...}}`, `{property: {...}}` or a bare record
pub fn unwrap_property(value: &Value) -> &Value {
    unwrap_keyed(value, &["data", "property"])
}

/// Extract a user from `{data: {...}}`, `{user: {...}}` or a bare record
pub fn unwrap_user(value: &Value) -> &Value {
    unwrap_keyed(value, &["data", "user"])
}

/// A value with its own `id` is already the record; nested objects under
/// `keys` are only followed for envelopes
fn unwrap_keyed<'a>(value: &'a Value, keys: &[&str]) -> &'a Value {
    if lookup(value, "id").is_some() {
        return value;
    }
    for key in keys {
        match value.get(*key) {
            Some(inner) if inner.is_object() => return inner,
            _ => {}
        }
    }
    value
}

/// Normalize a property list response; unknown envelopes yield an empty list
pub fn normalize_properties(value: &Value) -> Vec<Property> {
    match unwrap_collection(value) {
        Some(items) => items
            .iter()
            .filter(|item| item.is_object())
            .map(normalize_property)
            .collect(),
        None => {
            warn!("Unexpected property list shape, treating as empty: {}", shape_of(value));
            Vec::new()
        }
    }
}

/// Map one remote property record into the internal shape
pub fn normalize_property(value: &Value) -> Property {
    let id = first(value, &["id", "property_id", "_id"])
        .and_then(normalize_id)
        .unwrap_or_default();

    if id.is_empty() {
        debug!("Property record without id: {}", shape_of(value));
    }

    let address = match value.get("address") {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => text(value, &["address.street", "address.line1", "address.address", "location.address", "street"])
            .unwrap_or_default(),
    };

    Property {
        id,
        title: text(value, &["title", "name"]).unwrap_or_default(),
        description: text(value, &["description", "details.description"]).unwrap_or_default(),
        price: number(value, &["price", "details.price", "amount"]).unwrap_or(0.0),
        address,
        city: text(value, &["address.city", "city", "location.city"]).unwrap_or_default(),
        state: text(value, &["address.state", "state", "location.state"]).unwrap_or_default(),
        zip: text(value, &["address.zip", "address.zip_code", "address.postal_code", "zip", "zip_code", "postal_code"])
            .unwrap_or_default(),
        country: text(value, &["address.country", "country", "location.country"]).unwrap_or_default(),
        property_type: text(value, &["property_type", "type", "category", "details.property_type"])
            .unwrap_or_default(),
        listing_type: text(value, &["listing_type", "listingType", "purpose", "details.listing_type"])
            .and_then(|raw| ListingType::parse(&raw))
            .unwrap_or_default(),
        bedrooms: count(value, &["details.bedrooms", "bedrooms", "beds"]).unwrap_or(0),
        bathrooms: count(value, &["details.bathrooms", "bathrooms", "baths"]).unwrap_or(0),
        square_feet: number(value, &["details.square_feet", "square_feet", "details.area", "area", "size"])
            .unwrap_or(0.0),
        year_built: count(value, &["details.year_built", "year_built"]).filter(|y| *y > 0),
        status: text(value, &["status"]).unwrap_or_else(|| "available".to_string()),
        is_featured: first(value, &["is_featured", "featured"])
            .and_then(as_bool)
            .unwrap_or(false),
        features: string_list(value, &["features", "details.features", "amenities"]),
        media: normalize_media(value),
        coordinates: normalize_coordinates(value),
        contact: ContactInfo {
            name: text(value, &["contact_name", "contact.name", "user.name", "owner.name"]),
            email: text(value, &["contact_email", "contact.email", "user.email", "owner.email"]),
            phone: text(value, &["contact_phone", "contact.phone", "user.phone", "owner.phone"]),
        },
        owner_id: first(value, &["user_id", "owner_id", "user.id", "owner.id"]).and_then(normalize_id),
        created_at: first(value, &["created_at"]).and_then(as_datetime),
        updated_at: first(value, &["updated_at"]).and_then(as_datetime),
    }
}

/// Map a remote user payload into the internal shape
pub fn normalize_user(value: &Value) -> User {
    let value = unwrap_user(value);

    let mut first_name = text(value, &["first_name", "firstName"]);
    let mut last_name = text(value, &["last_name", "lastName"]);
    let name = text(value, &["name", "full_name"]).unwrap_or_else(|| {
        [first_name.as_deref(), last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    });

    // Split "Jane Q Doe" into "Jane" / "Q Doe" when the API sent only a full name
    if first_name.is_none() && !name.is_empty() {
        let mut parts = name.splitn(2, ' ');
        first_name = parts.next().map(str::to_string);
        if last_name.is_none() {
            last_name = parts.next().map(|rest| rest.trim().to_string()).filter(|s| !s.is_empty());
        }
    }

    let avatar = match value.get("avatar") {
        Some(Value::String(url)) if !url.trim().is_empty() => Some(url.trim().to_string()),
        Some(obj) if obj.is_object() => text(obj, &["url", "original_url", "path"]),
        _ => text(value, &["avatar_url", "profile_photo_url"]),
    };

    let is_verified = first(value, &["is_verified", "verified"])
        .and_then(as_bool)
        .unwrap_or_else(|| lookup(value, "email_verified_at").is_some());

    User {
        id: first(value, &["id", "user_id"]).and_then(normalize_id).unwrap_or_default(),
        name,
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.unwrap_or_default(),
        email: text(value, &["email"]).unwrap_or_default(),
        phone: text(value, &["phone", "phone_number"]),
        avatar,
        properties: id_list(value.get("properties")),
        favorites: id_list(value.get("favorites")),
        is_verified,
        user_type: text(value, &["user_type", "type", "role", "roles.0.name"])
            .unwrap_or_else(|| "user".to_string()),
        created_at: first(value, &["created_at"]).and_then(as_datetime),
        updated_at: first(value, &["updated_at"]).and_then(as_datetime),
    }
}

/// Favorite ids from a favorites response: bare ids, favorite rows or property records
pub fn normalize_favorite_ids(value: &Value) -> Vec<String> {
    match unwrap_collection(value) {
        Some(items) => items.iter().filter_map(favorite_id).collect(),
        None => {
            warn!("Unexpected favorites shape, treating as empty: {}", shape_of(value));
            Vec::new()
        }
    }
}

/// Stringify a numeric or string id
pub fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-blank text found along `paths`
pub(crate) fn text_at(value: &Value, paths: &[&str]) -> Option<String> {
    text(value, paths)
}

/// First boolean-ish flag (bool, 0/1, "true") found along `paths`
pub(crate) fn flag_at(value: &Value, paths: &[&str]) -> Option<bool> {
    first(value, paths).and_then(as_bool)
}

fn favorite_id(item: &Value) -> Option<String> {
    match item {
        Value::Object(_) => first(item, &["property_id", "property.id", "id"]).and_then(normalize_id),
        other => normalize_id(other),
    }
}

fn id_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(favorite_id).collect(),
        _ => Vec::new(),
    }
}

fn normalize_media(value: &Value) -> Vec<Media> {
    let from_media = media_list(lookup(value, "media"));
    if !from_media.is_empty() {
        return from_media;
    }
    media_list(first(value, &["images", "photos"]))
}

fn media_list(value: Option<&Value>) -> Vec<Media> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| match item {
            Value::String(url) if !url.trim().is_empty() => Some(Media {
                id: idx.to_string(),
                url: url.trim().to_string(),
                media_type: "image".to_string(),
                is_featured: idx == 0,
            }),
            Value::Object(_) => {
                let url = text(item, &["url", "original_url", "path", "file_url"])?;
                Some(Media {
                    id: first(item, &["id"]).and_then(normalize_id).unwrap_or_else(|| idx.to_string()),
                    url,
                    media_type: text(item, &["type", "media_type", "mime_type"])
                        .map(media_kind)
                        .unwrap_or_else(|| "image".to_string()),
                    is_featured: first(item, &["is_featured", "featured"])
                        .and_then(as_bool)
                        .unwrap_or(false),
                })
            }
            _ => None,
        })
        .collect()
}

/// Collapse MIME types ("image/jpeg") to the coarse kind the UI switches on
fn media_kind(raw: String) -> String {
    if raw.starts_with("image") {
        "image".to_string()
    } else if raw.starts_with("video") {
        "video".to_string()
    } else {
        raw
    }
}

fn normalize_coordinates(value: &Value) -> Option<Coordinates> {
    let lat = number(value, &["latitude", "lat", "coordinates.lat", "coordinates.latitude", "location.latitude", "location.lat"])?;
    let lng = number(value, &["longitude", "lng", "lon", "coordinates.lng", "coordinates.longitude", "location.longitude", "location.lng"])?;
    Some(Coordinates { lat, lng })
}

/// Follow a dotted path (`details.bedrooms`, `roles.0.name`); JSON null counts as missing
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn first<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(value, path))
}

fn text(value: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| lookup(value, path).and_then(as_text))
}

fn number(value: &Value, paths: &[&str]) -> Option<f64> {
    paths.iter().find_map(|path| lookup(value, path).and_then(as_f64))
}

fn count(value: &Value, paths: &[&str]) -> Option<u32> {
    number(value, paths)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.round() as u32)
}

fn string_list(value: &Value, paths: &[&str]) -> Vec<String> {
    let Some(found) = first(value, paths) else {
        return Vec::new();
    };

    match found {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        Value::String(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => first(value, &["name", "title", "value"]).and_then(as_text),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            // "$250,000" and "250000.00" both show up; commas are only
            // thousands separators, so "250.000,00" is rejected
            let last_dot = s.rfind('.');
            let last_comma = s.rfind(',');
            if s.matches('.').count() > 1 || matches!((last_dot, last_comma), (Some(d), Some(c)) if c > d) {
                return None;
            }
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Value {
        json!([
            { "id": 1, "title": "Villa", "price": "250000", "details": { "bedrooms": 4 } },
            { "id": "2", "title": "Flat", "price": 120000, "bedrooms": 2 }
        ])
    }

    #[test]
    fn test_all_envelopes_yield_same_list() {
        let bare = normalize_properties(&records());
        let wrapped = normalize_properties(&json!({ "data": records() }));
        let paginated = normalize_properties(&json!({ "data": { "current_page": 1, "data": records() } }));

        assert_eq!(bare.len(), 2);
        assert_eq!(bare, wrapped);
        assert_eq!(bare, paginated);
    }

    #[test]
    fn test_unknown_envelope_is_empty() {
        assert!(normalize_properties(&json!({ "items": records() })).is_empty());
        assert!(normalize_properties(&json!("oops")).is_empty());
        assert!(unwrap_collection(&json!({ "data": { "data": "nope" } })).is_none());
    }

    #[test]
    fn test_ids_are_stringified() {
        let props = normalize_properties(&records());
        assert_eq!(props[0].id, "1");
        assert_eq!(props[1].id, "2");
    }

    #[test]
    fn test_bedroom_fallback_chain() {
        let props = normalize_properties(&records());
        assert_eq!(props[0].bedrooms, 4);
        assert_eq!(props[1].bedrooms, 2);

        let bare = normalize_property(&json!({ "id": 3 }));
        assert_eq!(bare.bedrooms, 0);
        assert_eq!(bare.status, "available");
        assert_eq!(bare.listing_type, ListingType::Sale);
    }

    #[test]
    fn test_nested_details_win_over_top_level() {
        let prop = normalize_property(&json!({
            "id": 9,
            "bathrooms": 1,
            "details": { "bathrooms": 3, "square_feet": "1,850", "year_built": 1998 }
        }));
        assert_eq!(prop.bathrooms, 3);
        assert_eq!(prop.square_feet, 1850.0);
        assert_eq!(prop.year_built, Some(1998));
    }

    #[test]
    fn test_address_object_and_city_relation() {
        let prop = normalize_property(&json!({
            "id": 5,
            "address": { "street": "12 Elm St", "state": "TX", "zip": "78704", "country": "US" },
            "city": { "id": 3, "name": "Austin" },
            "property_type": { "id": 1, "name": "House" },
            "listing_type": "for_rent",
            "is_featured": 1
        }));
        assert_eq!(prop.address, "12 Elm St");
        assert_eq!(prop.city, "Austin");
        assert_eq!(prop.state, "TX");
        assert_eq!(prop.zip, "78704");
        assert_eq!(prop.property_type, "House");
        assert_eq!(prop.listing_type, ListingType::Rent);
        assert!(prop.is_featured);
    }

    #[test]
    fn test_bare_property_with_owner_is_not_unwrapped() {
        let body = json!({
            "id": 101,
            "title": "Beach Hut",
            "price": 75000,
            "user": { "id": 7, "name": "Ana" }
        });
        let prop = normalize_property(unwrap_property(&body));
        assert_eq!(prop.id, "101");
        assert_eq!(prop.title, "Beach Hut");
        assert_eq!(prop.price, 75000.0);
        assert_eq!(prop.owner_id.as_deref(), Some("7"));
        assert_eq!(prop.contact.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_record_envelopes_by_kind() {
        let wrapped = json!({ "data": { "id": 5, "title": "Loft" } });
        assert_eq!(normalize_property(unwrap_property(&wrapped)).id, "5");

        let keyed = json!({ "property": { "id": 6, "user": { "id": 1 } }, "message": "Created" });
        assert_eq!(normalize_property(unwrap_property(&keyed)).id, "6");

        // A user envelope never reaches into a property key
        let user = json!({ "user": { "id": 2, "name": "Kim" }, "property": { "id": 9 } });
        assert_eq!(normalize_user(&user).id, "2");
    }

    #[test]
    fn test_ambiguous_number_strings_are_rejected() {
        let euro = normalize_property(&json!({ "id": 1, "price": "250.000,00" }));
        assert_eq!(euro.price, 0.0);

        let dotted = normalize_property(&json!({ "id": 2, "price": "1.250.000" }));
        assert_eq!(dotted.price, 0.0);

        let us = normalize_property(&json!({ "id": 3, "price": "$250,000.50" }));
        assert_eq!(us.price, 250_000.5);
    }

    #[test]
    fn test_media_and_image_fallback() {
        let with_media = normalize_property(&json!({
            "id": 1,
            "media": [
                { "id": 10, "url": "a.jpg", "type": "image/jpeg" },
                { "id": 11, "url": "b.mp4", "type": "video/mp4", "is_featured": true }
            ]
        }));
        assert_eq!(with_media.media.len(), 2);
        assert_eq!(with_media.media[0].id, "10");
        assert_eq!(with_media.media[0].media_type, "image");
        assert_eq!(with_media.cover_image(), Some("b.mp4"));

        let with_images = normalize_property(&json!({ "id": 2, "images": ["x.jpg", "y.jpg"] }));
        assert_eq!(with_images.media.len(), 2);
        assert!(with_images.media[0].is_featured);
        assert_eq!(with_images.cover_image(), Some("x.jpg"));
    }

    #[test]
    fn test_coordinates_variants() {
        let flat = normalize_property(&json!({ "id": 1, "latitude": "30.26", "longitude": -97.74 }));
        assert_eq!(flat.coordinates, Some(Coordinates { lat: 30.26, lng: -97.74 }));

        let nested = normalize_property(&json!({ "id": 2, "coordinates": { "lat": 1.5, "lng": 2.5 } }));
        assert_eq!(nested.coordinates, Some(Coordinates { lat: 1.5, lng: 2.5 }));

        let partial = normalize_property(&json!({ "id": 3, "latitude": 1.0, "longitude": null }));
        assert_eq!(partial.coordinates, None);
    }

    #[test]
    fn test_features_and_contact() {
        let prop = normalize_property(&json!({
            "id": 1,
            "features": ["Pool", { "name": "Garage" }],
            "user": { "id": 7, "name": "Ana", "email": "ana@example.com" },
            "contact_phone": "555-0101"
        }));
        assert_eq!(prop.features, vec!["Pool", "Garage"]);
        assert_eq!(prop.owner_id.as_deref(), Some("7"));
        assert_eq!(prop.contact.name.as_deref(), Some("Ana"));
        assert_eq!(prop.contact.phone.as_deref(), Some("555-0101"));

        let joined = normalize_property(&json!({ "id": 2, "amenities": "wifi, parking" }));
        assert_eq!(joined.features, vec!["wifi", "parking"]);
    }

    #[test]
    fn test_timestamps() {
        let prop = normalize_property(&json!({
            "id": 1,
            "created_at": "2024-03-01T10:00:00.000000Z",
            "updated_at": "2024-03-02 11:30:00"
        }));
        assert!(prop.created_at.is_some());
        assert_eq!(prop.updated_at.map(|d| d.to_rfc3339()), Some("2024-03-02T11:30:00+00:00".to_string()));
    }

    #[test]
    fn test_user_avatar_as_string_or_object() {
        let plain = normalize_user(&json!({ "id": 1, "name": "Jane Doe", "avatar": "a.png" }));
        assert_eq!(plain.avatar.as_deref(), Some("a.png"));

        let object = normalize_user(&json!({ "id": 1, "name": "Jane", "avatar": { "url": "b.png" } }));
        assert_eq!(object.avatar.as_deref(), Some("b.png"));
    }

    #[test]
    fn test_user_name_split_and_join() {
        let split = normalize_user(&json!({ "id": 4, "name": "Jane Q Doe", "email": "j@x.io" }));
        assert_eq!(split.id, "4");
        assert_eq!(split.first_name, "Jane");
        assert_eq!(split.last_name, "Q Doe");

        let joined = normalize_user(&json!({ "id": 5, "first_name": "Sam", "last_name": "Lee" }));
        assert_eq!(joined.name, "Sam Lee");
        assert_eq!(joined.display_name(), "Sam Lee");
    }

    #[test]
    fn test_user_wrapped_payload_and_flags() {
        let user = normalize_user(&json!({
            "data": {
                "id": 8,
                "name": "Kim",
                "email_verified_at": "2024-01-01T00:00:00Z",
                "roles": [{ "name": "agent" }],
                "properties": [1, { "id": 2 }],
                "favorites": ["3"]
            }
        }));
        assert!(user.is_verified);
        assert_eq!(user.user_type, "agent");
        assert_eq!(user.properties, vec!["1", "2"]);
        assert_eq!(user.favorites, vec!["3"]);
        assert!(user.owns("2"));

        let unverified = normalize_user(&json!({ "id": 9, "email_verified_at": null }));
        assert!(!unverified.is_verified);
        assert_eq!(unverified.user_type, "user");
    }

    #[test]
    fn test_favorite_ids() {
        let ids = normalize_favorite_ids(&json!({
            "data": [5, "6", { "id": 99, "property_id": 7 }, { "property": { "id": 8 } }]
        }));
        assert_eq!(ids, vec!["5", "6", "7", "8"]);
    }
}
