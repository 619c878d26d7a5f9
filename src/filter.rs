use crate::models::{Property, SearchFilters};

/// Re-filter the in-memory property list against `filters`.
///
/// Every call scans the full list; there is no index. Empty strings and empty
/// feature lists impose no constraint.
pub fn filter_properties(properties: &[Property], filters: &SearchFilters) -> Vec<Property> {
    properties
        .iter()
        .filter(|property| matches(property, filters))
        .cloned()
        .collect()
}

/// Whether a single property satisfies every active criterion
pub fn matches(property: &Property, filters: &SearchFilters) -> bool {
    if let Some(search) = non_empty(&filters.search) {
        let haystacks = [
            property.title.as_str(),
            property.description.as_str(),
            property.property_type.as_str(),
            property.address.as_str(),
            property.city.as_str(),
        ];
        let in_fields = haystacks.iter().any(|field| contains_ci(field, &search));
        let in_features = property.features.iter().any(|f| contains_ci(f, &search));
        if !in_fields && !in_features {
            return false;
        }
    }

    if let Some(listing_type) = filters.listing_type {
        if property.listing_type != listing_type {
            return false;
        }
    }

    if let Some(property_type) = non_empty(&filters.property_type) {
        if !property.property_type.eq_ignore_ascii_case(&property_type) {
            return false;
        }
    }

    if !in_range(property.price, filters.min_price, filters.max_price) {
        return false;
    }

    if filters.bedrooms.is_some_and(|min| property.bedrooms < min) {
        return false;
    }

    if filters.bathrooms.is_some_and(|min| property.bathrooms < min) {
        return false;
    }

    if !in_range(property.square_feet, filters.min_area, filters.max_area) {
        return false;
    }

    let required = filters.features.iter().map(|f| f.trim()).filter(|f| !f.is_empty());
    for feature in required {
        if !property.has_feature(feature) {
            return false;
        }
    }

    if let Some(location) = non_empty(&filters.location) {
        let places = [
            property.address.as_str(),
            property.city.as_str(),
            property.state.as_str(),
            property.zip.as_str(),
            property.country.as_str(),
        ];
        if !places.iter().any(|place| contains_ci(place, &location)) {
            return false;
        }
    }

    true
}

fn in_range(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// Trimmed, lowercased criterion, or None when blank
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// `needle` must already be lowercase
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInfo, ListingType};

    fn property(id: &str, price: f64, features: &[&str]) -> Property {
        Property {
            id: id.to_string(),
            title: format!("Listing {}", id),
            description: String::new(),
            price,
            address: "12 Elm St".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip: "78704".to_string(),
            country: "US".to_string(),
            property_type: "House".to_string(),
            listing_type: ListingType::Sale,
            bedrooms: 3,
            bathrooms: 2,
            square_feet: 1500.0,
            year_built: None,
            status: "available".to_string(),
            is_featured: false,
            features: features.iter().map(|f| f.to_string()).collect(),
            media: vec![],
            coordinates: None,
            contact: ContactInfo::default(),
            owner_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(props: &[Property]) -> Vec<&str> {
        props.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let props = vec![property("1", 10.0, &[]), property("2", 20.0, &[])];
        let filters = SearchFilters {
            search: Some("   ".to_string()),
            property_type: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter_properties(&props, &filters).len(), 2);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let props = vec![
            property("low", 99_999.0, &[]),
            property("min", 100_000.0, &[]),
            property("mid", 150_000.0, &[]),
            property("max", 200_000.0, &[]),
            property("high", 200_001.0, &[]),
        ];
        let filters = SearchFilters {
            min_price: Some(100_000.0),
            max_price: Some(200_000.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_properties(&props, &filters)), vec!["min", "mid", "max"]);
    }

    #[test]
    fn test_features_must_all_be_present() {
        let props = vec![
            property("both", 1.0, &["Pool", "Garage", "Garden"]),
            property("pool", 1.0, &["pool"]),
            property("none", 1.0, &[]),
        ];
        let filters = SearchFilters {
            features: vec!["pool".to_string(), "garage".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter_properties(&props, &filters)), vec!["both"]);
    }

    #[test]
    fn test_search_text_matches_fields_and_features() {
        let mut lake = property("lake", 1.0, &["Lake Access"]);
        lake.title = "Quiet retreat".to_string();
        let mut loft = property("loft", 1.0, &[]);
        loft.description = "Downtown LOFT with views".to_string();
        let props = vec![lake, loft, property("other", 1.0, &[])];

        let by_feature = SearchFilters { search: Some("lake".to_string()), ..Default::default() };
        assert_eq!(ids(&filter_properties(&props, &by_feature)), vec!["lake"]);

        let by_description = SearchFilters { search: Some("loft".to_string()), ..Default::default() };
        assert_eq!(ids(&filter_properties(&props, &by_description)), vec!["loft"]);
    }

    #[test]
    fn test_type_and_room_minimums() {
        let mut rental = property("rent", 1.0, &[]);
        rental.listing_type = ListingType::Rent;
        rental.property_type = "Apartment".to_string();
        rental.bedrooms = 1;
        let mut big = property("big", 1.0, &[]);
        big.bedrooms = 5;
        big.bathrooms = 3;
        let props = vec![rental, big, property("std", 1.0, &[])];

        let rentals = SearchFilters { listing_type: Some(ListingType::Rent), ..Default::default() };
        assert_eq!(ids(&filter_properties(&props, &rentals)), vec!["rent"]);

        let apartments = SearchFilters { property_type: Some("apartment".to_string()), ..Default::default() };
        assert_eq!(ids(&filter_properties(&props, &apartments)), vec!["rent"]);

        let roomy = SearchFilters { bedrooms: Some(3), bathrooms: Some(3), ..Default::default() };
        assert_eq!(ids(&filter_properties(&props, &roomy)), vec!["big"]);
    }

    #[test]
    fn test_area_range_and_location() {
        let mut small = property("small", 1.0, &[]);
        small.square_feet = 600.0;
        let mut dallas = property("dallas", 1.0, &[]);
        dallas.city = "Dallas".to_string();
        let props = vec![small, dallas, property("austin", 1.0, &[])];

        let area = SearchFilters { min_area: Some(1000.0), max_area: Some(1500.0), ..Default::default() };
        assert_eq!(ids(&filter_properties(&props, &area)), vec!["dallas", "austin"]);

        let location = SearchFilters { location: Some("dal".to_string()), ..Default::default() };
        assert_eq!(ids(&filter_properties(&props, &location)), vec!["dallas"]);
    }
}
