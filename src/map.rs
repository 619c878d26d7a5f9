//! Map display configuration: tile layers, listing pins and cluster badges.

use crate::models::{Coordinates, ListingType, Property};
use serde::Serialize;

/// Fallback view when no listing has coordinates
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 30.0444,
    lng: 31.2357,
};
pub const DEFAULT_ZOOM: u8 = 12;

pub const SALE_COLOR: &str = "#2563eb";
pub const RENT_COLOR: &str = "#16a34a";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TileLayer {
    pub name: &'static str,
    pub url: &'static str,
    pub attribution: &'static str,
    pub max_zoom: u8,
}

/// Street and satellite base layers
pub fn tile_layers() -> Vec<TileLayer> {
    vec![
        TileLayer {
            name: "street",
            url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors",
            max_zoom: 19,
        },
        TileLayer {
            name: "satellite",
            url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            attribution: "Tiles &copy; Esri",
            max_zoom: 18,
        },
    ]
}

/// Pin icon for a single listing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarkerIcon {
    pub color: &'static str,
    pub class_name: String,
    pub html: String,
    pub size: (u32, u32),
    /// Pixel offset of the pin tip, bottom center
    pub anchor: (u32, u32),
    pub popup_anchor: (i32, i32),
}

pub fn property_icon(listing_type: ListingType) -> MarkerIcon {
    let color = match listing_type {
        ListingType::Sale => SALE_COLOR,
        ListingType::Rent => RENT_COLOR,
    };

    MarkerIcon {
        color,
        class_name: format!("property-marker property-marker--{}", listing_type.as_str()),
        html: format!(
            "<div style=\"background-color:{};width:32px;height:32px;border-radius:50% 50% 50% 0;transform:rotate(-45deg);border:2px solid #fff;\"></div>",
            color
        ),
        size: (32, 32),
        anchor: (16, 32),
        popup_anchor: (0, -32),
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClusterSize {
    Small,
    Medium,
    Large,
}

/// Badge for a group of nearby listings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterIcon {
    pub size: ClusterSize,
    pub class_name: String,
    pub label: String,
    pub pixels: u32,
}

pub fn cluster_icon(count: usize) -> ClusterIcon {
    let (size, pixels) = if count < 10 {
        (ClusterSize::Small, 30)
    } else if count < 100 {
        (ClusterSize::Medium, 40)
    } else {
        (ClusterSize::Large, 50)
    };

    let suffix = match size {
        ClusterSize::Small => "small",
        ClusterSize::Medium => "medium",
        ClusterSize::Large => "large",
    };

    ClusterIcon {
        size,
        class_name: format!("marker-cluster marker-cluster-{}", suffix),
        label: count.to_string(),
        pixels,
    }
}

/// A listing placed on the map
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapMarker {
    pub property_id: String,
    pub position: Coordinates,
    pub title: String,
    pub price: f64,
    pub icon: MarkerIcon,
}

/// Markers for every property with coordinates; the rest are skipped
pub fn markers(properties: &[Property]) -> Vec<MapMarker> {
    properties
        .iter()
        .filter_map(|property| {
            let position = property.coordinates?;
            Some(MapMarker {
                property_id: property.id.clone(),
                position,
                title: property.title.clone(),
                price: property.price,
                icon: property_icon(property.listing_type),
            })
        })
        .collect()
}

/// Average position of the markers, or the default center
pub fn center_of(markers: &[MapMarker]) -> Coordinates {
    if markers.is_empty() {
        return DEFAULT_CENTER;
    }
    let n = markers.len() as f64;
    Coordinates {
        lat: markers.iter().map(|m| m.position.lat).sum::<f64>() / n,
        lng: markers.iter().map(|m| m.position.lng).sum::<f64>() / n,
    }
}
