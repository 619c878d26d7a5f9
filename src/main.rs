use anyhow::Context;
use property_hub::api::HttpApi;
use property_hub::map;
use property_hub::models::{Credentials, SearchFilters};
use property_hub::storage::FileStore;
use property_hub::{AppProvider, Config};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Property Hub");
    info!("==============");

    let config = Config::from_env();
    info!("API: {}", config.api_url);

    let api = Arc::new(HttpApi::new(&config).context("Failed to create HTTP client")?);
    let storage = Arc::new(
        FileStore::open(config.storage_dir.clone()).context("Failed to open local storage")?,
    );
    let mut provider = AppProvider::with_http(api, storage);

    provider
        .initialize()
        .await
        .context("Failed to load properties")?;

    // Optional login from the environment
    if let (Ok(email), Ok(password)) = (
        std::env::var("PROPERTY_HUB_EMAIL"),
        std::env::var("PROPERTY_HUB_PASSWORD"),
    ) {
        match provider.login(&Credentials { email, password }).await {
            Ok(user) => info!("👤 Logged in as {}", user.display_name()),
            Err(e) => warn!("Login failed: {}", e),
        }
    }

    // Search text from the command line, e.g. `property-hub pool`
    let search: Vec<String> = std::env::args().skip(1).collect();
    let filters = SearchFilters {
        search: Some(search.join(" ")),
        ..Default::default()
    };
    let results = provider.filter_properties(filters).to_vec();

    info!("\n✅ {} of {} properties match\n", results.len(), provider.state().properties.len());

    let state = provider.state();
    for (i, property) in results.iter().enumerate() {
        let favorite = if state.is_favorite(&property.id) { " ★" } else { "" };
        println!("{}. {} ({:.0}){}", i + 1, property.title, property.price, favorite);
        println!("   {} · {}", property.listing_type.as_str(), property.property_type);
        println!("   {} bd, {} ba, {:.0} sqft", property.bedrooms, property.bathrooms, property.square_feet);
        if !property.address.is_empty() || !property.city.is_empty() {
            println!("   {} {}", property.address, property.city);
        }
        println!("   ID: {}", property.id);
        if !property.features.is_empty() {
            println!("   Features: {}", property.features.join(", "));
        }
        println!();
    }

    let markers = map::markers(&results);
    let center = map::center_of(&markers);
    info!("🗺️  {} listings on the map, centered at {:.4}, {:.4}", markers.len(), center.lat, center.lng);

    let json = serde_json::to_string_pretty(&results)?;
    tokio::fs::write("properties.json", json).await?;
    info!("💾 Saved matching properties to properties.json");

    Ok(())
}
