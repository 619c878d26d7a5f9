//! Client for a property-listing REST API: a single state store, API adapters
//! that normalize the API's varying response shapes, client-side search, local
//! persistence and map display configuration.

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod map;
pub mod models;
pub mod normalize;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{Action, AppProvider, AppState};
