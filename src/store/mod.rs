pub mod provider;
pub mod state;

pub use provider::{messages, AppProvider};
pub use state::{reduce, Action, AppState};
