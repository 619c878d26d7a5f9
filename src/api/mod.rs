pub mod http;
pub mod traits;

pub use http::HttpApi;
pub use traits::{AuthApi, PropertyApi};
