pub mod error;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;

// Re-export models and services for external use
pub use error::DiscoveryError;
pub use models::*;
pub use services::*;
pub use repository::{ProviderRepository, SupabaseProviderRepository};
pub use router::provider_routes;
