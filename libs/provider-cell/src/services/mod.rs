pub mod search;
pub mod availability;

pub use search::GeoSearchService;
pub use availability::AvailabilityResolver;
