use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use shared_config::{AppConfig, SearchSettings};

use crate::error::Result;
use crate::geo::{haversine_km, round_km, BoundingBox};
use crate::models::{
    CollectionType, Provider, ProviderSearchFilters, ProviderSearchRequest, ProviderWithDistance,
};
use crate::repository::{ProviderRepository, SupabaseProviderRepository};

pub struct GeoSearchService {
    repository: Arc<dyn ProviderRepository>,
    settings: Arc<dyn SearchSettings>,
}

impl GeoSearchService {
    pub fn new(repository: Arc<dyn ProviderRepository>, settings: Arc<dyn SearchSettings>) -> Self {
        Self { repository, settings }
    }

    pub fn from_config(config: &Arc<AppConfig>) -> Self {
        Self::new(SupabaseProviderRepository::shared(config), config.clone())
    }

    pub fn effective_radius(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or_else(|| self.settings.default_radius_km())
    }

    /// Active providers within the radius of the point, nearest first.
    #[instrument(skip(self, request))]
    pub async fn search(&self, request: &ProviderSearchRequest) -> Result<Vec<ProviderWithDistance>> {
        let radius_km = self.effective_radius(request.radius_km);
        debug!(
            "Searching providers around ({}, {}) within {} km",
            request.latitude, request.longitude, radius_km
        );

        let bbox = BoundingBox::around(request.latitude, request.longitude, radius_km);
        let candidates = self.repository.find_active_providers_in_bounding_box(&bbox).await?;

        if candidates.is_empty() {
            debug!("No providers inside bounding box");
            return Ok(vec![]);
        }

        let candidate_count = candidates.len();
        let in_range = within_radius(candidates, request.latitude, request.longitude, radius_km);
        debug!("{} of {} candidates within {} km", in_range.len(), candidate_count, radius_km);

        let results = apply_filters(in_range, &request.filters);

        info!("Provider search returned {} results", results.len());
        Ok(results)
    }
}

/// Annotates each candidate with its rounded distance, drops the ones past
/// the radius, sorts nearest first and keeps one entry per provider.
pub fn within_radius(
    candidates: Vec<Provider>,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> Vec<ProviderWithDistance> {
    let mut results: Vec<ProviderWithDistance> = candidates
        .into_iter()
        .filter(Provider::is_active)
        .map(|provider| {
            let distance_km = round_km(haversine_km(
                latitude,
                longitude,
                provider.latitude,
                provider.longitude,
            ));
            ProviderWithDistance { provider, distance_km }
        })
        .filter(|entry| entry.distance_km <= radius_km)
        .collect();

    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    let mut seen = HashSet::new();
    results.retain(|entry| seen.insert(entry.provider.id));

    results
}

pub fn apply_filters(
    mut results: Vec<ProviderWithDistance>,
    filters: &ProviderSearchFilters,
) -> Vec<ProviderWithDistance> {
    if let Some(service_id) = filters.service_id {
        results.retain(|entry| entry.provider.offers_service(service_id));
    }

    if let Some(collection_type) = filters.collection_type.as_deref().and_then(CollectionType::parse) {
        results.retain(|entry| entry.provider.supports(collection_type));
    }

    results
}
