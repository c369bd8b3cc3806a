use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::error::DiscoveryError;
use crate::models::{ProviderAvailabilityResponse, ProviderSearchFilters, ProviderSearchRequest};
use crate::services::{AvailabilityResolver, GeoSearchService};

pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 50.0;

// Query parameters for the search endpoint
#[derive(Debug, Deserialize)]
pub struct ProviderSearchQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
    pub service_id: Option<Uuid>,
    pub collection_type: Option<String>,
}

impl ProviderSearchQuery {
    /// Range checks the core relies on callers to perform.
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(DiscoveryError::Validation(
                "latitude must be between -90 and 90".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(DiscoveryError::Validation(
                "longitude must be between -180 and 180".to_string(),
            ));
        }
        if let Some(radius) = self.radius_km {
            if !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&radius) {
                return Err(DiscoveryError::Validation(format!(
                    "radius_km must be between {} and {}",
                    MIN_RADIUS_KM, MAX_RADIUS_KM
                )));
            }
        }
        Ok(())
    }

    pub fn into_request(self) -> ProviderSearchRequest {
        ProviderSearchRequest {
            latitude: self.latitude,
            longitude: self.longitude,
            radius_km: self.radius_km,
            filters: ProviderSearchFilters {
                service_id: self.service_id,
                collection_type: self.collection_type,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[axum::debug_handler]
pub async fn search_providers(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ProviderSearchQuery>,
) -> Result<Json<Value>, AppError> {
    query.validate()?;

    let search_service = GeoSearchService::from_config(&state);
    let request = query.into_request();
    let radius_km = search_service.effective_radius(request.radius_km);

    let providers = search_service.search(&request).await?;

    Ok(Json(json!({
        "providers": providers,
        "total": providers.len(),
        "radius_km": radius_km
    })))
}

#[axum::debug_handler]
pub async fn get_provider_availability(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let resolver = AvailabilityResolver::from_config(&state);

    let slots = resolver.resolve(provider_id, query.date).await?;

    Ok(Json(json!(ProviderAvailabilityResponse::new(provider_id, query.date, slots))))
}
