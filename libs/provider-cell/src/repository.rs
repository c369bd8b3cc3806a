use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::geo::BoundingBox;
use crate::models::{AvailabilityRule, Booking, BookingStatus, Provider};

/// Provider rows come back with everything the search filters look at.
const PROVIDER_SELECT: &str =
    "*,provider_services(*,service:services(*)),service_areas(*),clinic_locations(*)";

/// Read access to the marketplace tables the discovery engine depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    /// Providers with status `Active` whose coordinates fall inside `bbox`
    /// (bounds inclusive).
    async fn find_active_providers_in_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<Provider>>;

    /// Available rules for `date`: those pinned to the date plus recurring
    /// rules for `day_of_week`, ordered by start time.
    async fn find_availability_rules(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        day_of_week: i32,
    ) -> Result<Vec<AvailabilityRule>>;

    /// Pending and confirmed bookings on `date`.
    async fn find_active_bookings(&self, provider_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>>;
}

pub struct SupabaseProviderRepository {
    supabase: SupabaseClient,
}

impl SupabaseProviderRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn shared(config: &AppConfig) -> Arc<dyn ProviderRepository> {
        Arc::new(Self::new(config))
    }
}

#[async_trait]
impl ProviderRepository for SupabaseProviderRepository {
    async fn find_active_providers_in_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<Provider>> {
        let path = format!(
            "/rest/v1/providers?select={}&status=eq.Active&latitude=gte.{}&latitude=lte.{}&longitude=gte.{}&longitude=lte.{}",
            PROVIDER_SELECT, bbox.min_lat, bbox.max_lat, bbox.min_lng, bbox.max_lng
        );

        let providers: Vec<Provider> = self.supabase.select(&path).await?;
        debug!("Bounding box query returned {} providers", providers.len());

        Ok(providers)
    }

    async fn find_availability_rules(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        day_of_week: i32,
    ) -> Result<Vec<AvailabilityRule>> {
        let path = format!(
            "/rest/v1/availability_rules?provider_id=eq.{}&is_available=eq.true&or=(specific_date.eq.{},and(specific_date.is.null,day_of_week.eq.{}))&order=start_time.asc",
            provider_id, date, day_of_week
        );

        self.supabase.select(&path).await
    }

    async fn find_active_bookings(&self, provider_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>> {
        let statuses = BookingStatus::ACTIVE
            .iter()
            .map(|status| status.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let path = format!(
            "/rest/v1/bookings?provider_id=eq.{}&scheduled_date=eq.{}&status=in.({})",
            provider_id, date, statuses
        );

        self.supabase.select(&path).await
    }
}
