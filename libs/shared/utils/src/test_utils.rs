use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub default_search_radius_km: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            default_search_radius_km: 10.0,
        }
    }
}

impl TestConfig {
    /// Point the config at a mock PostgREST server.
    pub fn with_supabase_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            default_search_radius_km: self.default_search_radius_km,
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Rows shaped the way PostgREST returns them for the marketplace tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn provider_row(id: &str, latitude: f64, longitude: f64) -> Value {
        json!({
            "id": id,
            "business_name": "Test Phlebotomy Services",
            "provider_type": "Phlebotomist",
            "status": "Active",
            "latitude": latitude,
            "longitude": longitude,
            "phone": "+44 20 7946 0000",
            "address": "1 Test Street, London",
            "provider_services": [],
            "service_areas": [],
            "clinic_locations": []
        })
    }

    pub fn provider_service_row(provider_id: &str, service_id: &str, link_active: bool, service_active: bool) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "provider_id": provider_id,
            "service_id": service_id,
            "is_active": link_active,
            "price": 49.99,
            "service": {
                "id": service_id,
                "name": "Full Blood Count",
                "is_active": service_active
            }
        })
    }

    pub fn service_area_row(provider_id: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "provider_id": provider_id,
            "postcode": "SW1A",
            "radius_km": 5.0
        })
    }

    pub fn clinic_location_row(provider_id: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "provider_id": provider_id,
            "name": "Test Clinic",
            "address": "2 Test Street, London",
            "latitude": null,
            "longitude": null
        })
    }

    pub fn recurring_rule_row(provider_id: &str, day_of_week: i32, start_time: &str, end_time: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "provider_id": provider_id,
            "day_of_week": day_of_week,
            "specific_date": null,
            "start_time": start_time,
            "end_time": end_time,
            "is_available": true
        })
    }

    pub fn specific_date_rule_row(provider_id: &str, date: &str, start_time: &str, end_time: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "provider_id": provider_id,
            "day_of_week": null,
            "specific_date": date,
            "start_time": start_time,
            "end_time": end_time,
            "is_available": true
        })
    }

    pub fn booking_row(provider_id: &str, date: &str, time_slot: &str, status: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "provider_id": provider_id,
            "scheduled_date": date,
            "time_slot": time_slot,
            "status": status
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
