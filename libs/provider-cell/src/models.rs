use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime, Timelike};

// ==============================================================================
// PROVIDERS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderStatus {
    Active,
    Pending,
    Suspended,
    Rejected,
    Unknown,
}

impl From<String> for ProviderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Active" => ProviderStatus::Active,
            "Pending" => ProviderStatus::Pending,
            "Suspended" => ProviderStatus::Suspended,
            "Rejected" => ProviderStatus::Rejected,
            _ => ProviderStatus::Unknown,
        }
    }
}

impl From<ProviderStatus> for String {
    fn from(status: ProviderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Active => "Active",
            ProviderStatus::Pending => "Pending",
            ProviderStatus::Suspended => "Suspended",
            ProviderStatus::Rejected => "Rejected",
            ProviderStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    #[serde(default)]
    pub business_name: String,
    pub provider_type: Option<String>,
    pub status: ProviderStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub provider_services: Vec<ProviderService>,
    #[serde(default)]
    pub service_areas: Vec<ServiceArea>,
    #[serde(default)]
    pub clinic_locations: Vec<ClinicLocation>,
}

impl Provider {
    pub fn is_active(&self) -> bool {
        self.status == ProviderStatus::Active
    }

    /// True when an active link to an active service with this id exists.
    pub fn offers_service(&self, service_id: Uuid) -> bool {
        self.provider_services.iter().any(|link| {
            link.service_id == service_id
                && link.is_active
                && link.service.as_ref().is_some_and(|service| service.is_active)
        })
    }

    pub fn offers_home_visits(&self) -> bool {
        !self.service_areas.is_empty()
    }

    pub fn has_clinic(&self) -> bool {
        !self.clinic_locations.is_empty()
    }

    pub fn supports(&self, collection_type: CollectionType) -> bool {
        match collection_type {
            CollectionType::HomeVisit => self.offers_home_visits(),
            CollectionType::Clinic => self.has_clinic(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderService {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub is_active: bool,
    pub price: Option<f64>,
    #[serde(default)]
    pub service: Option<Service>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceArea {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub postcode: Option<String>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicLocation {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// How the sample is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    #[serde(rename = "Home Visit")]
    HomeVisit,
    #[serde(rename = "Clinic")]
    Clinic,
}

impl CollectionType {
    /// Unrecognised values yield `None` so the filter becomes a no-op.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Home Visit" => Some(CollectionType::HomeVisit),
            "Clinic" => Some(CollectionType::Clinic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSearchFilters {
    pub service_id: Option<Uuid>,
    pub collection_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub filters: ProviderSearchFilters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderWithDistance {
    #[serde(flatten)]
    pub provider: Provider,
    pub distance_km: f64,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub day_of_week: Option<i32>, // 0 = Sunday, 1 = Monday, etc.
    pub specific_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

impl AvailabilityRule {
    /// Exactly one of weekday / date is set, the weekday is 0-6 and the
    /// window is non-empty.
    pub fn is_well_formed(&self) -> bool {
        let keyed_once = match (self.day_of_week, self.specific_date) {
            (Some(day), None) => (0..=6).contains(&day),
            (None, Some(_)) => true,
            _ => false,
        };

        keyed_once && self.start_time < self.end_time
    }

    pub fn applies_to(&self, date: NaiveDate, day_of_week: i32) -> bool {
        match self.specific_date {
            Some(specific) => specific == date,
            None => self.day_of_week == Some(day_of_week),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Other,
}

impl BookingStatus {
    /// Statuses that hold on to their slot.
    pub const ACTIVE: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Other => "Other",
        }
    }
}

impl From<String> for BookingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pending" => BookingStatus::Pending,
            "Confirmed" => BookingStatus::Confirmed,
            "Completed" => BookingStatus::Completed,
            "Cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Other,
        }
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub time_slot: String, // "HH:MM"
    pub status: BookingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub time: String,
    pub available: bool,
}

impl Slot {
    pub fn starting_at(time: NaiveTime, available: bool) -> Self {
        Self {
            time: format!("{:02}:{:02}", time.hour(), time.minute()),
            available,
        }
    }
}

// DTO for the availability endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAvailabilityResponse {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
    pub total_slots: usize,
    pub available_slots: usize,
}

impl ProviderAvailabilityResponse {
    pub fn new(provider_id: Uuid, date: NaiveDate, slots: Vec<Slot>) -> Self {
        let available_slots = slots.iter().filter(|slot| slot.available).count();
        Self {
            provider_id,
            date,
            total_slots: slots.len(),
            available_slots,
            slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(day_of_week: Option<i32>, specific_date: Option<NaiveDate>, start: &str, end: &str) -> AvailabilityRule {
        AvailabilityRule {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            day_of_week,
            specific_date,
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            is_available: true,
        }
    }

    #[test]
    fn test_rule_must_be_keyed_exactly_once() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        assert!(rule(Some(1), None, "09:00", "11:00").is_well_formed());
        assert!(rule(None, Some(date), "09:00", "11:00").is_well_formed());
        assert!(!rule(Some(1), Some(date), "09:00", "11:00").is_well_formed());
        assert!(!rule(None, None, "09:00", "11:00").is_well_formed());
        assert!(!rule(Some(7), None, "09:00", "11:00").is_well_formed());
    }

    #[test]
    fn test_rule_with_inverted_window_is_malformed() {
        assert!(!rule(Some(1), None, "11:00", "09:00").is_well_formed());
        assert!(!rule(Some(1), None, "09:00", "09:00").is_well_formed());
    }

    #[test]
    fn test_rule_applies_to_date() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();

        let recurring = rule(Some(1), None, "09:00", "11:00");
        assert!(recurring.applies_to(monday, 1));
        assert!(!recurring.applies_to(tuesday, 2));

        let one_off = rule(None, Some(tuesday), "09:00", "11:00");
        assert!(one_off.applies_to(tuesday, 2));
        assert!(!one_off.applies_to(monday, 1));
    }

    #[test]
    fn test_booking_status_active_set() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(!BookingStatus::Completed.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
        assert!(!BookingStatus::from("no_show".to_string()).is_active());
    }

    #[test]
    fn test_collection_type_parse() {
        assert_eq!(CollectionType::parse("Home Visit"), Some(CollectionType::HomeVisit));
        assert_eq!(CollectionType::parse("Clinic"), Some(CollectionType::Clinic));
        assert_eq!(CollectionType::parse("Drive Through"), None);
    }

    #[test]
    fn test_provider_deserializes_without_embedded_collections() {
        let provider: Provider = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "business_name": "Mobile Bloods Ltd",
            "provider_type": "Phlebotomist",
            "status": "Suspended",
            "latitude": 51.5074,
            "longitude": -0.1278,
            "phone": null,
            "address": null
        })).unwrap();

        assert_eq!(provider.status, ProviderStatus::Suspended);
        assert!(!provider.is_active());
        assert!(!provider.offers_home_visits());
        assert!(!provider.has_clinic());
    }

    #[test]
    fn test_unknown_provider_status_is_not_active() {
        let status: ProviderStatus = serde_json::from_value(json!("Archived")).unwrap();
        assert_eq!(status, ProviderStatus::Unknown);
    }

    #[test]
    fn test_slot_formats_hours_and_minutes() {
        let slot = Slot::starting_at(NaiveTime::from_hms_opt(9, 30, 45).unwrap(), true);
        assert_eq!(slot.time, "09:30");
    }

    #[test]
    fn test_availability_response_counts() {
        let slots = vec![
            Slot { time: "09:00".to_string(), available: true },
            Slot { time: "09:30".to_string(), available: false },
        ];
        let response = ProviderAvailabilityResponse::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            slots,
        );

        assert_eq!(response.total_slots, 2);
        assert_eq!(response.available_slots, 1);
    }
}
