use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::Result;
use crate::models::{AvailabilityRule, Slot};
use crate::repository::{ProviderRepository, SupabaseProviderRepository};

pub const SLOT_MINUTES: u32 = 30;

const SLOT_SECONDS: u32 = SLOT_MINUTES * 60;

pub struct AvailabilityResolver {
    repository: Arc<dyn ProviderRepository>,
}

impl AvailabilityResolver {
    pub fn new(repository: Arc<dyn ProviderRepository>) -> Self {
        Self { repository }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(SupabaseProviderRepository::shared(config))
    }

    /// Bookable 30-minute slots for one provider on one date.
    ///
    /// An empty list means nothing is configured for that day. Slots taken
    /// by a pending or confirmed booking are returned with `available: false`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, provider_id: Uuid, date: NaiveDate) -> Result<Vec<Slot>> {
        let day_of_week = day_of_week(date);
        debug!("Resolving slots for provider {} on {} (day {})", provider_id, date, day_of_week);

        let rules = self.repository
            .find_availability_rules(provider_id, date, day_of_week)
            .await?;

        if rules.is_empty() {
            debug!("No availability rules for provider {} on {}", provider_id, date);
            return Ok(vec![]);
        }

        let blocked: HashSet<String> = self.repository
            .find_active_bookings(provider_id, date)
            .await?
            .into_iter()
            .filter(|booking| booking.status.is_active())
            .map(|booking| booking.time_slot)
            .collect();

        let mut slots = Vec::new();
        for rule in rules.iter().filter(|rule| rule.is_available) {
            if !rule.is_well_formed() {
                warn!(
                    "Skipping malformed availability rule {} for provider {}",
                    rule.id, provider_id
                );
                continue;
            }
            if !rule.applies_to(date, day_of_week) {
                continue;
            }
            slots.extend(slots_for_rule(rule, &blocked));
        }

        let slots = merge_slots(slots);
        debug!("Resolved {} slots ({} blocked)", slots.len(), blocked.len());

        Ok(slots)
    }
}

/// 0 = Sunday ... 6 = Saturday, matching `availability_rules.day_of_week`.
pub fn day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

/// Walks `[start_time, end_time)` in 30-minute steps. The first slot is the
/// first boundary at or after `start_time`.
pub fn slots_for_rule(rule: &AvailabilityRule, blocked: &HashSet<String>) -> Vec<Slot> {
    let start = rule.start_time.num_seconds_from_midnight();
    let end = rule.end_time.num_seconds_from_midnight();

    let mut current = start.div_ceil(SLOT_SECONDS) * SLOT_SECONDS;
    let mut slots = Vec::new();

    while current < end {
        let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(current, 0) else {
            break;
        };
        let mut slot = Slot::starting_at(time, true);
        slot.available = !blocked.contains(&slot.time);
        slots.push(slot);

        current += SLOT_SECONDS;
    }

    slots
}

/// Merge, sort by time, then drop repeated times keeping the first one.
pub fn merge_slots(mut slots: Vec<Slot>) -> Vec<Slot> {
    slots.sort_by(|a, b| a.time.cmp(&b.time));
    slots.dedup_by(|later, earlier| later.time == earlier.time);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use crate::models::{Booking, BookingStatus};
    use crate::repository::MockProviderRepository;
    use assert_matches::assert_matches;
    use mockall::predicate::eq;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn time(value: &str) -> NaiveTime {
        NaiveTime::parse_from_str(value, "%H:%M").unwrap()
    }

    fn recurring(provider_id: Uuid, day: i32, start: &str, end: &str) -> AvailabilityRule {
        AvailabilityRule {
            id: Uuid::new_v4(),
            provider_id,
            day_of_week: Some(day),
            specific_date: None,
            start_time: time(start),
            end_time: time(end),
            is_available: true,
        }
    }

    fn on_date(provider_id: Uuid, date: NaiveDate, start: &str, end: &str) -> AvailabilityRule {
        AvailabilityRule {
            id: Uuid::new_v4(),
            provider_id,
            day_of_week: None,
            specific_date: Some(date),
            start_time: time(start),
            end_time: time(end),
            is_available: true,
        }
    }

    fn booking(provider_id: Uuid, slot: &str, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            provider_id,
            scheduled_date: monday(),
            time_slot: slot.to_string(),
            status,
        }
    }

    fn resolver_with(rules: Vec<AvailabilityRule>, bookings: Vec<Booking>) -> AvailabilityResolver {
        let mut repository = MockProviderRepository::new();
        repository
            .expect_find_availability_rules()
            .returning(move |_, _, _| Ok(rules.clone()));
        repository
            .expect_find_active_bookings()
            .returning(move |_, _| Ok(bookings.clone()));
        AvailabilityResolver::new(Arc::new(repository))
    }

    fn times(slots: &[Slot]) -> Vec<&str> {
        slots.iter().map(|slot| slot.time.as_str()).collect()
    }

    #[test]
    fn test_day_of_week_starts_on_sunday() {
        assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()), 0);
        assert_eq!(day_of_week(monday()), 1);
        assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()), 6);
    }

    #[tokio::test]
    async fn test_monday_morning_yields_four_slots() {
        let provider_id = Uuid::new_v4();
        let resolver = resolver_with(vec![recurring(provider_id, 1, "09:00", "11:00")], vec![]);

        let slots = resolver.resolve(provider_id, monday()).await.unwrap();

        assert_eq!(times(&slots), vec!["09:00", "09:30", "10:00", "10:30"]);
        assert!(slots.iter().all(|slot| slot.available));
    }

    #[tokio::test]
    async fn test_resolving_twice_gives_identical_slots() {
        let provider_id = Uuid::new_v4();
        let resolver = resolver_with(
            vec![
                recurring(provider_id, 1, "09:00", "11:00"),
                on_date(provider_id, monday(), "10:00", "12:00"),
            ],
            vec![booking(provider_id, "10:30", BookingStatus::Confirmed)],
        );

        let first = resolver.resolve(provider_id, monday()).await.unwrap();
        let second = resolver.resolve(provider_id, monday()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(times(&first), vec!["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]);
    }

    #[tokio::test]
    async fn test_pending_booking_blocks_its_slot() {
        let provider_id = Uuid::new_v4();
        let resolver = resolver_with(
            vec![recurring(provider_id, 1, "09:00", "11:00")],
            vec![booking(provider_id, "09:30", BookingStatus::Pending)],
        );

        let slots = resolver.resolve(provider_id, monday()).await.unwrap();

        let blocked: Vec<_> = slots.iter().filter(|slot| !slot.available).collect();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].time, "09:30");
        assert_eq!(slots.len(), 4);
    }

    #[tokio::test]
    async fn test_inactive_booking_rows_do_not_block() {
        let provider_id = Uuid::new_v4();
        let resolver = resolver_with(
            vec![recurring(provider_id, 1, "09:00", "10:00")],
            vec![
                booking(provider_id, "09:00", BookingStatus::Cancelled),
                booking(provider_id, "09:30", BookingStatus::Confirmed),
            ],
        );

        let slots = resolver.resolve(provider_id, monday()).await.unwrap();

        assert_eq!(slots, vec![
            Slot { time: "09:00".to_string(), available: true },
            Slot { time: "09:30".to_string(), available: false },
        ]);
    }

    #[tokio::test]
    async fn test_recurring_and_specific_rules_are_unioned() {
        let provider_id = Uuid::new_v4();
        let resolver = resolver_with(
            vec![
                recurring(provider_id, 1, "09:00", "10:30"),
                on_date(provider_id, monday(), "10:00", "11:30"),
            ],
            vec![],
        );

        let slots = resolver.resolve(provider_id, monday()).await.unwrap();

        assert_eq!(times(&slots), vec!["09:00", "09:30", "10:00", "10:30", "11:00"]);
    }

    #[tokio::test]
    async fn test_no_rules_skips_booking_lookup() {
        let provider_id = Uuid::new_v4();
        let mut repository = MockProviderRepository::new();
        repository
            .expect_find_availability_rules()
            .with(eq(provider_id), eq(monday()), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(vec![]));
        repository.expect_find_active_bookings().never();
        let resolver = AvailabilityResolver::new(Arc::new(repository));

        let slots = resolver.resolve(provider_id, monday()).await.unwrap();

        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_rules_contribute_nothing() {
        let provider_id = Uuid::new_v4();
        let mut both_keys = recurring(provider_id, 1, "13:00", "14:00");
        both_keys.specific_date = Some(monday());
        let inverted = recurring(provider_id, 1, "12:00", "11:00");

        let resolver = resolver_with(
            vec![recurring(provider_id, 1, "09:00", "09:30"), both_keys, inverted],
            vec![],
        );

        let slots = resolver.resolve(provider_id, monday()).await.unwrap();

        assert_eq!(times(&slots), vec!["09:00"]);
    }

    #[tokio::test]
    async fn test_rules_for_other_days_are_ignored() {
        let provider_id = Uuid::new_v4();
        let tuesday = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let resolver = resolver_with(
            vec![
                recurring(provider_id, 2, "09:00", "10:00"),
                on_date(provider_id, tuesday, "14:00", "15:00"),
                recurring(provider_id, 1, "16:00", "16:30"),
            ],
            vec![],
        );

        let slots = resolver.resolve(provider_id, monday()).await.unwrap();

        assert_eq!(times(&slots), vec!["16:00"]);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let mut repository = MockProviderRepository::new();
        repository
            .expect_find_availability_rules()
            .returning(|_, _, _| Err(anyhow::anyhow!("timeout")));
        let resolver = AvailabilityResolver::new(Arc::new(repository));

        let err = resolver.resolve(Uuid::new_v4(), monday()).await.unwrap_err();

        assert_matches!(err, DiscoveryError::Repository(_));
    }

    #[test]
    fn test_end_of_day_window_does_not_wrap() {
        let rule = recurring(Uuid::new_v4(), 1, "23:00", "23:59");
        let slots = slots_for_rule(&rule, &HashSet::new());
        assert_eq!(times(&slots), vec!["23:00", "23:30"]);
    }

    #[test]
    fn test_unaligned_start_moves_to_next_boundary() {
        let rule = recurring(Uuid::new_v4(), 1, "09:15", "10:30");
        let slots = slots_for_rule(&rule, &HashSet::new());
        assert_eq!(times(&slots), vec!["09:30", "10:00"]);
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let merged = merge_slots(vec![
            Slot { time: "10:00".to_string(), available: true },
            Slot { time: "09:00".to_string(), available: true },
            Slot { time: "10:00".to_string(), available: false },
        ]);

        assert_eq!(merged, vec![
            Slot { time: "09:00".to_string(), available: true },
            Slot { time: "10:00".to_string(), available: true },
        ]);
    }

    #[tokio::test]
    async fn test_slot_times_are_on_half_hour_boundaries() {
        let provider_id = Uuid::new_v4();
        let resolver = resolver_with(
            vec![
                recurring(provider_id, 1, "07:10", "12:00"),
                on_date(provider_id, monday(), "00:00", "02:00"),
            ],
            vec![],
        );

        let slots = resolver.resolve(provider_id, monday()).await.unwrap();

        assert!(!slots.is_empty());
        for pair in slots.windows(2) {
            assert!(pair[0].time < pair[1].time);
        }
        for slot in &slots {
            let (hours, minutes) = slot.time.split_once(':').unwrap();
            assert_eq!(hours.len(), 2);
            assert!(hours.parse::<u32>().unwrap() < 24);
            assert_eq!(minutes.parse::<u32>().unwrap() % SLOT_MINUTES, 0);
        }
    }
}
