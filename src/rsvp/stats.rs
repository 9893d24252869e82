//! Aggregation of invitations into dashboard statistics.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::event_guest::Model as EventGuestModel;

use super::state::{RsvpState, headcount};

/// Wedding-wide RSVP totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RsvpStats {
    /// Invitation rows, one per (guest, event)
    pub total_invited: u64,
    pub total_responded: u64,
    pub attending: u64,
    pub declined: u64,
    /// Always `total_invited - total_responded`
    pub pending: u64,
    /// Attending guests plus their declared plus-ones
    pub total_headcount: u64,
}

impl RsvpStats {
    /// Fold invitation rows into totals.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a EventGuestModel>) -> Self {
        let mut stats = RsvpStats::default();
        for row in rows {
            stats.total_invited += 1;
            match RsvpState::from(row) {
                RsvpState::Pending => {}
                RsvpState::Attending => {
                    stats.total_responded += 1;
                    stats.attending += 1;
                    stats.total_headcount += headcount(row);
                }
                RsvpState::Declined => {
                    stats.total_responded += 1;
                    stats.declined += 1;
                }
            }
        }
        stats.pending = stats.total_invited - stats.total_responded;
        stats
    }
}

/// Totals for one event plus meal tallies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EventRsvpStats {
    pub event_id: Uuid,
    #[serde(flatten)]
    pub totals: RsvpStats,
    /// Attending rows per meal choice, keyed by the stored choice
    pub meal_counts: BTreeMap<String, u64>,
}

impl EventRsvpStats {
    pub fn from_rows(event_id: Uuid, rows: &[EventGuestModel]) -> Self {
        let rows: Vec<&EventGuestModel> = rows.iter().filter(|r| r.event_id == event_id).collect();

        let mut meal_counts = BTreeMap::new();
        for row in &rows {
            if RsvpState::from(*row) == RsvpState::Attending
                && let Some(choice) = row.meal_choice.as_deref()
            {
                *meal_counts.entry(choice.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            event_id,
            totals: RsvpStats::from_rows(rows.iter().copied()),
            meal_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event_guest::RsvpStatus;
    use chrono::Utc;
    use sea_orm::prelude::DateTimeWithTimeZone;

    fn row(
        event_id: Uuid,
        status: Option<RsvpStatus>,
        plus_ones: i32,
        meal: Option<&str>,
    ) -> EventGuestModel {
        let now: DateTimeWithTimeZone = Utc::now().into();
        EventGuestModel {
            id: Uuid::new_v4(),
            event_id,
            guest_id: Uuid::new_v4(),
            rsvp_status: status,
            plus_one_count: plus_ones,
            plus_one_name: None,
            meal_choice: meal.map(str::to_string),
            dietary_notes: None,
            responded_at: status.map(|_| now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_input_is_all_zero() {
        let none: Vec<EventGuestModel> = Vec::new();
        assert_eq!(RsvpStats::from_rows(&none), RsvpStats::default());
    }

    #[test]
    fn totals_and_headcount() {
        let event = Uuid::new_v4();
        let rows = vec![
            row(event, None, 0, None),
            row(event, Some(RsvpStatus::Attending), 2, Some("Fish")),
            row(event, Some(RsvpStatus::Attending), 0, None),
            row(event, Some(RsvpStatus::Declined), 4, Some("Beef")),
        ];

        let stats = RsvpStats::from_rows(&rows);
        assert_eq!(
            stats,
            RsvpStats {
                total_invited: 4,
                total_responded: 3,
                attending: 2,
                declined: 1,
                pending: 1,
                total_headcount: 4,
            }
        );
        assert_eq!(stats.pending, stats.total_invited - stats.total_responded);
    }

    #[test]
    fn declined_plus_ones_and_meals_never_count() {
        let event = Uuid::new_v4();
        let rows = vec![
            row(event, Some(RsvpStatus::Declined), 3, Some("Fish")),
            row(event, Some(RsvpStatus::Attending), 1, Some("Vegetarian")),
            row(event, Some(RsvpStatus::Attending), 0, Some("Vegetarian")),
            row(event, None, 0, Some("Fish")),
        ];

        let stats = EventRsvpStats::from_rows(event, &rows);
        assert_eq!(stats.totals.total_headcount, 3);
        assert_eq!(stats.meal_counts.len(), 1);
        assert_eq!(stats.meal_counts["Vegetarian"], 2);
    }

    #[test]
    fn event_stats_ignore_other_events() {
        let event = Uuid::new_v4();
        let rows = vec![
            row(event, Some(RsvpStatus::Attending), 0, Some("Fish")),
            row(Uuid::new_v4(), Some(RsvpStatus::Attending), 5, Some("Fish")),
        ];

        let stats = EventRsvpStats::from_rows(event, &rows);
        assert_eq!(stats.totals.total_invited, 1);
        assert_eq!(stats.totals.total_headcount, 1);
        assert_eq!(stats.meal_counts["Fish"], 1);
    }

    #[test]
    fn meal_keys_are_literal_strings() {
        let event = Uuid::new_v4();
        let rows = vec![
            row(event, Some(RsvpStatus::Attending), 0, Some("fish")),
            row(event, Some(RsvpStatus::Attending), 0, Some("Fish")),
        ];

        let stats = EventRsvpStats::from_rows(event, &rows);
        assert_eq!(stats.meal_counts.len(), 2);
    }
}
