use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::event_guest::{Model as EventGuestModel, RsvpStatus};

/// Attendance state of an invited (guest, event) pair.
///
/// An uninvited pair has no row at all and therefore no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RsvpState {
    Pending,
    Attending,
    Declined,
}

impl RsvpState {
    /// Label used in exports.
    pub fn label(self) -> &'static str {
        match self {
            RsvpState::Pending => "Pending",
            RsvpState::Attending => "Attending",
            RsvpState::Declined => "Declined",
        }
    }

    pub fn has_responded(self) -> bool {
        !matches!(self, RsvpState::Pending)
    }
}

impl From<Option<RsvpStatus>> for RsvpState {
    fn from(status: Option<RsvpStatus>) -> Self {
        match status {
            None => RsvpState::Pending,
            Some(RsvpStatus::Attending) => RsvpState::Attending,
            Some(RsvpStatus::Declined) => RsvpState::Declined,
        }
    }
}

impl From<&EventGuestModel> for RsvpState {
    fn from(row: &EventGuestModel) -> Self {
        row.rsvp_status.into()
    }
}

/// Headcount contributed by one invitation: the guest plus declared
/// plus-ones when attending, zero otherwise.
pub fn headcount(row: &EventGuestModel) -> u64 {
    match RsvpState::from(row) {
        RsvpState::Attending => 1 + u64::try_from(row.plus_one_count).unwrap_or(0),
        RsvpState::Pending | RsvpState::Declined => 0,
    }
}
