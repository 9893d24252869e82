//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations. There is no
//! ambient tenant: every tenant-owned query takes a [`TenantScope`] and filters
//! on it explicitly.

use uuid::Uuid;

pub mod event;
pub mod gift;
pub mod guest;
pub mod invitation;
pub mod photo;
pub mod seating;
pub mod tenant;
pub mod user;
pub mod wedding;

pub use event::EventRepository;
pub use gift::GiftRepository;
pub use guest::GuestRepository;
pub use invitation::InvitationRepository;
pub use photo::PhotoRepository;
pub use seating::SeatingRepository;
pub use tenant::TenantRepository;
pub use user::UserRepository;
pub use wedding::WeddingRepository;

/// The tenant and wedding a data-access call is confined to.
///
/// Resolved once per request, from the couple's session on dashboard routes or
/// from the rewritten subdomain on public routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    pub tenant_id: Uuid,
    pub wedding_id: Uuid,
}

/// Trim a free-text field, mapping blank input to `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
