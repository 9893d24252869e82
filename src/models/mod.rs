//! # Data Models
//!
//! SeaORM entities for the wedding platform plus a few shared response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod event;
pub mod event_guest;
pub mod gift_item;
pub mod guest;
pub mod guest_photo;
pub mod seating_table;
pub mod sections;
pub mod tenant;
pub mod user;
pub mod wedding;

pub use event::Entity as Event;
pub use event_guest::Entity as EventGuest;
pub use gift_item::Entity as GiftItem;
pub use guest::Entity as Guest;
pub use guest_photo::Entity as GuestPhoto;
pub use seating_table::Entity as SeatingTable;
pub use tenant::Entity as Tenant;
pub use user::Entity as User;
pub use wedding::Entity as Wedding;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "wedsite".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
