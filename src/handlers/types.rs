//! # Common API Types
//!
//! Response shapes shared across handlers. Entities are never serialized
//! directly; each has a DTO here built from its model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::event::Model as EventModel;
use crate::models::event_guest::Model as EventGuestModel;
use crate::models::gift_item::Model as GiftItemModel;
use crate::models::guest::Model as GuestModel;
use crate::models::guest_photo::{Model as GuestPhotoModel, PhotoStatus};
use crate::models::seating_table::Model as SeatingTableModel;
use crate::models::sections::{ContentSection, ThemeSettings};
use crate::models::tenant::{DomainStatus, Model as TenantModel};
use crate::models::wedding::Model as WeddingModel;
use crate::rsvp::RsvpState;

/// Wrapper for list endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new<M, I>(items: I) -> Self
    where
        I: IntoIterator<Item = M>,
        T: From<M>,
    {
        Self {
            data: items.into_iter().map(T::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TenantDto {
    pub id: Uuid,
    #[schema(example = "ana-and-ben")]
    pub subdomain: String,
    pub custom_domain: Option<String>,
    pub domain_status: DomainStatus,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl From<TenantModel> for TenantDto {
    fn from(tenant: TenantModel) -> Self {
        Self {
            id: tenant.id,
            subdomain: tenant.subdomain,
            custom_domain: tenant.custom_domain,
            domain_status: tenant.domain_status,
            created_at: tenant.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeddingDto {
    pub id: Uuid,
    pub partner_one: String,
    pub partner_two: String,
    /// ISO 8601 date
    #[schema(value_type = Option<String>, format = Date)]
    pub wedding_date: Option<chrono::NaiveDate>,
    pub theme: ThemeSettings,
    pub sections: Vec<ContentSection>,
    pub photo_sharing_enabled: bool,
}

impl From<WeddingModel> for WeddingDto {
    fn from(wedding: WeddingModel) -> Self {
        let sections = wedding.content_sections().unwrap_or_else(|err| {
            tracing::warn!(wedding_id = %wedding.id, error = %err, "Stored sections are unreadable");
            Vec::new()
        });
        Self {
            id: wedding.id,
            theme: wedding.theme_settings(),
            sections,
            partner_one: wedding.partner_one,
            partner_two: wedding.partner_two,
            wedding_date: wedding.wedding_date,
            photo_sharing_enabled: wedding.photo_sharing_enabled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GuestDto {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub party: Option<String>,
    pub party_size: i32,
    pub table_id: Option<Uuid>,
}

impl From<GuestModel> for GuestDto {
    fn from(guest: GuestModel) -> Self {
        Self {
            id: guest.id,
            name: guest.name,
            email: guest.email,
            phone: guest.phone,
            party: guest.party,
            party_size: guest.party_size,
            table_id: guest.table_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// RFC 3339 timestamp
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub is_public: bool,
    pub meal_options: Vec<String>,
    pub position: i32,
}

impl From<EventModel> for EventDto {
    fn from(event: EventModel) -> Self {
        Self {
            id: event.id,
            meal_options: event.meal_option_list(),
            name: event.name,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at.to_rfc3339(),
            ends_at: event.ends_at.map(|at| at.to_rfc3339()),
            is_public: event.is_public,
            position: event.position,
        }
    }
}

/// One (guest, event) invitation with its current answer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationDto {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub state: RsvpState,
    pub plus_one_count: i32,
    pub plus_one_name: Option<String>,
    pub meal_choice: Option<String>,
    pub dietary_notes: Option<String>,
    pub responded_at: Option<String>,
}

impl From<EventGuestModel> for InvitationDto {
    fn from(row: EventGuestModel) -> Self {
        Self {
            state: RsvpState::from(&row),
            guest_id: row.guest_id,
            event_id: row.event_id,
            plus_one_count: row.plus_one_count,
            plus_one_name: row.plus_one_name,
            meal_choice: row.meal_choice,
            dietary_notes: row.dietary_notes,
            responded_at: row.responded_at.map(|at| at.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeatingTableDto {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
}

impl From<SeatingTableModel> for SeatingTableDto {
    fn from(table: SeatingTableModel) -> Self {
        Self {
            id: table.id,
            name: table.name,
            capacity: table.capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GiftDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount_cents: i64,
    pub claimed: bool,
    /// Only shown to the couple
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
}

impl From<GiftItemModel> for GiftDto {
    fn from(gift: GiftItemModel) -> Self {
        Self {
            id: gift.id,
            name: gift.name,
            description: gift.description,
            target_amount_cents: gift.target_amount_cents,
            claimed: gift.claimed,
            claimed_by: gift.claimed_by,
        }
    }
}

impl GiftDto {
    /// The public registry hides who claimed what.
    pub fn public(gift: GiftItemModel) -> Self {
        Self {
            claimed_by: None,
            ..Self::from(gift)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoDto {
    pub id: Uuid,
    pub url: String,
    pub uploader_name: String,
    pub status: PhotoStatus,
    pub created_at: String,
}

impl From<GuestPhotoModel> for PhotoDto {
    fn from(photo: GuestPhotoModel) -> Self {
        Self {
            id: photo.id,
            url: photo.url,
            uploader_name: photo.uploader_name,
            status: photo.status,
            created_at: photo.created_at.to_rfc3339(),
        }
    }
}
