//! Wedding entity model
//!
//! One wedding per tenant. Theme and content sections are stored as JSON and
//! exposed through typed accessors.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::sections::{ContentSection, ThemeSettings};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "weddings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning tenant, one wedding per tenant
    #[sea_orm(unique)]
    pub tenant_id: Uuid,

    pub partner_one: String,

    pub partner_two: String,

    pub wedding_date: Option<Date>,

    /// Serialized [`ThemeSettings`]
    #[sea_orm(column_type = "JsonBinary")]
    pub theme: Json,

    /// Serialized ordered list of [`ContentSection`]
    #[sea_orm(column_type = "JsonBinary")]
    pub sections: Json,

    /// Whether guests may submit photos
    pub photo_sharing_enabled: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Theme settings, falling back to defaults when the stored JSON is unreadable.
    pub fn theme_settings(&self) -> ThemeSettings {
        serde_json::from_value(self.theme.clone()).unwrap_or_default()
    }

    /// Content sections in display order.
    pub fn content_sections(&self) -> Result<Vec<ContentSection>, serde_json::Error> {
        serde_json::from_value(self.sections.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
    #[sea_orm(has_many = "super::guest::Entity")]
    Guests,
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
    #[sea_orm(has_many = "super::gift_item::Entity")]
    GiftItems,
    #[sea_orm(has_many = "super::guest_photo::Entity")]
    GuestPhotos,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::guest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guests.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::gift_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GiftItems.def()
    }
}

impl Related<super::guest_photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GuestPhotos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
