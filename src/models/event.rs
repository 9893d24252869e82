//! Event entity model
//!
//! A wedding has one or more events (ceremony, reception, brunch). Private
//! events are only visible to and answerable by invited guests.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub wedding_id: Uuid,

    pub name: String,

    pub description: Option<String>,

    pub location: Option<String>,

    pub starts_at: DateTimeWithTimeZone,

    pub ends_at: Option<DateTimeWithTimeZone>,

    /// Public events appear on the site and accept RSVPs without an invitation
    pub is_public: bool,

    /// Ordered JSON array of meal option strings
    #[sea_orm(column_type = "JsonBinary")]
    pub meal_options: Json,

    /// Display order within the wedding
    pub position: i32,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Meal options as strings; non-string entries are ignored.
    pub fn meal_option_list(&self) -> Vec<String> {
        self.meal_options
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn offers_meal(&self, choice: &str) -> bool {
        self.meal_options
            .as_array()
            .is_some_and(|items| items.iter().any(|v| v.as_str() == Some(choice)))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wedding::Entity",
        from = "Column::WeddingId",
        to = "super::wedding::Column::Id",
        on_delete = "Cascade"
    )]
    Wedding,
    #[sea_orm(has_many = "super::event_guest::Entity")]
    EventGuests,
}

impl Related<super::wedding::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wedding.def()
    }
}

impl Related<super::event_guest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventGuests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
