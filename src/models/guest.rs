//! Guest entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Case-insensitive matching key for a guest name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A person on a wedding's guest list
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub wedding_id: Uuid,

    /// Display name as entered
    pub name: String,

    /// Matching key for `name`, unique within the wedding; see [`name_key`]
    pub name_key: String,

    pub email: Option<String>,

    pub phone: Option<String>,

    /// Household or group label
    pub party: Option<String>,

    /// Expected party size; informational only, never used for headcount
    pub party_size: i32,

    /// Assigned seating table, if any
    pub table_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,
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
    #[sea_orm(
        belongs_to = "super::seating_table::Entity",
        from = "Column::TableId",
        to = "super::seating_table::Column::Id",
        on_delete = "SetNull"
    )]
    SeatingTable,
    #[sea_orm(has_many = "super::event_guest::Entity")]
    EventGuests,
}

impl Related<super::wedding::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wedding.def()
    }
}

impl Related<super::seating_table::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SeatingTable.def()
    }
}

impl Related<super::event_guest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventGuests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
