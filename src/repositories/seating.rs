//! # Seating Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::{FieldError, RepositoryError};
use crate::models::seating_table::{self, Entity as SeatingTable, Model as SeatingTableModel};

use super::TenantScope;

pub struct SeatingRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SeatingRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn list_tables(
        &self,
        scope: TenantScope,
    ) -> Result<Vec<SeatingTableModel>, RepositoryError> {
        Ok(SeatingTable::find()
            .filter(seating_table::Column::WeddingId.eq(scope.wedding_id))
            .order_by_asc(seating_table::Column::Name)
            .all(self.db)
            .await?)
    }

    pub async fn create_table(
        &self,
        scope: TenantScope,
        name: &str,
        capacity: i32,
    ) -> Result<SeatingTableModel, RepositoryError> {
        let mut errors = Vec::new();
        if name.trim().is_empty() {
            errors.push(FieldError::new("name", "Table name is required"));
        }
        if capacity < 1 {
            errors.push(FieldError::new("capacity", "Capacity must be at least 1"));
        }
        if !errors.is_empty() {
            return Err(RepositoryError::Validation(errors));
        }

        let table = seating_table::ActiveModel {
            id: Set(Uuid::new_v4()),
            wedding_id: Set(scope.wedding_id),
            name: Set(name.trim().to_string()),
            capacity: Set(capacity),
            created_at: Set(Utc::now().into()),
        };
        Ok(table.insert(self.db).await?)
    }
}
