//! # Event Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::{FieldError, RepositoryError};
use crate::models::event::{self, Entity as Event, Model as EventModel};
use sea_orm::prelude::DateTimeWithTimeZone;

use super::{TenantScope, clean_optional};

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTimeWithTimeZone,
    pub ends_at: Option<DateTimeWithTimeZone>,
    pub is_public: bool,
    pub meal_options: Vec<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Event name is required"));
        }
        if let Some(ends_at) = self.ends_at
            && ends_at < self.starts_at
        {
            errors.push(FieldError::new("ends_at", "Event cannot end before it starts"));
        }
        for (i, option) in self.meal_options.iter().enumerate() {
            if option.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("meal_options[{i}]"),
                    "Meal option cannot be empty",
                ));
            } else if self.meal_options[..i]
                .iter()
                .any(|earlier| earlier.trim() == option.trim())
            {
                errors.push(FieldError::new(
                    format!("meal_options[{i}]"),
                    "Meal options must be unique",
                ));
            }
        }
        errors
    }
}

pub struct EventRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> EventRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// All events of the wedding in display order.
    pub async fn list(&self, scope: TenantScope) -> Result<Vec<EventModel>, RepositoryError> {
        Ok(Event::find()
            .filter(event::Column::WeddingId.eq(scope.wedding_id))
            .order_by_asc(event::Column::Position)
            .order_by_asc(event::Column::StartsAt)
            .all(self.db)
            .await?)
    }

    pub async fn list_public(&self, scope: TenantScope) -> Result<Vec<EventModel>, RepositoryError> {
        Ok(Event::find()
            .filter(event::Column::WeddingId.eq(scope.wedding_id))
            .filter(event::Column::IsPublic.eq(true))
            .order_by_asc(event::Column::Position)
            .order_by_asc(event::Column::StartsAt)
            .all(self.db)
            .await?)
    }

    pub async fn find(
        &self,
        scope: TenantScope,
        event_id: Uuid,
    ) -> Result<Option<EventModel>, RepositoryError> {
        Ok(Event::find_by_id(event_id)
            .filter(event::Column::WeddingId.eq(scope.wedding_id))
            .one(self.db)
            .await?)
    }

    /// Events of this wedding among `event_ids`; foreign ids are dropped.
    pub async fn find_many(
        &self,
        scope: TenantScope,
        event_ids: &[Uuid],
    ) -> Result<Vec<EventModel>, RepositoryError> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Event::find()
            .filter(event::Column::WeddingId.eq(scope.wedding_id))
            .filter(event::Column::Id.is_in(event_ids.iter().copied()))
            .all(self.db)
            .await?)
    }

    /// Create an event, appended after the existing ones.
    pub async fn create(
        &self,
        scope: TenantScope,
        new_event: NewEvent,
    ) -> Result<EventModel, RepositoryError> {
        let errors = new_event.validate();
        if !errors.is_empty() {
            return Err(RepositoryError::Validation(errors));
        }

        let position = Event::find()
            .filter(event::Column::WeddingId.eq(scope.wedding_id))
            .count(self.db)
            .await?;
        let meal_options = new_event
            .meal_options
            .iter()
            .map(|o| serde_json::Value::String(o.trim().to_string()))
            .collect();

        let event = event::ActiveModel {
            id: Set(Uuid::new_v4()),
            wedding_id: Set(scope.wedding_id),
            name: Set(new_event.name.trim().to_string()),
            description: Set(clean_optional(new_event.description)),
            location: Set(clean_optional(new_event.location)),
            starts_at: Set(new_event.starts_at),
            ends_at: Set(new_event.ends_at),
            is_public: Set(new_event.is_public),
            meal_options: Set(serde_json::Value::Array(meal_options)),
            position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
            created_at: Set(Utc::now().into()),
        };
        Ok(event.insert(self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event() -> NewEvent {
        NewEvent {
            name: "Ceremony".to_string(),
            description: None,
            location: None,
            starts_at: Utc.with_ymd_and_hms(2026, 6, 20, 15, 0, 0).unwrap().into(),
            ends_at: None,
            is_public: true,
            meal_options: vec!["Fish".to_string(), "Vegetarian".to_string()],
        }
    }

    #[test]
    fn valid_event_has_no_errors() {
        assert!(event().validate().is_empty());
    }

    #[test]
    fn rejects_backwards_times_and_duplicate_meals() {
        let mut bad = event();
        bad.ends_at = Some(bad.starts_at - Duration::hours(1));
        bad.meal_options.push(" Fish ".to_string());

        let fields: Vec<String> = bad.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["ends_at", "meal_options[2]"]);
    }
}
