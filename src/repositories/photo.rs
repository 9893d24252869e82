//! # Guest Photo Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::{FieldError, RepositoryError};
use crate::models::guest_photo::{self, Entity as GuestPhoto, Model as GuestPhotoModel, PhotoStatus};

use super::TenantScope;

pub struct PhotoRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PhotoRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Newest first, optionally restricted to one moderation status.
    pub async fn list(
        &self,
        scope: TenantScope,
        status: Option<PhotoStatus>,
    ) -> Result<Vec<GuestPhotoModel>, RepositoryError> {
        let mut query = GuestPhoto::find().filter(guest_photo::Column::WeddingId.eq(scope.wedding_id));
        if let Some(status) = status {
            query = query.filter(guest_photo::Column::Status.eq(status));
        }
        Ok(query
            .order_by_desc(guest_photo::Column::CreatedAt)
            .all(self.db)
            .await?)
    }

    /// Record a guest submission; it starts out pending moderation.
    pub async fn submit(
        &self,
        scope: TenantScope,
        url: &str,
        uploader_name: &str,
    ) -> Result<GuestPhotoModel, RepositoryError> {
        let mut errors = Vec::new();
        match url::Url::parse(url.trim()) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => errors.push(FieldError::new("url", "Photo URL must be an absolute http(s) URL")),
        }
        if uploader_name.trim().is_empty() {
            errors.push(FieldError::new("uploader_name", "Your name is required"));
        }
        if !errors.is_empty() {
            return Err(RepositoryError::Validation(errors));
        }

        let photo = guest_photo::ActiveModel {
            id: Set(Uuid::new_v4()),
            wedding_id: Set(scope.wedding_id),
            url: Set(url.trim().to_string()),
            uploader_name: Set(uploader_name.trim().to_string()),
            status: Set(PhotoStatus::Pending),
            created_at: Set(Utc::now().into()),
        };
        Ok(photo.insert(self.db).await?)
    }

    pub async fn set_status(
        &self,
        scope: TenantScope,
        photo_id: Uuid,
        status: PhotoStatus,
    ) -> Result<GuestPhotoModel, RepositoryError> {
        let photo = GuestPhoto::find_by_id(photo_id)
            .filter(guest_photo::Column::WeddingId.eq(scope.wedding_id))
            .one(self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Photo"))?;

        let mut active = photo.into_active_model();
        active.status = Set(status);
        Ok(active.update(self.db).await?)
    }
}
