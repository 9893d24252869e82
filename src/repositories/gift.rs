//! # Gift Registry Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::error::{FieldError, RepositoryError};
use crate::models::gift_item::{self, Entity as GiftItem, Model as GiftItemModel};

use super::{TenantScope, clean_optional};

#[derive(Debug, Clone)]
pub struct NewGift {
    pub name: String,
    pub description: Option<String>,
    pub target_amount_cents: i64,
}

pub struct GiftRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> GiftRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn list(&self, scope: TenantScope) -> Result<Vec<GiftItemModel>, RepositoryError> {
        Ok(GiftItem::find()
            .filter(gift_item::Column::WeddingId.eq(scope.wedding_id))
            .order_by_asc(gift_item::Column::Position)
            .all(self.db)
            .await?)
    }

    pub async fn create(
        &self,
        scope: TenantScope,
        gift: NewGift,
    ) -> Result<GiftItemModel, RepositoryError> {
        let mut errors = Vec::new();
        if gift.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Gift name is required"));
        }
        if gift.target_amount_cents < 0 {
            errors.push(FieldError::new(
                "target_amount_cents",
                "Target amount cannot be negative",
            ));
        }
        if !errors.is_empty() {
            return Err(RepositoryError::Validation(errors));
        }

        let position = GiftItem::find()
            .filter(gift_item::Column::WeddingId.eq(scope.wedding_id))
            .count(self.db)
            .await?;
        let item = gift_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            wedding_id: Set(scope.wedding_id),
            name: Set(gift.name.trim().to_string()),
            description: Set(clean_optional(gift.description)),
            target_amount_cents: Set(gift.target_amount_cents),
            claimed: Set(false),
            claimed_by: Set(None),
            position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
            created_at: Set(Utc::now().into()),
        };
        Ok(item.insert(self.db).await?)
    }

    pub async fn delete(&self, scope: TenantScope, gift_id: Uuid) -> Result<(), RepositoryError> {
        let result = GiftItem::delete_many()
            .filter(gift_item::Column::Id.eq(gift_id))
            .filter(gift_item::Column::WeddingId.eq(scope.wedding_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Gift"));
        }
        Ok(())
    }

    /// Claim an unclaimed gift.
    ///
    /// The update is conditional on `claimed = false`, so of two concurrent
    /// claims exactly one succeeds and the other gets a conflict.
    pub async fn claim(
        &self,
        scope: TenantScope,
        gift_id: Uuid,
        claimed_by: &str,
    ) -> Result<GiftItemModel, RepositoryError> {
        let claimed_by = claimed_by.trim();
        if claimed_by.is_empty() {
            return Err(RepositoryError::invalid("claimed_by", "Your name is required"));
        }

        let result = GiftItem::update_many()
            .col_expr(gift_item::Column::Claimed, Expr::value(true))
            .col_expr(gift_item::Column::ClaimedBy, Expr::value(claimed_by))
            .filter(gift_item::Column::Id.eq(gift_id))
            .filter(gift_item::Column::WeddingId.eq(scope.wedding_id))
            .filter(gift_item::Column::Claimed.eq(false))
            .exec(self.db)
            .await?;

        let gift = GiftItem::find_by_id(gift_id)
            .filter(gift_item::Column::WeddingId.eq(scope.wedding_id))
            .one(self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Gift"))?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::Conflict(
                "This gift has already been claimed".to_string(),
            ));
        }
        Ok(gift)
    }
}
