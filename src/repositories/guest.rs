//! # Guest Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::error::{FieldError, RepositoryError};
use crate::models::guest::{self, Entity as Guest, Model as GuestModel};
use crate::models::seating_table;

use super::{TenantScope, clean_optional};

/// Guest fields supplied on creation or import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub party: Option<String>,
    pub party_size: i32,
}

impl NewGuest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            party: None,
            party_size: 1,
        }
    }

    /// Field-level problems with this guest record.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if let Some(email) = self.email.as_deref()
            && !email.trim().is_empty()
            && !email.contains('@')
        {
            errors.push(FieldError::new("email", "Email must contain '@'"));
        }
        if self.party_size < 1 {
            errors.push(FieldError::new("party_size", "Party size must be at least 1"));
        }
        errors
    }

    fn into_active_model(self, scope: TenantScope) -> guest::ActiveModel {
        guest::ActiveModel {
            id: Set(Uuid::new_v4()),
            wedding_id: Set(scope.wedding_id),
            name_key: Set(guest::name_key(&self.name)),
            name: Set(self.name.trim().to_string()),
            email: Set(clean_optional(self.email)),
            phone: Set(clean_optional(self.phone)),
            party: Set(clean_optional(self.party)),
            party_size: Set(self.party_size),
            table_id: Set(None),
            created_at: Set(Utc::now().into()),
        }
    }
}

/// Rows per `INSERT` statement during bulk import
pub const INSERT_BATCH_SIZE: usize = 500;

pub struct GuestRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> GuestRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn list(&self, scope: TenantScope) -> Result<Vec<GuestModel>, RepositoryError> {
        Ok(Guest::find()
            .filter(guest::Column::WeddingId.eq(scope.wedding_id))
            .order_by_asc(guest::Column::Name)
            .all(self.db)
            .await?)
    }

    pub async fn find(
        &self,
        scope: TenantScope,
        guest_id: Uuid,
    ) -> Result<Option<GuestModel>, RepositoryError> {
        Ok(Guest::find_by_id(guest_id)
            .filter(guest::Column::WeddingId.eq(scope.wedding_id))
            .one(self.db)
            .await?)
    }

    /// Case-insensitive exact name match, used by the public RSVP lookup.
    ///
    /// The unique `(wedding_id, name_key)` index makes the match unambiguous.
    pub async fn find_by_name(
        &self,
        scope: TenantScope,
        name: &str,
    ) -> Result<Option<GuestModel>, RepositoryError> {
        let key = guest::name_key(name);
        if key.is_empty() {
            return Ok(None);
        }
        Ok(Guest::find()
            .filter(guest::Column::WeddingId.eq(scope.wedding_id))
            .filter(guest::Column::NameKey.eq(key))
            .one(self.db)
            .await?)
    }

    /// Keep only the ids that belong to this wedding.
    pub async fn ids_in_wedding(
        &self,
        scope: TenantScope,
        guest_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepositoryError> {
        if guest_ids.is_empty() {
            return Ok(Vec::new());
        }
        let guests = Guest::find()
            .filter(guest::Column::WeddingId.eq(scope.wedding_id))
            .filter(guest::Column::Id.is_in(guest_ids.iter().copied()))
            .all(self.db)
            .await?;
        Ok(guests.into_iter().map(|g| g.id).collect())
    }

    pub async fn create(
        &self,
        scope: TenantScope,
        new_guest: NewGuest,
    ) -> Result<GuestModel, RepositoryError> {
        let errors = new_guest.validate();
        if !errors.is_empty() {
            return Err(RepositoryError::Validation(errors));
        }
        let name = new_guest.name.trim().to_string();
        if self.find_by_name(scope, &name).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "A guest named '{name}' already exists"
            )));
        }
        Ok(new_guest.into_active_model(scope).insert(self.db).await?)
    }

    /// Bulk insert, silently skipping names already on the guest list
    /// (compared case-insensitively, including repeats within `guests`).
    ///
    /// Rows go out in batches of [`INSERT_BATCH_SIZE`] to stay under the
    /// bind-parameter limits of SQLite and Postgres. Run it inside a
    /// transaction to make the whole import atomic. Returns the number of
    /// rows actually inserted.
    pub async fn insert_ignoring_duplicates(
        &self,
        scope: TenantScope,
        guests: Vec<NewGuest>,
    ) -> Result<u64, RepositoryError> {
        let mut inserted = 0;
        let mut models = guests.into_iter().map(|g| g.into_active_model(scope));

        loop {
            let batch: Vec<_> = models.by_ref().take(INSERT_BATCH_SIZE).collect();
            if batch.is_empty() {
                break;
            }
            inserted += Guest::insert_many(batch)
                .on_conflict(
                    OnConflict::columns([guest::Column::WeddingId, guest::Column::NameKey])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.db)
                .await?;
        }
        Ok(inserted)
    }

    pub async fn delete(&self, scope: TenantScope, guest_id: Uuid) -> Result<(), RepositoryError> {
        let result = Guest::delete_many()
            .filter(guest::Column::Id.eq(guest_id))
            .filter(guest::Column::WeddingId.eq(scope.wedding_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Guest"));
        }
        Ok(())
    }

    /// Seat a guest at a table of the same wedding, or unseat with `None`.
    pub async fn assign_table(
        &self,
        scope: TenantScope,
        guest_id: Uuid,
        table_id: Option<Uuid>,
    ) -> Result<GuestModel, RepositoryError> {
        if let Some(table_id) = table_id {
            let table = seating_table::Entity::find_by_id(table_id)
                .filter(seating_table::Column::WeddingId.eq(scope.wedding_id))
                .one(self.db)
                .await?;
            if table.is_none() {
                return Err(RepositoryError::NotFound("Seating table"));
            }
        }

        let guest = self
            .find(scope, guest_id)
            .await?
            .ok_or(RepositoryError::NotFound("Guest"))?;
        let mut active = guest.into_active_model();
        active.table_id = Set(table_id);
        Ok(active.update(self.db).await?)
    }
}
