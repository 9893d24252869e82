//! # User Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::user::{self, Entity as User, Model as UserModel, Role};

/// Lowercase and sanity-check an e-mail address.
pub fn normalize_email(raw: &str) -> Result<String, RepositoryError> {
    let email = raw.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(RepositoryError::invalid("email", "A valid e-mail address is required")),
    }
}

pub struct UserRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create a user from an already-hashed password.
    pub async fn create(
        &self,
        email: &str,
        password_hash: String,
        role: Role,
        tenant_id: Option<Uuid>,
    ) -> Result<UserModel, RepositoryError> {
        let email = normalize_email(email)?;
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepositoryError::Conflict(
                "An account with this e-mail already exists".to_string(),
            ));
        }

        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role),
            tenant_id: Set(tenant_id),
            created_at: Set(Utc::now().into()),
        };
        Ok(user.insert(self.db).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email.trim().to_ascii_lowercase()))
            .one(self.db)
            .await?)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError> {
        Ok(User::find()
            .filter(user::Column::Role.eq(role))
            .count(self.db)
            .await?)
    }
}
