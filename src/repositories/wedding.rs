//! # Wedding Repository

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::{FieldError, RepositoryError};
use crate::models::sections::{ContentSection, ThemeSettings, validate_sections};
use crate::models::wedding::{self, Entity as Wedding, Model as WeddingModel};

use super::TenantScope;

/// Partial update of a wedding; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct WeddingChanges {
    pub partner_one: Option<String>,
    pub partner_two: Option<String>,
    /// `Some(None)` clears the date
    pub wedding_date: Option<Option<NaiveDate>>,
    pub theme: Option<ThemeSettings>,
    pub sections: Option<Vec<ContentSection>>,
    pub photo_sharing_enabled: Option<bool>,
}

impl WeddingChanges {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("partner_one", &self.partner_one),
            ("partner_two", &self.partner_two),
        ] {
            if let Some(name) = value
                && name.trim().is_empty()
            {
                errors.push(FieldError::new(field, "Partner name cannot be empty"));
            }
        }
        if let Some(theme) = &self.theme {
            errors.extend(
                theme
                    .validate()
                    .into_iter()
                    .map(|issue| FieldError::new(issue.field, issue.message)),
            );
        }
        if let Some(sections) = &self.sections {
            errors.extend(
                validate_sections(sections)
                    .into_iter()
                    .map(|issue| FieldError::new(issue.field, issue.message)),
            );
        }
        errors
    }
}

pub struct WeddingRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> WeddingRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create the tenant's wedding with default theme and no sections.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        partner_one: &str,
        partner_two: &str,
        wedding_date: Option<NaiveDate>,
    ) -> Result<WeddingModel, RepositoryError> {
        let mut errors = Vec::new();
        if partner_one.trim().is_empty() {
            errors.push(FieldError::new("partner_one", "Partner name is required"));
        }
        if partner_two.trim().is_empty() {
            errors.push(FieldError::new("partner_two", "Partner name is required"));
        }
        if !errors.is_empty() {
            return Err(RepositoryError::Validation(errors));
        }

        let now = Utc::now();
        let theme = serde_json::to_value(ThemeSettings::default())
            .map_err(|e| RepositoryError::invalid("theme", e.to_string()))?;
        let wedding = wedding::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            partner_one: Set(partner_one.trim().to_string()),
            partner_two: Set(partner_two.trim().to_string()),
            wedding_date: Set(wedding_date),
            theme: Set(theme),
            sections: Set(serde_json::Value::Array(Vec::new())),
            photo_sharing_enabled: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(wedding.insert(self.db).await?)
    }

    pub async fn find_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<WeddingModel>, RepositoryError> {
        Ok(Wedding::find()
            .filter(wedding::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?)
    }

    pub async fn get(&self, scope: TenantScope) -> Result<WeddingModel, RepositoryError> {
        Wedding::find_by_id(scope.wedding_id)
            .filter(wedding::Column::TenantId.eq(scope.tenant_id))
            .one(self.db)
            .await?
            .ok_or(RepositoryError::NotFound("Wedding"))
    }

    /// Validate every change first, then apply them in one update.
    pub async fn update(
        &self,
        scope: TenantScope,
        changes: WeddingChanges,
    ) -> Result<WeddingModel, RepositoryError> {
        let errors = changes.validate();
        if !errors.is_empty() {
            return Err(RepositoryError::Validation(errors));
        }

        let mut active = self.get(scope).await?.into_active_model();
        if let Some(name) = changes.partner_one {
            active.partner_one = Set(name.trim().to_string());
        }
        if let Some(name) = changes.partner_two {
            active.partner_two = Set(name.trim().to_string());
        }
        if let Some(date) = changes.wedding_date {
            active.wedding_date = Set(date);
        }
        if let Some(theme) = changes.theme {
            active.theme = Set(serde_json::to_value(theme)
                .map_err(|e| RepositoryError::invalid("theme", e.to_string()))?);
        }
        if let Some(sections) = changes.sections {
            active.sections = Set(serde_json::to_value(sections)
                .map_err(|e| RepositoryError::invalid("sections", e.to_string()))?);
        }
        if let Some(enabled) = changes.photo_sharing_enabled {
            active.photo_sharing_enabled = Set(enabled);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_partner_names_and_bad_theme_are_reported_together() {
        let changes = WeddingChanges {
            partner_one: Some("  ".to_string()),
            theme: Some(ThemeSettings {
                primary_color: "blue".to_string(),
                ..ThemeSettings::default()
            }),
            ..WeddingChanges::default()
        };

        let fields: Vec<String> = changes.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["partner_one", "theme.primary_color"]);
    }
}
