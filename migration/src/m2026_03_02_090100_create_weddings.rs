//! Migration to create the weddings table.
//!
//! Each tenant owns exactly one wedding, enforced by a unique tenant_id.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Weddings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Weddings::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Weddings::TenantId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Weddings::PartnerOne).text().not_null())
                    .col(ColumnDef::new(Weddings::PartnerTwo).text().not_null())
                    .col(ColumnDef::new(Weddings::WeddingDate).date().null())
                    .col(ColumnDef::new(Weddings::Theme).json_binary().not_null())
                    .col(ColumnDef::new(Weddings::Sections).json_binary().not_null())
                    .col(
                        ColumnDef::new(Weddings::PhotoSharingEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Weddings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Weddings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_weddings_tenant_id")
                            .from(Weddings::Table, Weddings::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Weddings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Weddings {
    Table,
    Id,
    TenantId,
    PartnerOne,
    PartnerTwo,
    WeddingDate,
    Theme,
    Sections,
    PhotoSharingEnabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
