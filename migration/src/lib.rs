//! Database migrations for the wedding site platform.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_01_01_000001_create_tenants;
mod m2026_03_02_090000_create_users;
mod m2026_03_02_090100_create_weddings;
mod m2026_03_02_090200_create_guests;
mod m2026_03_02_090300_create_events;
mod m2026_03_02_090400_create_gifts_and_photos;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_01_01_000001_create_tenants::Migration),
            Box::new(m2026_03_02_090000_create_users::Migration),
            Box::new(m2026_03_02_090100_create_weddings::Migration),
            Box::new(m2026_03_02_090200_create_guests::Migration),
            Box::new(m2026_03_02_090300_create_events::Migration),
            Box::new(m2026_03_02_090400_create_gifts_and_photos::Migration),
        ]
    }
}
