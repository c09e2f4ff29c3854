pub use sea_orm_migration::prelude::*;

mod m20260715_000001_create_profiles;
mod m20260715_000002_create_vehicles;
mod m20260715_000003_create_listings;
mod m20260716_000001_create_documents;
mod m20260716_000002_create_listing_offers;
mod m20260716_000003_create_counteroffers;
mod m20260717_000001_create_entrepreneur_verifications;
mod m20260717_000002_create_phone_otps;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260715_000001_create_profiles::Migration),
            Box::new(m20260715_000002_create_vehicles::Migration),
            Box::new(m20260715_000003_create_listings::Migration),
            Box::new(m20260716_000001_create_documents::Migration),
            Box::new(m20260716_000002_create_listing_offers::Migration),
            Box::new(m20260716_000003_create_counteroffers::Migration),
            Box::new(m20260717_000001_create_entrepreneur_verifications::Migration),
            Box::new(m20260717_000002_create_phone_otps::Migration),
        ]
    }
}
