pub use super::counteroffers::Entity as Counteroffers;
pub use super::documents::Entity as Documents;
pub use super::entrepreneur_verifications::Entity as EntrepreneurVerifications;
pub use super::listing_offers::Entity as ListingOffers;
pub use super::listings::Entity as Listings;
pub use super::phone_otps::Entity as PhoneOtps;
pub use super::profiles::Entity as Profiles;
pub use super::vehicles::Entity as Vehicles;
