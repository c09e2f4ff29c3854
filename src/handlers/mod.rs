pub mod admin;
pub mod document;
pub mod listing;
pub mod offer;
pub mod profile;
pub mod verification;
