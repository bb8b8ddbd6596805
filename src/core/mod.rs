pub mod account;
pub mod contact;
pub mod detail;
pub mod filter;
pub mod health;
pub mod locale;
pub mod query;
pub mod registration;
pub mod render;
pub mod search;

pub use crate::domain::model::{Listing, NewListing, Profile, SchoolType};
pub use crate::domain::ports::{ListingStore, Mailer, ProfileStore};
pub use crate::utils::error::Result;
