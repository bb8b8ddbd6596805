pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{InMemoryDirectory, PostgrestClient, ResendMailer};
pub use config::DirectoryConfig;
pub use crate::core::filter::SearchFilter;
pub use crate::core::query::ListingQuery;
pub use crate::core::render::{CardRenderer, OutputFormat, SearchView};
pub use crate::core::search::SearchSession;
pub use utils::error::{DirectoryError, Result};
