pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use app::Shell;
pub use config::LibraryConfig;
pub use crate::core::{
    catalog::Catalog,
    library::{Library, SaveOutcome},
    persistence::{FlatFileStore, LoadReport},
};
pub use domain::model::{Book, BookId, Member, MemberId, ReturnPolicy, SortKey};
pub use utils::error::{CatalogError, Result};
