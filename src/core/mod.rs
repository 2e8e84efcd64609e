pub mod catalog;
pub mod library;
pub mod persistence;

pub use crate::core::catalog::Catalog;
pub use crate::domain::model::{Book, BookId, Member, MemberId, ReturnPolicy, SortKey};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
