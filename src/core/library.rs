use crate::core::persistence::{FlatFileStore, LoadReport};
use crate::core::{Book, BookId, Catalog, ConfigProvider, MemberId, ReturnPolicy, SortKey, Storage};
use crate::utils::error::{CatalogError, Result};

/// Result of the save that follows a successful mutation.
#[derive(Debug)]
#[must_use]
pub enum SaveOutcome {
    Saved,
    /// The mutation stays applied in memory.
    Failed(CatalogError),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            SaveOutcome::Saved => None,
            SaveOutcome::Failed(e) => Some(e),
        }
    }
}

/// A catalog bound to its data files: every successful mutation is followed
/// by a full save.
pub struct Library<S: Storage> {
    catalog: Catalog,
    store: FlatFileStore<S>,
}

impl<S: Storage> Library<S> {
    /// Starts from an empty catalog without touching the data files.
    pub fn new(store: FlatFileStore<S>, return_policy: ReturnPolicy) -> Self {
        Self {
            catalog: Catalog::with_return_policy(return_policy),
            store,
        }
    }

    /// Builds the library and loads whatever the data files hold.
    pub fn open(store: FlatFileStore<S>, return_policy: ReturnPolicy) -> (Self, LoadReport) {
        let mut library = Self::new(store, return_policy);
        let report = library.load();
        (library, report)
    }

    pub fn from_config<C: ConfigProvider>(storage: S, config: &C) -> (Self, LoadReport) {
        Self::open(
            FlatFileStore::from_config(storage, config),
            config.return_policy(),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replaces the in-memory catalog with the contents of the data files.
    pub fn load(&mut self) -> LoadReport {
        let mut catalog = Catalog::with_return_policy(self.catalog.return_policy());
        let report = self.store.load(&mut catalog);
        self.catalog = catalog;

        tracing::info!(
            "Loaded {} books and {} members ({} lines skipped)",
            self.catalog.book_count(),
            self.catalog.member_count(),
            report.lines_skipped
        );
        report
    }

    pub fn save(&self) -> SaveOutcome {
        match self.store.save(&self.catalog) {
            Ok(()) => SaveOutcome::Saved,
            Err(e) => {
                tracing::warn!("Saving catalog failed: {}", e);
                SaveOutcome::Failed(e)
            }
        }
    }

    pub fn add_book(
        &mut self,
        id: BookId,
        title: &str,
        author: &str,
        category: &str,
    ) -> Result<SaveOutcome> {
        self.catalog.add_book(id, title, author, category)?;
        tracing::debug!("Added book {}", id);
        Ok(self.save())
    }

    pub fn add_member(&mut self, id: MemberId, name: &str, email: &str) -> Result<SaveOutcome> {
        self.catalog.add_member(id, name, email)?;
        tracing::debug!("Added member {}", id);
        Ok(self.save())
    }

    pub fn issue_book(&mut self, book_id: BookId, member_id: MemberId) -> Result<SaveOutcome> {
        self.catalog.issue_book(book_id, member_id)?;
        tracing::debug!("Issued book {} to member {}", book_id, member_id);
        Ok(self.save())
    }

    pub fn return_book(&mut self, book_id: BookId, member_id: MemberId) -> Result<SaveOutcome> {
        self.catalog.return_book(book_id, member_id)?;
        tracing::debug!("Book {} returned by member {}", book_id, member_id);
        Ok(self.save())
    }

    pub fn search_books<'a>(&'a self, keyword: &str) -> impl Iterator<Item = &'a Book> + 'a {
        self.catalog.search_books(keyword)
    }

    pub fn sort_books(&self, key: SortKey) -> Vec<&Book> {
        tracing::debug!("Sorting {} books by {}", self.catalog.book_count(), key);
        self.catalog.sort_books(key)
    }
}
