use crate::core::{Book, BookId, Member, MemberId, ReturnPolicy, SortKey};
use crate::utils::error::{CatalogError, Entity, Result};
use std::collections::BTreeMap;

/// In-memory aggregate of books and members.
///
/// Every mutation either succeeds completely or leaves the catalog untouched.
/// Persisting the result is the caller's job (see [`crate::core::library::Library`]).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: BTreeMap<BookId, Book>,
    members: BTreeMap<MemberId, Member>,
    return_policy: ReturnPolicy,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_return_policy(return_policy: ReturnPolicy) -> Self {
        Self {
            return_policy,
            ..Self::default()
        }
    }

    pub fn return_policy(&self) -> ReturnPolicy {
        self.return_policy
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.get(&id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Books in ascending id order.
    pub fn books(&self) -> impl Iterator<Item = &Book> + '_ {
        self.books.values()
    }

    /// Members in ascending id order.
    pub fn members(&self) -> impl Iterator<Item = &Member> + '_ {
        self.members.values()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn add_book(
        &mut self,
        id: BookId,
        title: &str,
        author: &str,
        category: &str,
    ) -> Result<()> {
        if self.books.contains_key(&id) {
            return Err(CatalogError::DuplicateId {
                entity: Entity::Book,
                id,
            });
        }
        self.books.insert(id, Book::new(id, title, author, category));
        Ok(())
    }

    pub fn add_member(&mut self, id: MemberId, name: &str, email: &str) -> Result<()> {
        if self.members.contains_key(&id) {
            return Err(CatalogError::DuplicateId {
                entity: Entity::Member,
                id,
            });
        }
        self.members.insert(id, Member::new(id, name, email));
        Ok(())
    }

    pub fn issue_book(&mut self, book_id: BookId, member_id: MemberId) -> Result<()> {
        let (book, member) = self.resolve(book_id, member_id)?;
        if book.is_issued() {
            return Err(CatalogError::AlreadyIssued { book_id });
        }

        book.mark_as_issued();
        member.add_issued_book(book_id);
        Ok(())
    }

    /// Under [`ReturnPolicy::Lenient`] the book is marked returned even when
    /// `member_id` does not hold it; nothing is removed from that member.
    pub fn return_book(&mut self, book_id: BookId, member_id: MemberId) -> Result<()> {
        let policy = self.return_policy;
        let (book, member) = self.resolve(book_id, member_id)?;
        if !book.is_issued() {
            return Err(CatalogError::NotIssued { book_id });
        }
        if policy == ReturnPolicy::Strict && !member.holds(book_id) {
            return Err(CatalogError::NotHeldByMember { book_id, member_id });
        }

        book.mark_as_returned();
        if !member.return_issued_book(book_id) {
            tracing::warn!(
                "Book {} returned by member {} who did not hold it; issued lists left unchanged",
                book_id,
                member_id
            );
        }
        Ok(())
    }

    /// Books whose title, author or category contains `keyword`, ignoring case.
    pub fn search_books<'a>(&'a self, keyword: &str) -> impl Iterator<Item = &'a Book> + 'a {
        let needle = keyword.to_lowercase();
        self.books
            .values()
            .filter(move |book| book.matches_lowercase(&needle))
    }

    /// All books ordered by `key`. Titles compare ignoring case; authors and
    /// categories compare as written. Ties keep id order.
    pub fn sort_books(&self, key: SortKey) -> Vec<&Book> {
        let mut sorted: Vec<&Book> = self.books.values().collect();
        match key {
            SortKey::Title => sorted.sort_by_cached_key(|book| book.title().to_lowercase()),
            SortKey::Author => sorted.sort_by(|a, b| a.author().cmp(b.author())),
            SortKey::Category => sorted.sort_by(|a, b| a.category().cmp(b.category())),
        }
        sorted
    }

    /// Inserts a record read from disk, replacing any earlier record with the same id.
    pub(crate) fn restore_book(&mut self, book: Book) {
        self.books.insert(book.id(), book);
    }

    pub(crate) fn restore_member(&mut self, member: Member) {
        self.members.insert(member.id(), member);
    }

    fn resolve(&mut self, book_id: BookId, member_id: MemberId) -> Result<(&mut Book, &mut Member)> {
        let book = self.books.get_mut(&book_id).ok_or(CatalogError::NotFound {
            entity: Entity::Book,
            id: book_id,
        })?;
        let member = self.members.get_mut(&member_id).ok_or(CatalogError::NotFound {
            entity: Entity::Member,
            id: member_id,
        })?;
        Ok((book, member))
    }
}
