use std::fmt;
use std::str::FromStr;

pub type BookId = i32;
pub type MemberId = i32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    category: String,
    issued: bool,
}

impl Book {
    /// A freshly catalogued book is never issued.
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            category: category.into(),
            issued: false,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_issued(&self) -> bool {
        self.issued
    }

    pub(crate) fn mark_as_issued(&mut self) {
        self.issued = true;
    }

    pub(crate) fn mark_as_returned(&mut self) {
        self.issued = false;
    }

    /// Case-insensitive substring match over title, author and category.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.author.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: MemberId,
    name: String,
    email: String,
    issued_books: Vec<BookId>,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            issued_books: Vec::new(),
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Book ids in the order they were issued.
    pub fn issued_books(&self) -> &[BookId] {
        &self.issued_books
    }

    pub fn holds(&self, book_id: BookId) -> bool {
        self.issued_books.contains(&book_id)
    }

    pub(crate) fn add_issued_book(&mut self, book_id: BookId) {
        self.issued_books.push(book_id);
    }

    /// Removes the first occurrence of `book_id`. Returns false when absent.
    pub(crate) fn return_issued_book(&mut self, book_id: BookId) -> bool {
        match self.issued_books.iter().position(|&id| id == book_id) {
            Some(index) => {
                self.issued_books.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Field to order books by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Author,
    Category,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Title => write!(f, "title"),
            SortKey::Author => write!(f, "author"),
            SortKey::Category => write!(f, "category"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// Accepts the menu numbers (1-3) as well as the field names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "title" => Ok(SortKey::Title),
            "2" | "author" => Ok(SortKey::Author),
            "3" | "category" => Ok(SortKey::Category),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// How a return by a member who does not hold the book is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnPolicy {
    /// The book is marked returned anyway; the member's list is left as is.
    #[default]
    Lenient,
    /// The return is rejected with `NotHeldByMember`.
    Strict,
}
