use std::fmt;
use thiserror::Error;

/// Which collection an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Book,
    Member,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Book => write!(f, "Book"),
            Entity::Member => write!(f, "Member"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{entity} ID already exists: {id}")]
    DuplicateId { entity: Entity, id: i32 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: i32 },

    #[error("Book {book_id} is already issued")]
    AlreadyIssued { book_id: i32 },

    #[error("Book {book_id} is not issued")]
    NotIssued { book_id: i32 },

    #[error("Book {book_id} is not held by member {member_id}")]
    NotHeldByMember { book_id: i32, member_id: i32 },

    #[error("Parse error in {file} line {line}: {message}")]
    ParseError {
        file: String,
        line: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Catalog,
    Persistence,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CatalogError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::DuplicateId { .. }
            | CatalogError::NotFound { .. }
            | CatalogError::AlreadyIssued { .. }
            | CatalogError::NotIssued { .. }
            | CatalogError::NotHeldByMember { .. } => ErrorCategory::Catalog,
            CatalogError::ParseError { .. }
            | CatalogError::IoError(_)
            | CatalogError::CsvError(_) => ErrorCategory::Persistence,
            CatalogError::ConfigError { .. }
            | CatalogError::ConfigValidationError { .. }
            | CatalogError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // Rejected operations leave the catalog untouched.
            ErrorCategory::Catalog => ErrorSeverity::Low,
            ErrorCategory::Persistence => match self {
                CatalogError::ParseError { .. } => ErrorSeverity::Medium,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Message shown verbatim to the operator.
    pub fn user_friendly_message(&self) -> String {
        match self {
            CatalogError::DuplicateId { entity, .. } => format!("{} ID already exists.", entity),
            CatalogError::NotFound { .. } => "Invalid Book or Member ID.".to_string(),
            CatalogError::AlreadyIssued { .. } => "Book already issued.".to_string(),
            CatalogError::NotIssued { .. } => "Book is not issued.".to_string(),
            CatalogError::NotHeldByMember { book_id, member_id } => {
                format!("Book {} is not issued to member {}.", book_id, member_id)
            }
            CatalogError::ParseError { .. } => format!("Error loading files: {}", self),
            CatalogError::IoError(e) => format!("File access failed: {}", e),
            CatalogError::CsvError(e) => format!("Malformed data file: {}", e),
            CatalogError::ConfigError { .. }
            | CatalogError::ConfigValidationError { .. }
            | CatalogError::InvalidConfigValueError { .. } => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CatalogError::DuplicateId { .. } => "Choose an ID that is not in use",
            CatalogError::NotFound { .. } => "Check the book and member IDs",
            CatalogError::AlreadyIssued { .. } => "Return the book before issuing it again",
            CatalogError::NotIssued { .. } => "Only issued books can be returned",
            CatalogError::NotHeldByMember { .. } => "Return the book with the member who holds it",
            CatalogError::ParseError { .. } | CatalogError::CsvError(_) => {
                "Fix or remove the malformed line in the data file"
            }
            CatalogError::IoError(_) => "Check that the data directory exists and is writable",
            CatalogError::ConfigError { .. }
            | CatalogError::ConfigValidationError { .. }
            | CatalogError::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line flags"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
