use crate::core::{Book, BookId, Catalog, ConfigProvider, Member, Storage};
use crate::utils::error::{CatalogError, Result};
use csv::{ByteRecord, QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};

/// `id,title,author,category,issued`
pub const BOOK_FIELDS: usize = 5;
/// `id,name,email[,issuedBookId]*`
pub const MIN_MEMBER_FIELDS: usize = 3;

/// What a single data line turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome<T> {
    Parsed(T),
    /// Wrong number of fields; the line is ignored.
    Skipped { fields: usize },
    /// Malformed integer; loading stops here.
    Fatal(String),
}

/// Summary of a load. Records parsed before a failure stay loaded.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Distinct books in the catalog once loading ends.
    pub books_loaded: usize,
    /// Distinct members in the catalog once loading ends.
    pub members_loaded: usize,
    pub lines_skipped: usize,
    pub error: Option<CatalogError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Splits a raw line into text fields. Invalid UTF-8 becomes U+FFFD and
/// trailing empty fields are dropped, so `1,Alice,a@x.com,` has three fields.
fn text_fields(raw: &ByteRecord) -> StringRecord {
    let mut fields: Vec<String> = raw
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    StringRecord::from(fields)
}

fn parse_id(field: &str) -> std::result::Result<i32, String> {
    field
        .parse::<i32>()
        .map_err(|e| format!("invalid integer '{}': {}", field, e))
}

pub fn decode_book(record: &StringRecord) -> LineOutcome<Book> {
    if record.len() != BOOK_FIELDS {
        return LineOutcome::Skipped {
            fields: record.len(),
        };
    }

    let id = match parse_id(&record[0]) {
        Ok(id) => id,
        Err(message) => return LineOutcome::Fatal(message),
    };

    let mut book = Book::new(id, &record[1], &record[2], &record[3]);
    // Anything other than "true" (any case) reads as not issued.
    if record[4].eq_ignore_ascii_case("true") {
        book.mark_as_issued();
    }
    LineOutcome::Parsed(book)
}

pub fn decode_member(record: &StringRecord) -> LineOutcome<Member> {
    if record.len() < MIN_MEMBER_FIELDS {
        return LineOutcome::Skipped {
            fields: record.len(),
        };
    }

    let id = match parse_id(&record[0]) {
        Ok(id) => id,
        Err(message) => return LineOutcome::Fatal(message),
    };

    let mut member = Member::new(id, &record[1], &record[2]);
    for field in record.iter().skip(MIN_MEMBER_FIELDS) {
        match parse_id(field) {
            Ok(book_id) => member.add_issued_book(book_id),
            Err(message) => return LineOutcome::Fatal(message),
        }
    }
    LineOutcome::Parsed(member)
}

fn record_writer() -> csv::Writer<Vec<u8>> {
    // No quoting: a comma inside a field is written as-is.
    WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| CatalogError::IoError(e.into_error()))
}

pub fn encode_books<'a>(books: impl IntoIterator<Item = &'a Book>) -> Result<Vec<u8>> {
    let mut writer = record_writer();
    for book in books {
        writer.write_record([
            book.id().to_string().as_str(),
            book.title(),
            book.author(),
            book.category(),
            if book.is_issued() { "true" } else { "false" },
        ])?;
    }
    finish(writer)
}

pub fn encode_members<'a>(members: impl IntoIterator<Item = &'a Member>) -> Result<Vec<u8>> {
    let mut writer = record_writer();
    for member in members {
        let mut fields = vec![
            member.id().to_string(),
            member.name().to_string(),
            member.email().to_string(),
        ];
        fields.extend(member.issued_books().iter().map(BookId::to_string));
        writer.write_record(&fields)?;
    }
    finish(writer)
}

/// Reads and writes the catalog as two comma-delimited text files.
#[derive(Debug, Clone)]
pub struct FlatFileStore<S: Storage> {
    storage: S,
    books_file: String,
    members_file: String,
}

impl<S: Storage> FlatFileStore<S> {
    pub fn new(storage: S, books_file: impl Into<String>, members_file: impl Into<String>) -> Self {
        Self {
            storage,
            books_file: books_file.into(),
            members_file: members_file.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(storage: S, config: &C) -> Self {
        Self::new(storage, config.books_file(), config.members_file())
    }

    /// Fills `catalog` from the data files. Never fails: problems end up in
    /// the report and whatever was parsed before them stays in the catalog.
    pub fn load(&self, catalog: &mut Catalog) -> LoadReport {
        let mut report = LoadReport::default();
        if let Err(e) = self.load_into(catalog, &mut report.lines_skipped) {
            tracing::warn!("Load stopped early: {}", e);
            report.error = Some(e);
        }
        // A repeated id replaces the earlier record, so count what is left.
        report.books_loaded = catalog.book_count();
        report.members_loaded = catalog.member_count();
        report
    }

    fn load_into(&self, catalog: &mut Catalog, skipped: &mut usize) -> Result<()> {
        self.load_file(
            &self.books_file,
            decode_book,
            |book| catalog.restore_book(book),
            skipped,
        )?;

        self.load_file(
            &self.members_file,
            decode_member,
            |member| catalog.restore_member(member),
            skipped,
        )
    }

    fn load_file<T>(
        &self,
        file: &str,
        decode: fn(&StringRecord) -> LineOutcome<T>,
        mut accept: impl FnMut(T),
        skipped: &mut usize,
    ) -> Result<()> {
        if !self.storage.exists(file) {
            tracing::debug!("{} not found, starting with no records", file);
            return Ok(());
        }

        let data = self.storage.read_file(file)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(data.as_slice());

        for result in reader.byte_records() {
            let raw = result?;
            let line = raw.position().map_or(0, |p| p.line() as usize);
            match decode(&text_fields(&raw)) {
                LineOutcome::Parsed(item) => accept(item),
                LineOutcome::Skipped { fields } => {
                    tracing::debug!("Skipping {} line {}: {} fields", file, line, fields);
                    *skipped += 1;
                }
                LineOutcome::Fatal(message) => {
                    return Err(CatalogError::ParseError {
                        file: file.to_string(),
                        line,
                        message,
                    });
                }
            }
        }
        Ok(())
    }

    /// Truncates and rewrites both files. The members file is not touched
    /// when writing the books file fails.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        let books = encode_books(catalog.books())?;
        self.storage.write_file(&self.books_file, &books)?;

        let members = encode_members(catalog.members())?;
        self.storage.write_file(&self.members_file, &members)?;

        tracing::debug!(
            "Saved {} books to {} and {} members to {}",
            catalog.book_count(),
            self.books_file,
            catalog.member_count(),
            self.members_file
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(self, path: &str, content: &str) -> Self {
            self.with_bytes(path, content.as_bytes())
        }

        fn with_bytes(self, path: &str, content: &[u8]) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), content.to_vec());
            self
        }

        fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().unwrap();
            files
                .get(path)
                .map(|data| String::from_utf8(data.clone()).unwrap())
        }
    }

    impl Storage for MockStorage {
        fn exists(&self, path: &str) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }

        fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().unwrap();
            files.get(path).cloned().ok_or_else(|| {
                CatalogError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().unwrap();
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn store(storage: MockStorage) -> FlatFileStore<MockStorage> {
        FlatFileStore::new(storage, "books.txt", "members.txt")
    }

    #[test]
    fn test_decode_book_line() {
        let record = StringRecord::from(vec!["7", "Dune", "Herbert", "SciFi", "TRUE"]);
        match decode_book(&record) {
            LineOutcome::Parsed(book) => {
                assert_eq!(book.id(), 7);
                assert_eq!(book.category(), "SciFi");
                assert!(book.is_issued());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let record = StringRecord::from(vec!["7", "Dune", "Herbert", "SciFi", "yes"]);
        assert!(matches!(decode_book(&record), LineOutcome::Parsed(b) if !b.is_issued()));
    }

    #[test]
    fn test_decode_book_wrong_field_count_is_skipped() {
        let record = StringRecord::from(vec!["7", "Dune", "Herbert", "Sci", "Fi", "false"]);
        assert_eq!(decode_book(&record), LineOutcome::Skipped { fields: 6 });
    }

    #[test]
    fn test_decode_bad_integer_is_fatal() {
        let record = StringRecord::from(vec!["x7", "Dune", "Herbert", "SciFi", "false"]);
        assert!(matches!(decode_book(&record), LineOutcome::Fatal(_)));

        let record = StringRecord::from(vec!["1", "Alice", "a@x.com", "3", "four"]);
        assert!(matches!(decode_member(&record), LineOutcome::Fatal(_)));
    }

    #[test]
    fn test_decode_member_with_issued_books() {
        let record = StringRecord::from(vec!["1", "Alice", "a@x.com", "3", "5"]);
        match decode_member(&record) {
            LineOutcome::Parsed(member) => {
                assert_eq!(member.name(), "Alice");
                assert_eq!(member.issued_books(), &[3, 5]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let record = StringRecord::from(vec!["1", "Alice"]);
        assert_eq!(decode_member(&record), LineOutcome::Skipped { fields: 2 });
    }

    #[test]
    fn test_load_missing_files_gives_empty_catalog() {
        let mut catalog = Catalog::new();
        let report = store(MockStorage::default()).load(&mut catalog);

        assert!(report.is_complete());
        assert_eq!(catalog.book_count(), 0);
        assert_eq!(catalog.member_count(), 0);
    }

    #[test]
    fn test_load_skips_short_lines() {
        let storage = MockStorage::default()
            .with_file("books.txt", "1,Dune,Herbert,SciFi,true\n2,Broken,line\n\n3,Emma,Austen,Fiction,false\n")
            .with_file("members.txt", "1,Alice,a@x.com,1\n2,Bob\n");
        let mut catalog = Catalog::new();
        let report = store(storage).load(&mut catalog);

        assert!(report.is_complete());
        assert_eq!(report.books_loaded, 2);
        assert_eq!(report.members_loaded, 1);
        assert_eq!(report.lines_skipped, 2);
        assert!(catalog.book(1).unwrap().is_issued());
        assert_eq!(catalog.member(1).unwrap().issued_books(), &[1]);
    }

    #[test]
    fn test_bad_integer_keeps_earlier_lines_and_stops() {
        let storage = MockStorage::default()
            .with_file("books.txt", "1,Dune,Herbert,SciFi,false\nabc,Bad,Id,X,false\n3,Emma,Austen,Fiction,false\n")
            .with_file("members.txt", "1,Alice,a@x.com\n");
        let mut catalog = Catalog::new();
        let report = store(storage).load(&mut catalog);

        assert!(!report.is_complete());
        match report.error {
            Some(CatalogError::ParseError { ref file, line, .. }) => {
                assert_eq!(file, "books.txt");
                assert_eq!(line, 2);
            }
            ref other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(catalog.book_count(), 1);
        assert!(catalog.book(3).is_none());
        // The members file is never reached.
        assert_eq!(catalog.member_count(), 0);
    }

    #[test]
    fn test_save_writes_expected_layout() {
        let storage = MockStorage::default();
        let mut catalog = Catalog::new();
        catalog.add_book(2, "Emma", "Austen", "Fiction").unwrap();
        catalog.add_book(1, "Dune", "Herbert", "SciFi").unwrap();
        catalog.add_member(1, "Alice", "a@x.com").unwrap();
        catalog.add_member(2, "Bob", "b@x.com").unwrap();
        catalog.issue_book(1, 1).unwrap();
        catalog.issue_book(2, 1).unwrap();

        store(storage.clone()).save(&catalog).unwrap();

        assert_eq!(
            storage.get_file("books.txt").unwrap(),
            "1,Dune,Herbert,SciFi,true\n2,Emma,Austen,Fiction,true\n"
        );
        assert_eq!(
            storage.get_file("members.txt").unwrap(),
            "1,Alice,a@x.com,1,2\n2,Bob,b@x.com\n"
        );
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let storage = MockStorage::default();
        let mut catalog = Catalog::new();
        catalog.add_book(1, "Dune", "Herbert", "SciFi").unwrap();
        catalog.add_book(2, "Cosmos", "Sagan", "Science").unwrap();
        catalog.add_member(5, "Alice", "a@x.com").unwrap();
        catalog.issue_book(2, 5).unwrap();
        store(storage.clone()).save(&catalog).unwrap();

        let mut reloaded = Catalog::new();
        let report = store(storage).load(&mut reloaded);

        assert!(report.is_complete());
        let original: Vec<&Book> = catalog.books().collect();
        let restored: Vec<&Book> = reloaded.books().collect();
        assert_eq!(original, restored);
        assert_eq!(reloaded.member(5), catalog.member(5));
    }

    #[test]
    fn test_comma_in_title_corrupts_line() {
        let storage = MockStorage::default();
        let mut catalog = Catalog::new();
        catalog.add_book(1, "Guns, Germs, and Steel", "Diamond", "History").unwrap();
        store(storage.clone()).save(&catalog).unwrap();

        let mut reloaded = Catalog::new();
        let report = store(storage).load(&mut reloaded);
        assert_eq!(report.lines_skipped, 1);
        assert_eq!(reloaded.book_count(), 0);
    }

    #[test]
    fn test_trailing_comma_is_ignored() {
        let storage = MockStorage::default()
            .with_file("books.txt", "1,Dune,Herbert,SciFi,true,\n2,Emma,Austen,Fiction,\n")
            .with_file("members.txt", "1,Alice,a@x.com,\n2,Bob,b@x.com,1,,\n");
        let mut catalog = Catalog::new();
        let report = store(storage).load(&mut catalog);

        assert!(report.is_complete(), "unexpected error: {:?}", report.error);
        assert!(catalog.book(1).unwrap().is_issued());
        // Dropping the empty issued flag leaves four fields.
        assert!(catalog.book(2).is_none());
        assert_eq!(report.lines_skipped, 1);
        assert_eq!(report.members_loaded, 2);
        assert!(catalog.member(1).unwrap().issued_books().is_empty());
        assert_eq!(catalog.member(2).unwrap().issued_books(), &[1]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let storage = MockStorage::default()
            .with_bytes(
                "books.txt",
                b"1,Dune,Herbert,SciFi,false\n2,Caf\xE9,X,Y,false\n3,Emma,Austen,Fiction,false\n",
            )
            .with_file("members.txt", "1,Alice,a@x.com\n");
        let mut catalog = Catalog::new();
        let report = store(storage).load(&mut catalog);

        assert!(report.is_complete(), "unexpected error: {:?}", report.error);
        assert_eq!(catalog.book(2).unwrap().title(), "Caf\u{FFFD}");
        assert_eq!(report.books_loaded, 3);
        assert_eq!(report.members_loaded, 1);
    }

    #[test]
    fn test_repeated_id_counts_once() {
        let storage = MockStorage::default()
            .with_file("books.txt", "1,Dune,Herbert,SciFi,false\n1,Dune II,Herbert,SciFi,true\n")
            .with_file("members.txt", "4,Alice,a@x.com\n4,Alice B,a@x.com,1\n");
        let mut catalog = Catalog::new();
        let report = store(storage).load(&mut catalog);

        assert_eq!(report.books_loaded, 1);
        assert_eq!(report.members_loaded, 1);
        assert_eq!(catalog.book(1).unwrap().title(), "Dune II");
        assert_eq!(catalog.member(4).unwrap().issued_books(), &[1]);
    }
}
