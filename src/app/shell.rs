use crate::core::library::{Library, SaveOutcome};
use crate::core::{Book, SortKey, Storage};
use crate::utils::error::Result;
use std::io::{BufRead, Write};

const MENU: [&str; 7] = [
    "1. Add Book",
    "2. Add Member",
    "3. Issue Book",
    "4. Return Book",
    "5. Search Books",
    "6. Sort Books",
    "7. Exit",
];

enum Flow {
    Continue,
    Exit,
}

/// A parsed answer to a prompt.
enum Answer<T> {
    Value(T),
    /// Already reported to the operator; back to the menu.
    Invalid,
    /// End of input.
    Closed,
}

/// Text menu over a [`Library`]. End of input is treated like choosing Exit.
pub struct Shell<S: Storage, R: BufRead, W: Write> {
    library: Library<S>,
    input: R,
    output: W,
}

impl<S: Storage, R: BufRead, W: Write> Shell<S, R, W> {
    pub fn new(library: Library<S>, input: R, output: W) -> Self {
        Self {
            library,
            input,
            output,
        }
    }

    pub fn into_parts(self) -> (Library<S>, W) {
        (self.library, self.output)
    }

    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Welcome to City Library Digital Management System")?;
        loop {
            for entry in MENU {
                writeln!(self.output, "{}", entry)?;
            }

            let choice = match self.prompt("Enter your choice: ")? {
                Some(choice) => choice,
                None => return self.exit(),
            };

            let flow = match choice.trim() {
                "1" => self.add_book()?,
                "2" => self.add_member()?,
                "3" => self.issue_book()?,
                "4" => self.return_book()?,
                "5" => self.search_books()?,
                "6" => self.sort_books()?,
                "7" => Flow::Exit,
                _ => {
                    writeln!(self.output, "Invalid choice.")?;
                    Flow::Continue
                }
            };

            if let Flow::Exit = flow {
                return self.exit();
            }
            writeln!(self.output)?;
        }
    }

    fn exit(&mut self) -> Result<()> {
        let outcome = self.library.save();
        self.report_save(outcome)?;
        writeln!(self.output, "Exiting application.")?;
        self.output.flush()?;
        Ok(())
    }

    /// Prints `label` and reads one line without its terminator. `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn prompt_id(&mut self, label: &str) -> Result<Answer<i32>> {
        let Some(line) = self.prompt(label)? else {
            return Ok(Answer::Closed);
        };
        match line.trim().parse::<i32>() {
            Ok(id) => Ok(Answer::Value(id)),
            Err(_) => {
                writeln!(self.output, "Invalid input.")?;
                Ok(Answer::Invalid)
            }
        }
    }

    fn report_save(&mut self, outcome: SaveOutcome) -> Result<()> {
        if let Some(e) = outcome.error() {
            writeln!(self.output, "Error saving files: {}", e)?;
        }
        Ok(())
    }

    fn report_result(&mut self, result: Result<SaveOutcome>, success: &str) -> Result<()> {
        match result {
            Ok(outcome) => {
                writeln!(self.output, "{}", success)?;
                self.report_save(outcome)
            }
            Err(e) => {
                writeln!(self.output, "{}", e.user_friendly_message())?;
                Ok(())
            }
        }
    }

    fn write_book(&mut self, book: &Book) -> Result<()> {
        writeln!(self.output, "Book ID: {}", book.id())?;
        writeln!(self.output, "Title: {}", book.title())?;
        writeln!(self.output, "Author: {}", book.author())?;
        writeln!(self.output, "Category: {}", book.category())?;
        writeln!(self.output, "Issued: {}", book.is_issued())?;
        writeln!(self.output)?;
        Ok(())
    }

    fn add_book(&mut self) -> Result<Flow> {
        let id = match self.prompt_id("Enter Book ID: ")? {
            Answer::Value(id) => id,
            Answer::Invalid => return Ok(Flow::Continue),
            Answer::Closed => return Ok(Flow::Exit),
        };
        let Some(title) = self.prompt("Enter Book Title: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(author) = self.prompt("Enter Author: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(category) = self.prompt("Enter Category: ")? else {
            return Ok(Flow::Exit);
        };

        let result = self.library.add_book(id, &title, &author, &category);
        self.report_result(result, &format!("Book added successfully with ID: {}", id))?;
        Ok(Flow::Continue)
    }

    fn add_member(&mut self) -> Result<Flow> {
        let id = match self.prompt_id("Enter Member ID: ")? {
            Answer::Value(id) => id,
            Answer::Invalid => return Ok(Flow::Continue),
            Answer::Closed => return Ok(Flow::Exit),
        };
        let Some(name) = self.prompt("Enter Member Name: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(email) = self.prompt("Enter Email: ")? else {
            return Ok(Flow::Exit);
        };

        let result = self.library.add_member(id, &name, &email);
        self.report_result(result, &format!("Member added successfully with ID: {}", id))?;
        Ok(Flow::Continue)
    }

    /// Reads a book id then a member id.
    fn prompt_loan(&mut self) -> Result<Answer<(i32, i32)>> {
        let book_id = match self.prompt_id("Enter Book ID: ")? {
            Answer::Value(id) => id,
            Answer::Invalid => return Ok(Answer::Invalid),
            Answer::Closed => return Ok(Answer::Closed),
        };
        let member_id = match self.prompt_id("Enter Member ID: ")? {
            Answer::Value(id) => id,
            Answer::Invalid => return Ok(Answer::Invalid),
            Answer::Closed => return Ok(Answer::Closed),
        };
        Ok(Answer::Value((book_id, member_id)))
    }

    fn issue_book(&mut self) -> Result<Flow> {
        let (book_id, member_id) = match self.prompt_loan()? {
            Answer::Value(ids) => ids,
            Answer::Invalid => return Ok(Flow::Continue),
            Answer::Closed => return Ok(Flow::Exit),
        };

        let result = self.library.issue_book(book_id, member_id);
        self.report_result(result, "Book issued successfully.")?;
        Ok(Flow::Continue)
    }

    fn return_book(&mut self) -> Result<Flow> {
        let (book_id, member_id) = match self.prompt_loan()? {
            Answer::Value(ids) => ids,
            Answer::Invalid => return Ok(Flow::Continue),
            Answer::Closed => return Ok(Flow::Exit),
        };

        let result = self.library.return_book(book_id, member_id);
        self.report_result(result, "Book returned successfully.")?;
        Ok(Flow::Continue)
    }

    fn search_books(&mut self) -> Result<Flow> {
        let Some(keyword) = self.prompt("Enter search keyword: ")? else {
            return Ok(Flow::Exit);
        };

        let matches: Vec<Book> = self.library.search_books(&keyword).cloned().collect();
        if matches.is_empty() {
            writeln!(self.output, "No matching books found.")?;
        }
        for book in &matches {
            self.write_book(book)?;
        }
        Ok(Flow::Continue)
    }

    fn sort_books(&mut self) -> Result<Flow> {
        writeln!(self.output, "Sort by: 1. Title 2. Author 3. Category")?;
        let Some(choice) = self.prompt("Enter your choice: ")? else {
            return Ok(Flow::Exit);
        };
        let key = match choice.parse::<SortKey>() {
            Ok(key) => key,
            Err(_) => {
                writeln!(self.output, "Invalid choice.")?;
                return Ok(Flow::Continue);
            }
        };

        let sorted: Vec<Book> = self
            .library
            .sort_books(key)
            .into_iter()
            .cloned()
            .collect();
        for book in &sorted {
            self.write_book(book)?;
        }
        Ok(Flow::Continue)
    }
}
