//! demo
//!
//! A sample library catalogue wired into a [`Registry`].
//!
//! # Records
//!
//! - `language` (alias `lang`): kept in a `Vec`, acquired as a collection
//! - `author` (alias `writer`): acquired through a find/create pair
//! - `book` (aliases `b`, `title`): kept in a map, acquired through one
//!   combined accessor
//!
//! Authors are referenced by key or display name through a custom
//! converter. Two custom commands are registered: `update-language` and
//! `retire-book`.
//!
//! # Example
//!
//! ```
//! use seedline::demo::{self, Library};
//!
//! let registry = demo::registry().unwrap();
//! let mut library = Library::default();
//! registry
//!     .run_many(&mut library, "add language en English\nadd book b1 Dune --lang=EN")
//!     .unwrap();
//! assert_eq!(library.book("b1").unwrap().language.as_ref().unwrap().key(), "en");
//! ```

pub mod library;

pub use library::{Author, Book, Formats, Genre, Language};

use indexmap::IndexMap;
use thiserror::Error;

use crate::core::naming::{self, fold};
use crate::core::types::{ConvertError, RecordRef, Value};
use crate::engine::{
    Acquire, CustomCommand, Field, GenerateOptions, Method, RecordRegistration, Registry,
    RegistryError, ScriptError,
};

/// Errors raised by the library's custom commands.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("no language with key '{0}'")]
    UnknownLanguage(String),

    #[error("no book with key '{0}'")]
    UnknownBook(String),
}

/// The sample context.
#[derive(Debug, Clone, Default)]
pub struct Library {
    pub languages: Vec<Language>,
    pub authors: Vec<Author>,
    /// Keyed by folded book key.
    pub books: IndexMap<String, Book>,
    /// Entries written by custom commands.
    pub journal: Vec<String>,
}

impl Library {
    pub fn language(&self, key: &str) -> Option<&Language> {
        self.languages
            .iter()
            .find(|l| naming::eq_ignore_case(&l.key, key))
    }

    pub fn author(&self, key: &str) -> Option<&Author> {
        self.authors
            .iter()
            .find(|a| naming::eq_ignore_case(&a.key, key))
    }

    pub fn book(&self, key: &str) -> Option<&Book> {
        self.books
            .get(&fold(key))
            .filter(|b| naming::eq_ignore_case(&b.key, key))
            .or_else(|| {
                self.books
                    .values()
                    .find(|b| naming::eq_ignore_case(&b.key, key))
            })
    }

    /// Re-key `books` by identity after a `--Key=` rename, keeping order.
    fn reindex_books(&mut self) {
        if self.books.iter().all(|(slot, book)| *slot == fold(&book.key)) {
            return;
        }
        self.books = std::mem::take(&mut self.books)
            .into_values()
            .map(|book| (fold(&book.key), book))
            .collect();
    }
}

fn languages(library: &mut Library) -> &mut Vec<Language> {
    &mut library.languages
}

fn find_author<'a>(library: &'a mut Library, key: &str) -> Option<&'a mut Author> {
    library
        .authors
        .iter_mut()
        .find(|a| naming::eq_ignore_case(&a.key, key))
}

fn create_author<'a>(library: &'a mut Library, key: &str) -> &'a mut Author {
    let index = library.authors.len();
    library.authors.push(Author {
        key: key.to_string(),
        ..Author::default()
    });
    &mut library.authors[index]
}

fn book_entry<'a>(library: &'a mut Library, key: &str, acquire: Acquire) -> Option<&'a mut Book> {
    library.reindex_books();
    match acquire {
        Acquire::Find => library.books.get_mut(&fold(key)),
        Acquire::FindOrCreate => Some(library.books.entry(fold(key)).or_insert_with(|| Book {
            key: key.to_string(),
            ..Book::default()
        })),
    }
}

/// Resolve an author by key, then by display name.
fn resolve_author(library: &mut Library, token: &str) -> Result<Value, ConvertError> {
    let library: &Library = library;
    library
        .author(token)
        .or_else(|| {
            library
                .authors
                .iter()
                .find(|a| naming::eq_ignore_case(&a.name, token))
        })
        .map(|a| Value::Ref(a.key.clone()))
        .ok_or_else(|| ConvertError::Custom(format!("no author with key or name '{token}'")))
}

fn update_language(
    library: &mut Library,
    key: String,
    name: String,
    native: Option<String>,
) -> Result<(), LibraryError> {
    let language = library
        .languages
        .iter_mut()
        .find(|l| naming::eq_ignore_case(&l.key, &key))
        .ok_or(LibraryError::UnknownLanguage(key))?;
    language.name = name;
    if native.is_some() {
        language.native_name = native;
    }
    Ok(())
}

fn retire_book(library: &mut Library, key: String, reason: String) -> Result<(), LibraryError> {
    library.reindex_books();
    let book = library
        .books
        .shift_remove(&fold(&key))
        .ok_or_else(|| LibraryError::UnknownBook(key.clone()))?;
    library
        .journal
        .push(format!("retired {} ({}): {reason}", book.key, book.title));
    Ok(())
}

/// Build the registry for [`Library`].
///
/// # Errors
///
/// Returns `RegistryError` if a registration is rejected.
pub fn registry() -> Result<Registry<Library>, RegistryError> {
    let mut registry = Registry::new();

    registry.register(
        RecordRegistration::new("language")
            .alias("lang")
            .collection(languages)
            .identity("Key", |l: &Language| &l.key, |l, v| l.key = v)
            .positional(Field::new("Name", |l: &Language| &l.name, |l, v| l.name = v))
            .field(
                Field::new("NativeName", |l: &Language| &l.native_name, |l, v| l.native_name = v)
                    .alias("native"),
            ),
    )?;

    registry.register(
        RecordRegistration::new("author")
            .alias("writer")
            .find_create(find_author, create_author)
            .identity("Key", |a: &Author| &a.key, |a, v| a.key = v)
            .positional(Field::new("Name", |a: &Author| &a.name, |a, v| a.name = v))
            .field(Field::new("Born", |a: &Author| &a.born, |a, v| a.born = v))
            .field(Field::new("Active", |a: &Author| &a.active, |a, v| a.active = v)),
    )?;

    registry.register(
        RecordRegistration::new("book")
            .alias("b")
            .alias("title")
            .combined(book_entry)
            .identity("Key", |b: &Book| &b.key, |b, v| b.key = v)
            .positional(Field::new("Title", |b: &Book| &b.title, |b, v| b.title = v))
            .positional(Field::new("Author", |b: &Book| &b.author, |b, v| b.author = v).alias("by"))
            .positional(Field::new("Year", |b: &Book| &b.year, |b, v| b.year = v))
            .field(Field::new("Language", |b: &Book| &b.language, |b, v| b.language = v).alias("lang"))
            .field(Field::new("Genre", |b: &Book| &b.genre, |b, v| b.genre = v).alias("kind"))
            .field(Field::new("Formats", |b: &Book| &b.formats, |b, v| b.formats = v))
            .field(Field::new("Published", |b: &Book| &b.published, |b, v| b.published = v))
            .field(Field::new("ReadingTime", |b: &Book| &b.reading_time, |b, v| b.reading_time = v))
            .field(Field::new("Id", |b: &Book| &b.id, |b, v| b.id = v))
            .field(Field::new("Rating", |b: &Book| &b.rating, |b, v| b.rating = v))
            .field(Field::with_default_check(
                "Copies",
                |b: &Book| &b.copies,
                |b, v| b.copies = v,
                |copies: &u32| *copies == 1,
            ))
            .field(Field::new("Tags", |b: &Book| &b.tags, |b, v| b.tags = v))
            .field(Field::new("Languages", |b: &Book| &b.languages, |b, v| b.languages = v).alias("langs"))
            .method(Method::binary("SetTitle", Book::set_title))
            // One-argument methods cannot be reached from a command line;
            // `--Tag:x=y` reports the arity mismatch.
            .method(Method::unary("Tag", Book::tag)),
    )?;

    registry.register_described_converter::<RecordRef<Author>, _>("author key or name", resolve_author);

    registry.register_command(
        CustomCommand::new("update-language", update_language)
            .params(["key", "name", "native"])
            .optional("native")
            .describe("Rename a language"),
    )?;

    registry.register_command(
        CustomCommand::new("retire-book", retire_book)
            .params(["key", "reason"])
            .default_value("reason", "out of print".to_string())
            .describe("Remove a book and note why"),
    )?;

    Ok(registry)
}

/// Regenerate every record in `library` as `add` commands: languages,
/// then authors, then books.
///
/// # Errors
///
/// Returns `ScriptError` if a record type is not registered.
pub fn dump(
    registry: &Registry<Library>,
    library: &Library,
    options: &GenerateOptions,
) -> Result<String, ScriptError> {
    let sections = [
        registry.generate_commands(&library.languages, options)?,
        registry.generate_commands(&library.authors, options)?,
        registry.generate_commands(library.books.values(), options)?,
    ];
    Ok(sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Registry<Library>, Library) {
        (registry().unwrap(), Library::default())
    }

    #[test]
    fn registry_builds() {
        let (registry, _) = setup();
        assert_eq!(registry.records().count(), 3);
        assert_eq!(registry.commands().count(), 2);
        assert_eq!(registry.record("writer").unwrap().name(), "author");
    }

    #[test]
    fn author_converter_accepts_names() {
        let (registry, mut library) = setup();
        registry
            .run_many(
                &mut library,
                "add author tolkien \"J. R. R. Tolkien\"\nadd book hobbit \"The Hobbit\" \"j. r. r. tolkien\" 1937",
            )
            .unwrap();

        let book = library.book("hobbit").unwrap();
        assert_eq!(book.author.as_ref().unwrap().key(), "tolkien");
        assert_eq!(book.year, 1937);
    }

    #[test]
    fn unknown_author_is_an_error() {
        let (registry, mut library) = setup();
        let err = registry
            .run(&mut library, "add book b1 Dune \"Frank Herbert\"")
            .unwrap_err();
        assert_eq!(
            err.conversion().unwrap().to_string(),
            "no author with key or name 'Frank Herbert'"
        );
    }

    #[test]
    fn combined_accessor_folds_keys() {
        let (registry, mut library) = setup();
        registry.run(&mut library, "add book B1 Dune").unwrap();
        registry.run(&mut library, "add b b1 --Year=1965").unwrap();

        assert_eq!(library.books.len(), 1);
        let book = library.book("b1").unwrap();
        assert_eq!(book.key, "B1");
        assert_eq!(book.year, 1965);
    }

    #[test]
    fn renamed_book_is_rekeyed() {
        let (registry, mut library) = setup();
        registry
            .run(&mut library, "add book b1 Dune --Key=b2 --Year=1965")
            .unwrap();
        registry.run(&mut library, "add book B2 --Copies=4").unwrap();

        assert_eq!(library.books.len(), 1);
        assert_eq!(library.books.keys().collect::<Vec<_>>(), ["b2"]);
        let book = library.book("b2").unwrap();
        assert_eq!((book.title.as_str(), book.year, book.copies), ("Dune", 1965, 4));
        assert!(library.book("b1").is_none());

        // The old key is free again.
        registry.run(&mut library, "add book b1 Emma").unwrap();
        assert_eq!(library.books.len(), 2);
        registry.run(&mut library, "retire-book b2").unwrap();
        assert_eq!(library.book("b1").unwrap().title, "Emma");
    }

    #[test]
    fn rename_onto_existing_book_fails() {
        let (registry, mut library) = setup();
        registry
            .run_many(&mut library, "add book b1 Dune\nadd book b2 Emma")
            .unwrap();

        let err = registry.run(&mut library, "add book b1 --Key=B2").unwrap_err();
        assert!(matches!(err, ScriptError::DuplicateKey { .. }));
        assert_eq!(library.book("b1").unwrap().title, "Dune");
        assert_eq!(library.book("b2").unwrap().title, "Emma");
    }

    #[test]
    fn set_title_method() {
        let (registry, mut library) = setup();
        registry
            .run_many(
                &mut library,
                "add lang es Spanish\nadd book b1 Dune --SetTitle:ES=\"Dune (es)\" --Title:es=Duna",
            )
            .unwrap();
        assert_eq!(library.book("b1").unwrap().titles["es"], "Duna");
    }

    #[test]
    fn retire_book_journals() {
        let (registry, mut library) = setup();
        registry.run(&mut library, "add book b1 Dune").unwrap();
        registry.run(&mut library, "retire-book B1").unwrap();
        assert!(library.books.is_empty());
        assert_eq!(library.journal, ["retired b1 (Dune): out of print"]);

        let err = registry.run(&mut library, "retire-book b1 gone").unwrap_err();
        assert_eq!(err.to_string(), "command 'retire-book' failed: no book with key 'b1'");
    }

    #[test]
    fn dump_orders_sections() {
        let (registry, mut library) = setup();
        registry
            .run_many(
                &mut library,
                "add book b1 Dune\nadd language en English\nadd author fh \"Frank Herbert\"",
            )
            .unwrap();
        let text = dump(&registry, &library, &GenerateOptions::default()).unwrap();
        assert_eq!(
            text,
            "add language en English\nadd author fh \"Frank Herbert\"\nadd book b1 Dune"
        );
    }
}
