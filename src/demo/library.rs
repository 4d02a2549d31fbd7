//! demo::library
//!
//! Record types of the sample library.

use chrono::{NaiveDate, TimeDelta};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::core::types::RecordRef;

/// A language books are written in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Language {
    pub key: String,
    pub name: String,
    pub native_name: Option<String>,
}

/// A book author.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Author {
    pub key: String,
    pub name: String,
    pub born: Option<NaiveDate>,
    pub active: bool,
}

crate::field_enum! {
    /// Broad shelf category.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Genre {
        #[default]
        Fiction,
        NonFiction,
        Poetry,
        Drama,
        Reference,
    }
}

bitflags::bitflags! {
    /// Editions a book is available in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Formats: u8 {
        const HARDCOVER = 1 << 0;
        const PAPERBACK = 1 << 1;
        const EBOOK = 1 << 2;
        const AUDIOBOOK = 1 << 3;
    }
}

impl Default for Formats {
    fn default() -> Self {
        Formats::empty()
    }
}

crate::flags_field!(Formats);

/// A book in the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub key: String,
    pub title: String,
    pub author: Option<RecordRef<Author>>,
    pub year: i32,
    pub language: Option<RecordRef<Language>>,
    pub genre: Genre,
    pub formats: Formats,
    pub published: Option<NaiveDate>,
    pub reading_time: Option<TimeDelta>,
    pub id: Option<Uuid>,
    pub rating: f32,
    pub copies: u32,
    pub tags: Vec<String>,
    pub languages: Vec<String>,
    /// Translated titles by language key. Not a field; set through `SetTitle`.
    pub titles: IndexMap<String, String>,
}

impl Default for Book {
    fn default() -> Self {
        Self {
            key: String::new(),
            title: String::new(),
            author: None,
            year: 0,
            language: None,
            genre: Genre::default(),
            formats: Formats::default(),
            published: None,
            reading_time: None,
            id: None,
            rating: 0.0,
            copies: 1,
            tags: Vec::new(),
            languages: Vec::new(),
            titles: IndexMap::new(),
        }
    }
}

impl Book {
    /// Record a translated title.
    pub fn set_title(&mut self, language: RecordRef<Language>, title: String) {
        self.titles.insert(language.key().to_string(), title);
    }

    /// Add a tag unless already present.
    pub fn tag(&mut self, tag: String) {
        if !self.tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            self.tags.push(tag);
        }
    }
}
