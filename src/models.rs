use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::permissions::{Permission, CAN_MARK_RETURNED};
use crate::status::LoanStatus;

const GENRE_SUMMARY_LIMIT: usize = 3;
const GENRE_SUMMARY_SEPARATOR: &str = ",   ";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Stable locator for an entity's detail page. The host router turns it into a path.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalReference {
    Author(i64),
    Book(i64),
}

impl CanonicalReference {
    pub fn route_name(&self) -> &'static str {
        match self {
            CanonicalReference::Author(_) => "author-detail",
            CanonicalReference::Book(_) => "book-detail",
        }
    }

    pub fn id(&self) -> String {
        match self {
            CanonicalReference::Author(id) | CanonicalReference::Book(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub fn canonical_reference(&self) -> CanonicalReference {
        CanonicalReference::Author(self.id)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// A catalog entry, not a physical copy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i64>,
    pub language_id: Option<i64>,
    /// In the order the links were stored.
    pub genres: Vec<Genre>,
}

impl Book {
    pub const GENRE_SUMMARY_LABEL: &'static str = "Genre";

    pub fn canonical_reference(&self) -> CanonicalReference {
        CanonicalReference::Book(self.id)
    }

    /// Names of the first three genres, as stored, joined for list display.
    pub fn display_genre_summary(&self) -> String {
        self.genres
            .iter()
            .take(GENRE_SUMMARY_LIMIT)
            .map(|genre| genre.name.as_str())
            .collect::<Vec<&str>>()
            .join(GENRE_SUMMARY_SEPARATOR)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A borrowable copy of a book.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i64>,
    /// Title of the referenced book, filled when read from the store.
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    /// Opaque user id from the external identity provider.
    pub borrower: Option<String>,
    pub status: LoanStatus,
}

impl BookInstance {
    pub const PERMISSIONS: &'static [Permission] = &[CAN_MARK_RETURNED];

    pub fn new(book_id: Option<i64>, imprint: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            book_title: None,
            imprint: imprint.into(),
            due_back: None,
            borrower: None,
            status: LoanStatus::default(),
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Local::now().date_naive())
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        matches!(self.due_back, Some(due_back) if today > due_back)
    }
}

impl fmt::Display for BookInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.book_title.as_deref() {
            Some(title) => write!(f, "{} ({})", self.id, title),
            None => write!(f, "{} (no book)", self.id),
        }
    }
}

/// Ascending by due date; copies without one go last. Stable for equal dates.
pub fn sort_by_due_back(instances: &mut [BookInstance]) {
    instances.sort_by_key(|instance| (instance.due_back.is_none(), instance.due_back));
}
