//! Field constraints the store checks before writing a row.
//!
//! The same limits appear as `CHECK` clauses in the schema migration.

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Copy)]
pub struct FieldConstraint {
    pub field: &'static str,
    pub label: &'static str,
    pub max_len: usize,
    pub required: bool,
    pub help: &'static str,
}

pub const GENRE_NAME: FieldConstraint = FieldConstraint {
    field: "genre.name",
    label: "Name",
    max_len: 200,
    required: true,
    help: "Enter a book genre (e.g. Science Fiction, Military History etc.)",
};

pub const LANGUAGE_NAME: FieldConstraint = FieldConstraint {
    field: "language.name",
    label: "Name",
    max_len: 200,
    required: true,
    help: "Enter the book's natural language (e.g. English, Spanish, Japanese etc.)",
};

pub const AUTHOR_FIRST_NAME: FieldConstraint = FieldConstraint {
    field: "author.first_name",
    label: "First name",
    max_len: 100,
    required: true,
    help: "",
};

pub const AUTHOR_LAST_NAME: FieldConstraint = FieldConstraint {
    field: "author.last_name",
    label: "Last name",
    max_len: 100,
    required: true,
    help: "",
};

pub const BOOK_TITLE: FieldConstraint = FieldConstraint {
    field: "book.title",
    label: "Title",
    max_len: 200,
    required: true,
    help: "",
};

pub const BOOK_SUMMARY: FieldConstraint = FieldConstraint {
    field: "book.summary",
    label: "Summary",
    max_len: 1000,
    required: true,
    help: "Enter a brief description of the book",
};

// Nominally 13 characters; shorter values are accepted.
pub const BOOK_ISBN: FieldConstraint = FieldConstraint {
    field: "book.isbn",
    label: "ISBN",
    max_len: 13,
    required: true,
    help: "13 Character ISBN number",
};

pub const INSTANCE_IMPRINT: FieldConstraint = FieldConstraint {
    field: "book_instance.imprint",
    label: "Imprint",
    max_len: 200,
    required: true,
    help: "",
};

/// Length is counted in characters, not bytes.
pub fn check(constraint: &FieldConstraint, value: &str) -> Result<()> {
    if constraint.required && value.trim().is_empty() {
        return Err(CatalogError::Required {
            field: constraint.field,
        });
    }
    let actual = value.chars().count();
    if actual > constraint.max_len {
        return Err(CatalogError::TooLong {
            field: constraint.field,
            max: constraint.max_len,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check, BOOK_ISBN, BOOK_SUMMARY, GENRE_NAME, INSTANCE_IMPRINT, LANGUAGE_NAME};
    use crate::error::CatalogError;

    #[test]
    fn accepts_value_at_limit() {
        let name = "x".repeat(200);
        assert!(check(&GENRE_NAME, &name).is_ok());
    }

    #[test]
    fn rejects_value_over_limit() {
        let summary = "s".repeat(1001);
        match check(&BOOK_SUMMARY, &summary) {
            Err(CatalogError::TooLong { field, max, actual }) => {
                assert_eq!(field, "book.summary");
                assert_eq!(max, 1000);
                assert_eq!(actual, 1001);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(check(&BOOK_ISBN, "ééééééééééééé").is_ok());
    }

    #[test]
    fn rejects_blank_required_value() {
        assert!(matches!(
            check(&GENRE_NAME, "   "),
            Err(CatalogError::Required { field: "genre.name" })
        ));
        assert!(matches!(
            check(&BOOK_ISBN, ""),
            Err(CatalogError::Required { field: "book.isbn" })
        ));
        assert!(matches!(
            check(&INSTANCE_IMPRINT, ""),
            Err(CatalogError::Required { .. })
        ));
    }

    #[test]
    fn form_metadata_matches_admin_labels() {
        assert_eq!(BOOK_ISBN.label, "ISBN");
        assert_eq!(BOOK_ISBN.help, "13 Character ISBN number");
        assert_eq!(BOOK_SUMMARY.help, "Enter a brief description of the book");
        assert_eq!(GENRE_NAME.label, "Name");
        assert!(GENRE_NAME.help.starts_with("Enter a book genre"));
        assert!(LANGUAGE_NAME.help.contains("natural language"));
    }
}
