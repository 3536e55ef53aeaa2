//! SQLite-backed storage for catalog entities.
//!
//! Deleting a referenced row never cascades: the store first clears the
//! referencing foreign keys to NULL, inside the same transaction, and only then
//! removes the row. The schema declares plain foreign keys, so a raw `DELETE`
//! of a referenced row is rejected.

pub mod authors;
pub mod books;
pub mod instances;
pub mod taxonomy;

pub use authors::{create_author, delete_author, get_author, list_authors, update_author, NewAuthor};
pub use books::{
    create_book, delete_book, get_book, list_books, list_books_by_author, set_book_genres,
    update_book, NewBook,
};
pub use instances::{
    clear_borrower, create_instance, delete_instance, get_instance, list_instances,
    list_instances_for_book, list_instances_for_borrower, set_instance_status, update_instance,
};
pub use taxonomy::{
    create_genre, create_language, delete_genre, delete_language, get_genre, get_language,
    list_genres, list_languages, rename_genre, rename_language,
};
