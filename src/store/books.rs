use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;

use crate::constraints::{self, BOOK_ISBN, BOOK_SUMMARY, BOOK_TITLE};
use crate::error::{CatalogError, Result};
use crate::models::{Book, Genre};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i64>,
    pub language_id: Option<i64>,
    /// Stored in this order; duplicates are dropped.
    pub genre_ids: Vec<i64>,
}

const BOOK_COLUMNS: &str = "id, title, summary, isbn, author_id, language_id";

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        isbn: row.get(3)?,
        author_id: row.get(4)?,
        language_id: row.get(5)?,
        genres: vec![],
    })
}

fn check_fields(title: &str, summary: &str, isbn: &str) -> Result<()> {
    constraints::check(&BOOK_TITLE, title)?;
    constraints::check(&BOOK_SUMMARY, summary)?;
    constraints::check(&BOOK_ISBN, isbn)
}

fn write_genres(conn: &Connection, book_id: i64, genre_ids: &[i64]) -> Result<()> {
    conn.execute("DELETE FROM book_genres WHERE book_id = ?1", params![book_id])?;
    let mut seen: Vec<i64> = Vec::with_capacity(genre_ids.len());
    for genre_id in genre_ids {
        if seen.contains(genre_id) {
            continue;
        }
        conn.execute(
            "INSERT INTO book_genres (book_id, genre_id, position) VALUES (?1, ?2, ?3)",
            params![book_id, genre_id, seen.len() as i64],
        )?;
        seen.push(*genre_id);
    }
    Ok(())
}

fn load_genres(conn: &Connection, book_id: i64) -> Result<Vec<Genre>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name FROM book_genres bg
         JOIN genres g ON g.id = bg.genre_id
         WHERE bg.book_id = ?1
         ORDER BY bg.position",
    )?;
    let rows = stmt.query_map(params![book_id], |row| {
        Ok(Genre {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<Genre>>>()?)
}

pub fn create_book(conn: &mut Connection, book: &NewBook) -> Result<Book> {
    check_fields(&book.title, &book.summary, &book.isbn)?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO books (title, summary, isbn, author_id, language_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            book.title,
            book.summary,
            book.isbn,
            book.author_id,
            book.language_id
        ],
    )?;
    let id = tx.last_insert_rowid();
    write_genres(&tx, id, &book.genre_ids)?;
    let created = Book {
        genres: load_genres(&tx, id)?,
        ..get_book_row(&tx, id)?
    };
    tx.commit()?;
    log::info!("created book {} ({})", id, created.title);
    Ok(created)
}

fn get_book_row(conn: &Connection, id: i64) -> Result<Book> {
    conn.query_row(
        &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS),
        params![id],
        book_from_row,
    )
    .optional()?
    .ok_or_else(|| CatalogError::not_found("book", id))
}

pub fn get_book(conn: &Connection, id: i64) -> Result<Book> {
    let mut book = get_book_row(conn, id)?;
    book.genres = load_genres(conn, id)?;
    Ok(book)
}

pub fn list_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM books ORDER BY title, id",
        BOOK_COLUMNS
    ))?;
    let mut books = stmt
        .query_map([], book_from_row)?
        .collect::<rusqlite::Result<Vec<Book>>>()?;
    for book in books.iter_mut() {
        book.genres = load_genres(conn, book.id)?;
    }
    Ok(books)
}

pub fn list_books_by_author(conn: &Connection, author_id: i64) -> Result<Vec<Book>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM books WHERE author_id = ?1 ORDER BY title, id",
        BOOK_COLUMNS
    ))?;
    let mut books = stmt
        .query_map(params![author_id], book_from_row)?
        .collect::<rusqlite::Result<Vec<Book>>>()?;
    for book in books.iter_mut() {
        book.genres = load_genres(conn, book.id)?;
    }
    Ok(books)
}

/// Writes the scalar fields and references. Genres are left alone; see [`set_book_genres`].
pub fn update_book(conn: &Connection, book: &Book) -> Result<()> {
    check_fields(&book.title, &book.summary, &book.isbn)?;
    let updated = conn.execute(
        "UPDATE books SET title = ?1, summary = ?2, isbn = ?3, author_id = ?4, language_id = ?5
         WHERE id = ?6",
        params![
            book.title,
            book.summary,
            book.isbn,
            book.author_id,
            book.language_id,
            book.id
        ],
    )?;
    if updated == 0 {
        return Err(CatalogError::not_found("book", book.id));
    }
    Ok(())
}

/// Replaces the book's genres, keeping the given order.
pub fn set_book_genres(
    conn: &mut Connection,
    book_id: i64,
    genre_ids: &[i64],
) -> Result<Vec<Genre>> {
    let tx = conn.transaction()?;
    get_book_row(&tx, book_id)?;
    write_genres(&tx, book_id, genre_ids)?;
    let genres = load_genres(&tx, book_id)?;
    tx.commit()?;
    Ok(genres)
}

/// Clears `book_id` on the book's copies and drops its genre links, then deletes it.
pub fn delete_book(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    let cleared = tx.execute(
        "UPDATE book_instances SET book_id = NULL WHERE book_id = ?1",
        params![id],
    )?;
    tx.execute("DELETE FROM book_genres WHERE book_id = ?1", params![id])?;
    let deleted = tx.execute("DELETE FROM books WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(CatalogError::not_found("book", id));
    }
    tx.commit()?;
    log::debug!("book {} cleared from {} copies", id, cleared);
    log::info!("deleted book {}", id);
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_book() -> NewBook {
    NewBook {
        title: "Sample".to_string(),
        summary: "A book used in tests.".to_string(),
        isbn: "9780000000002".to_string(),
        ..NewBook::default()
    }
}
