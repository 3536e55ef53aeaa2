use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;

use crate::constraints::{self, AUTHOR_FIRST_NAME, AUTHOR_LAST_NAME};
use crate::error::{CatalogError, Result};
use crate::models::Author;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, date_of_birth, date_of_death";

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        date_of_birth: row.get(3)?,
        date_of_death: row.get(4)?,
    })
}

fn check_names(first_name: &str, last_name: &str) -> Result<()> {
    constraints::check(&AUTHOR_FIRST_NAME, first_name)?;
    constraints::check(&AUTHOR_LAST_NAME, last_name)
}

pub fn create_author(conn: &Connection, author: &NewAuthor) -> Result<Author> {
    check_names(&author.first_name, &author.last_name)?;
    conn.execute(
        "INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            author.first_name,
            author.last_name,
            author.date_of_birth,
            author.date_of_death
        ],
    )?;
    let created = Author {
        id: conn.last_insert_rowid(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
        date_of_birth: author.date_of_birth,
        date_of_death: author.date_of_death,
    };
    log::info!("created author {} ({})", created.id, created);
    Ok(created)
}

pub fn get_author(conn: &Connection, id: i64) -> Result<Author> {
    conn.query_row(
        &format!("SELECT {} FROM authors WHERE id = ?1", AUTHOR_COLUMNS),
        params![id],
        author_from_row,
    )
    .optional()?
    .ok_or_else(|| CatalogError::not_found("author", id))
}

pub fn list_authors(conn: &Connection) -> Result<Vec<Author>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM authors ORDER BY last_name, first_name, id",
        AUTHOR_COLUMNS
    ))?;
    let rows = stmt.query_map([], author_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<Author>>>()?)
}

pub fn update_author(conn: &Connection, author: &Author) -> Result<()> {
    check_names(&author.first_name, &author.last_name)?;
    let updated = conn.execute(
        "UPDATE authors SET first_name = ?1, last_name = ?2, date_of_birth = ?3, date_of_death = ?4
         WHERE id = ?5",
        params![
            author.first_name,
            author.last_name,
            author.date_of_birth,
            author.date_of_death,
            author.id
        ],
    )?;
    if updated == 0 {
        return Err(CatalogError::not_found("author", author.id));
    }
    Ok(())
}

/// Clears `author_id` on the author's books, then deletes the author.
pub fn delete_author(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    let cleared = tx.execute(
        "UPDATE books SET author_id = NULL WHERE author_id = ?1",
        params![id],
    )?;
    let deleted = tx.execute("DELETE FROM authors WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(CatalogError::not_found("author", id));
    }
    tx.commit()?;
    log::debug!("author {} cleared from {} books", id, cleared);
    log::info!("deleted author {}", id);
    Ok(())
}
