use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::constraints::{self, INSTANCE_IMPRINT};
use crate::error::{CatalogError, Result};
use crate::models::BookInstance;
use crate::status::LoanStatus;

const INSTANCE_SELECT: &str =
    "SELECT i.id, i.book_id, b.title, i.imprint, i.due_back, i.borrower, i.status
     FROM book_instances i
     LEFT JOIN books b ON b.id = i.book_id";

// Copies without a due date sort last.
const INSTANCE_ORDER: &str = "ORDER BY i.due_back IS NULL, i.due_back";

fn instance_from_row(row: &Row<'_>) -> rusqlite::Result<BookInstance> {
    let raw_id: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?;
    Ok(BookInstance {
        id,
        book_id: row.get(1)?,
        book_title: row.get(2)?,
        imprint: row.get(3)?,
        due_back: row.get(4)?,
        borrower: row.get(5)?,
        status: row.get(6)?,
    })
}

fn query_instances(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<BookInstance>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, instance_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<BookInstance>>>()?)
}

/// Stores a copy built with [`BookInstance::new`] and returns it with its book title filled.
pub fn create_instance(conn: &Connection, instance: &BookInstance) -> Result<BookInstance> {
    constraints::check(&INSTANCE_IMPRINT, &instance.imprint)?;
    conn.execute(
        "INSERT INTO book_instances (id, book_id, imprint, due_back, borrower, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            instance.id.to_string(),
            instance.book_id,
            instance.imprint,
            instance.due_back,
            instance.borrower,
            instance.status
        ],
    )?;
    log::info!("created book instance {}", instance.id);
    get_instance(conn, &instance.id)
}

pub fn get_instance(conn: &Connection, id: &Uuid) -> Result<BookInstance> {
    conn.query_row(
        &format!("{} WHERE i.id = ?1", INSTANCE_SELECT),
        params![id.to_string()],
        instance_from_row,
    )
    .optional()?
    .ok_or_else(|| CatalogError::not_found("book instance", id))
}

pub fn list_instances(conn: &Connection) -> Result<Vec<BookInstance>> {
    query_instances(
        conn,
        &format!("{} {}", INSTANCE_SELECT, INSTANCE_ORDER),
        [],
    )
}

pub fn list_instances_for_book(conn: &Connection, book_id: i64) -> Result<Vec<BookInstance>> {
    query_instances(
        conn,
        &format!("{} WHERE i.book_id = ?1 {}", INSTANCE_SELECT, INSTANCE_ORDER),
        params![book_id],
    )
}

pub fn list_instances_for_borrower(conn: &Connection, borrower: &str) -> Result<Vec<BookInstance>> {
    query_instances(
        conn,
        &format!("{} WHERE i.borrower = ?1 {}", INSTANCE_SELECT, INSTANCE_ORDER),
        params![borrower],
    )
}

/// Writes every mutable field. `book_title` is ignored.
pub fn update_instance(conn: &Connection, instance: &BookInstance) -> Result<()> {
    constraints::check(&INSTANCE_IMPRINT, &instance.imprint)?;
    let updated = conn.execute(
        "UPDATE book_instances
         SET book_id = ?1, imprint = ?2, due_back = ?3, borrower = ?4, status = ?5
         WHERE id = ?6",
        params![
            instance.book_id,
            instance.imprint,
            instance.due_back,
            instance.borrower,
            instance.status,
            instance.id.to_string()
        ],
    )?;
    if updated == 0 {
        return Err(CatalogError::not_found("book instance", instance.id));
    }
    Ok(())
}

/// Any status may follow any other. Callers check `can_mark_returned` themselves.
pub fn set_instance_status(conn: &Connection, id: &Uuid, status: LoanStatus) -> Result<()> {
    let updated = conn.execute(
        "UPDATE book_instances SET status = ?1 WHERE id = ?2",
        params![status, id.to_string()],
    )?;
    if updated == 0 {
        return Err(CatalogError::not_found("book instance", id));
    }
    log::info!("book instance {} status set to {}", id, status.label());
    Ok(())
}

pub fn delete_instance(conn: &Connection, id: &Uuid) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM book_instances WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(CatalogError::not_found("book instance", id));
    }
    log::info!("deleted book instance {}", id);
    Ok(())
}

/// Called when the identity provider removes a user. Returns the number of copies touched.
pub fn clear_borrower(conn: &Connection, borrower: &str) -> Result<usize> {
    let cleared = conn.execute(
        "UPDATE book_instances SET borrower = NULL WHERE borrower = ?1",
        params![borrower],
    )?;
    log::debug!("borrower {} cleared from {} copies", borrower, cleared);
    Ok(cleared)
}
