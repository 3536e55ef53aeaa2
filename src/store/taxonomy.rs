use rusqlite::{params, Connection, OptionalExtension};

use crate::constraints::{self, GENRE_NAME, LANGUAGE_NAME};
use crate::error::{CatalogError, Result};
use crate::models::{Genre, Language};

pub fn create_genre(conn: &Connection, name: &str) -> Result<Genre> {
    constraints::check(&GENRE_NAME, name)?;
    conn.execute("INSERT INTO genres (name) VALUES (?1)", params![name])?;
    let id = conn.last_insert_rowid();
    log::info!("created genre {} ({})", id, name);
    Ok(Genre {
        id,
        name: name.to_string(),
    })
}

pub fn get_genre(conn: &Connection, id: i64) -> Result<Genre> {
    conn.query_row(
        "SELECT id, name FROM genres WHERE id = ?1",
        params![id],
        |row| {
            Ok(Genre {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| CatalogError::not_found("genre", id))
}

pub fn list_genres(conn: &Connection) -> Result<Vec<Genre>> {
    let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY name, id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Genre {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<Genre>>>()?)
}

pub fn rename_genre(conn: &Connection, id: i64, name: &str) -> Result<Genre> {
    constraints::check(&GENRE_NAME, name)?;
    let updated = conn.execute(
        "UPDATE genres SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    if updated == 0 {
        return Err(CatalogError::not_found("genre", id));
    }
    Ok(Genre {
        id,
        name: name.to_string(),
    })
}

/// Removes the genre and its book links. Books themselves are kept.
pub fn delete_genre(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    let unlinked = tx.execute("DELETE FROM book_genres WHERE genre_id = ?1", params![id])?;
    let deleted = tx.execute("DELETE FROM genres WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(CatalogError::not_found("genre", id));
    }
    tx.commit()?;
    log::debug!("genre {} unlinked from {} books", id, unlinked);
    log::info!("deleted genre {}", id);
    Ok(())
}

pub fn create_language(conn: &Connection, name: &str) -> Result<Language> {
    constraints::check(&LANGUAGE_NAME, name)?;
    conn.execute("INSERT INTO languages (name) VALUES (?1)", params![name])?;
    let id = conn.last_insert_rowid();
    log::info!("created language {} ({})", id, name);
    Ok(Language {
        id,
        name: name.to_string(),
    })
}

pub fn get_language(conn: &Connection, id: i64) -> Result<Language> {
    conn.query_row(
        "SELECT id, name FROM languages WHERE id = ?1",
        params![id],
        |row| {
            Ok(Language {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| CatalogError::not_found("language", id))
}

pub fn list_languages(conn: &Connection) -> Result<Vec<Language>> {
    let mut stmt = conn.prepare("SELECT id, name FROM languages ORDER BY name, id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Language {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<Language>>>()?)
}

pub fn rename_language(conn: &Connection, id: i64, name: &str) -> Result<Language> {
    constraints::check(&LANGUAGE_NAME, name)?;
    let updated = conn.execute(
        "UPDATE languages SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    if updated == 0 {
        return Err(CatalogError::not_found("language", id));
    }
    Ok(Language {
        id,
        name: name.to_string(),
    })
}

/// Clears `language_id` on every book in this language, then deletes it.
pub fn delete_language(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    let cleared = tx.execute(
        "UPDATE books SET language_id = NULL WHERE language_id = ?1",
        params![id],
    )?;
    let deleted = tx.execute("DELETE FROM languages WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(CatalogError::not_found("language", id));
    }
    tx.commit()?;
    log::debug!("language {} cleared from {} books", id, cleared);
    log::info!("deleted language {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::store::books::{create_book, get_book, sample_book, NewBook};

    #[test]
    fn genre_crud() {
        let mut conn = open_in_memory().unwrap();
        let drama = create_genre(&conn, "Drama").unwrap();
        create_genre(&conn, "Comedy").unwrap();

        assert_eq!(get_genre(&conn, drama.id).unwrap().name, "Drama");
        let names: Vec<String> = list_genres(&conn)
            .unwrap()
            .into_iter()
            .map(|genre| genre.name)
            .collect();
        assert_eq!(names, vec!["Comedy", "Drama"]);

        rename_genre(&conn, drama.id, "Tragedy").unwrap();
        assert_eq!(get_genre(&conn, drama.id).unwrap().to_string(), "Tragedy");

        delete_genre(&mut conn, drama.id).unwrap();
        assert!(matches!(
            get_genre(&conn, drama.id),
            Err(CatalogError::NotFound { entity: "genre", .. })
        ));
    }

    #[test]
    fn rejects_empty_and_long_names() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(
            create_genre(&conn, ""),
            Err(CatalogError::Required { .. })
        ));
        assert!(matches!(
            create_language(&conn, &"x".repeat(201)),
            Err(CatalogError::TooLong { max: 200, .. })
        ));
        assert!(list_genres(&conn).unwrap().is_empty());
    }

    #[test]
    fn deleting_genre_keeps_books() {
        let mut conn = open_in_memory().unwrap();
        let fantasy = create_genre(&conn, "Fantasy").unwrap();
        let horror = create_genre(&conn, "Horror").unwrap();
        let book = create_book(
            &mut conn,
            &NewBook {
                title: "Dracula".to_string(),
                genre_ids: vec![fantasy.id, horror.id],
                ..sample_book()
            },
        )
        .unwrap();

        delete_genre(&mut conn, fantasy.id).unwrap();

        let book = get_book(&conn, book.id).unwrap();
        assert_eq!(book.genres, vec![horror]);
    }

    #[test]
    fn deleting_language_clears_book_reference() {
        let mut conn = open_in_memory().unwrap();
        let french = create_language(&conn, "French").unwrap();
        let book = create_book(
            &mut conn,
            &NewBook {
                title: "Candide".to_string(),
                language_id: Some(french.id),
                ..sample_book()
            },
        )
        .unwrap();

        delete_language(&mut conn, french.id).unwrap();

        let book = get_book(&conn, book.id).unwrap();
        assert_eq!(book.language_id, None);
        assert!(get_language(&conn, french.id).is_err());
    }

    #[test]
    fn deleting_missing_language_is_not_found() {
        let mut conn = open_in_memory().unwrap();
        assert!(matches!(
            delete_language(&mut conn, 42),
            Err(CatalogError::NotFound { .. })
        ));
    }
}
