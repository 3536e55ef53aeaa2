use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{field} is longer than {max} characters ({actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Unknown loan status code: {0}")]
    InvalidStatus(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CatalogError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
