pub mod config;
pub mod constraints;
pub mod db;
pub mod error;
pub mod models;
pub mod permissions;
pub mod status;
pub mod store;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use models::{sort_by_due_back, Author, Book, BookInstance, CanonicalReference, Genre, Language};
pub use permissions::{Permission, CAN_MARK_RETURNED};
pub use status::{LoanStatus, LOAN_STATUS};
