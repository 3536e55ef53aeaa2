use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// Availability of a single book copy.
///
/// Stored as a one-letter code. Any status may be set from any other; there is
/// no transition guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

/// Code and label for every status, in display order.
pub const LOAN_STATUS: [(LoanStatus, &str, &str); 4] = [
    (LoanStatus::Maintenance, "m", "Maintenance"),
    (LoanStatus::OnLoan, "o", "On loan"),
    (LoanStatus::Available, "a", "Available"),
    (LoanStatus::Reserved, "r", "Reserved"),
];

impl LoanStatus {
    pub fn code(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, CatalogError> {
        LOAN_STATUS
            .iter()
            .find(|(_, value, _)| *value == code)
            .map(|(status, _, _)| *status)
            .ok_or_else(|| CatalogError::InvalidStatus(code.to_string()))
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl ToSql for LoanStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for LoanStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        LoanStatus::from_code(code).map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}
