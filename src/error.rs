//! Errors raised by the record stores and the shop layer on top of them.
//!
//! Two families share one enum:
//! - Business outcomes (unknown keyboard or account, duplicate create,
//!   bad credentials)
//! - Technical failures (backing file I/O, JSON/CSV encoding, malformed
//!   price input)
//!
//! Technical failures are propagated verbatim; stores never roll back the
//! in-memory state when a snapshot write fails.

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("backing file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("backing file JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid price {input:?}: {source}")]
    InvalidPrice {
        input: String,
        #[source]
        source: ParseIntError,
    },

    #[error("keyboard {0} not found")]
    KeyboardNotFound(u32),

    #[error("account {0:?} not found")]
    AccountNotFound(String),

    #[error("an equal keyboard already exists")]
    KeyboardConflict,

    #[error("no keyboard ids left to assign")]
    IdsExhausted,

    #[error("account {0:?} already exists")]
    AccountConflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
