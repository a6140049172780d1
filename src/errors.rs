use miette::Diagnostic;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failure converting a structured value to or from its column representation.
#[derive(Debug, Error, Diagnostic)]
pub enum CodecError {
    #[error("failed to encode column value: {0}")]
    #[diagnostic(code(perihelion::codec::encode))]
    Encode(#[source] serde_json::Error),

    /// The stored column is corrupted; the owning row cannot be trusted.
    #[error("failed to decode column value: {0}")]
    #[diagnostic(code(perihelion::codec::decode))]
    Decode(#[source] serde_json::Error),
}

/// A stored visibility outside `shown`, `hidden` and `permission`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("unknown visibility '{0}'")]
#[diagnostic(code(perihelion::visibility))]
pub struct UnknownVisibility(pub String);

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("Config error: {0}")]
    #[diagnostic(code(perihelion::config))]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    #[diagnostic(code(perihelion::db))]
    Db(DbErr),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codec(#[from] CodecError),

    #[error("Corrupted row: {0}")]
    #[diagnostic(code(perihelion::decode))]
    Decode(String),

    #[error("Constraint violation: {0}")]
    #[diagnostic(code(perihelion::constraint))]
    Constraint(String),

    #[error("Invalid state: {0}")]
    #[diagnostic(code(perihelion::invalid_state))]
    InvalidState(String),

    #[error("Not found: {0}")]
    #[diagnostic(code(perihelion::not_found))]
    NotFound(String),

    #[error("{0}")]
    #[diagnostic(code(perihelion::other))]
    Other(String),
}

impl From<UnknownVisibility> for StoreError {
    fn from(value: UnknownVisibility) -> Self {
        StoreError::Decode(value.to_string())
    }
}

impl From<DbErr> for StoreError {
    fn from(value: DbErr) -> Self {
        match value.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => StoreError::Constraint(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => StoreError::Constraint(msg),
            _ => StoreError::Db(value),
        }
    }
}
