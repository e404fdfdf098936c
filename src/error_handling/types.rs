//! Error type definitions.

use thiserror::Error;

/// Error types for route geometry construction.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// The route has no point with both a latitude and a longitude.
    ///
    /// Individual unusable points are skipped; this fires only when none
    /// remain, in which case enrichment for the route is a no-op.
    #[error("route has no usable GPS points")]
    InvalidGeometry,
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}
