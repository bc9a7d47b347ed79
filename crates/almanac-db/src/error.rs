use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Pool build error: {0}")]
    PoolBuildError(#[from] diesel_async::pooled_connection::PoolError),

    #[error("Connection error: {0}")]
    ConnectionError(#[from] diesel::ConnectionError),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
