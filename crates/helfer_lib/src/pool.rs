//! Contains the type representing the database of the tool.

use sea_orm::{ConnectOptions, DbConn};

/// Represents the database of the tool.
#[derive(Clone)]
pub struct Database {
    /// The SQL database connection pool.
    pub sql_conn: DbConn,
}

impl Database {
    /// Returns the database from the URL of the SQL database.
    ///
    /// An in-memory SQLite database only lives as long as its connection, so the pool
    /// is restricted to a single connection in that case.
    pub async fn from_db_url(db_url: String) -> Result<Self, sea_orm::DbErr> {
        let in_memory = db_url.starts_with("sqlite::memory:");
        let mut options = ConnectOptions::new(db_url);
        if in_memory {
            options.max_connections(1).min_connections(1);
        }
        options.sqlx_logging(false);

        let sql_conn = sea_orm::Database::connect(options).await?;
        Ok(Self { sql_conn })
    }
}

impl From<DbConn> for Database {
    fn from(sql_conn: DbConn) -> Self {
        Self { sql_conn }
    }
}
