use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, PoolConfig, RecyclingMethod, Runtime, SslMode};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Row;
use tracing::{error, info, warn};

use crate::config::DatabaseConfig;
use crate::error::ApiError;
use crate::models::User;
use crate::store::UserStore;

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

/// PostgreSQL-backed `UserStore`.
///
/// Expects an existing `users` table:
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) UNIQUE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL
/// );
/// ```
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Builds the connection pool and checks that a connection can be made.
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    /// Assembles the deadpool `Config` from `DatabaseConfig` and creates the pool.
    ///
    /// The SSL mode string is mapped onto `SslMode`; a `native-tls` connector is
    /// always installed so `prefer` and `require` can negotiate TLS. The
    /// connection timeout bounds both connecting and waiting for a free slot.
    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);
        pg_config.connect_timeout = Some(config.connection_timeout);

        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => SslMode::Disable,
            "prefer" => SslMode::Prefer,
            "require" => SslMode::Require,
            other => {
                warn!("Unknown SSL mode '{}', defaulting to 'require'", other);
                SslMode::Require
            }
        });

        pg_config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder().build().map_err(|e| {
            error!("Failed to create TLS connector: {}", e);
            ApiError::Database(format!("TLS connector creation failed: {}", e))
        })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls).map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            ApiError::Database(format!("Connection pool creation failed: {}", e))
        })
    }

    /// Borrows a connection from the pool.
    /// Pool timeouts and closure come back as `ApiError::Unavailable`.
    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Runs `SELECT 1` on a pooled connection.
    /// Called from `new` so a bad `DATABASE_URL` fails at startup, not on the first request.
    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database connection test failed: {}", e);
            ApiError::from(e)
        })?;

        info!("Database connection test successful");
        Ok(())
    }

    /// Closes the pool; pending and future checkouts fail with `Unavailable`.
    pub fn close(&self) {
        self.pool.close();
        info!("Database connection pool closed");
    }
}

/// Maps a row selected with `USER_COLUMNS` onto `User`, column order included.
fn user_from_row(row: &Row) -> User {
    User {
        id: row.get(0),
        name: row.get(1),
        email: row.get(2),
        created_at: row.get(3),
        updated_at: row.get(4),
    }
}

#[async_trait]
impl UserStore for Database {
    /// All rows, oldest first; `id` breaks ties between equal timestamps.
    async fn find_all_users(&self) -> Result<Vec<User>, ApiError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM users ORDER BY created_at ASC, id ASC", USER_COLUMNS);

        let rows = client.query(query.as_str(), &[]).await.map_err(ApiError::from)?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Inserts the prepared record and returns it as stored via `RETURNING`.
    /// A duplicate email trips the `UNIQUE` constraint and maps to `ApiError::Conflict`.
    async fn create_user(&self, user: User) -> Result<User, ApiError> {
        let client = self.get_connection().await?;
        let query = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = USER_COLUMNS
        );

        let row = client
            .query_one(
                query.as_str(),
                &[&user.id, &user.name, &user.email, &user.created_at, &user.updated_at],
            )
            .await
            .map_err(ApiError::from)?;

        let created = user_from_row(&row);
        info!("Inserted user with id: {}", created.id);
        Ok(created)
    }
}
