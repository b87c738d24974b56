use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, SqlxSqliteConnector, Statement};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Tables owned by this backend, created on startup when missing.
///
/// Money columns are TEXT decimal strings and are parsed into `Decimal`
/// on read, so sums never go through floating point.
const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_product",
        r#"
        CREATE TABLE IF NOT EXISTS a001_product (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            product_type TEXT,
            material TEXT,
            color TEXT,
            quantity INTEGER NOT NULL DEFAULT 1,
            start_date TEXT,
            estimated_date TEXT,
            delivery_date TEXT,
            price TEXT NOT NULL DEFAULT '0',
            notes TEXT,
            owner_id TEXT,
            created_at TEXT,
            updated_at TEXT
        );
        "#,
    ),
    (
        "a002_payment",
        r#"
        CREATE TABLE IF NOT EXISTS a002_payment (
            id TEXT PRIMARY KEY NOT NULL,
            product_id TEXT NOT NULL,
            payment_type TEXT,
            amount TEXT NOT NULL,
            payment_date TEXT NOT NULL,
            receipt_path TEXT,
            created_at TEXT
        );
        "#,
    ),
    (
        "a003_cost",
        r#"
        CREATE TABLE IF NOT EXISTS a003_cost (
            id TEXT PRIMARY KEY NOT NULL,
            cost_type TEXT,
            date TEXT NOT NULL,
            amount TEXT NOT NULL,
            frequency TEXT NOT NULL DEFAULT 'ONE_TIME',
            reason TEXT NOT NULL DEFAULT '',
            generated_from TEXT,
            created_at TEXT
        );
        "#,
    ),
    (
        "sys_users",
        r#"
        CREATE TABLE IF NOT EXISTS sys_users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_admin INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            last_login_at TEXT
        );
        "#,
    ),
    (
        "sys_settings",
        r#"
        CREATE TABLE IF NOT EXISTS sys_settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            description TEXT,
            created_at TEXT,
            updated_at TEXT
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_a001_product_delivery_date ON a001_product (delivery_date);",
    "CREATE INDEX IF NOT EXISTS idx_a002_payment_payment_date ON a002_payment (payment_date);",
    "CREATE INDEX IF NOT EXISTS idx_a003_cost_date ON a003_cost (date);",
    "CREATE INDEX IF NOT EXISTS idx_a003_cost_generated_from ON a003_cost (generated_from, date);",
];

pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!("Opening database: {}", db_file.display());
    let options = SqliteConnectOptions::new()
        .filename(db_file)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;
    let conn = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

    bootstrap_schema(&conn).await?;

    if DB_CONN.set(conn).is_err() {
        tracing::warn!("Database connection already initialized");
    }
    Ok(())
}

/// Create missing tables and indexes
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (table, sql) in SCHEMA {
        tracing::debug!("Ensuring table {}", table);
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    for sql in INDEXES {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    tracing::info!("Database schema ready ({} tables)", SCHEMA.len());
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Fresh in-memory database with the schema applied
#[cfg(test)]
pub async fn memory_connection() -> DatabaseConnection {
    // A single pooled connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should open");
    let conn = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
    bootstrap_schema(&conn).await.expect("schema should apply");
    conn
}
