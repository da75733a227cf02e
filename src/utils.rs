use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::error::{BillError, Result};

pub const APP_DIR_NAME: &str = "BillTrack";
pub const DB_FILE_NAME: &str = "billtrack.db";

/// Per-user application directory, created on demand.
pub fn app_data_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir()
        .ok_or_else(|| BillError::Configuration("Could not find data directory".to_string()))?;
    let app_dir = base_dir.join(APP_DIR_NAME);
    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

pub fn get_db_path(config: &AppConfig) -> Result<PathBuf> {
    match &config.database_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(app_data_dir()?.join(DB_FILE_NAME)),
    }
}

pub fn open_database(config: &AppConfig) -> Result<Connection> {
    let path = get_db_path(config)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(&path)?;
    init_db(&conn)?;
    log::info!("Opened bill database at {}", path.display());
    Ok(conn)
}

/// Creates the schema if missing and migrates databases written by older versions.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS bills (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL DEFAULT 'USD',
            billing_interval TEXT NOT NULL DEFAULT 'monthly',
            next_billing_date TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS payment_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bill_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            billing_date TEXT NOT NULL,
            paid_at TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (bill_id) REFERENCES bills (id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_payment_history_bill ON payment_history (bill_id);",
    )?;

    // Columns added after the first release.
    let migrations: [(&str, &str); 4] = [
        ("reminder_schema", "ALTER TABLE bills ADD COLUMN reminder_schema TEXT"),
        ("category_group", "ALTER TABLE bills ADD COLUMN category_group TEXT"),
        ("notes", "ALTER TABLE bills ADD COLUMN notes TEXT"),
        ("active", "ALTER TABLE bills ADD COLUMN active BOOLEAN NOT NULL DEFAULT 1"),
    ];
    let existing = table_columns(conn, "bills")?;
    for (column, statement) in migrations {
        if !existing.iter().any(|c| c == column) {
            conn.execute(statement, [])?;
            log::info!("Migrated bills table: added {}", column);
        }
    }
    Ok(())
}

pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(columns)
}

/// Deletes the database file and recreates an empty schema.
pub fn reset_database(path: &Path) -> Result<Connection> {
    // Missing file is fine.
    let _ = fs::remove_file(path);
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    log::info!("Reset bill database at {}", path.display());
    Ok(conn)
}
