use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, DatabaseName};
use serde::Serialize;

use crate::error::{BillError, Result};

const BACKUP_PREFIX: &str = "billtrack_backup_";
const REQUIRED_TABLES: [&str; 2] = ["bills", "payment_history"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub path: String,
    pub timestamp: String,
    pub file_size: u64,
}

fn verify_tables(conn: &Connection) -> Result<()> {
    for table in REQUIRED_TABLES.iter() {
        if conn.prepare(&format!("SELECT 1 FROM {} LIMIT 1", table)).is_err() {
            return Err(BillError::Database(format!("Database is missing {} table", table)));
        }
    }
    Ok(())
}

/// Online backup of the live database into `backup_dir`, keeping only the newest `keep_count` backups.
pub fn backup_database(conn: &Connection, backup_dir: &Path, keep_count: usize) -> Result<BackupInfo> {
    verify_tables(conn)?;
    fs::create_dir_all(backup_dir)?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S%3f").to_string();
    let backup_path = backup_dir.join(format!("{}{}.db", BACKUP_PREFIX, timestamp));
    conn.backup(DatabaseName::Main, &backup_path, None)?;

    let file_size = fs::metadata(&backup_path)?.len();
    log::info!("Backed up database to {} ({} bytes)", backup_path.display(), file_size);
    cleanup_old_backups(backup_dir, keep_count)?;

    Ok(BackupInfo {
        path: backup_path.to_string_lossy().to_string(),
        timestamp,
        file_size,
    })
}

/// Backups in `backup_dir`, oldest first.
pub fn list_backups(backup_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut backups = Vec::new();
    for entry in fs::read_dir(backup_dir)? {
        let path = entry?.path();
        let is_backup = path.extension().map_or(false, |ext| ext == "db")
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.starts_with(BACKUP_PREFIX));
        if is_backup {
            backups.push(path);
        }
    }
    // Timestamped names sort chronologically.
    backups.sort();
    Ok(backups)
}

fn cleanup_old_backups(backup_dir: &Path, keep_count: usize) -> Result<()> {
    let backups = list_backups(backup_dir)?;
    if backups.len() > keep_count {
        for path in backups.iter().take(backups.len() - keep_count) {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Failed to remove old backup {}: {}", path.display(), e);
            }
        }
    }
    Ok(())
}

/// Replaces the live database with a backup after checking it holds bill data.
pub fn restore_database(conn: &mut Connection, file_path: &Path) -> Result<()> {
    let candidate = Connection::open(file_path)?;
    verify_tables(&candidate)?;
    drop(candidate);

    conn.restore(DatabaseName::Main, file_path, None::<fn(rusqlite::backup::Progress)>)?;
    log::info!("Restored database from {}", file_path.display());
    Ok(())
}
