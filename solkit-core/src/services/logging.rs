//! Logging service - structured event log in DuckDB
//!
//! Every command run and every confirmed transaction lands in `logs.duckdb`
//! in the app directory. Only public data is recorded (addresses, signatures,
//! amounts); secret keys and wallet file contents never are.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::log_migrations::LOG_MIGRATIONS;

/// Disambiguates IDs generated within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Timestamp in the upper bits, counter in the lower 16
fn generate_id() -> u64 {
    let timestamp = now_ms() as u64;
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Current unix time in milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// An event to record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lamports: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Default::default()
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Public address the event concerns
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_lamports(mut self, lamports: u64) -> Self {
        self.lamports = Some(lamports);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Server-provided context such as preflight logs
    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A stored log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub cluster: Option<String>,
    pub address: Option<String>,
    pub signature: Option<String>,
    pub lamports: Option<u64>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

const ENTRY_COLUMNS: &str = "id, timestamp, app_version, platform, event, command, cluster, \
     address, signature, lamports, error_message, error_details";

fn entry_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        app_version: row.get(2)?,
        platform: row.get(3)?,
        event: row.get(4)?,
        command: row.get(5)?,
        cluster: row.get(6)?,
        address: row.get(7)?,
        signature: row.get(8)?,
        lamports: row.get(9)?,
        error_message: row.get(10)?,
        error_details: row.get(11)?,
    })
}

/// Structured event logger backed by `logs.duckdb`
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open (or create) `logs.duckdb` in `app_dir` and apply migrations
    pub fn new(app_dir: &Path, app_version: impl Into<String>) -> Result<Self> {
        std::fs::create_dir_all(app_dir)?;
        let db_path = app_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;

        let service = Self {
            conn: Mutex::new(conn),
            db_path,
            app_version: app_version.into(),
            platform: std::env::consts::OS,
        };
        service.run_migrations()?;

        Ok(service)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        // The bookkeeping table is created idempotently before anything is read from it
        let (first, rest) = LOG_MIGRATIONS
            .split_first()
            .ok_or_else(|| anyhow!("no log migrations embedded"))?;
        conn.execute_batch(first.1)?;

        let applied: Vec<String> = conn
            .prepare("SELECT migration_name FROM sys_migrations")?
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<_, _>>()?;

        for (name, sql) in std::iter::once(first).chain(rest) {
            if applied.iter().any(|done| done == name) {
                continue;
            }
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                [name],
            )?;
        }

        Ok(())
    }

    /// Record an event
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        conn.execute(
            &format!(
                "INSERT INTO sys_logs ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                ENTRY_COLUMNS
            ),
            duckdb::params![
                generate_id(),
                now_ms(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.command,
                &event.cluster,
                &event.address,
                &event.signature,
                &event.lamports,
                &event.error_message,
                &event.error_details,
            ],
        )?;

        Ok(())
    }

    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    pub fn log_error(&self, command: &str, message: &str, details: Option<&str>) -> Result<()> {
        let mut event = LogEvent::new("command_failed")
            .with_command(command)
            .with_error(message);
        if let Some(d) = details {
            event = event.with_error_details(d);
        }
        self.log(event)
    }

    /// Most recent entries first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query_entries("", limit)
    }

    /// Most recent entries carrying an error
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query_entries("WHERE error_message IS NOT NULL", limit)
    }

    fn query_entries(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_logs {} ORDER BY timestamp DESC, id DESC LIMIT ?",
            ENTRY_COLUMNS, filter
        ))?;
        let entries = stmt
            .query_map([limit as i64], entry_from_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Entry count per event name, most frequent first
    pub fn event_counts(&self) -> Result<Vec<(String, u64)>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let mut stmt = conn.prepare(
            "SELECT event, COUNT(*) AS n FROM sys_logs GROUP BY event ORDER BY n DESC, event",
        )?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(counts)
    }

    /// Delete entries older than `timestamp_ms`
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_database() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();
        assert!(service.db_path().exists());
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let dir = tempdir().unwrap();
        {
            let service = LoggingService::new(dir.path(), "0.1.0").unwrap();
            service.log_command("balance").unwrap();
        }
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_log_transaction_event() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();

        service
            .log(
                LogEvent::new("drain_completed")
                    .with_command("drain")
                    .with_cluster("devnet")
                    .with_address("Fv6pfvTxAXECfs81aPNFTqiLvwkSkPUo3D3Zr7NrGfNP")
                    .with_signature("5sig")
                    .with_lamports(999_995_000),
            )
            .unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "drain_completed");
        assert_eq!(entries[0].cluster.as_deref(), Some("devnet"));
        assert_eq!(entries[0].lamports, Some(999_995_000));
        assert_eq!(entries[0].app_version, "0.1.0");
    }

    #[test]
    fn test_errors_and_counts() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();

        service.log_command("airdrop").unwrap();
        service.log_command("airdrop").unwrap();
        service
            .log_error("airdrop", "rate limit exceeded", Some("{\"code\":429}"))
            .unwrap();

        let errors = service.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "command_failed");
        assert_eq!(errors[0].error_details.as_deref(), Some("{\"code\":429}"));

        let counts = service.event_counts().unwrap();
        assert_eq!(counts[0], ("command_executed".to_string(), 2));
        assert_eq!(counts[1], ("command_failed".to_string(), 1));
    }

    #[test]
    fn test_delete_before() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();

        service.log_command("keygen").unwrap();
        service.log_command("balance").unwrap();

        let deleted = service.delete_before(now_ms() + 1000).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(service.count().unwrap(), 0);
    }
}
