//! Admin session storage

use chrono::{DateTime, Utc};

use super::Database;
use crate::error::Result;

impl Database {
    pub async fn insert_session(&self, token: &str, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT INTO admin_sessions (token, issued_at, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(issued_at.timestamp_millis())
            .bind(expires_at.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Whether `token` names a session that has not expired at `now`
    pub async fn session_is_active(&self, token: &str, now: DateTime<Utc>) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM admin_sessions WHERE token = ? AND expires_at > ?")
                .bind(token)
                .bind(now.timestamp_millis())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    pub async fn delete_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop sessions that expired at or before `now`, returning how many were removed
    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
