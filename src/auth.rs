//! Admin password gate and server-side sessions

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::db::Database;
use crate::error::{AppError, Result};

const TOKEN_BYTES: usize = 32;

/// Opaque bearer token: random bytes, hex-encoded
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Byte comparison whose running time does not depend on where the inputs differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Check a submitted password and open a session on success
pub async fn login(db: &Database, config: &AdminConfig, password: Option<&str>, now: DateTime<Utc>) -> Result<String> {
    let password = password.filter(|p| !p.is_empty()).ok_or_else(|| {
        AppError::Validation("Password is required".to_string())
    })?;

    if !constant_time_eq(password.as_bytes(), config.password.as_bytes()) {
        warn!("Rejected admin login attempt");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let purged = db.purge_expired_sessions(now).await?;
    if purged > 0 {
        info!("Purged {} expired admin sessions", purged);
    }

    let token = generate_token();
    let expires_at = now + Duration::hours(config.session_ttl_hours);
    db.insert_session(&token, now, expires_at).await?;

    info!("Admin session opened, expires {}", expires_at);
    Ok(token)
}

/// Succeeds only for a token with an unexpired session
pub async fn authorize(db: &Database, token: &str, now: DateTime<Utc>) -> Result<()> {
    if !token.is_empty() && db.session_is_active(token, now).await? {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Invalid or expired session".to_string()))
    }
}

pub async fn logout(db: &Database, token: &str) -> Result<()> {
    if db.delete_session(token).await? {
        info!("Admin session closed");
    }
    Ok(())
}
