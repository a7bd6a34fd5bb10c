//! Database schema definitions

pub const CREATE_VIDEOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    thumbnail TEXT,
    created_at BIGINT NOT NULL,     -- Unix millis
    title_folded TEXT NOT NULL,     -- lowercased copies for search
    url_folded TEXT NOT NULL
)
"#;

pub const CREATE_VISITORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS visitors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ip TEXT,
    user_agent TEXT,
    path TEXT,
    referrer TEXT,
    created_at BIGINT NOT NULL
)
"#;

// One row per local calendar day
pub const CREATE_DAILY_STATS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS daily_stats (
    date TEXT PRIMARY KEY,          -- YYYY-MM-DD
    visits INTEGER NOT NULL DEFAULT 0,
    page_views INTEGER NOT NULL DEFAULT 0,
    unique_visitors INTEGER NOT NULL DEFAULT 0
)
"#;

pub const CREATE_ADMIN_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS admin_sessions (
    token TEXT PRIMARY KEY,
    issued_at BIGINT NOT NULL,
    expires_at BIGINT NOT NULL
)
"#;

// Listing order (newest first)
pub const CREATE_INDEX_VIDEOS_CREATED: &str =
    "CREATE INDEX IF NOT EXISTS idx_videos_created ON videos(created_at DESC)";

// Window queries over the visit log
pub const CREATE_INDEX_VISITORS_CREATED: &str =
    "CREATE INDEX IF NOT EXISTS idx_visitors_created ON visitors(created_at)";

pub const CREATE_INDEX_VISITORS_TS_IP: &str =
    "CREATE INDEX IF NOT EXISTS idx_visitors_ts_ip ON visitors(created_at, ip)";

pub const CREATE_INDEX_VISITORS_TS_PATH: &str =
    "CREATE INDEX IF NOT EXISTS idx_visitors_ts_path ON visitors(created_at, path)";
