//! Visit log and daily rollup queries

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{from_millis, DailyStats, Database, Visitor};
use crate::error::Result;
use crate::paging::PageRequest;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A visit ready to be stored; empty fields are already normalized to `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewVisit {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub path: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStat {
    pub path: String,
    pub count: i64,
}

type VisitorRow = (i64, Option<String>, Option<String>, Option<String>, Option<String>, i64);
type DailyRow = (String, i64, i64, i64);

fn daily_from_row((date, visits, page_views, unique_visitors): DailyRow) -> Option<DailyStats> {
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).ok()?;
    Some(DailyStats {
        date,
        visits,
        page_views,
        unique_visitors,
    })
}

impl Database {
    /// Append a visit and bump the rollup row for `day` in one transaction
    pub async fn record_visit(&self, visit: &NewVisit, at: DateTime<Utc>, day: NaiveDate) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO visitors (ip, user_agent, path, referrer, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&visit.ip)
        .bind(&visit.user_agent)
        .bind(&visit.path)
        .bind(&visit.referrer)
        .bind(at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO daily_stats (date, visits, page_views, unique_visitors)
            VALUES (?, 1, 1, 1)
            ON CONFLICT(date) DO UPDATE SET
                visits = visits + 1,
                page_views = page_views + 1
            "#,
        )
        .bind(day.format(DATE_FORMAT).to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Rollup rows from `first_day` onwards, oldest first
    pub async fn daily_stats_since(&self, first_day: NaiveDate) -> Result<Vec<DailyStats>> {
        let rows: Vec<DailyRow> = sqlx::query_as(
            "SELECT date, visits, page_views, unique_visitors FROM daily_stats WHERE date >= ? ORDER BY date ASC",
        )
        .bind(first_day.format(DATE_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(daily_from_row).collect())
    }

    /// Visits with `start <= created_at < end`
    pub async fn count_visitors_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visitors WHERE created_at >= ? AND created_at < ?")
            .bind(start.timestamp_millis())
            .bind(end.timestamp_millis())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    pub async fn count_visitors_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visitors WHERE created_at >= ?")
            .bind(since.timestamp_millis())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Distinct non-null IPs seen since `since`
    pub async fn count_unique_ips_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT ip) FROM visitors WHERE created_at >= ? AND ip IS NOT NULL",
        )
        .bind(since.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn top_paths_since(&self, since: DateTime<Utc>, limit: i64) -> Result<Vec<PathStat>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT path, COUNT(*) as count
            FROM visitors
            WHERE created_at >= ? AND path IS NOT NULL
            GROUP BY path
            ORDER BY count DESC, path ASC
            LIMIT ?
            "#,
        )
        .bind(since.timestamp_millis())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(path, count)| PathStat { path, count }).collect())
    }

    /// Raw visit log, newest first
    pub async fn list_visitors(&self, page: &PageRequest) -> Result<(Vec<Visitor>, i64)> {
        let rows: Vec<VisitorRow> = sqlx::query_as(
            r#"
            SELECT id, ip, user_agent, path, referrer, created_at
            FROM visitors
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visitors")
            .fetch_one(&self.pool)
            .await?;

        let visitors = rows
            .into_iter()
            .map(|(id, ip, user_agent, path, referrer, created_at)| Visitor {
                id,
                ip,
                user_agent,
                path,
                referrer,
                created_at: from_millis(created_at),
            })
            .collect();

        Ok((visitors, total.0))
    }
}
