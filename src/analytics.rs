//! Visit recording and the aggregate report
//!
//! Every function takes "now" explicitly. Day boundaries are midnights in
//! the time zone of that timestamp; handlers pass local time.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{DailyStats, Database, NewVisit, PathStat};
use crate::error::Result;

pub const DEFAULT_REPORT_DAYS: i64 = 30;
pub const MAX_REPORT_DAYS: i64 = 365;
const REALTIME_WINDOW_MINUTES: i64 = 30;
const TOP_PATHS: i64 = 10;

/// Tracker payload as sent by the browser
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPayload {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub path: Option<String>,
    pub referrer: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl VisitPayload {
    /// Normalize into a storable visit. `peer_ip` fills in when the client sent no ip.
    pub fn into_visit(self, peer_ip: Option<String>) -> NewVisit {
        NewVisit {
            ip: non_empty(self.ip).or_else(|| non_empty(peer_ip)),
            user_agent: non_empty(self.user_agent),
            path: non_empty(self.path).or_else(|| Some("/".to_string())),
            referrer: non_empty(self.referrer),
        }
    }
}

/// Calendar day a timestamp falls on, in its own time zone
pub fn day_bucket<Tz: TimeZone>(at: &DateTime<Tz>) -> NaiveDate {
    at.date_naive()
}

fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&naive).earliest()
}

/// `[start, end)` of the calendar day containing `at`, as UTC instants
pub fn day_bounds<Tz: TimeZone>(at: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = at.timezone();
    let today = day_bucket(at);
    let start = midnight(&tz, today)
        .map(|m| m.with_timezone(&Utc))
        .unwrap_or_else(|| at.with_timezone(&Utc));
    let end = today
        .succ_opt()
        .and_then(|tomorrow| midnight(&tz, tomorrow))
        .map(|m| m.with_timezone(&Utc))
        .unwrap_or(start + Duration::days(1));
    (start, end)
}

/// Store one visit and bump today's rollup
pub async fn record_visit<Tz: TimeZone>(db: &Database, visit: &NewVisit, now: &DateTime<Tz>) -> Result<()> {
    db.record_visit(visit, now.with_timezone(&Utc), day_bucket(now)).await
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub daily_stats: Vec<DailyStats>,
    pub total_visitors: i64,
    pub unique_visitors: i64,
    pub popular_pages: Vec<PathStat>,
    pub today_stats: i64,
    pub real_time_visitors: i64,
    pub period: i64,
}

pub fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_REPORT_DAYS).clamp(1, MAX_REPORT_DAYS)
}

/// Aggregate the trailing `days`-day window ending at `now`
pub async fn build_report<Tz: TimeZone>(db: &Database, days: i64, now: &DateTime<Tz>) -> Result<AnalyticsReport> {
    let now_utc = now.with_timezone(&Utc);
    let since = now_utc - Duration::days(days);
    let first_day = day_bucket(now)
        .checked_sub_signed(Duration::days(days - 1))
        .unwrap_or(NaiveDate::MIN);
    let (today_start, today_end) = day_bounds(now);
    let realtime_since = now_utc - Duration::minutes(REALTIME_WINDOW_MINUTES);

    Ok(AnalyticsReport {
        daily_stats: db.daily_stats_since(first_day).await?,
        total_visitors: db.count_visitors_since(since).await?,
        unique_visitors: db.count_unique_ips_since(since).await?,
        popular_pages: db.top_paths_since(since, TOP_PATHS).await?,
        today_stats: db.count_visitors_between(today_start, today_end).await?,
        real_time_visitors: db.count_visitors_since(realtime_since).await?,
        period: days,
    })
}
