//! Activity log reports: daily login counts and the recent event feed.

use super::{day_start_epoch, Reporting};
use crate::db::Value;
use crate::error::Result;
use crate::query::clamp_positive;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const LOGIN_EVENT: &str = r"\core\event\user_loggedin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLogins {
    pub date: NaiveDate,
    pub login_count: i64,
    pub unique_users: i64,
}

impl DailyLogins {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            login_count: 0,
            unique_users: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoginPeriod {
    pub days: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginActivity {
    pub period: LoginPeriod,
    pub data: Vec<DailyLogins>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub eventname: String,
    pub component: String,
    pub action: String,
    pub target: String,
    pub userid: i64,
    pub username: Option<String>,
    pub courseid: Option<i64>,
    pub timecreated: i64,
    pub ip: Option<String>,
}

/// First day of a `days`-long window ending on `today`.
fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN)
}

/// Expands sparse per-day rows into one entry per day, oldest first, ending
/// on `today`. Days without a row get zero counts; rows outside the window are
/// dropped.
pub fn fill_daily_buckets(today: NaiveDate, days: u32, rows: &[DailyLogins]) -> Vec<DailyLogins> {
    let by_date: HashMap<NaiveDate, DailyLogins> = rows.iter().map(|r| (r.date, *r)).collect();
    window_start(today, days)
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| {
            by_date
                .get(&date)
                .copied()
                .unwrap_or_else(|| DailyLogins::empty(date))
        })
        .collect()
}

impl Reporting {
    /// Daily login counts for the last `days` UTC days, today included.
    pub async fn login_activity(&self, days: Option<&str>) -> Result<LoginActivity> {
        self.login_activity_until(Utc::now().date_naive(), days)
            .await
    }

    /// Daily login counts for the window ending on `today`.
    pub async fn login_activity_until(
        &self,
        today: NaiveDate,
        days: Option<&str>,
    ) -> Result<LoginActivity> {
        let days = clamp_positive(
            days,
            self.limits.default_login_days,
            self.limits.max_login_days,
        );
        let from = window_start(today, days);

        let sql = format!(
            "SELECT to_char(to_timestamp(timecreated) AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS date,
       COUNT(*) AS login_count,
       COUNT(DISTINCT userid) AS unique_users
FROM {}
WHERE eventname = $1 AND timecreated >= $2
GROUP BY 1
ORDER BY 1",
            self.table("logstore_standard_log")
        );
        let params = [Value::from(LOGIN_EVENT), Value::Int(day_start_epoch(from))];
        let rows = self.executor.fetch(&sql, &params).await?.decode::<DailyLogins>()?;

        Ok(LoginActivity {
            period: LoginPeriod {
                days,
                from,
                to: today,
            },
            data: fill_daily_buckets(today, days, &rows),
        })
    }

    /// Most recent log events, newest first.
    pub async fn recent_logs(&self, limit: Option<&str>) -> Result<Vec<LogEntry>> {
        let limit = clamp_positive(
            limit,
            self.limits.default_recent_logs,
            self.limits.max_recent_logs,
        );
        let sql = format!(
            "SELECT l.id, l.eventname, l.component, l.action, l.target, l.userid,
       u.username, l.courseid, l.timecreated, l.ip
FROM {logs} l
LEFT JOIN {users} u ON u.id = l.userid
ORDER BY l.timecreated DESC, l.id DESC
LIMIT {limit}",
            logs = self.table("logstore_standard_log"),
            users = self.table("user"),
        );
        self.executor.fetch(&sql, &[]).await?.decode()
    }
}
