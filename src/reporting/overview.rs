//! Headline counts for the dashboard landing page.

use super::{day_start_epoch, Reporting};
use crate::db::Value;
use crate::error::Result;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_users: i64,
    pub total_courses: i64,
    pub today_activities: i64,
    pub total_enrollments: i64,
}

impl Reporting {
    /// Runs the four headline counts concurrently.
    pub async fn overview(&self) -> Result<Overview> {
        let users_sql = format!(
            "SELECT COUNT(*) AS total FROM {} WHERE deleted = 0",
            self.table("user")
        );
        let courses_sql = format!(
            "SELECT COUNT(*) AS total FROM {} WHERE id <> 1",
            self.table("course")
        );
        let activity_sql = format!(
            "SELECT COUNT(*) AS total FROM {} WHERE timecreated >= $1",
            self.table("logstore_standard_log")
        );
        let enrolments_sql = format!(
            "SELECT COUNT(*) AS total FROM {}",
            self.table("user_enrolments")
        );
        let since = [Value::Int(day_start_epoch(Utc::now().date_naive()))];

        let (users, courses, activity, enrolments) = tokio::try_join!(
            self.executor.fetch(&users_sql, &[]),
            self.executor.fetch(&courses_sql, &[]),
            self.executor.fetch(&activity_sql, &since),
            self.executor.fetch(&enrolments_sql, &[]),
        )?;

        Ok(Overview {
            total_users: users.scalar_i64()?.max(0),
            total_courses: courses.scalar_i64()?.max(0),
            today_activities: activity.scalar_i64()?.max(0),
            total_enrollments: enrolments.scalar_i64()?.max(0),
        })
    }
}
