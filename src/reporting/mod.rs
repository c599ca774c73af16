//! Fixed reporting queries over the LMS schema.
//!
//! Every query here is written by us, so it bypasses the classifier. User input
//! reaches the SQL only as bound parameters, except page sizes, which are
//! coerced to integers before they are formatted into `LIMIT`/`OFFSET`.

mod courses;
mod logs;
mod overview;
mod pagination;
mod users;

pub use courses::{completion_rate, CourseDetail, CoursePage, CourseSummary};
pub use logs::{fill_daily_buckets, DailyLogins, LogEntry, LoginActivity, LoginPeriod};
pub use overview::Overview;
pub use pagination::{PageInfo, PageRequest};
pub use users::{grade_percentage, EnrolledCourse, GradeEntry, UserGrades, UserPage, UserSummary};

use crate::config::LimitsConfig;
use crate::db::TablePrefix;
use crate::query::QueryExecutor;
use chrono::{NaiveDate, NaiveTime};

/// Composes the reporting queries for one LMS installation.
#[derive(Clone)]
pub struct Reporting {
    executor: QueryExecutor,
    prefix: TablePrefix,
    limits: LimitsConfig,
}

impl Reporting {
    pub fn new(executor: QueryExecutor, prefix: TablePrefix, limits: LimitsConfig) -> Self {
        Self {
            executor,
            prefix,
            limits,
        }
    }

    fn table(&self, name: &str) -> String {
        self.prefix.table(name)
    }
}

/// Epoch seconds at 00:00 UTC on `date`.
fn day_start_epoch(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}
