//! Course listing with enrolment and completion counts.

use super::{PageInfo, PageRequest, Reporting};
use crate::db::Value;
use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: i64,
    pub fullname: String,
    pub shortname: String,
    pub category: i64,
    pub visible: i64,
    pub startdate: i64,
    pub enddate: i64,
    pub enrolled_count: i64,
    pub completed_count: i64,
    #[serde(default)]
    pub completion_rate: i64,
}

impl CourseSummary {
    fn with_completion_rate(mut self) -> Self {
        self.completion_rate = completion_rate(self.enrolled_count, self.completed_count);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseSummary,
    pub summary: Option<String>,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoursePage {
    pub courses: Vec<CourseSummary>,
    pub pagination: PageInfo,
}

/// Percentage of enrolled users who completed, rounded to an integer in `0..=100`.
pub fn completion_rate(enrolled: i64, completed: i64) -> i64 {
    if enrolled <= 0 {
        return 0;
    }
    let rate = (completed.max(0) as f64 / enrolled as f64 * 100.0).round() as i64;
    rate.clamp(0, 100)
}

const COURSE_SELECT: &str =
    "SELECT c.id, c.fullname, c.shortname, c.category, c.visible, c.startdate, c.enddate,
       COUNT(DISTINCT ue.userid) AS enrolled_count,
       COUNT(DISTINCT cc.userid) AS completed_count";

impl Reporting {
    fn course_joins(&self) -> String {
        format!(
            "FROM {course} c
LEFT JOIN {enrol} e ON e.courseid = c.id
LEFT JOIN {user_enrolments} ue ON ue.enrolid = e.id
LEFT JOIN {completions} cc ON cc.course = c.id AND cc.timecompleted IS NOT NULL",
            course = self.table("course"),
            enrol = self.table("enrol"),
            user_enrolments = self.table("user_enrolments"),
            completions = self.table("course_completions"),
        )
    }

    /// Lists courses (excluding the site course) with enrolment statistics.
    pub async fn list_courses(
        &self,
        page: Option<&str>,
        limit: Option<&str>,
        search: Option<&str>,
    ) -> Result<CoursePage> {
        let request = PageRequest::from_raw(
            page,
            limit,
            self.limits.default_page_size,
            self.limits.max_page_size,
        );

        let mut filter = String::from("WHERE c.id <> 1");
        let mut params = Vec::new();
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            filter.push_str(" AND (c.fullname ILIKE $1 OR c.shortname ILIKE $1)");
            params.push(Value::from(format!("%{term}%")));
        }

        let list_sql = format!(
            "{select}\n{joins}\n{filter}
GROUP BY c.id, c.fullname, c.shortname, c.category, c.visible, c.startdate, c.enddate
ORDER BY c.fullname, c.id
{page}",
            select = COURSE_SELECT,
            joins = self.course_joins(),
            page = request.sql_clause(),
        );
        let count_sql = format!(
            "SELECT COUNT(*) AS total FROM {} c {filter}",
            self.table("course")
        );

        let (rows, total) = tokio::try_join!(
            self.executor.fetch(&list_sql, &params),
            self.executor.fetch(&count_sql, &params),
        )?;

        let courses = rows
            .decode::<CourseSummary>()?
            .into_iter()
            .map(CourseSummary::with_completion_rate)
            .collect();

        Ok(CoursePage {
            courses,
            pagination: PageInfo::new(request, total.scalar_i64()?),
        })
    }

    /// Fetches one course with its category name and statistics.
    pub async fn course_detail(&self, id: i64) -> Result<CourseDetail> {
        let sql = format!(
            "{select}, c.summary, cat.name AS category_name
{joins}
LEFT JOIN {categories} cat ON cat.id = c.category
WHERE c.id = $1 AND c.id <> 1
GROUP BY c.id, c.fullname, c.shortname, c.category, c.visible, c.startdate, c.enddate, c.summary, cat.name",
            select = COURSE_SELECT,
            joins = self.course_joins(),
            categories = self.table("course_categories"),
        );

        let result = self.executor.fetch(&sql, &[Value::Int(id)]).await?;
        let mut detail = result
            .decode_first::<CourseDetail>()?
            .ok_or_else(|| InsightError::not_found(format!("Course {id} not found")))?;
        detail.course = detail.course.with_completion_rate();
        Ok(detail)
    }
}
