//! User search and per-user grade summaries.

use super::{PageInfo, PageRequest, Reporting};
use crate::db::Value;
use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};

/// Shortest search term, in characters, that reaches the database.
const MIN_SEARCH_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub lastaccess: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPage {
    pub users: Vec<UserSummary>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub course_id: i64,
    pub course_name: String,
    pub item_name: Option<String>,
    pub item_type: String,
    pub finalgrade: Option<f64>,
    pub grademax: Option<f64>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledCourse {
    pub id: i64,
    pub fullname: String,
    pub shortname: String,
    pub enrolled_at: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    pub timecompleted: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserGrades {
    pub user: UserSummary,
    pub grades: Vec<GradeEntry>,
    #[serde(rename = "enrolledCourses")]
    pub enrolled_courses: Vec<EnrolledCourse>,
}

/// Grade as a percentage of the item maximum, rounded to two decimals.
///
/// `None` when either value is missing or the maximum is not positive.
pub fn grade_percentage(finalgrade: Option<f64>, grademax: Option<f64>) -> Option<f64> {
    let (grade, max) = (finalgrade?, grademax?);
    if max <= 0.0 {
        return None;
    }
    Some((grade / max * 10_000.0).round() / 100.0)
}

const USER_COLUMNS: &str = "u.id, u.username, u.firstname, u.lastname, u.email, u.lastaccess";

impl Reporting {
    /// Searches active users by name, username or email.
    ///
    /// Terms shorter than two characters return an empty page without a query.
    pub async fn search_users(
        &self,
        q: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Result<UserPage> {
        let request = PageRequest::from_raw(
            page,
            limit,
            self.limits.default_page_size,
            self.limits.max_page_size,
        );

        let term = q.map(str::trim).unwrap_or_default();
        if term.chars().count() < MIN_SEARCH_CHARS {
            return Ok(UserPage {
                users: Vec::new(),
                pagination: PageInfo::new(request, 0),
            });
        }

        let filter = "WHERE u.deleted = 0 AND (u.username ILIKE $1 OR u.firstname ILIKE $1 \
             OR u.lastname ILIKE $1 OR u.email ILIKE $1 \
             OR CONCAT(u.firstname, ' ', u.lastname) ILIKE $1)";
        let users_table = self.table("user");
        let params = [Value::from(format!("%{term}%"))];

        let list_sql = format!(
            "SELECT {USER_COLUMNS} FROM {users_table} u {filter}
ORDER BY u.lastname, u.firstname, u.id
{page}",
            page = request.sql_clause(),
        );
        let count_sql = format!("SELECT COUNT(*) AS total FROM {users_table} u {filter}");

        let (rows, total) = tokio::try_join!(
            self.executor.fetch(&list_sql, &params),
            self.executor.fetch(&count_sql, &params),
        )?;

        Ok(UserPage {
            users: rows.decode()?,
            pagination: PageInfo::new(request, total.scalar_i64()?),
        })
    }

    /// Loads a user's grade items and enrolments.
    pub async fn user_grades(&self, user_id: i64) -> Result<UserGrades> {
        let id = [Value::Int(user_id)];

        let user_sql = format!(
            "SELECT {USER_COLUMNS} FROM {} u WHERE u.id = $1 AND u.deleted = 0",
            self.table("user")
        );
        let user = self
            .executor
            .fetch(&user_sql, &id)
            .await?
            .decode_first::<UserSummary>()?
            .ok_or_else(|| InsightError::not_found(format!("User {user_id} not found")))?;

        let grades_sql = format!(
            "SELECT c.id AS course_id, c.fullname AS course_name,
       gi.itemname AS item_name, gi.itemtype AS item_type,
       gg.finalgrade::float8 AS finalgrade, gi.grademax::float8 AS grademax
FROM {grades} gg
JOIN {items} gi ON gi.id = gg.itemid
JOIN {course} c ON c.id = gi.courseid
WHERE gg.userid = $1 AND gg.finalgrade IS NOT NULL
ORDER BY c.fullname, gi.sortorder",
            grades = self.table("grade_grades"),
            items = self.table("grade_items"),
            course = self.table("course"),
        );
        let enrolled_sql = format!(
            "SELECT c.id, c.fullname, c.shortname,
       MIN(ue.timecreated) AS enrolled_at,
       MAX(cc.timecompleted) AS timecompleted
FROM {user_enrolments} ue
JOIN {enrol} e ON e.id = ue.enrolid
JOIN {course} c ON c.id = e.courseid
LEFT JOIN {completions} cc ON cc.course = c.id AND cc.userid = ue.userid
WHERE ue.userid = $1
GROUP BY c.id, c.fullname, c.shortname
ORDER BY c.fullname",
            user_enrolments = self.table("user_enrolments"),
            enrol = self.table("enrol"),
            course = self.table("course"),
            completions = self.table("course_completions"),
        );

        let (grades, enrolled) = tokio::try_join!(
            self.executor.fetch(&grades_sql, &id),
            self.executor.fetch(&enrolled_sql, &id),
        )?;

        let grades = grades
            .decode::<GradeEntry>()?
            .into_iter()
            .map(|mut grade| {
                grade.percentage = grade_percentage(grade.finalgrade, grade.grademax);
                grade
            })
            .collect();
        let enrolled_courses = enrolled
            .decode::<EnrolledCourse>()?
            .into_iter()
            .map(|mut course| {
                course.completed = course.timecompleted.is_some();
                course
            })
            .collect();

        Ok(UserGrades {
            user,
            grades,
            enrolled_courses,
        })
    }
}
