//! Custom report definitions persisted as a JSON document.
//!
//! The whole collection is read and rewritten on every mutation. An async
//! mutex serialises mutations within this process; a second process writing
//! the same file can still lose updates (last writer wins).

use crate::error::{InsightError, Result};
use crate::safety::classify_sql;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// A named, persisted SQL query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sql: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReport {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sql: String,
}

/// Fields accepted when updating a report. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sql: Option<String>,
}

/// Rejects SQL that fails the read-only check.
fn ensure_read_only(sql: &str) -> Result<()> {
    let verdict = classify_sql(sql);
    if verdict.allowed {
        Ok(())
    } else {
        Err(InsightError::validation(verdict.denial_message()))
    }
}

/// Returns the trimmed value if it is non-empty.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// File-backed list of report definitions.
#[derive(Debug)]
pub struct ReportStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ReportStore {
    /// Creates a store over the given JSON file. The file is created lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every report in stored order.
    pub async fn list(&self) -> Result<Vec<ReportDefinition>> {
        self.load().await
    }

    /// Returns a report by id.
    pub async fn get(&self, id: &str) -> Result<ReportDefinition> {
        self.load()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| report_not_found(id))
    }

    /// Validates and appends a new report.
    pub async fn create(&self, new: NewReport) -> Result<ReportDefinition> {
        let name = non_blank(Some(new.name.as_str()))
            .ok_or_else(|| InsightError::validation("Report name is required"))?;
        if new.sql.trim().is_empty() {
            return Err(InsightError::validation("Report SQL is required"));
        }
        ensure_read_only(&new.sql)?;

        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;

        let now = Utc::now();
        let report = ReportDefinition {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            description: new.description.unwrap_or_default(),
            sql: new.sql,
            created_at: now,
            updated_at: now,
        };
        reports.push(report.clone());
        self.save(&reports).await?;

        info!(id = %report.id, name = %report.name, "Created report");
        Ok(report)
    }

    /// Applies partial changes to an existing report.
    ///
    /// Blank `name` or `sql` values are treated as absent. A changed `sql` is
    /// re-validated before anything is written.
    pub async fn update(&self, id: &str, changes: ReportChanges) -> Result<ReportDefinition> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;

        let report = reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| report_not_found(id))?;

        if let Some(sql) = changes.sql.as_deref().filter(|s| !s.trim().is_empty()) {
            ensure_read_only(sql)?;
            report.sql = sql.to_string();
        }
        if let Some(name) = non_blank(changes.name.as_deref()) {
            report.name = name.to_string();
        }
        if let Some(description) = changes.description {
            report.description = description;
        }
        report.updated_at = Utc::now();

        let updated = report.clone();
        self.save(&reports).await?;

        info!(id = %updated.id, "Updated report");
        Ok(updated)
    }

    /// Removes a report.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load().await?;

        let before = reports.len();
        reports.retain(|r| r.id != id);
        if reports.len() == before {
            return Err(report_not_found(id));
        }

        self.save(&reports).await?;
        info!(id, "Deleted report");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ReportDefinition>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Report file {} does not exist yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(InsightError::persistence(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            InsightError::persistence(format!(
                "Report file {} is not valid JSON: {e}",
                self.path.display()
            ))
        })
    }

    /// Writes the collection to a sibling temp file, then renames it over the
    /// original so readers never observe a half-written document.
    async fn save(&self, reports: &[ReportDefinition]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                InsightError::persistence(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(reports)
            .map_err(|e| InsightError::persistence(format!("Failed to serialize reports: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            InsightError::persistence(format!("Failed to write {}: {e}", tmp_path.display()))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            InsightError::persistence(format!(
                "Failed to replace {}: {e}",
                self.path.display()
            ))
        })
    }
}

fn report_not_found(id: &str) -> InsightError {
    InsightError::not_found(format!("Report '{id}' not found"))
}
