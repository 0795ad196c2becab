use super::traits::{compare_due_dates, lab_matches_service, Storage};
use crate::common::csv::{join_csv, split_csv};
use crate::common::error::{Result, ToolkitError};
use crate::config::DatabaseConfig;
use crate::db::DatabaseManager;
use crate::domain::*;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// libSQL-backed storage over the relational schema in
/// `migrations/001_create_tables.sql`.
///
/// Equality/substring filters run over the mapped rows so both backends share
/// one set of filter semantics; ordering is done in SQL where the column
/// encoding allows it.
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db_manager = DatabaseManager::new(config).await?;
        db_manager.run_migrations().await?;

        Ok(Self {
            db: Arc::new(db_manager),
        })
    }
}

fn db_err(context: &str, e: impl std::fmt::Display) -> ToolkitError {
    ToolkitError::Database {
        message: format!("{context}: {e}"),
    }
}

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that SQL
/// string ordering matches chronological ordering.
fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| db_err("Failed to parse stored timestamp", e))
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| db_err("Invalid stored UUID", e))
}

fn get_text(row: &libsql::Row, idx: i32) -> Result<String> {
    row.get(idx)
        .map_err(|e| db_err(&format!("Failed to read column {idx}"), e))
}

fn get_opt_text(row: &libsql::Row, idx: i32) -> Option<String> {
    row.get(idx).ok()
}

async fn collect_rows<T>(
    mut rows: libsql::Rows,
    map: impl Fn(&libsql::Row) -> Result<T>,
) -> Result<Vec<T>> {
    let mut results = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| db_err("Failed to read row", e))?
    {
        results.push(map(&row)?);
    }
    Ok(results)
}

fn row_to_framework(row: &libsql::Row) -> Result<Framework> {
    Ok(Framework {
        id: get_text(row, 0)?,
        name: get_text(row, 1)?,
        description: get_opt_text(row, 2),
    })
}

fn row_to_control(row: &libsql::Row) -> Result<Control> {
    Ok(Control {
        id: get_text(row, 0)?,
        framework_id: get_text(row, 1)?,
        title: get_text(row, 2)?,
        description: get_opt_text(row, 3),
        category: get_opt_text(row, 4),
    })
}

fn row_to_lab(row: &libsql::Row) -> Result<Lab> {
    Ok(Lab {
        id: get_text(row, 0)?,
        name: get_text(row, 1)?,
        repo_path: get_opt_text(row, 2),
        aws_services: split_csv(&get_text(row, 3)?),
        evidence_types: split_csv(&get_text(row, 4)?),
    })
}

fn row_to_project(row: &libsql::Row) -> Result<Project> {
    Ok(Project {
        id: Some(parse_uuid(&get_text(row, 0)?)?),
        name: get_text(row, 1)?,
        description: get_opt_text(row, 2),
        status: get_text(row, 3)?,
        target_frameworks: split_csv(&get_text(row, 4)?),
    })
}

fn row_to_evidence(row: &libsql::Row) -> Result<EvidenceItem> {
    Ok(EvidenceItem {
        id: Some(parse_uuid(&get_text(row, 0)?)?),
        project_id: get_text(row, 1)?,
        control_id: get_text(row, 2)?,
        lab_id: get_opt_text(row, 3),
        kind: get_text(row, 4)?,
        location: get_text(row, 5)?,
        collected_at: parse_datetime(&get_text(row, 6)?)?,
    })
}

fn row_to_task(row: &libsql::Row) -> Result<RemediationTask> {
    let due_date = match get_opt_text(row, 7) {
        Some(value) => Some(parse_datetime(&value)?),
        None => None,
    };
    Ok(RemediationTask {
        id: Some(parse_uuid(&get_text(row, 0)?)?),
        project_id: get_text(row, 1)?,
        control_id: get_text(row, 2)?,
        title: get_text(row, 3)?,
        description: get_opt_text(row, 4),
        owner: get_opt_text(row, 5),
        status: get_text(row, 6)?,
        due_date,
    })
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn insert_framework(&self, framework: &Framework) -> Result<()> {
        let conn = self.db.get_connection().await?;
        conn.execute(
            "INSERT INTO frameworks (id, name, description) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, description = excluded.description",
            libsql::params![
                framework.id.clone(),
                framework.name.clone(),
                framework.description.clone()
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert framework", e))?;
        Ok(())
    }

    async fn list_frameworks(&self) -> Result<Vec<Framework>> {
        let conn = self.db.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, name, description FROM frameworks ORDER BY id",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query frameworks", e))?;
        collect_rows(rows, row_to_framework).await
    }

    async fn count_frameworks(&self) -> Result<usize> {
        let conn = self.db.get_connection().await?;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM frameworks", libsql::params![])
            .await
            .map_err(|e| db_err("Failed to count frameworks", e))?;

        let row = rows
            .next()
            .await
            .map_err(|e| db_err("Failed to read row", e))?
            .ok_or_else(|| ToolkitError::Database {
                message: "COUNT query returned no rows".to_string(),
            })?;
        let count: i64 = row.get(0).map_err(|e| db_err("Failed to read count", e))?;
        Ok(count as usize)
    }

    async fn insert_control(&self, control: &Control) -> Result<()> {
        let conn = self.db.get_connection().await?;
        conn.execute(
            "INSERT INTO controls (id, framework_id, title, description, category)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
               framework_id = excluded.framework_id,
               title = excluded.title,
               description = excluded.description,
               category = excluded.category",
            libsql::params![
                control.id.clone(),
                control.framework_id.clone(),
                control.title.clone(),
                control.description.clone(),
                control.category.clone()
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert control", e))?;
        Ok(())
    }

    async fn list_controls(&self, framework_id: Option<&str>) -> Result<Vec<Control>> {
        let conn = self.db.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, framework_id, title, description, category FROM controls ORDER BY id",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query controls", e))?;
        let mut controls = collect_rows(rows, row_to_control).await?;
        if let Some(framework_id) = framework_id {
            controls.retain(|c| c.framework_id == framework_id);
        }
        Ok(controls)
    }

    async fn insert_lab(&self, lab: &Lab) -> Result<()> {
        let conn = self.db.get_connection().await?;
        conn.execute(
            "INSERT INTO labs (id, name, repo_path, aws_services, evidence_types)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
               name = excluded.name,
               repo_path = excluded.repo_path,
               aws_services = excluded.aws_services,
               evidence_types = excluded.evidence_types",
            libsql::params![
                lab.id.clone(),
                lab.name.clone(),
                lab.repo_path.clone(),
                join_csv(&lab.aws_services),
                join_csv(&lab.evidence_types)
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert lab", e))?;
        Ok(())
    }

    async fn list_labs(&self, service: Option<&str>) -> Result<Vec<Lab>> {
        let conn = self.db.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, name, repo_path, aws_services, evidence_types FROM labs ORDER BY id",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query labs", e))?;
        let mut labs = collect_rows(rows, row_to_lab).await?;
        if let Some(service) = service {
            labs.retain(|lab| lab_matches_service(lab, service));
        }
        Ok(labs)
    }

    async fn create_project(&self, project: &mut Project) -> Result<()> {
        let id = Uuid::new_v4();
        project.id = Some(id);

        let conn = self.db.get_connection().await?;
        conn.execute(
            "INSERT INTO projects (id, name, description, status, target_frameworks)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                id.to_string(),
                project.name.clone(),
                project.description.clone(),
                project.status.clone(),
                join_csv(&project.target_frameworks)
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert project", e))?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.db.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, name, description, status, target_frameworks FROM projects ORDER BY name",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query projects", e))?;
        collect_rows(rows, row_to_project).await
    }

    async fn create_evidence(&self, item: &mut EvidenceItem) -> Result<()> {
        let id = Uuid::new_v4();
        item.id = Some(id);

        let conn = self.db.get_connection().await?;
        conn.execute(
            "INSERT INTO evidence_items (id, project_id, control_id, lab_id, kind, location, collected_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                id.to_string(),
                item.project_id.clone(),
                item.control_id.clone(),
                item.lab_id.clone(),
                item.kind.clone(),
                item.location.clone(),
                format_datetime(&item.collected_at)
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert evidence item", e))?;
        Ok(())
    }

    async fn list_evidence(
        &self,
        project_id: Option<&str>,
        control_id: Option<&str>,
    ) -> Result<Vec<EvidenceItem>> {
        let conn = self.db.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, project_id, control_id, lab_id, kind, location, collected_at
                 FROM evidence_items ORDER BY collected_at DESC",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query evidence items", e))?;
        let mut items = collect_rows(rows, row_to_evidence).await?;
        if let Some(project_id) = project_id {
            items.retain(|e| e.project_id == project_id);
        }
        if let Some(control_id) = control_id {
            items.retain(|e| e.control_id == control_id);
        }
        Ok(items)
    }

    async fn create_task(&self, task: &mut RemediationTask) -> Result<()> {
        let id = Uuid::new_v4();
        task.id = Some(id);

        let conn = self.db.get_connection().await?;
        conn.execute(
            "INSERT INTO remediation_tasks (id, project_id, control_id, title, description, owner, status, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            libsql::params![
                id.to_string(),
                task.project_id.clone(),
                task.control_id.clone(),
                task.title.clone(),
                task.description.clone(),
                task.owner.clone(),
                task.status.clone(),
                task.due_date.as_ref().map(format_datetime)
            ],
        )
        .await
        .map_err(|e| db_err("Failed to insert task", e))?;
        Ok(())
    }

    async fn list_tasks(
        &self,
        project_id: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<RemediationTask>> {
        let conn = self.db.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, project_id, control_id, title, description, owner, status, due_date
                 FROM remediation_tasks",
                libsql::params![],
            )
            .await
            .map_err(|e| db_err("Failed to query tasks", e))?;
        let mut tasks = collect_rows(rows, row_to_task).await?;
        if let Some(project_id) = project_id {
            tasks.retain(|t| t.project_id == project_id);
        }
        if let Some(status) = status {
            tasks.retain(|t| t.status == status);
        }
        tasks.sort_by(compare_due_dates);
        Ok(tasks)
    }
}
