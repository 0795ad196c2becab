use crate::common::error::Result;
use crate::domain::*;
use async_trait::async_trait;

/// Storage trait for the catalog (frameworks, controls, labs) and the
/// mutable entities (projects, evidence items, remediation tasks).
///
/// List operations encode the API's ordering contract: frameworks, controls,
/// and labs by id; projects by name; evidence newest-first; tasks by due date
/// with undated tasks last. `create_*` methods assign a fresh UUID and write
/// it back through the `&mut` argument.
#[async_trait]
pub trait Storage: Send + Sync {
    // Framework operations
    async fn insert_framework(&self, framework: &Framework) -> Result<()>;
    async fn list_frameworks(&self) -> Result<Vec<Framework>>;
    async fn count_frameworks(&self) -> Result<usize>;

    // Control operations
    async fn insert_control(&self, control: &Control) -> Result<()>;
    async fn list_controls(&self, framework_id: Option<&str>) -> Result<Vec<Control>>;

    // Lab operations
    async fn insert_lab(&self, lab: &Lab) -> Result<()>;
    async fn list_labs(&self, service: Option<&str>) -> Result<Vec<Lab>>;

    // Readiness project operations
    async fn create_project(&self, project: &mut Project) -> Result<()>;
    async fn list_projects(&self) -> Result<Vec<Project>>;

    // Evidence operations
    async fn create_evidence(&self, item: &mut EvidenceItem) -> Result<()>;
    async fn list_evidence(
        &self,
        project_id: Option<&str>,
        control_id: Option<&str>,
    ) -> Result<Vec<EvidenceItem>>;

    // Remediation task operations
    async fn create_task(&self, task: &mut RemediationTask) -> Result<()>;
    async fn list_tasks(
        &self,
        project_id: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<RemediationTask>>;
}

/// Case-insensitive match of a service query against a lab's service list.
/// Mirrors the substring semantics of the original `LIKE` filter, applied
/// per stored value.
pub(crate) fn lab_matches_service(lab: &Lab, service: &str) -> bool {
    let needle = service.to_lowercase();
    lab.aws_services
        .iter()
        .any(|s| s.to_lowercase().contains(&needle))
}

/// Ordering for remediation tasks: ascending due date, undated tasks last.
pub(crate) fn compare_due_dates(a: &RemediationTask, b: &RemediationTask) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (&a.due_date, &b.due_date) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
