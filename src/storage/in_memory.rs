use super::traits::{compare_due_dates, lab_matches_service, Storage};
use crate::common::error::Result;
use crate::domain::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// In-memory storage implementation for development/testing.
pub struct InMemoryStorage {
    frameworks: Arc<Mutex<HashMap<String, Framework>>>,
    controls: Arc<Mutex<HashMap<String, Control>>>,
    labs: Arc<Mutex<HashMap<String, Lab>>>,
    projects: Arc<Mutex<HashMap<Uuid, Project>>>,
    evidence: Arc<Mutex<HashMap<Uuid, EvidenceItem>>>,
    tasks: Arc<Mutex<HashMap<Uuid, RemediationTask>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            frameworks: Arc::new(Mutex::new(HashMap::new())),
            controls: Arc::new(Mutex::new(HashMap::new())),
            labs: Arc::new(Mutex::new(HashMap::new())),
            projects: Arc::new(Mutex::new(HashMap::new())),
            evidence: Arc::new(Mutex::new(HashMap::new())),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_framework(&self, framework: &Framework) -> Result<()> {
        let mut frameworks = self.frameworks.lock().unwrap();
        frameworks.insert(framework.id.clone(), framework.clone());
        debug!("Inserted framework {}", framework.id);
        Ok(())
    }

    async fn list_frameworks(&self) -> Result<Vec<Framework>> {
        let frameworks = self.frameworks.lock().unwrap();
        let mut results: Vec<Framework> = frameworks.values().cloned().collect();
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }

    async fn count_frameworks(&self) -> Result<usize> {
        Ok(self.frameworks.lock().unwrap().len())
    }

    async fn insert_control(&self, control: &Control) -> Result<()> {
        let mut controls = self.controls.lock().unwrap();
        controls.insert(control.id.clone(), control.clone());
        debug!("Inserted control {}", control.id);
        Ok(())
    }

    async fn list_controls(&self, framework_id: Option<&str>) -> Result<Vec<Control>> {
        let controls = self.controls.lock().unwrap();
        let mut results: Vec<Control> = controls
            .values()
            .filter(|c| framework_id.map_or(true, |fw| c.framework_id == fw))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }

    async fn insert_lab(&self, lab: &Lab) -> Result<()> {
        let mut labs = self.labs.lock().unwrap();
        labs.insert(lab.id.clone(), lab.clone());
        debug!("Inserted lab {}", lab.id);
        Ok(())
    }

    async fn list_labs(&self, service: Option<&str>) -> Result<Vec<Lab>> {
        let labs = self.labs.lock().unwrap();
        let mut results: Vec<Lab> = labs
            .values()
            .filter(|lab| service.map_or(true, |s| lab_matches_service(lab, s)))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }

    async fn create_project(&self, project: &mut Project) -> Result<()> {
        let id = Uuid::new_v4();
        project.id = Some(id);

        let mut projects = self.projects.lock().unwrap();
        projects.insert(id, project.clone());

        debug!("Created project: {} with id {}", project.name, id);
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let projects = self.projects.lock().unwrap();
        let mut results: Vec<Project> = projects.values().cloned().collect();
        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }

    async fn create_evidence(&self, item: &mut EvidenceItem) -> Result<()> {
        let id = Uuid::new_v4();
        item.id = Some(id);

        let mut evidence = self.evidence.lock().unwrap();
        evidence.insert(id, item.clone());

        debug!("Created evidence item {} for project {}", id, item.project_id);
        Ok(())
    }

    async fn list_evidence(
        &self,
        project_id: Option<&str>,
        control_id: Option<&str>,
    ) -> Result<Vec<EvidenceItem>> {
        let evidence = self.evidence.lock().unwrap();
        let mut results: Vec<EvidenceItem> = evidence
            .values()
            .filter(|e| project_id.map_or(true, |p| e.project_id == p))
            .filter(|e| control_id.map_or(true, |c| e.control_id == c))
            .cloned()
            .collect();
        // Newest first
        results.sort_by(|a, b| b.collected_at.cmp(&a.collected_at));
        Ok(results)
    }

    async fn create_task(&self, task: &mut RemediationTask) -> Result<()> {
        let id = Uuid::new_v4();
        task.id = Some(id);

        let mut tasks = self.tasks.lock().unwrap();
        tasks.insert(id, task.clone());

        debug!("Created task: {} with id {}", task.title, id);
        Ok(())
    }

    async fn list_tasks(
        &self,
        project_id: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<RemediationTask>> {
        let tasks = self.tasks.lock().unwrap();
        let mut results: Vec<RemediationTask> = tasks
            .values()
            .filter(|t| project_id.map_or(true, |p| t.project_id == p))
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        results.sort_by(compare_due_dates);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn framework(id: &str) -> Framework {
        Framework {
            id: id.to_string(),
            name: format!("Framework {id}"),
            description: None,
        }
    }

    fn control(id: &str, framework_id: &str) -> Control {
        Control {
            id: id.to_string(),
            framework_id: framework_id.to_string(),
            title: format!("Control {id}"),
            description: None,
            category: None,
        }
    }

    fn lab(id: &str, services: &[&str]) -> Lab {
        Lab {
            id: id.to_string(),
            name: format!("Lab {id}"),
            repo_path: None,
            aws_services: services.iter().map(|s| s.to_string()).collect(),
            evidence_types: vec!["json".to_string()],
        }
    }

    #[tokio::test]
    async fn frameworks_are_listed_ordered_by_id() {
        let storage = InMemoryStorage::new();
        storage.insert_framework(&framework("soc2")).await.unwrap();
        storage.insert_framework(&framework("cis_aws")).await.unwrap();
        storage.insert_framework(&framework("iso27001")).await.unwrap();

        let ids: Vec<String> = storage
            .list_frameworks()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, ["cis_aws", "iso27001", "soc2"]);
        assert_eq!(storage.count_frameworks().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn controls_filter_by_framework() {
        let storage = InMemoryStorage::new();
        storage.insert_control(&control("A.5.1", "iso27001")).await.unwrap();
        storage.insert_control(&control("CC6.1", "soc2")).await.unwrap();
        storage.insert_control(&control("A.8.2", "iso27001")).await.unwrap();

        let iso: Vec<String> = storage
            .list_controls(Some("iso27001"))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(iso, ["A.5.1", "A.8.2"]);

        let all = storage.list_controls(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let none = storage.list_controls(Some("missing")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn lab_service_filter_is_case_insensitive_substring() {
        let storage = InMemoryStorage::new();
        storage
            .insert_lab(&lab("monitoring", &["CloudTrail", "Security Hub"]))
            .await
            .unwrap();
        storage.insert_lab(&lab("inventory", &["EC2"])).await.unwrap();

        let hits = storage.list_labs(Some("security hub")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "monitoring");

        // Substring of a stored value also matches
        let hits = storage.list_labs(Some("Trail")).await.unwrap();
        assert_eq!(hits.len(), 1);

        let misses = storage.list_labs(Some("Lambda")).await.unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn create_project_assigns_id() {
        let storage = InMemoryStorage::new();
        let mut project = Project {
            id: None,
            name: "SOC 2 readiness".to_string(),
            description: None,
            status: "planning".to_string(),
            target_frameworks: vec!["soc2".to_string()],
        };
        storage.create_project(&mut project).await.unwrap();
        assert!(project.id.is_some());

        let listed = storage.list_projects().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, project.id);
    }

    #[tokio::test]
    async fn evidence_is_listed_newest_first() {
        let storage = InMemoryStorage::new();
        let base = Utc::now();
        for (offset, project) in [(2, "p1"), (0, "p1"), (1, "p2")] {
            let mut item = EvidenceItem {
                id: None,
                project_id: project.to_string(),
                control_id: "A.5.1".to_string(),
                lab_id: None,
                kind: "json".to_string(),
                location: format!("s3://evidence/{offset}"),
                collected_at: base + Duration::hours(offset),
            };
            storage.create_evidence(&mut item).await.unwrap();
        }

        let all = storage.list_evidence(None, None).await.unwrap();
        let locations: Vec<&str> = all.iter().map(|e| e.location.as_str()).collect();
        assert_eq!(locations, ["s3://evidence/2", "s3://evidence/1", "s3://evidence/0"]);

        let p1 = storage.list_evidence(Some("p1"), None).await.unwrap();
        assert_eq!(p1.len(), 2);

        let p1_ctrl = storage
            .list_evidence(Some("p1"), Some("A.5.1"))
            .await
            .unwrap();
        assert_eq!(p1_ctrl.len(), 2);
    }

    #[tokio::test]
    async fn tasks_order_by_due_date_with_undated_last() {
        let storage = InMemoryStorage::new();
        let base = Utc::now();
        let due_dates = [Some(base + Duration::days(7)), None, Some(base + Duration::days(1))];
        for (i, due_date) in due_dates.into_iter().enumerate() {
            let mut task = RemediationTask {
                id: None,
                project_id: "p1".to_string(),
                control_id: "A.5.1".to_string(),
                title: format!("task {i}"),
                description: None,
                owner: None,
                status: if i == 1 { "done".to_string() } else { "open".to_string() },
                due_date,
            };
            storage.create_task(&mut task).await.unwrap();
        }

        let all = storage.list_tasks(None, None).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["task 2", "task 0", "task 1"]);

        let open = storage.list_tasks(Some("p1"), Some("open")).await.unwrap();
        assert_eq!(open.len(), 2);
    }
}
