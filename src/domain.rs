use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A regulatory framework from the control catalog (e.g. ISO 27001, SOC 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Framework {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// A single control within a framework. The id is the framework's own
/// control identifier (e.g. `A.5.1`, `CC6.1`), unique across the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub framework_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// A hands-on lab that produces evidence artifacts for one or more controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lab {
    pub id: String,
    pub name: String,
    pub repo_path: Option<String>,
    pub aws_services: Vec<String>,
    pub evidence_types: Vec<String>,
}

/// A readiness engagement tracking remediation against one or more
/// target frameworks. Storage assigns the id on create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub target_frameworks: Vec<String>,
}

/// An evidence artifact collected for a project/control pair, optionally
/// produced by a lab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: Option<Uuid>,
    pub project_id: String,
    pub control_id: String,
    pub lab_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub collected_at: DateTime<Utc>,
}

/// A remediation work item for a project/control pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationTask {
    pub id: Option<Uuid>,
    pub project_id: String,
    pub control_id: String,
    pub title: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
}
