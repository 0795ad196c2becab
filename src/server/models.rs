//! Request payloads and list-query parameters for the HTTP API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `planning` when omitted.
    pub status: Option<String>,
    pub target_frameworks: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEvidence {
    pub project_id: String,
    pub control_id: String,
    pub lab_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    /// Defaults to the current time when omitted.
    pub collected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub project_id: String,
    pub control_id: String,
    pub title: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    /// Defaults to `open` when omitted.
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ControlsQuery {
    pub framework_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LabsQuery {
    pub service: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceQuery {
    pub project_id: Option<String>,
    pub control_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub project_id: Option<String>,
    pub status: Option<String>,
}
