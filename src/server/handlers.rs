use crate::common::constants::{DEFAULT_PROJECT_STATUS, DEFAULT_TASK_STATUS};
use crate::domain::{EvidenceItem, Project, RemediationTask};
use crate::server::models::{
    ControlsQuery, CreateEvidence, CreateProject, CreateTask, EvidenceQuery, LabsQuery, TasksQuery,
};
use crate::storage::Storage;
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use std::sync::Arc;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ccrt-backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List all frameworks, ordered by id.
pub async fn list_frameworks(
    Extension(storage): Extension<Arc<dyn Storage>>,
) -> impl IntoResponse {
    match storage.list_frameworks().await {
        Ok(frameworks) => Json(frameworks).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// List controls, optionally filtered by framework.
///
/// Example: `/controls?framework_id=iso27001_2022`.
pub async fn list_controls(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(query): Query<ControlsQuery>,
) -> impl IntoResponse {
    match storage.list_controls(query.framework_id.as_deref()).await {
        Ok(controls) => Json(controls).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// List labs, optionally filtered by AWS service.
///
/// Example: `/labs?service=Security Hub`.
pub async fn list_labs(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(query): Query<LabsQuery>,
) -> impl IntoResponse {
    match storage.list_labs(query.service.as_deref()).await {
        Ok(labs) => Json(labs).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// List all readiness projects, ordered by name.
pub async fn list_projects(Extension(storage): Extension<Arc<dyn Storage>>) -> impl IntoResponse {
    match storage.list_projects().await {
        Ok(projects) => Json(projects).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Create a new readiness project (e.g. "SaaS SOC 2 + ISO 27001 Readiness").
pub async fn create_project(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Json(payload): Json<CreateProject>,
) -> impl IntoResponse {
    let mut project = Project {
        id: None,
        name: payload.name,
        description: payload.description,
        status: payload
            .status
            .unwrap_or_else(|| DEFAULT_PROJECT_STATUS.to_string()),
        target_frameworks: payload.target_frameworks.unwrap_or_default(),
    };

    match storage.create_project(&mut project).await {
        Ok(()) => Json(project).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// List evidence items, optionally filtered by project and control,
/// newest first.
pub async fn list_evidence(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(query): Query<EvidenceQuery>,
) -> impl IntoResponse {
    match storage
        .list_evidence(query.project_id.as_deref(), query.control_id.as_deref())
        .await
    {
        Ok(items) => Json(items).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Record a new evidence item for a project/control pair, e.g. a CSV from
/// the EC2 inventory lab linked to an asset-management control.
pub async fn create_evidence(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Json(payload): Json<CreateEvidence>,
) -> impl IntoResponse {
    let mut item = EvidenceItem {
        id: None,
        project_id: payload.project_id,
        control_id: payload.control_id,
        lab_id: payload.lab_id,
        kind: payload.kind,
        location: payload.location,
        collected_at: payload.collected_at.unwrap_or_else(Utc::now),
    };

    match storage.create_evidence(&mut item).await {
        Ok(()) => Json(item).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// List remediation tasks, optionally filtered by project and status,
/// ordered by due date with undated tasks last.
pub async fn list_tasks(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(query): Query<TasksQuery>,
) -> impl IntoResponse {
    match storage
        .list_tasks(query.project_id.as_deref(), query.status.as_deref())
        .await
    {
        Ok(tasks) => Json(tasks).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Create a new remediation task for a project/control pair.
pub async fn create_task(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Json(payload): Json<CreateTask>,
) -> impl IntoResponse {
    let mut task = RemediationTask {
        id: None,
        project_id: payload.project_id,
        control_id: payload.control_id,
        title: payload.title,
        description: payload.description,
        owner: payload.owner,
        status: payload
            .status
            .unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string()),
        due_date: payload.due_date,
    };

    match storage.create_task(&mut task).await {
        Ok(()) => Json(task).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
