use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ccrt_backend::domain::{Control, Framework, Lab};
use ccrt_backend::server::create_server;
use ccrt_backend::storage::{InMemoryStorage, Storage};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn seeded_app() -> Result<Router> {
    let storage = InMemoryStorage::new();

    storage
        .insert_framework(&Framework {
            id: "soc2_tsc2017".to_string(),
            name: "SOC 2 Trust Services Criteria".to_string(),
            description: None,
        })
        .await?;
    storage
        .insert_framework(&Framework {
            id: "iso27001_2022".to_string(),
            name: "ISO/IEC 27001:2022".to_string(),
            description: Some("Information security management".to_string()),
        })
        .await?;

    storage
        .insert_control(&Control {
            id: "A.5.1".to_string(),
            framework_id: "iso27001_2022".to_string(),
            title: "Policies for information security".to_string(),
            description: None,
            category: Some("organizational".to_string()),
        })
        .await?;
    storage
        .insert_control(&Control {
            id: "CC6.1".to_string(),
            framework_id: "soc2_tsc2017".to_string(),
            title: "Logical access security".to_string(),
            description: None,
            category: None,
        })
        .await?;

    storage
        .insert_lab(&Lab {
            id: "security_monitoring_baseline".to_string(),
            name: "Security Monitoring Baseline".to_string(),
            repo_path: Some("labs/security-monitoring-baseline".to_string()),
            aws_services: vec!["CloudTrail".to_string(), "Security Hub".to_string()],
            evidence_types: vec!["json".to_string()],
        })
        .await?;
    storage
        .insert_lab(&Lab {
            id: "ec2_inventory".to_string(),
            name: "EC2 Inventory Lab".to_string(),
            repo_path: None,
            aws_services: vec!["EC2".to_string()],
            evidence_types: vec!["csv".to_string()],
        })
        .await?;

    let storage: Arc<dyn Storage> = Arc::new(storage);
    Ok(create_server(storage))
}

async fn get_json(app: &Router, uri: &str) -> Result<Value> {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    let body = hyper::body::to_bytes(response.into_body()).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn post_json(app: &Router, uri: &str, payload: Value) -> Result<Value> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload)?))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK, "POST {uri}");
    let body = hyper::body::to_bytes(response.into_body()).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn health_reports_healthy() -> Result<()> {
    let app = seeded_app().await?;
    let value = get_json(&app, "/health").await?;
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["service"], "ccrt-backend");
    Ok(())
}

#[tokio::test]
async fn frameworks_are_listed_ordered_by_id() -> Result<()> {
    let app = seeded_app().await?;
    let value = get_json(&app, "/frameworks").await?;
    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["iso27001_2022", "soc2_tsc2017"]);
    Ok(())
}

#[tokio::test]
async fn controls_can_be_filtered_by_framework() -> Result<()> {
    let app = seeded_app().await?;

    let all = get_json(&app, "/controls").await?;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let iso = get_json(&app, "/controls?framework_id=iso27001_2022").await?;
    let iso = iso.as_array().unwrap();
    assert_eq!(iso.len(), 1);
    assert_eq!(iso[0]["id"], "A.5.1");

    let none = get_json(&app, "/controls?framework_id=nist_800_53").await?;
    assert!(none.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn labs_filter_by_service_and_expose_lists() -> Result<()> {
    let app = seeded_app().await?;

    let hits = get_json(&app, "/labs?service=Security%20Hub").await?;
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], "security_monitoring_baseline");
    assert_eq!(
        hits[0]["aws_services"],
        json!(["CloudTrail", "Security Hub"])
    );

    let all = get_json(&app, "/labs").await?;
    assert_eq!(all.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn create_project_applies_defaults_and_lists_by_name() -> Result<()> {
    let app = seeded_app().await?;

    let created = post_json(
        &app,
        "/projects",
        json!({
            "name": "SaaS SOC 2 readiness",
            "target_frameworks": ["soc2_tsc2017"]
        }),
    )
    .await?;
    assert!(created["id"].as_str().is_some());
    assert_eq!(created["status"], "planning");
    assert_eq!(created["target_frameworks"], json!(["soc2_tsc2017"]));

    post_json(
        &app,
        "/projects",
        json!({ "name": "ACME ISO 27001 readiness", "status": "in_progress" }),
    )
    .await?;

    let listed = get_json(&app, "/projects").await?;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["ACME ISO 27001 readiness", "SaaS SOC 2 readiness"]);
    Ok(())
}

#[tokio::test]
async fn create_evidence_defaults_collected_at() -> Result<()> {
    let app = seeded_app().await?;

    let created = post_json(
        &app,
        "/evidence",
        json!({
            "project_id": "p1",
            "control_id": "A.5.1",
            "lab_id": "ec2_inventory",
            "type": "csv",
            "location": "s3://evidence/ec2-inventory.csv"
        }),
    )
    .await?;
    assert!(created["id"].as_str().is_some());
    assert!(created["collected_at"].as_str().is_some());
    assert_eq!(created["type"], "csv");

    let listed = get_json(&app, "/evidence?project_id=p1&control_id=A.5.1").await?;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let other = get_json(&app, "/evidence?project_id=other").await?;
    assert!(other.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn tasks_default_to_open_and_filter_by_status() -> Result<()> {
    let app = seeded_app().await?;

    let created = post_json(
        &app,
        "/tasks",
        json!({
            "project_id": "p1",
            "control_id": "A.5.1",
            "title": "Enable org-wide CloudTrail",
            "due_date": "2026-09-01T00:00:00Z"
        }),
    )
    .await?;
    assert_eq!(created["status"], "open");

    post_json(
        &app,
        "/tasks",
        json!({
            "project_id": "p1",
            "control_id": "CC6.1",
            "title": "Document access review",
            "status": "done"
        }),
    )
    .await?;

    let open = get_json(&app, "/tasks?project_id=p1&status=open").await?;
    let open = open.as_array().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["title"], "Enable org-wide CloudTrail");

    // Dated tasks come before undated ones
    let all = get_json(&app, "/tasks").await?;
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        ["Enable org-wide CloudTrail", "Document access review"]
    );
    Ok(())
}
