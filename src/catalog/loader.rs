//! Catalog parsing, validation, and the idempotent startup seed step.

use crate::catalog::format::CatalogFile;
use crate::common::error::{Result, ToolkitError};
use crate::domain::{Control, Framework, Lab};
use crate::storage::Storage;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Counts from a seed run. `seeded` is false when the step was skipped
/// (storage already populated, or no catalog file to read).
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedSummary {
    pub seeded: bool,
    pub frameworks: usize,
    pub controls: usize,
    pub labs: usize,
}

/// Read and parse a catalog file from disk.
pub fn load_catalog(path: &Path) -> Result<CatalogFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        ToolkitError::Catalog(format!(
            "Failed to read catalog file '{}': {e}",
            path.display()
        ))
    })?;
    parse_catalog(&content)
}

/// Parse and validate a catalog from a YAML string.
pub fn parse_catalog(content: &str) -> Result<CatalogFile> {
    let catalog: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Reject catalogs with duplicate identifiers. Control ids must be unique
/// across the whole file, not just within their framework, because they
/// become primary keys.
fn validate_catalog(catalog: &CatalogFile) -> Result<()> {
    let mut framework_ids = HashSet::new();
    let mut control_ids = HashSet::new();
    for framework in &catalog.frameworks {
        if !framework_ids.insert(&framework.id) {
            return Err(ToolkitError::Catalog(format!(
                "Duplicate framework id: {}",
                framework.id
            )));
        }
        for control in &framework.controls {
            if !control_ids.insert(&control.control_id) {
                return Err(ToolkitError::Catalog(format!(
                    "Duplicate control id: {}",
                    control.control_id
                )));
            }
        }
    }

    let mut lab_ids = HashSet::new();
    for lab in &catalog.labs {
        if !lab_ids.insert(&lab.id) {
            return Err(ToolkitError::Catalog(format!("Duplicate lab id: {}", lab.id)));
        }
    }

    Ok(())
}

/// Seed storage from the catalog file if it has not been seeded yet.
///
/// Skips without touching storage when any framework rows already exist, and
/// when the catalog file is missing (nothing to seed). Labs are inserted
/// first, then frameworks with their nested controls.
pub async fn seed_if_empty(storage: &dyn Storage, path: &Path) -> Result<SeedSummary> {
    if storage.count_frameworks().await? > 0 {
        info!("Catalog already seeded, skipping");
        return Ok(SeedSummary::default());
    }

    if !path.exists() {
        warn!("Catalog file '{}' not found, nothing to seed", path.display());
        return Ok(SeedSummary::default());
    }

    let catalog = load_catalog(path)?;
    let mut summary = SeedSummary {
        seeded: true,
        ..Default::default()
    };

    for lab in &catalog.labs {
        storage
            .insert_lab(&Lab {
                id: lab.id.clone(),
                name: lab.name.clone(),
                repo_path: lab.repo_path.clone(),
                aws_services: lab.aws_services.clone(),
                evidence_types: lab.evidence_types.clone(),
            })
            .await?;
        summary.labs += 1;
    }

    for framework in &catalog.frameworks {
        storage
            .insert_framework(&Framework {
                id: framework.id.clone(),
                name: framework.name.clone(),
                description: framework.description.clone(),
            })
            .await?;
        summary.frameworks += 1;

        for control in &framework.controls {
            storage
                .insert_control(&Control {
                    id: control.control_id.clone(),
                    framework_id: framework.id.clone(),
                    title: control.title.clone(),
                    description: control.description.clone(),
                    category: control.category.clone(),
                })
                .await?;
            summary.controls += 1;
        }
    }

    info!(
        frameworks = summary.frameworks,
        controls = summary.controls,
        labs = summary.labs,
        "Seeded control catalog"
    );
    Ok(summary)
}
