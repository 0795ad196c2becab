//! YAML structure of the control catalog file.

use serde::{Deserialize, Serialize};

/// Top-level catalog file: frameworks (with nested controls) and labs.
/// Both keys may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub frameworks: Vec<CatalogFramework>,

    #[serde(default)]
    pub labs: Vec<CatalogLab>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFramework {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub controls: Vec<CatalogControl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogControl {
    /// Framework-native control identifier (e.g. `A.5.1`), used verbatim as
    /// the control's primary key.
    pub control_id: String,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogLab {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub repo_path: Option<String>,

    #[serde(default)]
    pub aws_services: Vec<String>,

    #[serde(default)]
    pub evidence_types: Vec<String>,
}
