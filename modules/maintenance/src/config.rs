use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;
use crate::domain::uploads::UploadPolicy;

/// Configuration for the maintenance module (`modules.maintenance` in the app config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaintenanceConfig {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "default_allowed_image_types")]
    pub allowed_image_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Lost on exit. `quota_bytes` emulates a browser storage limit.
    Memory {
        #[serde(default)]
        quota_bytes: Option<usize>,
    },
    /// Relative `dir` resolves against the app home directory.
    File {
        #[serde(default = "default_storage_dir")]
        dir: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File {
            dir: default_storage_dir(),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            seed_demo_data: default_seed_demo_data(),
            storage: StorageConfig::default(),
            max_image_bytes: default_max_image_bytes(),
            allowed_image_types: default_allowed_image_types(),
        }
    }
}

impl MaintenanceConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            uploads: UploadPolicy {
                max_bytes: self.max_image_bytes,
                allowed_types: self.allowed_image_types.clone(),
            },
        }
    }
}

fn default_key_prefix() -> String {
    "property_mgmt".to_string()
}

fn default_seed_demo_data() -> bool {
    true
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_max_image_bytes() -> u64 {
    UploadPolicy::default().max_bytes
}

fn default_allowed_image_types() -> Vec<String> {
    UploadPolicy::default().allowed_types
}
