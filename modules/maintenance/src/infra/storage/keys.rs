/// Names of the four persisted regions for a given prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub users: String,
    pub requests: String,
    pub images: String,
    pub current_user: String,
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            users: format!("{prefix}_users"),
            requests: format!("{prefix}_requests"),
            images: format!("{prefix}_images"),
            current_user: format!("{prefix}_current_user"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix("property_mgmt")
    }
}
