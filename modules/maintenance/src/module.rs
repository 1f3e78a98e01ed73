use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, info};

use crate::config::{MaintenanceConfig, StorageConfig};
use crate::contract::client::MaintenanceApi;
use crate::domain::service::Service;
use crate::domain::session::Session;
use crate::gateways::local::MaintenanceLocalClient;
use crate::infra::events::LogEventPublisher;
use crate::infra::storage::seed::seed_missing;
use crate::infra::storage::{
    FileStore, KeyValueStore, KvImagesRepository, KvRequestsRepository, KvSessionRepository,
    KvUsersRepository, MemoryStore, StorageKeys,
};

/// Maintenance module: owns the wired service and session once initialized.
#[derive(Default)]
pub struct Maintenance {
    service: ArcSwapOption<Service>,
    session: ArcSwapOption<Session>,
}

impl Clone for Maintenance {
    fn clone(&self) -> Self {
        Self {
            service: ArcSwapOption::new(self.service.load_full()),
            session: ArcSwapOption::new(self.session.load_full()),
        }
    }
}

/// Open the configured backend. Relative file dirs resolve against `home_dir`.
pub async fn open_store(
    cfg: &MaintenanceConfig,
    home_dir: &Path,
) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    Ok(match &cfg.storage {
        StorageConfig::Memory {
            quota_bytes: Some(limit),
        } => Arc::new(MemoryStore::with_quota(*limit)),
        StorageConfig::Memory { quota_bytes: None } => Arc::new(MemoryStore::new()),
        StorageConfig::File { dir } => {
            let dir = if dir.is_absolute() {
                dir.clone()
            } else {
                home_dir.join(dir)
            };
            let store = FileStore::open(&dir).await?;
            debug!(dir = %store.dir().display(), "Opened file store");
            Arc::new(store)
        }
    })
}

impl Maintenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn init(&self, cfg: &MaintenanceConfig, home_dir: &Path) -> anyhow::Result<()> {
        let kv = open_store(cfg, home_dir).await?;
        self.init_with_store(kv, cfg).await
    }

    /// Wire repositories, service and session over an already opened store.
    pub async fn init_with_store(
        &self,
        kv: Arc<dyn KeyValueStore>,
        cfg: &MaintenanceConfig,
    ) -> anyhow::Result<()> {
        info!("Initializing maintenance module");

        let keys = StorageKeys::with_prefix(&cfg.key_prefix);
        if cfg.seed_demo_data {
            seed_missing(kv.as_ref(), &keys).await?;
        }

        let users = Arc::new(KvUsersRepository::new(kv.clone(), &keys.users));
        let requests = Arc::new(KvRequestsRepository::new(kv.clone(), &keys.requests));
        let images = Arc::new(KvImagesRepository::new(kv.clone(), &keys.images));
        let session_store = Arc::new(KvSessionRepository::new(kv, &keys.current_user));

        let service = Service::new(
            users.clone(),
            requests,
            images,
            Arc::new(LogEventPublisher),
            cfg.service_config(),
        );
        let session = Session::new(session_store, users);
        if let Some(user) = session.init().await? {
            debug!(user_id = %user.id, role = %user.role, "Session ready");
        }

        self.service.store(Some(Arc::new(service)));
        self.session.store(Some(Arc::new(session)));
        info!(prefix = %cfg.key_prefix, "Maintenance module initialized");
        Ok(())
    }

    pub fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    pub fn session(&self) -> anyhow::Result<Arc<Session>> {
        self.session
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Session not initialized"))
    }

    /// In-process client over the initialized service.
    pub fn client(&self) -> anyhow::Result<Arc<dyn MaintenanceApi>> {
        Ok(Arc::new(MaintenanceLocalClient::new(
            self.service()?,
            self.session()?,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_before_init_is_an_error() {
        let module = Maintenance::new();
        assert!(module.client().is_err());
    }

    #[tokio::test]
    async fn file_storage_dir_resolves_under_home() {
        let home = tempfile::tempdir().unwrap();
        let module = Maintenance::new();
        module
            .init(&MaintenanceConfig::default(), home.path())
            .await
            .unwrap();

        assert!(home.path().join("data/property_mgmt_users.json").is_file());
        assert!(home.path().join("data/property_mgmt_current_user.json").is_file());
    }
}
