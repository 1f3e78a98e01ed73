#![allow(dead_code)]

use std::sync::Arc;

use maintenance::contract::client::MaintenanceApi;
use maintenance::contract::model::{ImageUpload, Priority, RequestDraft, User};
use maintenance::infra::storage::{KeyValueStore, MemoryStore};
use maintenance::{Maintenance, MaintenanceConfig};

pub struct Harness {
    pub module: Maintenance,
    pub api: Arc<dyn MaintenanceApi>,
    pub kv: Arc<dyn KeyValueStore>,
    pub tenant: User,
    pub admin: User,
    pub manager: User,
}

pub async fn seeded() -> Harness {
    seeded_over(Arc::new(MemoryStore::new())).await
}

pub async fn seeded_over(kv: Arc<dyn KeyValueStore>) -> Harness {
    let module = Maintenance::new();
    module
        .init_with_store(kv.clone(), &MaintenanceConfig::default())
        .await
        .unwrap();
    let api = module.client().unwrap();

    let users = api.list_users().await.unwrap();
    let by_email = |email: &str| users.iter().find(|u| u.email == email).cloned().unwrap();

    Harness {
        tenant: by_email("tenant@example.com"),
        admin: by_email("admin@example.com"),
        manager: by_email("manager@example.com"),
        module,
        api,
        kv,
    }
}

pub fn leak_draft() -> RequestDraft {
    RequestDraft {
        title: "Leak".into(),
        description: "Sink leaking".into(),
        category: "Plumbing".into(),
        priority: Priority::High,
    }
}

pub fn jpeg(name: &str, size: usize) -> ImageUpload {
    ImageUpload::new(name, "image/jpeg", vec![0xAB; size])
}
