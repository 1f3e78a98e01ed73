//! Repository implementations over a [`KeyValueStore`].
//!
//! Each region is read whole, modified and written back whole. A per-region
//! async mutex serializes read-modify-write within this process; separate
//! processes sharing a store are last-write-wins.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::contract::model::{
    ImageRef, ImageUpload, MaintenanceRequest, NewRequest, RequestPatch, RequestStatus,
    StoredImage, User,
};
use crate::domain::repo::{
    ImagesRepository, RequestsRepository, SessionRepository, UsersRepository,
};
use crate::infra::storage::entity::{ImageMap, ImageRecord, RequestRecord, UserRecord};
use crate::infra::storage::kv::{read_json, write_json, KeyValueStore};
use crate::infra::storage::mapper::{
    record_to_image, record_to_request, record_to_user, request_to_record, user_to_record,
};

// -------- users --------

pub struct KvUsersRepository {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl KvUsersRepository {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> anyhow::Result<Vec<UserRecord>> {
        let records = read_json::<Vec<UserRecord>>(self.kv.as_ref(), &self.key)
            .await
            .context("failed to read users")?;
        Ok(records.unwrap_or_default())
    }
}

#[async_trait]
impl UsersRepository for KvUsersRepository {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        self.load().await?.into_iter().map(record_to_user).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.load()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .map(record_to_user)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.load()
            .await?
            .into_iter()
            .find(|u| u.email == email)
            .map(record_to_user)
            .transpose()
    }

    async fn insert(&self, user: User) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        records.push(user_to_record(&user));
        write_json(self.kv.as_ref(), &self.key, &records)
            .await
            .context("failed to write users")
    }
}

// -------- requests --------

pub struct KvRequestsRepository {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl KvRequestsRepository {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> anyhow::Result<Vec<RequestRecord>> {
        let records = read_json::<Vec<RequestRecord>>(self.kv.as_ref(), &self.key)
            .await
            .context("failed to read requests")?;
        Ok(records.unwrap_or_default())
    }

    async fn save(&self, records: &[RequestRecord]) -> anyhow::Result<()> {
        write_json(self.kv.as_ref(), &self.key, records)
            .await
            .context("failed to write requests")
    }
}

#[async_trait]
impl RequestsRepository for KvRequestsRepository {
    async fn list(&self) -> anyhow::Result<Vec<MaintenanceRequest>> {
        self.load()
            .await?
            .into_iter()
            .map(record_to_request)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<MaintenanceRequest>> {
        self.load()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .map(record_to_request)
            .transpose()
    }

    async fn create(&self, draft: NewRequest) -> anyhow::Result<MaintenanceRequest> {
        let request = MaintenanceRequest {
            id: Uuid::new_v4(),
            tenant_id: draft.tenant_id,
            tenant_name: draft.tenant_name,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            priority: draft.priority,
            status: RequestStatus::Pending,
            images: draft.images,
            created_at: Utc::now(),
            assigned_to: None,
            assigned_by: None,
            assigned_at: None,
            completed_at: None,
            completion_report: None,
            completion_images: None,
            reviewed_at: None,
            rejection_reason: None,
        };

        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        records.push(request_to_record(&request));
        self.save(&records).await?;
        Ok(request)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: RequestPatch,
    ) -> anyhow::Result<Option<MaintenanceRequest>> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let Some(slot) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        let mut request = record_to_request(slot.clone())?;
        patch.apply_to(&mut request);
        *slot = request_to_record(&request);

        self.save(&records).await?;
        Ok(Some(request))
    }
}

// -------- images --------

pub struct KvImagesRepository {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl KvImagesRepository {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> anyhow::Result<ImageMap> {
        let images = read_json::<ImageMap>(self.kv.as_ref(), &self.key)
            .await
            .context("failed to read images")?;
        Ok(images.unwrap_or_default())
    }
}

/// `data:<mime>;base64,<payload>`
pub fn encode_data_url(content_type: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{content_type};base64,{payload}")
}

#[async_trait]
impl ImagesRepository for KvImagesRepository {
    async fn save(&self, upload: ImageUpload) -> anyhow::Result<ImageRef> {
        let record = ImageRecord {
            data: encode_data_url(&upload.content_type, &upload.bytes),
            size: upload.size(),
            name: upload.name,
            content_type: upload.content_type,
            uploaded_at: Utc::now(),
        };

        let _guard = self.write_lock.lock().await;
        let mut images = self.load().await?;
        let mut image = ImageRef::generate();
        while images.contains_key(image.as_str()) {
            image = ImageRef::generate();
        }
        images.insert(image.as_str().to_string(), record);

        write_json(self.kv.as_ref(), &self.key, &images)
            .await
            .context("failed to write images")?;
        Ok(image)
    }

    async fn get(&self, image: &ImageRef) -> anyhow::Result<Option<StoredImage>> {
        Ok(self.load().await?.remove(image.as_str()).map(record_to_image))
    }

    async fn remove(&self, image: &ImageRef) -> anyhow::Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut images = self.load().await?;
        if images.remove(image.as_str()).is_none() {
            return Ok(false);
        }
        write_json(self.kv.as_ref(), &self.key, &images)
            .await
            .context("failed to write images")?;
        Ok(true)
    }
}

// -------- session --------

pub struct KvSessionRepository {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl KvSessionRepository {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SessionRepository for KvSessionRepository {
    async fn load(&self) -> anyhow::Result<Option<User>> {
        read_json::<UserRecord>(self.kv.as_ref(), &self.key)
            .await
            .context("failed to read current user")?
            .map(record_to_user)
            .transpose()
    }

    async fn store(&self, user: Option<&User>) -> anyhow::Result<()> {
        match user {
            Some(user) => write_json(self.kv.as_ref(), &self.key, &user_to_record(user))
                .await
                .context("failed to write current user"),
            None => self
                .kv
                .remove(&self.key)
                .await
                .context("failed to clear current user"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::kv::MemoryStore;

    #[test]
    fn data_url_matches_browser_encoding() {
        assert_eq!(
            encode_data_url("image/png", b"hello"),
            "data:image/png;base64,aGVsbG8="
        );
    }

    #[tokio::test]
    async fn image_refs_are_fresh_and_reads_are_stable() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = KvImagesRepository::new(kv, "images");

        let a = repo
            .save(ImageUpload::new("a.jpg", "image/jpeg", vec![1, 2, 3]))
            .await
            .unwrap();
        let b = repo
            .save(ImageUpload::new("a.jpg", "image/jpeg", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_ne!(a, b);

        let first = repo.get(&a).await.unwrap().unwrap();
        let second = repo.get(&a).await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.size, 3);
        assert_eq!(first.content_type, "image/jpeg");

        assert!(repo.remove(&a).await.unwrap());
        assert!(!repo.remove(&a).await.unwrap());
        assert!(repo.get(&a).await.unwrap().is_none());
        assert!(repo.get(&b).await.unwrap().is_some());
    }

    fn draft() -> NewRequest {
        NewRequest {
            tenant_id: Uuid::new_v4(),
            tenant_name: "John Tenant".into(),
            title: "Leak".into(),
            description: "Sink leaking".into(),
            category: "Plumbing".into(),
            priority: crate::contract::model::Priority::High,
            images: vec![ImageRef::from("img_a"), ImageRef::from("img_b")],
        }
    }

    #[tokio::test]
    async fn create_keeps_draft_fields_and_issues_fresh_ids() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = KvRequestsRepository::new(kv, "requests");

        let input = draft();
        let first = repo.create(input.clone()).await.unwrap();
        let second = repo.create(input.clone()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.status, RequestStatus::Pending);
        assert_eq!(first.tenant_id, input.tenant_id);
        assert_eq!(first.tenant_name, input.tenant_name);
        assert_eq!(first.title, input.title);
        assert_eq!(first.description, input.description);
        assert_eq!(first.category, input.category);
        assert_eq!(first.priority, input.priority);
        assert_eq!(first.images, input.images);
        assert_eq!(first.assigned_to, None);

        let listed = repo.list().await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn update_merges_given_fields_only() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = KvRequestsRepository::new(kv, "requests");
        let created = repo.create(draft()).await.unwrap();

        let manager = Uuid::new_v4();
        let patch = RequestPatch {
            assigned_to: Some(manager),
            ..RequestPatch::status(RequestStatus::Assigned)
        };
        let updated = repo.update(created.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.status, RequestStatus::Assigned);
        assert_eq!(updated.assigned_to, Some(manager));
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_none() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = KvRequestsRepository::new(kv, "requests");
        repo.create(draft()).await.unwrap();

        let patch = RequestPatch::status(RequestStatus::Approved);
        assert_eq!(repo.update(Uuid::new_v4(), patch).await.unwrap(), None);
    }

    #[tokio::test]
    async fn session_pointer_round_trips_and_clears() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = KvSessionRepository::new(kv.clone(), "current_user");
        assert_eq!(repo.load().await.unwrap(), None);

        let user = User {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            name: "admin".into(),
            role: crate::contract::model::Role::Admin,
            created_at: Utc::now(),
        };
        repo.store(Some(&user)).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(user));

        repo.store(None).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), None);
        assert_eq!(kv.get("current_user").await.unwrap(), None);
    }
}
