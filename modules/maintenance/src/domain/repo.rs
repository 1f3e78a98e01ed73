use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{
    ImageRef, ImageUpload, MaintenanceRequest, NewRequest, RequestPatch, StoredImage, User,
};

/// Persistence the domain needs for users. Users are never updated or deleted.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// First user with this email; emails are not enforced unique.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn insert(&self, user: User) -> anyhow::Result<()>;
}

/// Persistence for maintenance requests. There is no delete.
#[async_trait]
pub trait RequestsRepository: Send + Sync {
    /// All requests in insertion order.
    async fn list(&self) -> anyhow::Result<Vec<MaintenanceRequest>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<MaintenanceRequest>>;
    /// Assign a fresh id, `created_at = now`, `status = pending`; append.
    async fn create(&self, draft: NewRequest) -> anyhow::Result<MaintenanceRequest>;
    /// Shallow merge; `Ok(None)` when the id is unknown.
    async fn update(
        &self,
        id: Uuid,
        patch: RequestPatch,
    ) -> anyhow::Result<Option<MaintenanceRequest>>;
}

/// Opaque blob storage for photos.
#[async_trait]
pub trait ImagesRepository: Send + Sync {
    /// Encode and store under a fresh ref; never overwrites.
    async fn save(&self, upload: ImageUpload) -> anyhow::Result<ImageRef>;
    async fn get(&self, image: &ImageRef) -> anyhow::Result<Option<StoredImage>>;
    /// Returns true if something was removed.
    async fn remove(&self, image: &ImageRef) -> anyhow::Result<bool>;
}

/// Storage for the single "current user" pointer.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load(&self) -> anyhow::Result<Option<User>>;
    async fn store(&self, user: Option<&User>) -> anyhow::Result<()>;
}
