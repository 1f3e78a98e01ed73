use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::MaintenanceError,
    model::{
        ImageRef, ImageUpload, MaintenanceRequest, Outcome, RequestDraft, RequestStats, Role,
        StatusFilter, User,
    },
};

/// Public API of the maintenance module.
///
/// Lifecycle operations take the acting user explicitly; nothing reads an
/// ambient "current user".
#[async_trait]
pub trait MaintenanceApi: Send + Sync {
    /// Log in by email. Unknown emails are only registered when `role` is given.
    async fn login(&self, email: &str, role: Option<Role>)
        -> Result<Option<User>, MaintenanceError>;

    /// Clear the current session.
    async fn logout(&self) -> Result<(), MaintenanceError>;

    /// The session's current user, if any.
    async fn current_user(&self) -> Result<Option<User>, MaintenanceError>;

    async fn list_users(&self) -> Result<Vec<User>, MaintenanceError>;

    /// Tenant files a new request, optionally with photos.
    async fn submit_request(
        &self,
        actor: &User,
        draft: RequestDraft,
        uploads: Vec<ImageUpload>,
    ) -> Result<Outcome<MaintenanceRequest>, MaintenanceError>;

    /// Admin hands a pending request to a property manager.
    async fn assign_request(
        &self,
        actor: &User,
        request_id: Uuid,
        manager_id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError>;

    async fn start_work(
        &self,
        actor: &User,
        request_id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError>;

    async fn complete_work(
        &self,
        actor: &User,
        request_id: Uuid,
        report: &str,
        uploads: Vec<ImageUpload>,
    ) -> Result<Outcome<MaintenanceRequest>, MaintenanceError>;

    async fn approve_request(
        &self,
        actor: &User,
        request_id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError>;

    async fn reject_request(
        &self,
        actor: &User,
        request_id: Uuid,
        reason: &str,
    ) -> Result<MaintenanceRequest, MaintenanceError>;

    /// Assigned manager resumes work on a rejected request.
    async fn reopen_request(
        &self,
        actor: &User,
        request_id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError>;

    async fn get_request(&self, request_id: Uuid) -> Result<MaintenanceRequest, MaintenanceError>;

    /// Requests the actor's role may see, narrowed by `filter`.
    async fn visible_requests(
        &self,
        actor: &User,
        filter: StatusFilter,
    ) -> Result<Vec<MaintenanceRequest>, MaintenanceError>;

    async fn request_stats(&self, actor: &User) -> Result<RequestStats, MaintenanceError>;

    /// Data URL of a stored image, `None` for unknown refs.
    async fn image_data(&self, image: &ImageRef) -> Result<Option<String>, MaintenanceError>;
}
