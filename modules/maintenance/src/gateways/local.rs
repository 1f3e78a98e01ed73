use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::MaintenanceApi,
    error::MaintenanceError,
    model::{
        ImageRef, ImageUpload, MaintenanceRequest, Outcome, RequestDraft, RequestStats, Role,
        StatusFilter, User,
    },
};
use crate::domain::{service::Service, session::Session, views::RoleView};

/// Local implementation of the MaintenanceApi trait that delegates to the domain service
pub struct MaintenanceLocalClient {
    service: Arc<Service>,
    session: Arc<Session>,
}

impl MaintenanceLocalClient {
    pub fn new(service: Arc<Service>, session: Arc<Session>) -> Self {
        Self { service, session }
    }
}

#[async_trait]
impl MaintenanceApi for MaintenanceLocalClient {
    async fn login(
        &self,
        email: &str,
        role: Option<Role>,
    ) -> Result<Option<User>, MaintenanceError> {
        let user = self.service.login_or_create(email, role).await?;
        if let Some(user) = &user {
            self.session.set_current(Some(user)).await?;
        }
        Ok(user)
    }

    async fn logout(&self) -> Result<(), MaintenanceError> {
        Ok(self.session.logout().await?)
    }

    async fn current_user(&self) -> Result<Option<User>, MaintenanceError> {
        Ok(self.session.current().await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, MaintenanceError> {
        Ok(self.service.list_users().await?)
    }

    async fn submit_request(
        &self,
        actor: &User,
        draft: RequestDraft,
        uploads: Vec<ImageUpload>,
    ) -> Result<Outcome<MaintenanceRequest>, MaintenanceError> {
        Ok(self.service.submit_request(actor, draft, uploads).await?)
    }

    async fn assign_request(
        &self,
        actor: &User,
        request_id: Uuid,
        manager_id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError> {
        Ok(self
            .service
            .assign_request(actor, request_id, manager_id)
            .await?)
    }

    async fn start_work(
        &self,
        actor: &User,
        request_id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError> {
        Ok(self.service.start_work(actor, request_id).await?)
    }

    async fn complete_work(
        &self,
        actor: &User,
        request_id: Uuid,
        report: &str,
        uploads: Vec<ImageUpload>,
    ) -> Result<Outcome<MaintenanceRequest>, MaintenanceError> {
        Ok(self
            .service
            .complete_work(actor, request_id, report, uploads)
            .await?)
    }

    async fn approve_request(
        &self,
        actor: &User,
        request_id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError> {
        Ok(self.service.approve_request(actor, request_id).await?)
    }

    async fn reject_request(
        &self,
        actor: &User,
        request_id: Uuid,
        reason: &str,
    ) -> Result<MaintenanceRequest, MaintenanceError> {
        Ok(self
            .service
            .reject_request(actor, request_id, reason)
            .await?)
    }

    async fn reopen_request(
        &self,
        actor: &User,
        request_id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError> {
        Ok(self.service.reopen_request(actor, request_id).await?)
    }

    async fn get_request(&self, request_id: Uuid) -> Result<MaintenanceRequest, MaintenanceError> {
        Ok(self.service.get_request(request_id).await?)
    }

    async fn visible_requests(
        &self,
        actor: &User,
        filter: StatusFilter,
    ) -> Result<Vec<MaintenanceRequest>, MaintenanceError> {
        let view = RoleView::build(&self.service, actor).await?;
        Ok(view.filtered(filter).into_iter().cloned().collect())
    }

    async fn request_stats(&self, actor: &User) -> Result<RequestStats, MaintenanceError> {
        let view = RoleView::build(&self.service, actor).await?;
        Ok(view.stats())
    }

    async fn image_data(&self, image: &ImageRef) -> Result<Option<String>, MaintenanceError> {
        Ok(self.service.image_data(image).await?)
    }
}
