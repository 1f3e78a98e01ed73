use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    ImageRef, ImageUpload, MaintenanceRequest, NewRequest, Outcome, RequestDraft, Role,
    StoredImage, User,
};
use crate::domain::error::DomainError;
use crate::domain::events::RequestEvent;
use crate::domain::lifecycle::{
    authorize, require_edge, require_text, LifecycleEvent, Transition,
};
use crate::domain::ports::EventPublisher;
use crate::domain::repo::{ImagesRepository, RequestsRepository, UsersRepository};
use crate::domain::uploads::{ImageBatch, UploadPolicy};

/// Domain service: user directory plus the request lifecycle.
/// Depends only on repository ports, not on storage types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    requests: Arc<dyn RequestsRepository>,
    images: Arc<dyn ImagesRepository>,
    events: Arc<dyn EventPublisher<RequestEvent>>,
    config: ServiceConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub uploads: UploadPolicy,
}

impl Service {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        requests: Arc<dyn RequestsRepository>,
        images: Arc<dyn ImagesRepository>,
        events: Arc<dyn EventPublisher<RequestEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            requests,
            images,
            events,
            config,
        }
    }

    // --- users ---

    #[instrument(name = "maintenance.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.list().await.map_err(DomainError::repository)
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.users.find_by_id(id).await.map_err(DomainError::repository)
    }

    pub async fn property_managers(&self) -> Result<Vec<User>, DomainError> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.role == Role::PropertyManager)
            .collect())
    }

    /// Existing email → stored user, whatever `role` says.
    /// Unknown email → a new user if `role` is given, otherwise `None`.
    #[instrument(name = "maintenance.service.login_or_create", skip(self), fields(email = %email))]
    pub async fn login_or_create(
        &self,
        email: &str,
        role: Option<Role>,
    ) -> Result<Option<User>, DomainError> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(DomainError::repository)?;
        if let Some(existing) = existing {
            debug!(user_id = %existing.id, "Found existing user");
            return Ok(Some(existing));
        }

        let Some(role) = role else {
            debug!("Unknown email and no role given");
            return Ok(None);
        };

        require_text("email", email)?;
        let name = email.split('@').next().unwrap_or(email).to_string();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name,
            role,
            created_at: Utc::now(),
        };
        self.users
            .insert(user.clone())
            .await
            .map_err(DomainError::repository)?;

        info!(user_id = %user.id, role = %user.role, "Registered new user");
        Ok(Some(user))
    }

    // --- requests: reads ---

    #[instrument(name = "maintenance.service.list_requests", skip(self))]
    pub async fn list_requests(&self) -> Result<Vec<MaintenanceRequest>, DomainError> {
        self.requests.list().await.map_err(DomainError::repository)
    }

    #[instrument(name = "maintenance.service.get_request", skip(self), fields(request_id = %id))]
    pub async fn get_request(&self, id: Uuid) -> Result<MaintenanceRequest, DomainError> {
        self.requests
            .find_by_id(id)
            .await
            .map_err(DomainError::repository)?
            .ok_or_else(|| DomainError::request_not_found(id))
    }

    pub async fn image(&self, image: &ImageRef) -> Result<Option<StoredImage>, DomainError> {
        self.images.get(image).await.map_err(DomainError::repository)
    }

    pub async fn image_data(&self, image: &ImageRef) -> Result<Option<String>, DomainError> {
        Ok(self.image(image).await?.map(|img| img.data))
    }

    // --- requests: lifecycle ---

    #[instrument(
        name = "maintenance.service.submit_request",
        skip(self, actor, draft, uploads),
        fields(tenant_id = %actor.id, uploads = uploads.len())
    )]
    pub async fn submit_request(
        &self,
        actor: &User,
        draft: RequestDraft,
        uploads: Vec<ImageUpload>,
    ) -> Result<Outcome<MaintenanceRequest>, DomainError> {
        info!("Submitting maintenance request");

        if actor.role != Role::Tenant {
            return Err(DomainError::not_permitted("only a tenant may file a request"));
        }
        require_text("title", &draft.title)?;
        require_text("description", &draft.description)?;
        require_text("category", &draft.category)?;

        let batch = self.config.uploads.filter(uploads);
        let warning = batch.warning();
        let images = self.upload_all(batch).await?;

        let new_request = NewRequest {
            tenant_id: actor.id,
            tenant_name: actor.name.clone(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            priority: draft.priority,
            images: images.clone(),
        };

        let request = match self.requests.create(new_request).await {
            Ok(request) => request,
            Err(e) => {
                self.rollback_images(&images).await;
                return Err(DomainError::repository(e));
            }
        };

        self.events.publish(&RequestEvent::Submitted {
            id: request.id,
            tenant_id: request.tenant_id,
            at: request.created_at,
        });
        info!(request_id = %request.id, "Request submitted");
        Ok(Outcome::new(request).with_warning(warning))
    }

    #[instrument(
        name = "maintenance.service.assign_request",
        skip(self, actor),
        fields(admin_id = %actor.id, request_id = %id, manager_id = %manager_id)
    )]
    pub async fn assign_request(
        &self,
        actor: &User,
        id: Uuid,
        manager_id: Uuid,
    ) -> Result<MaintenanceRequest, DomainError> {
        let current = self.get_request(id).await?;
        require_edge(current.status, LifecycleEvent::Assign)?;
        authorize(LifecycleEvent::Assign, actor, &current)?;

        let manager = self
            .find_user(manager_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(manager_id))?;
        if manager.role != Role::PropertyManager {
            return Err(DomainError::validation(
                "assigned_to",
                format!("user {} is not a property manager", manager.id),
            ));
        }

        let transition = Transition::Assign {
            manager_id,
            admin_id: actor.id,
        };
        let updated = self.commit(&current, transition).await?;
        self.events.publish(&RequestEvent::Assigned {
            id,
            manager_id,
            at: updated.assigned_at.unwrap_or_else(Utc::now),
        });
        Ok(updated)
    }

    #[instrument(name = "maintenance.service.start_work", skip(self, actor), fields(manager_id = %actor.id, request_id = %id))]
    pub async fn start_work(&self, actor: &User, id: Uuid) -> Result<MaintenanceRequest, DomainError> {
        let updated = self.transition(actor, id, Transition::StartWork).await?;
        self.events
            .publish(&RequestEvent::WorkStarted { id, at: Utc::now() });
        Ok(updated)
    }

    #[instrument(
        name = "maintenance.service.complete_work",
        skip(self, actor, report, uploads),
        fields(manager_id = %actor.id, request_id = %id, uploads = uploads.len())
    )]
    pub async fn complete_work(
        &self,
        actor: &User,
        id: Uuid,
        report: &str,
        uploads: Vec<ImageUpload>,
    ) -> Result<Outcome<MaintenanceRequest>, DomainError> {
        require_text("completion_report", report)?;

        let current = self.get_request(id).await?;
        // Refuse before uploading anything.
        require_edge(current.status, LifecycleEvent::Complete)?;
        authorize(LifecycleEvent::Complete, actor, &current)?;

        let batch = self.config.uploads.filter(uploads);
        let warning = batch.warning();
        let images = self.upload_all(batch).await?;

        let transition = Transition::Complete {
            report: report.to_string(),
            images: images.clone(),
        };
        let updated = match self.commit(&current, transition).await {
            Ok(updated) => updated,
            Err(e) => {
                self.rollback_images(&images).await;
                return Err(e);
            }
        };

        self.events.publish(&RequestEvent::Completed {
            id,
            images: images.len(),
            at: updated.completed_at.unwrap_or_else(Utc::now),
        });
        Ok(Outcome::new(updated).with_warning(warning))
    }

    #[instrument(name = "maintenance.service.approve_request", skip(self, actor), fields(tenant_id = %actor.id, request_id = %id))]
    pub async fn approve_request(
        &self,
        actor: &User,
        id: Uuid,
    ) -> Result<MaintenanceRequest, DomainError> {
        let updated = self.transition(actor, id, Transition::Approve).await?;
        self.events.publish(&RequestEvent::Approved {
            id,
            at: updated.reviewed_at.unwrap_or_else(Utc::now),
        });
        Ok(updated)
    }

    #[instrument(name = "maintenance.service.reject_request", skip(self, actor, reason), fields(tenant_id = %actor.id, request_id = %id))]
    pub async fn reject_request(
        &self,
        actor: &User,
        id: Uuid,
        reason: &str,
    ) -> Result<MaintenanceRequest, DomainError> {
        require_text("rejection_reason", reason)?;
        let transition = Transition::Reject {
            reason: reason.to_string(),
        };
        let updated = self.transition(actor, id, transition).await?;
        self.events.publish(&RequestEvent::Rejected {
            id,
            at: updated.reviewed_at.unwrap_or_else(Utc::now),
        });
        Ok(updated)
    }

    /// Rejected work goes back to `in_progress` for the assigned manager.
    #[instrument(name = "maintenance.service.reopen_request", skip(self, actor), fields(manager_id = %actor.id, request_id = %id))]
    pub async fn reopen_request(
        &self,
        actor: &User,
        id: Uuid,
    ) -> Result<MaintenanceRequest, DomainError> {
        let updated = self.transition(actor, id, Transition::Reopen).await?;
        self.events
            .publish(&RequestEvent::Reopened { id, at: Utc::now() });
        Ok(updated)
    }

    // --- helpers ---

    async fn transition(
        &self,
        actor: &User,
        id: Uuid,
        transition: Transition,
    ) -> Result<MaintenanceRequest, DomainError> {
        transition.validate()?;
        let current = self.get_request(id).await?;
        require_edge(current.status, transition.event())?;
        authorize(transition.event(), actor, &current)?;
        self.commit(&current, transition).await
    }

    async fn commit(
        &self,
        current: &MaintenanceRequest,
        transition: Transition,
    ) -> Result<MaintenanceRequest, DomainError> {
        let event = transition.event();
        let patch = transition.into_patch(current, Utc::now())?;
        let updated = self
            .requests
            .update(current.id, patch)
            .await
            .map_err(DomainError::repository)?
            .ok_or_else(|| DomainError::request_not_found(current.id))?;

        info!(
            request_id = %updated.id,
            from = %current.status,
            to = %updated.status,
            event = %event,
            "Request transitioned"
        );
        Ok(updated)
    }

    /// Save accepted uploads in order; the first failure aborts the batch
    /// and removes what this batch already stored.
    async fn upload_all(&self, batch: ImageBatch) -> Result<Vec<ImageRef>, DomainError> {
        if !batch.dropped.is_empty() {
            warn!(
                dropped = batch.dropped.len(),
                accepted = batch.accepted.len(),
                "Skipped files that are not allowed"
            );
        }

        let mut saved = Vec::with_capacity(batch.accepted.len());
        for upload in batch.accepted {
            let name = upload.name.clone();
            match self.images.save(upload).await {
                Ok(image) => saved.push(image),
                Err(e) => {
                    warn!(file = %name, error = %e, "Image upload failed, aborting");
                    self.rollback_images(&saved).await;
                    let e = e.context(format!("failed to save image '{name}'"));
                    return Err(DomainError::repository(e));
                }
            }
        }
        Ok(saved)
    }

    async fn rollback_images(&self, images: &[ImageRef]) {
        for image in images {
            if let Err(e) = self.images.remove(image).await {
                warn!(image = %image, error = %e, "Failed to remove image during rollback");
            }
        }
    }
}
