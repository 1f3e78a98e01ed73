//! Per-role read models, dispatched once on the user's role.

use uuid::Uuid;

use crate::contract::model::{
    MaintenanceRequest, RequestStats, RequestStatus, Role, StatusFilter, User,
};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// Requests a user may see: tenants their own, managers those assigned to
/// them, admins everything.
pub fn is_visible_to(user: &User, request: &MaintenanceRequest) -> bool {
    match user.role {
        Role::Tenant => request.tenant_id == user.id,
        Role::PropertyManager => request.assigned_to == Some(user.id),
        Role::Admin => true,
    }
}

#[derive(Debug, Clone)]
pub enum RoleView {
    Tenant(TenantView),
    Admin(AdminView),
    PropertyManager(ManagerView),
}

#[derive(Debug, Clone)]
pub struct TenantView {
    pub user: User,
    pub requests: Vec<MaintenanceRequest>,
}

#[derive(Debug, Clone)]
pub struct ManagerView {
    pub user: User,
    pub requests: Vec<MaintenanceRequest>,
}

#[derive(Debug, Clone)]
pub struct AdminView {
    pub user: User,
    pub requests: Vec<MaintenanceRequest>,
    pub managers: Vec<User>,
}

impl RoleView {
    pub async fn build(service: &Service, user: &User) -> Result<Self, DomainError> {
        let all = service.list_requests().await?;
        let mine: Vec<_> = all
            .into_iter()
            .filter(|r| is_visible_to(user, r))
            .collect();

        Ok(match user.role {
            Role::Tenant => RoleView::Tenant(TenantView {
                user: user.clone(),
                requests: mine,
            }),
            Role::PropertyManager => RoleView::PropertyManager(ManagerView {
                user: user.clone(),
                requests: mine,
            }),
            Role::Admin => RoleView::Admin(AdminView {
                user: user.clone(),
                requests: mine,
                managers: service.property_managers().await?,
            }),
        })
    }

    pub fn user(&self) -> &User {
        match self {
            RoleView::Tenant(v) => &v.user,
            RoleView::Admin(v) => &v.user,
            RoleView::PropertyManager(v) => &v.user,
        }
    }

    pub fn requests(&self) -> &[MaintenanceRequest] {
        match self {
            RoleView::Tenant(v) => &v.requests,
            RoleView::Admin(v) => &v.requests,
            RoleView::PropertyManager(v) => &v.requests,
        }
    }

    pub fn filtered(&self, filter: StatusFilter) -> Vec<&MaintenanceRequest> {
        self.requests()
            .iter()
            .filter(|r| filter.matches(r.status))
            .collect()
    }

    pub fn stats(&self) -> RequestStats {
        RequestStats::tally(self.requests())
    }
}

impl TenantView {
    /// Completed work waiting for this tenant's approval or rejection.
    pub fn awaiting_review(&self) -> impl Iterator<Item = &MaintenanceRequest> {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Completed)
    }
}

impl ManagerView {
    /// Work the manager can act on right now.
    pub fn actionable(&self) -> impl Iterator<Item = &MaintenanceRequest> {
        self.requests.iter().filter(|r| {
            matches!(
                r.status,
                RequestStatus::Assigned | RequestStatus::InProgress | RequestStatus::Rejected
            )
        })
    }
}

impl AdminView {
    pub fn unassigned(&self) -> impl Iterator<Item = &MaintenanceRequest> {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
    }

    pub fn manager_name(&self, manager_id: Uuid) -> &str {
        self.managers
            .iter()
            .find(|m| m.id == manager_id)
            .map(|m| m.name.as_str())
            .unwrap_or("Unknown")
    }
}
