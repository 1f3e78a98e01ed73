//! Request lifecycle state machine.
//!
//! ```text
//! pending --assign--> assigned --start--> in_progress --complete--> completed
//!                                              ^                     |     |
//!                                              |                 approve reject
//!                                              |                     v     v
//!                                              +-------reopen---- rejected approved
//! ```
//!
//! Everything here is pure: the service loads the record, asks for a patch,
//! and hands the patch to the request store.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{
    ImageRef, MaintenanceRequest, RequestPatch, RequestStatus, Role, User,
};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Assign,
    StartWork,
    Complete,
    Approve,
    Reject,
    Reopen,
}

impl LifecycleEvent {
    /// Verb used in error messages ("Cannot approve a request that is pending").
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Assign => "assign",
            LifecycleEvent::StartWork => "start work on",
            LifecycleEvent::Complete => "complete",
            LifecycleEvent::Approve => "approve",
            LifecycleEvent::Reject => "reject",
            LifecycleEvent::Reopen => "reopen",
        }
    }

    pub fn actor_role(&self) -> Role {
        match self {
            LifecycleEvent::Assign => Role::Admin,
            LifecycleEvent::StartWork | LifecycleEvent::Complete | LifecycleEvent::Reopen => {
                Role::PropertyManager
            }
            LifecycleEvent::Approve | LifecycleEvent::Reject => Role::Tenant,
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target status of `event` fired in `from`, or `None` if the table has no such edge.
pub fn next_status(from: RequestStatus, event: LifecycleEvent) -> Option<RequestStatus> {
    use LifecycleEvent as E;
    use RequestStatus as S;

    match (from, event) {
        (S::Pending, E::Assign) => Some(S::Assigned),
        (S::Assigned, E::StartWork) => Some(S::InProgress),
        (S::InProgress, E::Complete) => Some(S::Completed),
        (S::Completed, E::Approve) => Some(S::Approved),
        (S::Completed, E::Reject) => Some(S::Rejected),
        (S::Rejected, E::Reopen) => Some(S::InProgress),
        _ => None,
    }
}

/// Like [`next_status`], but a missing edge is an `InvalidTransition`.
/// Service operations check this before [`authorize`].
pub fn require_edge(
    from: RequestStatus,
    event: LifecycleEvent,
) -> Result<RequestStatus, DomainError> {
    next_status(from, event).ok_or_else(|| DomainError::invalid_transition(from, event))
}

pub fn available_events(status: RequestStatus) -> Vec<LifecycleEvent> {
    [
        LifecycleEvent::Assign,
        LifecycleEvent::StartWork,
        LifecycleEvent::Complete,
        LifecycleEvent::Approve,
        LifecycleEvent::Reject,
        LifecycleEvent::Reopen,
    ]
    .into_iter()
    .filter(|event| next_status(status, *event).is_some())
    .collect()
}

/// No tenant action remains. A rejected request can still be reopened by its manager.
pub fn is_terminal(status: RequestStatus) -> bool {
    matches!(status, RequestStatus::Approved | RequestStatus::Rejected)
}

/// Reject blank or whitespace-only text for a required field.
pub fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    Ok(())
}

/// A lifecycle event together with the data its side effects need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Assign { manager_id: Uuid, admin_id: Uuid },
    StartWork,
    Complete { report: String, images: Vec<ImageRef> },
    Approve,
    Reject { reason: String },
    Reopen,
}

impl Transition {
    pub fn event(&self) -> LifecycleEvent {
        match self {
            Transition::Assign { .. } => LifecycleEvent::Assign,
            Transition::StartWork => LifecycleEvent::StartWork,
            Transition::Complete { .. } => LifecycleEvent::Complete,
            Transition::Approve => LifecycleEvent::Approve,
            Transition::Reject { .. } => LifecycleEvent::Reject,
            Transition::Reopen => LifecycleEvent::Reopen,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Transition::Complete { report, .. } => require_text("completion_report", report),
            Transition::Reject { reason } => require_text("rejection_reason", reason),
            _ => Ok(()),
        }
    }

    /// Build the store patch moving `current` through this transition.
    pub fn into_patch(
        self,
        current: &MaintenanceRequest,
        now: DateTime<Utc>,
    ) -> Result<RequestPatch, DomainError> {
        self.validate()?;
        let event = self.event();
        let to = require_edge(current.status, event)?;

        let mut patch = RequestPatch::status(to);
        match self {
            Transition::Assign {
                manager_id,
                admin_id,
            } => {
                patch.assigned_to = Some(manager_id);
                patch.assigned_by = Some(admin_id);
                patch.assigned_at = Some(now);
            }
            Transition::Complete { report, images } => {
                patch.completed_at = Some(now);
                patch.completion_report = Some(report);
                patch.completion_images = Some(images);
            }
            Transition::Approve => {
                patch.reviewed_at = Some(now);
            }
            Transition::Reject { reason } => {
                patch.reviewed_at = Some(now);
                patch.rejection_reason = Some(reason);
            }
            Transition::StartWork | Transition::Reopen => {}
        }
        Ok(patch)
    }
}

/// Role gate: admins assign, the assigned manager works, the filing tenant reviews.
pub fn authorize(
    event: LifecycleEvent,
    actor: &User,
    request: &MaintenanceRequest,
) -> Result<(), DomainError> {
    let required = event.actor_role();
    if actor.role != required {
        return Err(DomainError::not_permitted(format!(
            "only a {} may {} a request",
            required,
            event.as_str()
        )));
    }

    match required {
        Role::Admin => Ok(()),
        Role::PropertyManager if request.assigned_to == Some(actor.id) => Ok(()),
        Role::PropertyManager => Err(DomainError::not_permitted(
            "request is not assigned to this manager",
        )),
        Role::Tenant if request.tenant_id == actor.id => Ok(()),
        Role::Tenant => Err(DomainError::not_permitted(
            "request was filed by another tenant",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::Priority;

    fn request(status: RequestStatus) -> MaintenanceRequest {
        MaintenanceRequest {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            tenant_name: "John Tenant".into(),
            title: "Leak".into(),
            description: "Sink leaking".into(),
            category: "Plumbing".into(),
            priority: Priority::High,
            status,
            images: vec![],
            created_at: Utc::now(),
            assigned_to: None,
            assigned_by: None,
            assigned_at: None,
            completed_at: None,
            completion_report: None,
            completion_images: None,
            reviewed_at: None,
            rejection_reason: None,
        }
    }

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{role}@example.com"),
            name: role.to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn table_edges() {
        use LifecycleEvent as E;
        use RequestStatus as S;

        assert_eq!(next_status(S::Pending, E::Assign), Some(S::Assigned));
        assert_eq!(next_status(S::Assigned, E::StartWork), Some(S::InProgress));
        assert_eq!(next_status(S::InProgress, E::Complete), Some(S::Completed));
        assert_eq!(next_status(S::Completed, E::Approve), Some(S::Approved));
        assert_eq!(next_status(S::Completed, E::Reject), Some(S::Rejected));
        assert_eq!(next_status(S::Rejected, E::Reopen), Some(S::InProgress));

        assert_eq!(next_status(S::Pending, E::StartWork), None);
        assert_eq!(next_status(S::Assigned, E::Complete), None);
        assert_eq!(next_status(S::Rejected, E::Complete), None);
        assert_eq!(next_status(S::Approved, E::Reopen), None);
    }

    #[test]
    fn approved_has_no_way_out() {
        assert!(available_events(RequestStatus::Approved).is_empty());
        assert_eq!(
            available_events(RequestStatus::Rejected),
            vec![LifecycleEvent::Reopen]
        );
        assert_eq!(
            available_events(RequestStatus::Completed),
            vec![LifecycleEvent::Approve, LifecycleEvent::Reject]
        );
        assert!(is_terminal(RequestStatus::Rejected));
        assert!(!is_terminal(RequestStatus::Completed));
    }

    #[test]
    fn assign_sets_assignment_fields() {
        let current = request(RequestStatus::Pending);
        let manager_id = Uuid::new_v4();
        let admin_id = Uuid::new_v4();
        let now = Utc::now();

        let patch = Transition::Assign {
            manager_id,
            admin_id,
        }
        .into_patch(&current, now)
        .unwrap();

        assert_eq!(patch.status, Some(RequestStatus::Assigned));
        assert_eq!(patch.assigned_to, Some(manager_id));
        assert_eq!(patch.assigned_by, Some(admin_id));
        assert_eq!(patch.assigned_at, Some(now));
        assert_eq!(patch.completed_at, None);
    }

    #[test]
    fn start_work_without_assignment_is_invalid() {
        let current = request(RequestStatus::Pending);
        let err = Transition::StartWork
            .into_patch(&current, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: RequestStatus::Pending,
                event: LifecycleEvent::StartWork
            }
        ));
    }

    #[test]
    fn blank_report_fails_validation_before_status_check() {
        let current = request(RequestStatus::Assigned);
        let err = Transition::Complete {
            report: "   \n".into(),
            images: vec![],
        }
        .into_patch(&current, Utc::now())
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "completion_report"));
    }

    #[test]
    fn complete_records_report_and_images() {
        let current = request(RequestStatus::InProgress);
        let image = ImageRef::generate();
        let patch = Transition::Complete {
            report: "Fixed washer".into(),
            images: vec![image.clone()],
        }
        .into_patch(&current, Utc::now())
        .unwrap();

        assert_eq!(patch.status, Some(RequestStatus::Completed));
        assert_eq!(patch.completion_report.as_deref(), Some("Fixed washer"));
        assert_eq!(patch.completion_images, Some(vec![image]));
        assert!(patch.completed_at.is_some());
    }

    #[test]
    fn reject_requires_reason() {
        let current = request(RequestStatus::Completed);
        let err = Transition::Reject { reason: "".into() }
            .into_patch(&current, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let patch = Transition::Reject {
            reason: "Still leaking".into(),
        }
        .into_patch(&current, Utc::now())
        .unwrap();
        assert_eq!(patch.status, Some(RequestStatus::Rejected));
        assert_eq!(patch.rejection_reason.as_deref(), Some("Still leaking"));
        assert!(patch.reviewed_at.is_some());
    }

    #[test]
    fn authorize_checks_role_and_ownership() {
        let tenant = user(Role::Tenant);
        let manager = user(Role::PropertyManager);
        let admin = user(Role::Admin);

        let mut current = request(RequestStatus::Completed);
        current.tenant_id = tenant.id;
        current.assigned_to = Some(manager.id);

        assert!(authorize(LifecycleEvent::Assign, &admin, &current).is_ok());
        assert!(authorize(LifecycleEvent::Assign, &tenant, &current).is_err());
        assert!(authorize(LifecycleEvent::Approve, &tenant, &current).is_ok());
        assert!(authorize(LifecycleEvent::Reopen, &manager, &current).is_ok());

        let other_tenant = user(Role::Tenant);
        let other_manager = user(Role::PropertyManager);
        assert!(matches!(
            authorize(LifecycleEvent::Reject, &other_tenant, &current),
            Err(DomainError::NotPermitted { .. })
        ));
        assert!(matches!(
            authorize(LifecycleEvent::StartWork, &other_manager, &current),
            Err(DomainError::NotPermitted { .. })
        ));
    }
}
