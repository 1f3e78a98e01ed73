use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::RequestStatus;

/// Transport-agnostic domain event, one per successful lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    Submitted {
        id: Uuid,
        tenant_id: Uuid,
        at: DateTime<Utc>,
    },
    Assigned {
        id: Uuid,
        manager_id: Uuid,
        at: DateTime<Utc>,
    },
    WorkStarted {
        id: Uuid,
        at: DateTime<Utc>,
    },
    Completed {
        id: Uuid,
        images: usize,
        at: DateTime<Utc>,
    },
    Approved {
        id: Uuid,
        at: DateTime<Utc>,
    },
    Rejected {
        id: Uuid,
        at: DateTime<Utc>,
    },
    Reopened {
        id: Uuid,
        at: DateTime<Utc>,
    },
}

impl RequestEvent {
    pub fn request_id(&self) -> Uuid {
        match self {
            RequestEvent::Submitted { id, .. }
            | RequestEvent::Assigned { id, .. }
            | RequestEvent::WorkStarted { id, .. }
            | RequestEvent::Completed { id, .. }
            | RequestEvent::Approved { id, .. }
            | RequestEvent::Rejected { id, .. }
            | RequestEvent::Reopened { id, .. } => *id,
        }
    }

    /// Status the request is in once this event happened.
    pub fn status(&self) -> RequestStatus {
        match self {
            RequestEvent::Submitted { .. } => RequestStatus::Pending,
            RequestEvent::Assigned { .. } => RequestStatus::Assigned,
            RequestEvent::WorkStarted { .. } | RequestEvent::Reopened { .. } => {
                RequestStatus::InProgress
            }
            RequestEvent::Completed { .. } => RequestStatus::Completed,
            RequestEvent::Approved { .. } => RequestStatus::Approved,
            RequestEvent::Rejected { .. } => RequestStatus::Rejected,
        }
    }
}
