use anyhow::Context;

use crate::contract::model::{ImageRef, MaintenanceRequest, StoredImage, User};
use crate::infra::storage::entity::{ImageRecord, RequestRecord, UserRecord};

pub fn user_to_record(user: &User) -> UserRecord {
    UserRecord {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.as_str().to_string(),
        created_at: user.created_at,
    }
}

pub fn record_to_user(record: UserRecord) -> anyhow::Result<User> {
    Ok(User {
        role: record
            .role
            .parse()
            .with_context(|| format!("user {}", record.id))?,
        id: record.id,
        email: record.email,
        name: record.name,
        created_at: record.created_at,
    })
}

fn refs_to_strings(refs: &[ImageRef]) -> Vec<String> {
    refs.iter().map(|r| r.as_str().to_string()).collect()
}

fn strings_to_refs(raw: Vec<String>) -> Vec<ImageRef> {
    raw.into_iter().map(ImageRef::from).collect()
}

pub fn request_to_record(request: &MaintenanceRequest) -> RequestRecord {
    RequestRecord {
        id: request.id,
        tenant_id: request.tenant_id,
        tenant_name: request.tenant_name.clone(),
        title: request.title.clone(),
        description: request.description.clone(),
        category: request.category.clone(),
        priority: request.priority.as_str().to_string(),
        status: request.status.as_str().to_string(),
        images: refs_to_strings(&request.images),
        created_at: request.created_at,
        assigned_to: request.assigned_to,
        assigned_by: request.assigned_by,
        assigned_at: request.assigned_at,
        completed_at: request.completed_at,
        completion_report: request.completion_report.clone(),
        completion_images: request.completion_images.as_deref().map(refs_to_strings),
        reviewed_at: request.reviewed_at,
        rejection_reason: request.rejection_reason.clone(),
    }
}

pub fn record_to_request(record: RequestRecord) -> anyhow::Result<MaintenanceRequest> {
    let id = record.id;
    Ok(MaintenanceRequest {
        id,
        tenant_id: record.tenant_id,
        tenant_name: record.tenant_name,
        title: record.title,
        description: record.description,
        category: record.category,
        priority: record
            .priority
            .parse()
            .with_context(|| format!("request {id}"))?,
        status: record
            .status
            .parse()
            .with_context(|| format!("request {id}"))?,
        images: strings_to_refs(record.images),
        created_at: record.created_at,
        assigned_to: record.assigned_to,
        assigned_by: record.assigned_by,
        assigned_at: record.assigned_at,
        completed_at: record.completed_at,
        completion_report: record.completion_report,
        completion_images: record.completion_images.map(strings_to_refs),
        reviewed_at: record.reviewed_at,
        rejection_reason: record.rejection_reason,
    })
}

pub fn record_to_image(record: ImageRecord) -> StoredImage {
    StoredImage {
        data: record.data,
        name: record.name,
        content_type: record.content_type,
        size: record.size,
        uploaded_at: record.uploaded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{Priority, RequestStatus, Role};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn request_record_uses_camel_case_and_omits_unset_fields() {
        let request = MaintenanceRequest {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            tenant_name: "John Tenant".into(),
            title: "Leak".into(),
            description: "Sink leaking".into(),
            category: "Plumbing".into(),
            priority: Priority::High,
            status: RequestStatus::InProgress,
            images: vec![ImageRef::from("img_1")],
            created_at: Utc::now(),
            assigned_to: Some(Uuid::new_v4()),
            assigned_by: None,
            assigned_at: None,
            completed_at: None,
            completion_report: None,
            completion_images: None,
            reviewed_at: None,
            rejection_reason: None,
        };

        let json = serde_json::to_value(request_to_record(&request)).unwrap();
        assert_eq!(json["tenantName"], "John Tenant");
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["images"][0], "img_1");
        assert!(json.get("assignedTo").is_some());
        assert!(json.get("completionReport").is_none());

        let back: RequestRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record_to_request(back).unwrap(), request);
    }

    #[test]
    fn unknown_role_is_reported() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: "x@example.com".into(),
            name: "x".into(),
            role: "landlord".into(),
            created_at: Utc::now(),
        };
        let err = record_to_user(record).unwrap_err();
        assert!(format!("{err:#}").contains("unknown role 'landlord'"));

        let user = User {
            id: Uuid::new_v4(),
            email: "m@example.com".into(),
            name: "m".into(),
            role: Role::PropertyManager,
            created_at: Utc::now(),
        };
        assert_eq!(user_to_record(&user).role, "property_manager");
    }

    #[test]
    fn image_record_serializes_type_field() {
        let record = ImageRecord {
            data: "data:image/png;base64,AA==".into(),
            name: "a.png".into(),
            content_type: "image/png".into(),
            size: 1,
            uploaded_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "image/png");
        assert!(json.get("uploadedAt").is_some());
    }
}
