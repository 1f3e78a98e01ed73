//! Demo data written on first start.

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::contract::model::{MaintenanceRequest, Priority, RequestStatus, Role, User};
use crate::infra::storage::entity::{ImageMap, RequestRecord, UserRecord};
use crate::infra::storage::keys::StorageKeys;
use crate::infra::storage::kv::{write_json, KeyValueStore};
use crate::infra::storage::mapper::{request_to_record, user_to_record};

pub const DEMO_TENANT_ID: Uuid = Uuid::from_u128(0x00000000_0000_4000_8000_000000000001);
pub const DEMO_ADMIN_ID: Uuid = Uuid::from_u128(0x00000000_0000_4000_8000_000000000002);
pub const DEMO_MANAGER_ID: Uuid = Uuid::from_u128(0x00000000_0000_4000_8000_000000000003);

pub const DEMO_LEAK_REQUEST_ID: Uuid = Uuid::from_u128(0x00000000_0000_4000_8000_000000000101);
pub const DEMO_FAUCET_REQUEST_ID: Uuid = Uuid::from_u128(0x00000000_0000_4000_8000_000000000102);

fn at(ts: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(ts)
        .with_context(|| format!("bad seed timestamp '{ts}'"))?
        .with_timezone(&Utc))
}

pub fn demo_users() -> anyhow::Result<Vec<User>> {
    let created_at = at("2024-01-01T00:00:00Z")?;
    let user = |id, email: &str, name: &str, role| User {
        id,
        email: email.to_string(),
        name: name.to_string(),
        role,
        created_at,
    };
    Ok(vec![
        user(DEMO_TENANT_ID, "tenant@example.com", "John Tenant", Role::Tenant),
        user(DEMO_ADMIN_ID, "admin@example.com", "Sarah Admin", Role::Admin),
        user(
            DEMO_MANAGER_ID,
            "manager@example.com",
            "Mike Manager",
            Role::PropertyManager,
        ),
    ])
}

pub fn demo_requests() -> anyhow::Result<Vec<MaintenanceRequest>> {
    Ok(vec![
        MaintenanceRequest {
            id: DEMO_LEAK_REQUEST_ID,
            tenant_id: DEMO_TENANT_ID,
            tenant_name: "John Tenant".into(),
            title: "AC Unit Leaking Water".into(),
            description: "The AC unit in the living room is leaking water onto the floor. \
                          It started yesterday and is getting worse."
                .into(),
            category: "HVAC".into(),
            priority: Priority::High,
            status: RequestStatus::Pending,
            images: Vec::new(),
            created_at: at("2024-12-07T10:00:00Z")?,
            assigned_to: None,
            assigned_by: None,
            assigned_at: None,
            completed_at: None,
            completion_report: None,
            completion_images: None,
            reviewed_at: None,
            rejection_reason: None,
        },
        MaintenanceRequest {
            id: DEMO_FAUCET_REQUEST_ID,
            tenant_id: DEMO_TENANT_ID,
            tenant_name: "John Tenant".into(),
            title: "Broken Kitchen Faucet".into(),
            description: "Kitchen faucet handle is loose and water pressure is very low.".into(),
            category: "Plumbing".into(),
            priority: Priority::Medium,
            status: RequestStatus::Assigned,
            images: Vec::new(),
            created_at: at("2024-12-06T14:30:00Z")?,
            assigned_to: Some(DEMO_MANAGER_ID),
            assigned_by: Some(DEMO_ADMIN_ID),
            assigned_at: Some(at("2024-12-06T15:00:00Z")?),
            completed_at: None,
            completion_report: None,
            completion_images: None,
            reviewed_at: None,
            rejection_reason: None,
        },
    ])
}

/// Write the demo users, requests and an empty image map into whichever of
/// those regions are absent. Existing regions are left untouched, even if empty.
pub async fn seed_missing(kv: &dyn KeyValueStore, keys: &StorageKeys) -> anyhow::Result<()> {
    if kv.get(&keys.users).await?.is_none() {
        let records: Vec<UserRecord> = demo_users()?.iter().map(user_to_record).collect();
        write_json(kv, &keys.users, &records)
            .await
            .context("failed to seed users")?;
        info!(key = %keys.users, count = records.len(), "Seeded demo users");
    } else {
        debug!(key = %keys.users, "Users region present, not seeding");
    }

    if kv.get(&keys.requests).await?.is_none() {
        let records: Vec<RequestRecord> =
            demo_requests()?.iter().map(request_to_record).collect();
        write_json(kv, &keys.requests, &records)
            .await
            .context("failed to seed requests")?;
        info!(key = %keys.requests, count = records.len(), "Seeded demo requests");
    }

    if kv.get(&keys.images).await?.is_none() {
        write_json(kv, &keys.images, &ImageMap::new())
            .await
            .context("failed to seed images")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::kv::{read_json, MemoryStore};

    #[tokio::test]
    async fn seeds_all_three_regions_on_empty_store() {
        let kv = MemoryStore::new();
        let keys = StorageKeys::default();
        seed_missing(&kv, &keys).await.unwrap();

        let users: Vec<UserRecord> = read_json(&kv, &keys.users).await.unwrap().unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[1].email, "admin@example.com");

        let requests: Vec<RequestRecord> = read_json(&kv, &keys.requests).await.unwrap().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].status, "assigned");
        assert_eq!(requests[1].assigned_to, Some(DEMO_MANAGER_ID));

        assert_eq!(kv.get(&keys.images).await.unwrap().as_deref(), Some("{}"));
        assert_eq!(kv.get(&keys.current_user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn existing_empty_region_is_not_reseeded() {
        let kv = MemoryStore::new();
        let keys = StorageKeys::default();
        kv.set(&keys.requests, "[]".into()).await.unwrap();

        seed_missing(&kv, &keys).await.unwrap();

        assert_eq!(kv.get(&keys.requests).await.unwrap().as_deref(), Some("[]"));
        assert!(kv.get(&keys.users).await.unwrap().is_some());
    }
}
