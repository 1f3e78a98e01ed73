//! Service operations run under tracing spans and publish one event each.

use std::sync::{Arc, Mutex};

use maintenance::contract::model::{RequestDraft, RequestStatus};
use maintenance::domain::events::RequestEvent;
use maintenance::domain::ports::EventPublisher;
use maintenance::domain::service::{Service, ServiceConfig};
use maintenance::infra::storage::seed::{
    seed_missing, DEMO_ADMIN_ID, DEMO_MANAGER_ID, DEMO_TENANT_ID,
};
use maintenance::infra::storage::{
    KeyValueStore, KvImagesRepository, KvRequestsRepository, KvUsersRepository, MemoryStore,
    StorageKeys,
};
use tracing_test::traced_test;

#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<RequestEvent>>,
}

impl EventPublisher<RequestEvent> for RecordingPublisher {
    fn publish(&self, event: &RequestEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

async fn service() -> (Service, Arc<RecordingPublisher>) {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let keys = StorageKeys::default();
    seed_missing(kv.as_ref(), &keys).await.unwrap();

    let events = Arc::new(RecordingPublisher::default());
    let service = Service::new(
        Arc::new(KvUsersRepository::new(kv.clone(), &keys.users)),
        Arc::new(KvRequestsRepository::new(kv.clone(), &keys.requests)),
        Arc::new(KvImagesRepository::new(kv, &keys.images)),
        events.clone(),
        ServiceConfig::default(),
    );
    (service, events)
}

#[traced_test]
#[tokio::test]
async fn full_lifecycle_emits_one_event_per_step() {
    let (service, events) = service().await;
    let tenant = service.find_user(DEMO_TENANT_ID).await.unwrap().unwrap();
    let admin = service.find_user(DEMO_ADMIN_ID).await.unwrap().unwrap();
    let manager = service.find_user(DEMO_MANAGER_ID).await.unwrap().unwrap();

    let draft = RequestDraft {
        title: "Leak".into(),
        description: "Sink leaking".into(),
        category: "Plumbing".into(),
        ..Default::default()
    };
    let id = service
        .submit_request(&tenant, draft, vec![])
        .await
        .unwrap()
        .value
        .id;
    service.assign_request(&admin, id, manager.id).await.unwrap();
    service.start_work(&manager, id).await.unwrap();
    service
        .complete_work(&manager, id, "Fixed washer", vec![])
        .await
        .unwrap();
    service.reject_request(&tenant, id, "Still leaking").await.unwrap();
    service.reopen_request(&manager, id).await.unwrap();
    service
        .complete_work(&manager, id, "Fixed for real", vec![])
        .await
        .unwrap();
    service.approve_request(&tenant, id).await.unwrap();

    let statuses: Vec<_> = events
        .events
        .lock()
        .unwrap()
        .iter()
        .inspect(|e| assert_eq!(e.request_id(), id))
        .map(RequestEvent::status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            RequestStatus::Pending,
            RequestStatus::Assigned,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Rejected,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Approved,
        ]
    );
}

#[traced_test]
#[tokio::test]
async fn failed_operation_publishes_nothing() {
    let (service, events) = service().await;
    let tenant = service.find_user(DEMO_TENANT_ID).await.unwrap().unwrap();
    let requests = service.list_requests().await.unwrap();
    let pending = requests
        .iter()
        .find(|r| r.status == RequestStatus::Pending)
        .unwrap();

    assert!(service.approve_request(&tenant, pending.id).await.is_err());
    assert!(events.events.lock().unwrap().is_empty());
}
