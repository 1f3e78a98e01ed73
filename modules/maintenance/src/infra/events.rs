use tracing::info;

use crate::domain::events::RequestEvent;
use crate::domain::ports::EventPublisher;

/// Publishes lifecycle events to the log under the `maintenance.events` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventPublisher;

impl EventPublisher<RequestEvent> for LogEventPublisher {
    fn publish(&self, event: &RequestEvent) {
        info!(
            target: "maintenance.events",
            request_id = %event.request_id(),
            status = %event.status(),
            ?event,
            "Request event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tracing_test::traced_test;
    use uuid::Uuid;

    #[traced_test]
    #[test]
    fn events_are_logged_with_request_id() {
        let id = Uuid::new_v4();
        LogEventPublisher.publish(&RequestEvent::WorkStarted { id, at: Utc::now() });

        assert!(logs_contain("Request event"));
        assert!(logs_contain(&id.to_string()));
        assert!(logs_contain("in_progress"));
    }
}
