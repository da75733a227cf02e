use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub trigger_at: DateTime<Utc>,
}

/// Platform service that delivers local notifications.
///
/// `schedule` returns the platform handle, or `None` when the platform declined
/// (permission denied, quota reached). `cancel` must tolerate unknown handles.
#[allow(async_fn_in_trait)]
pub trait NotificationScheduler {
    async fn request_permission(&self) -> bool;
    async fn schedule(&self, request: &NotificationRequest) -> Result<Option<String>>;
    async fn cancel(&self, notification_id: &str) -> Result<()>;
}

/// A platform without notification support is `None`: nothing is ever scheduled.
impl<S: NotificationScheduler> NotificationScheduler for Option<S> {
    async fn request_permission(&self) -> bool {
        match self {
            Some(inner) => inner.request_permission().await,
            None => false,
        }
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<Option<String>> {
        match self {
            Some(inner) => inner.schedule(request).await,
            None => Ok(None),
        }
    }

    async fn cancel(&self, notification_id: &str) -> Result<()> {
        match self {
            Some(inner) => inner.cancel(notification_id).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use crate::error::BillError;

    /// Records every call; handles are `notif-1`, `notif-2`, ...
    #[derive(Default)]
    pub struct FakeScheduler {
        pub deny_permission: bool,
        /// Zero-based schedule call indices that fail with an error.
        pub failing_calls: HashSet<usize>,
        pub state: Mutex<FakeState>,
    }

    #[derive(Default)]
    pub struct FakeState {
        pub permission_requests: usize,
        pub schedule_calls: usize,
        pub scheduled: Vec<(String, NotificationRequest)>,
        pub cancelled: Vec<String>,
    }

    impl FakeScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn scheduled(&self) -> Vec<(String, NotificationRequest)> {
            self.state.lock().unwrap().scheduled.clone()
        }

        pub fn cancelled(&self) -> Vec<String> {
            self.state.lock().unwrap().cancelled.clone()
        }

        pub fn schedule_calls(&self) -> usize {
            self.state.lock().unwrap().schedule_calls
        }
    }

    impl NotificationScheduler for FakeScheduler {
        async fn request_permission(&self) -> bool {
            self.state.lock().unwrap().permission_requests += 1;
            !self.deny_permission
        }

        async fn schedule(&self, request: &NotificationRequest) -> Result<Option<String>> {
            let mut state = self.state.lock().unwrap();
            let call = state.schedule_calls;
            state.schedule_calls += 1;
            if self.failing_calls.contains(&call) {
                return Err(BillError::Notification("platform rejected request".to_string()));
            }
            let id = format!("notif-{}", state.scheduled.len() + 1);
            state.scheduled.push((id.clone(), request.clone()));
            Ok(Some(id))
        }

        async fn cancel(&self, notification_id: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.cancelled.push(notification_id.to_string());
            if notification_id.starts_with("unknown") {
                return Err(BillError::Notification(format!("no notification {}", notification_id)));
            }
            Ok(())
        }
    }
}
