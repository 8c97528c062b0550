//! Observer list for automation events.
//!
//! Delivery is synchronous and in registration order. A listener error is
//! logged and delivery continues with the next listener.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::errors::ListenerError;
use crate::domain::models::{AutomationTrigger, UserBehavior};
use crate::domain::ports::{AutomationEvent, AutomationEventType, AutomationListener, ListenerId};

/// Delivery counts for one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Events built (one per action)
    pub events: usize,
    /// Listener calls that returned `Ok`
    pub delivered: usize,
    /// Listener calls that returned an error
    pub failed: usize,
}

/// Ordered listener registry.
#[derive(Default)]
pub struct AutomationDispatcher {
    listeners: Vec<(ListenerId, Arc<dyn AutomationListener>)>,
}

impl AutomationDispatcher {
    /// Dispatcher with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; it receives events after those already registered.
    pub fn subscribe(&mut self, listener: Arc<dyn AutomationListener>) -> ListenerId {
        let id = ListenerId::new();
        tracing::debug!(listener_id = %id, name = listener.name(), "Automation listener subscribed");
        self.listeners.push((id, listener));
        id
    }

    /// Subscribe a closure.
    pub fn subscribe_fn<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&AutomationEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(listener))
    }

    /// Returns false when `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Emit one event per action of `trigger` to every listener.
    pub fn dispatch(
        &self,
        trigger: &AutomationTrigger,
        user_id: &str,
        behavior: &UserBehavior,
        now: DateTime<Utc>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for action in &trigger.actions {
            let event = AutomationEvent {
                event_type: AutomationEventType::AutomationTrigger,
                trigger_id: trigger.id.clone(),
                user_id: user_id.to_string(),
                action: action.clone(),
                user_behavior: behavior.clone(),
                timestamp: now,
            };
            report.events += 1;

            for (id, listener) in &self.listeners {
                match listener.on_event(&event) {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(
                            listener_id = %id,
                            trigger_id = %trigger.id,
                            user_id = %user_id,
                            action = %action.kind,
                            error = %e,
                            "Automation listener failed"
                        );
                    }
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for AutomationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
