//! Observer port for automation events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::ListenerError;
use crate::domain::models::{Action, UserBehavior};

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    /// Fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminator carried on the wire as `"type"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationEventType {
    /// A trigger fired
    AutomationTrigger,
}

/// One event per action of a fired trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationEvent {
    /// Always `automation_trigger`
    #[serde(rename = "type")]
    pub event_type: AutomationEventType,
    /// Trigger that fired
    pub trigger_id: String,
    /// User it fired for
    pub user_id: String,
    /// The action to carry out
    pub action: Action,
    /// Behavior snapshot at fire time.
    pub user_behavior: UserBehavior,
    /// Fire time
    pub timestamp: DateTime<Utc>,
}

/// Receives automation events synchronously, in registration order.
///
/// Returning an error does not stop delivery to other listeners.
pub trait AutomationListener: Send + Sync {
    /// Name used in logs when delivery fails.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Handle one event.
    fn on_event(&self, event: &AutomationEvent) -> Result<(), ListenerError>;
}

impl<F> AutomationListener for F
where
    F: Fn(&AutomationEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_event(&self, event: &AutomationEvent) -> Result<(), ListenerError> {
        self(event)
    }
}
