//! Ports (interfaces) between the engine and its host.

pub mod clock;
pub mod listener;

pub use clock::{Clock, ManualClock, SystemClock};
pub use listener::{AutomationEvent, AutomationEventType, AutomationListener, ListenerId};
