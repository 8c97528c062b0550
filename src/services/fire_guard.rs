//! Dedup and throttle state for trigger firings.
//!
//! Two maps per engine:
//! - the fired-set: every key a user has ever fired (trigger ids plus the
//!   one-shot keys of milestone conditions). Only milestone evaluation
//!   reads it, so behavioral and temporal triggers stay repeatable.
//! - the throttle map: last fire time per `(user, trigger)`; a trigger
//!   cannot fire again for the same user inside the window.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::AutomationTrigger;

/// Outcome of asking the guard whether a trigger may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Recorded as fired; dispatch its actions.
    Fire,
    /// Fired too recently for this user.
    Throttled {
        /// Time until the trigger may fire again
        remaining: Duration,
    },
}

/// Fired-set and throttle map for every user of one engine.
#[derive(Debug)]
pub struct FireGuard {
    window: Duration,
    fired: HashMap<String, HashSet<String>>,
    last_fired: HashMap<(String, String), DateTime<Utc>>,
}

impl FireGuard {
    /// Guard with the given throttle window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            fired: HashMap::new(),
            last_fired: HashMap::new(),
        }
    }

    /// Throttle window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Apply the throttle, then record the firing.
    pub fn try_fire(
        &mut self,
        user_id: &str,
        trigger: &AutomationTrigger,
        now: DateTime<Utc>,
    ) -> GuardDecision {
        let throttle_key = (user_id.to_string(), trigger.id.clone());

        if let Some(last) = self.last_fired.get(&throttle_key) {
            let elapsed = now - *last;
            if elapsed < self.window {
                // Elapsed can be negative when the clock is moved backwards.
                let remaining = self
                    .window
                    .checked_sub(&elapsed)
                    .unwrap_or(Duration::MAX);
                return GuardDecision::Throttled { remaining };
            }
        }

        let fired = self.fired.entry(user_id.to_string()).or_default();
        fired.insert(trigger.id.clone());
        fired.extend(trigger.milestone_keys());
        self.last_fired.insert(throttle_key, now);

        GuardDecision::Fire
    }

    /// Whether `key` (a trigger id or milestone key) has fired for the user.
    pub fn has_fired(&self, user_id: &str, key: &str) -> bool {
        self.fired
            .get(user_id)
            .is_some_and(|keys| keys.contains(key))
    }

    /// Forget everything recorded for one user.
    pub fn reset_user(&mut self, user_id: &str) {
        self.fired.remove(user_id);
        self.last_fired.retain(|(user, _), _| user != user_id);
    }

    /// Drop throttle entries whose window has passed. Returns how many.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.last_fired.len();
        let window = self.window;
        self.last_fired.retain(|_, last| now - *last < window);
        before - self.last_fired.len()
    }

    /// Number of live `(user, trigger)` throttle entries.
    pub fn throttle_entries(&self) -> usize {
        self.last_fired.len()
    }

    /// Forget every user.
    pub fn clear(&mut self) {
        self.fired.clear();
        self.last_fired.clear();
    }
}

impl Default for FireGuard {
    fn default() -> Self {
        Self::new(Duration::seconds(60))
    }
}
