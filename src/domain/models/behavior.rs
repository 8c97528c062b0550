//! Observed user activity.
//!
//! A `UserBehavior` is created on the first behavior update for a user and
//! merged with every subsequent `BehaviorUpdate`. Page views and
//! interactions are kept in bounded ring buffers so long-lived processes do
//! not grow without limit.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest engagement score a user can have.
pub const MAX_ENGAGEMENT_SCORE: u8 = 100;

/// Display language for localized text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Arabic
    Ar,
}

impl Language {
    /// Pick the English or Arabic variant of a string.
    pub fn pick<'a>(self, en: &'a str, ar: &'a str) -> &'a str {
        match self {
            Self::En => en,
            Self::Ar => ar,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Ar => write!(f, "ar"),
        }
    }
}

/// A single page view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    /// Page path such as `/pricing`
    pub page: String,
    /// When the view started
    pub timestamp: DateTime<Utc>,
    /// Seconds spent on the page.
    pub duration: f64,
}

impl PageView {
    /// View of `page` lasting `duration` seconds.
    pub fn new(page: impl Into<String>, timestamp: DateTime<Utc>, duration: f64) -> Self {
        Self {
            page: page.into(),
            timestamp,
            duration,
        }
    }
}

/// A single UI interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// What happened, e.g. `click` or `demo_request`
    pub action: String,
    /// UI element it happened on
    pub element: String,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    /// Interaction of `action` on `element`.
    pub fn new(
        action: impl Into<String>,
        element: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            action: action.into(),
            element: element.into(),
            timestamp,
        }
    }
}

/// User preferences used for localization and segmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Language for recommendations and next-best-action text
    #[serde(default)]
    pub language: Language,
    /// Free-form industry label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Free-form company size bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    /// What the user is trying to do with the product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

/// Accumulated behavior record for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBehavior {
    /// Oldest first, bounded by `max_page_views`
    pub page_views: VecDeque<PageView>,
    /// Oldest first, bounded by `max_interactions`
    pub interactions: VecDeque<Interaction>,
    /// 0..=100
    pub engagement_score: u8,
    /// Time of the latest merge
    pub last_activity: DateTime<Utc>,
    /// Last preferences supplied
    pub preferences: Preferences,
}

impl UserBehavior {
    /// Default record for a user seen for the first time.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            page_views: VecDeque::new(),
            interactions: VecDeque::new(),
            engagement_score: 0,
            last_activity: now,
            preferences: Preferences::default(),
        }
    }

    /// Most recent page view, if any.
    pub fn last_page_view(&self) -> Option<&PageView> {
        self.page_views.back()
    }

    /// Merge a partial update into this record.
    ///
    /// Page views and interactions are appended and the oldest entries are
    /// dropped once the caps are exceeded. Score and preferences overwrite
    /// when present. `last_activity` is always set to `now`.
    pub fn merge(
        &mut self,
        update: BehaviorUpdate,
        now: DateTime<Utc>,
        max_page_views: usize,
        max_interactions: usize,
    ) {
        push_bounded(&mut self.page_views, update.page_views, max_page_views);
        push_bounded(&mut self.interactions, update.interactions, max_interactions);

        if let Some(score) = update.engagement_score {
            self.engagement_score = score.min(MAX_ENGAGEMENT_SCORE);
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
        self.last_activity = now;
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, items: Vec<T>, cap: usize) {
    buffer.extend(items);
    while buffer.len() > cap {
        buffer.pop_front();
    }
}

/// Partial behavior update pushed by the host application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorUpdate {
    /// Appended to the history
    #[serde(default)]
    pub page_views: Vec<PageView>,
    /// Appended to the history
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    /// Overwrites the stored score when present (clamped to 100)
    #[serde(default)]
    pub engagement_score: Option<u8>,
    /// Overwrites stored preferences when present
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

impl BehaviorUpdate {
    /// Empty update; merging it only refreshes `last_activity`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page view.
    pub fn with_page_view(mut self, view: PageView) -> Self {
        self.page_views.push(view);
        self
    }

    /// Append an interaction.
    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interactions.push(interaction);
        self
    }

    /// Set the score.
    pub fn with_engagement_score(mut self, score: u8) -> Self {
        self.engagement_score = Some(score);
        self
    }

    /// Set the preferences.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = Some(preferences);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_merge_appends_page_views() {
        let t0 = Utc::now();
        let mut behavior = UserBehavior::new(t0);

        behavior.merge(
            BehaviorUpdate::new().with_page_view(PageView::new("/home", t0, 5.0)),
            t0,
            10,
            10,
        );
        behavior.merge(
            BehaviorUpdate::new().with_page_view(PageView::new("/pricing", t0, 40.0)),
            t0 + Duration::seconds(3),
            10,
            10,
        );

        assert_eq!(behavior.page_views.len(), 2);
        assert_eq!(behavior.last_page_view().map(|v| v.page.as_str()), Some("/pricing"));
        assert_eq!(behavior.last_activity, t0 + Duration::seconds(3));
    }

    #[test]
    fn test_merge_drops_oldest_beyond_cap() {
        let t0 = Utc::now();
        let mut behavior = UserBehavior::new(t0);
        let update = BehaviorUpdate {
            page_views: (0..5)
                .map(|i| PageView::new(format!("/p{i}"), t0, 1.0))
                .collect(),
            ..Default::default()
        };

        behavior.merge(update, t0, 3, 3);

        let pages: Vec<_> = behavior.page_views.iter().map(|v| v.page.as_str()).collect();
        assert_eq!(pages, vec!["/p2", "/p3", "/p4"]);
    }

    #[test]
    fn test_merge_keeps_score_when_absent_and_clamps() {
        let t0 = Utc::now();
        let mut behavior = UserBehavior::new(t0);

        behavior.merge(BehaviorUpdate::new().with_engagement_score(250), t0, 10, 10);
        assert_eq!(behavior.engagement_score, MAX_ENGAGEMENT_SCORE);

        behavior.merge(BehaviorUpdate::new(), t0, 10, 10);
        assert_eq!(behavior.engagement_score, MAX_ENGAGEMENT_SCORE);
    }

    #[test]
    fn test_update_deserializes_camel_case() {
        let json = r#"{
            "pageViews": [{"page": "/pricing", "timestamp": "2026-01-01T00:00:00Z", "duration": 40}],
            "engagementScore": 55,
            "preferences": {"language": "ar", "companySize": "50-200"}
        }"#;

        let update: BehaviorUpdate = serde_json::from_str(json).expect("update should parse");
        assert_eq!(update.page_views.len(), 1);
        assert_eq!(update.engagement_score, Some(55));
        let prefs = update.preferences.expect("preferences present");
        assert_eq!(prefs.language, Language::Ar);
        assert_eq!(prefs.company_size.as_deref(), Some("50-200"));
        assert!(update.interactions.is_empty());
    }

    #[test]
    fn test_language_pick() {
        assert_eq!(Language::En.pick("Start", "ابدأ"), "Start");
        assert_eq!(Language::Ar.pick("Start", "ابدأ"), "ابدأ");
    }
}
