//! Trigger catalog: the fixed rule set an engine evaluates.
//!
//! The catalog is built once (built-in rules or a YAML file) and never
//! mutated afterwards. Engines share it behind an `Arc`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::errors::{CatalogError, CatalogResult};
use crate::domain::models::{
    ActionKind, AutomationTrigger, BehavioralCondition, Condition, MilestoneCondition,
};

/// Ordered, validated set of triggers.
///
/// Evaluation walks triggers in catalog order, so events from one pass are
/// dispatched in the order the triggers are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerCatalog {
    triggers: Vec<AutomationTrigger>,
}

impl TriggerCatalog {
    /// Build a catalog, rejecting empty or duplicate ids and triggers
    /// without actions.
    pub fn new(triggers: Vec<AutomationTrigger>) -> CatalogResult<Self> {
        let catalog = Self { triggers };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Catalog with no triggers; nothing ever fires.
    pub fn empty() -> Self {
        Self {
            triggers: Vec::new(),
        }
    }

    /// Parse a `triggers:` document and validate it.
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Io`] when the file cannot be read, otherwise the same
    /// errors as [`TriggerCatalog::from_yaml_str`].
    pub fn from_yaml_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            triggers = catalog.len(),
            "Loaded trigger catalog"
        );
        Ok(catalog)
    }

    /// Serialize back to the `triggers:` form accepted by `from_yaml_str`.
    pub fn to_yaml(&self) -> CatalogResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> CatalogResult<()> {
        let mut seen = HashSet::new();
        for trigger in &self.triggers {
            if trigger.id.trim().is_empty() {
                return Err(CatalogError::EmptyTriggerId);
            }
            if !seen.insert(trigger.id.as_str()) {
                return Err(CatalogError::DuplicateTriggerId(trigger.id.clone()));
            }
            if trigger.actions.is_empty() {
                return Err(CatalogError::NoActions(trigger.id.clone()));
            }
        }
        Ok(())
    }

    /// Trigger by id.
    pub fn get(&self, id: &str) -> Option<&AutomationTrigger> {
        self.triggers.iter().find(|t| t.id == id)
    }

    /// Triggers in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, AutomationTrigger> {
        self.triggers.iter()
    }

    /// Number of triggers.
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether the catalog has no triggers.
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// The default journey rules, one or more per funnel stage.
    pub fn builtin() -> Self {
        Self {
            triggers: builtin_triggers(),
        }
    }
}

impl Default for TriggerCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a TriggerCatalog {
    type Item = &'a AutomationTrigger;
    type IntoIter = std::slice::Iter<'a, AutomationTrigger>;

    fn into_iter(self) -> Self::IntoIter {
        self.triggers.iter()
    }
}

/// The built-in journey rules, unvalidated.
///
/// Used by [`TriggerCatalog::builtin`]; exposed so hosts can extend the
/// default set before building their own catalog.
pub fn builtin_triggers() -> Vec<AutomationTrigger> {
    vec![
        // Awareness
        AutomationTrigger::new("exit_intent_popup", "Exit Intent Lead Magnet")
            .when(Condition::interaction("mouse_leave_viewport"))
            .when(Condition::time_on_page(30.0))
            .then(
                ActionKind::UiChange,
                json!({
                    "component": "exit_intent_modal",
                    "content": {
                        "en": "Wait! Get our free PRD template guide",
                        "ar": "انتظر! احصل على دليل نماذج المواصفات مجاناً"
                    }
                }),
            ),
        // Consideration. Scroll depth is not tracked; dwell time stands in.
        AutomationTrigger::new("pricing_page_engagement", "Pricing Page ROI Calculator")
            .when(Condition::page_visit("/pricing"))
            .when(Condition::time_on_page(30.0))
            .then(
                ActionKind::UiChange,
                json!({
                    "component": "roi_calculator_widget",
                    "trigger": "show_comparison"
                }),
            )
            .then(
                ActionKind::AiAssistance,
                json!({
                    "message": "I see you're exploring our pricing. Would you like me to calculate the ROI for your specific use case?"
                }),
            ),
        // Decision
        AutomationTrigger::new("trial_activation_flow", "Immediate Trial Onboarding")
            .when(Condition::milestone(MilestoneCondition::TrialStarted))
            .then(
                ActionKind::Notification,
                json!({
                    "title": "🎉 Welcome to your innovation journey!",
                    "content": "Let's create your first idea in under 5 minutes",
                    "priority": "high"
                }),
            )
            .then(
                ActionKind::AiAssistance,
                json!({
                    "message": "I'm here to guide you through your first innovation project. Shall we start with idea generation?",
                    "suggestedActions": ["start_idea_spark", "watch_tutorial", "explore_templates"]
                }),
            ),
        // Onboarding
        AutomationTrigger::new("first_success_milestone", "First PRD Created Celebration")
            .when(Condition::milestone(MilestoneCondition::FirstPrdCreated))
            .then(
                ActionKind::Notification,
                json!({
                    "title": "🚀 Congratulations! Your first PRD is ready!",
                    "content": "You're now ready to move to the prototype stage",
                    "celebratory": true
                }),
            )
            .then(
                ActionKind::AiAssistance,
                json!({
                    "message": "Fantastic work! Your PRD looks professional. Ready to create a working prototype?",
                    "achievement": "first_architect"
                }),
            ),
        // Adoption. "High core feature usage" maps to a high engagement score.
        AutomationTrigger::new("feature_discovery", "Progressive Feature Introduction")
            .when(Condition::days_since_signup(3.0))
            .when(Condition::engagement_score(70.0))
            .then(
                ActionKind::AiAssistance,
                json!({
                    "message": "You're doing great with the core features! Let me show you some advanced capabilities that could save you even more time.",
                    "features": ["ai_content_enhancement", "smart_suggestions", "collaboration_tools"]
                }),
            ),
        // Retention
        AutomationTrigger::new("engagement_drop_intervention", "Re-engagement Campaign")
            .when(Condition::days_since_last_login(7.0))
            .when(Condition::engagement_score(70.0))
            .then(
                ActionKind::Email,
                json!({
                    "template": "we_miss_you",
                    "personalization": {
                        "lastProject": "{{last_project_name}}",
                        "completionRate": "{{completion_percentage}}"
                    }
                }),
            )
            .then(
                ActionKind::Whatsapp,
                json!({
                    "message": "سلام! لاحظنا أنك لم تدخل للمنصة مؤخراً. هل تحتاج مساعدة لإكمال مشروعك؟",
                    "cta": "Continue Project"
                }),
            ),
        // Expansion. Usage quotas are not tracked, so this never fires.
        AutomationTrigger::new("usage_limit_upsell", "Smart Upgrade Suggestion")
            .when(Condition::Behavioral(BehavioralCondition::Unrecognized {
                key: "monthly_usage_percentage".to_string(),
                value: json!(85),
            }))
            .then(
                ActionKind::AiAssistance,
                json!({
                    "message": "I notice you're being very productive! You've used 85% of your monthly limit. Would you like to upgrade to continue without interruption?",
                    "upgrade_benefits": ["unlimited_projects", "advanced_ai_features", "priority_support"]
                }),
            ),
        // Advocacy
        AutomationTrigger::new("nps_survey_automation", "Smart NPS Collection")
            .when(Condition::milestone(MilestoneCondition::Custom {
                key: "projects_completed".to_string(),
                value: json!(5),
            }))
            .when(Condition::days_since_signup(30.0))
            .then(
                ActionKind::Notification,
                json!({
                    "title": "Quick question: How likely are you to recommend Spark to a colleague?",
                    "type": "nps_survey",
                    "scale": 10
                }),
            ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = TriggerCatalog::builtin();
        assert_eq!(catalog.len(), 8);
        catalog.validate().expect("built-in catalog should validate");
        assert_eq!(
            catalog.iter().next().map(|t| t.id.as_str()),
            Some("exit_intent_popup")
        );
        assert!(catalog.get("trial_activation_flow").is_some());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_yaml_catalog_loads() {
        let yaml = r#"
triggers:
  - id: welcome_back
    name: Welcome Back
    conditions:
      - type: behavioral
        condition: page_visit
        value: /dashboard
      - type: milestone
        condition: trial_started
        value: true
    actions:
      - type: notification
        payload:
          title: Welcome back
"#;
        let catalog = TriggerCatalog::from_yaml_str(yaml).expect("yaml should load");
        let trigger = catalog.get("welcome_back").expect("trigger present");
        assert_eq!(trigger.conditions.len(), 2);
        assert_eq!(trigger.conditions[0], Condition::page_visit("/dashboard"));
        assert!(trigger.is_one_shot());
        assert_eq!(trigger.actions[0].kind, ActionKind::Notification);
    }

    #[test]
    fn test_yaml_catalog_rejects_false_known_milestone() {
        let yaml = r"
triggers:
  - id: not_trial
    name: Not trial
    conditions:
      - type: milestone
        condition: trial_started
        value: false
    actions:
      - type: notification
";
        match TriggerCatalog::from_yaml_str(yaml) {
            Err(CatalogError::Parse(err)) => assert!(err.to_string().contains("trial_started")),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let trigger = AutomationTrigger::new("dup", "Dup")
            .then(ActionKind::Notification, json!({}));
        let result = TriggerCatalog::new(vec![trigger.clone(), trigger]);
        assert!(matches!(result, Err(CatalogError::DuplicateTriggerId(id)) if id == "dup"));
    }

    #[test]
    fn test_trigger_without_actions_rejected() {
        let result = TriggerCatalog::new(vec![AutomationTrigger::new("quiet", "Quiet")]);
        assert!(matches!(result, Err(CatalogError::NoActions(_))));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let result = TriggerCatalog::from_yaml_file("/nonexistent/catalog.yaml");
        match result {
            Err(CatalogError::Io { path, .. }) => {
                assert!(path.ends_with("catalog.yaml"));
            }
            other => panic!("Expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_builtin_round_trips_through_yaml() {
        let catalog = TriggerCatalog::builtin();
        let yaml = catalog.to_yaml().expect("serialize");
        let reloaded = TriggerCatalog::from_yaml_str(&yaml).expect("reload");
        assert_eq!(reloaded.len(), catalog.len());
        assert_eq!(
            reloaded.get("pricing_page_engagement"),
            catalog.get("pricing_page_engagement")
        );
    }
}
