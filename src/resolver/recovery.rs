//! Recovery actions run after a fallback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::store::ResolverStore;
use super::types::{EdgeCaseRule, EdgeCaseType, FallbackPayload, RecoveryAction, RecoveryOutcome};
use crate::error::RecoveryError;

/// An edge-case incident reported to monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Incident id.
    pub id: Uuid,
    /// Detected case.
    pub case_type: EdgeCaseType,
    /// Strategy applied.
    pub strategy: String,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
    /// User-facing message of the rule.
    pub message: String,
}

impl Incident {
    /// New incident stamped now.
    pub fn new(case_type: EdgeCaseType, strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            case_type,
            strategy: strategy.into(),
            occurred_at: Utc::now(),
            message: message.into(),
        }
    }
}

/// Sink for monitoring notifications.
#[cfg_attr(test, mockall::automock)]
pub trait IncidentNotifier: Send + Sync {
    /// Deliver an incident.
    fn notify(&self, incident: &Incident) -> Result<(), RecoveryError>;
}

/// Notifier that writes incidents to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl IncidentNotifier for TracingNotifier {
    fn notify(&self, incident: &Incident) -> Result<(), RecoveryError> {
        warn!(
            incident_id = %incident.id,
            case_type = %incident.case_type,
            strategy = %incident.strategy,
            "Monitoring notification"
        );
        Ok(())
    }
}

/// Run `rule`'s recovery actions in order. Failures are logged and recorded;
/// they never stop later actions.
pub(crate) fn run_recovery_actions(
    rule: &EdgeCaseRule,
    strategy: &str,
    payload: &FallbackPayload,
    store: &ResolverStore,
    notifier: &dyn IncidentNotifier,
) -> Vec<RecoveryOutcome> {
    rule.recovery_actions
        .iter()
        .map(|&action| {
            let result = run_action(action, rule, strategy, payload, store, notifier);
            match result {
                Ok(()) => RecoveryOutcome {
                    action,
                    success: true,
                    error: None,
                },
                Err(e) => {
                    error!(
                        action = %action,
                        case_type = %rule.case_type,
                        strategy = %strategy,
                        error = %e,
                        "Recovery action failed"
                    );
                    RecoveryOutcome {
                        action,
                        success: false,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}

fn run_action(
    action: RecoveryAction,
    rule: &EdgeCaseRule,
    strategy: &str,
    payload: &FallbackPayload,
    store: &ResolverStore,
    notifier: &dyn IncidentNotifier,
) -> Result<(), RecoveryError> {
    match action {
        RecoveryAction::CacheResult => {
            store.cache_fallback(rule.case_type, &payload.signal);
            Ok(())
        }
        RecoveryAction::LogIncident => {
            info!(
                case_type = %rule.case_type,
                strategy = %strategy,
                preference = %payload.signal.class,
                confidence = payload.signal.confidence,
                historical_data_used = payload.historical_data_used,
                "Edge case handled"
            );
            Ok(())
        }
        RecoveryAction::NotifyMonitoring => {
            let incident = Incident::new(rule.case_type, strategy, rule.user_message.clone());
            notifier.notify(&incident)
        }
        RecoveryAction::CleanupState => {
            let removed = store.purge_case(rule.case_type);
            info!(case_type = %rule.case_type, removed, "Cleaned up cached state");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::strategies::minimal_payload;
    use crate::resolver::EdgeCaseRuleSet;

    fn degraded_rule() -> EdgeCaseRule {
        EdgeCaseRuleSet::builtin()
            .rules()
            .iter()
            .find(|r| r.case_type == EdgeCaseType::DegradedPerformance)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_notifier_failure_recorded_and_continues() {
        let mut notifier = MockIncidentNotifier::new();
        notifier.expect_notify().times(1).returning(|_| {
            Err(RecoveryError::Notifier {
                message: "unreachable".to_string(),
            })
        });

        let store = ResolverStore::default();
        let outcomes = run_recovery_actions(
            &degraded_rule(),
            "minimal_response",
            &minimal_payload(),
            &store,
            &notifier,
        );

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].action, RecoveryAction::NotifyMonitoring);
        assert!(!outcomes[0].success);
        assert_eq!(
            outcomes[0].error.as_deref(),
            Some("Monitoring notification failed: unreachable")
        );
        assert_eq!(outcomes[1].action, RecoveryAction::LogIncident);
        assert!(outcomes[1].success);
    }

    #[test]
    fn test_notifier_receives_incident() {
        let mut notifier = MockIncidentNotifier::new();
        notifier
            .expect_notify()
            .withf(|incident| {
                incident.case_type == EdgeCaseType::DegradedPerformance
                    && incident.strategy == "minimal_response"
            })
            .times(1)
            .returning(|_| Ok(()));

        let store = ResolverStore::default();
        let outcomes = run_recovery_actions(
            &degraded_rule(),
            "minimal_response",
            &minimal_payload(),
            &store,
            &notifier,
        );
        assert!(outcomes.iter().all(|o| o.success));
    }

    #[test]
    fn test_cache_and_cleanup_actions() {
        let store = ResolverStore::default();
        let mut rule = degraded_rule();
        rule.recovery_actions = vec![RecoveryAction::CacheResult];

        run_recovery_actions(&rule, "minimal_response", &minimal_payload(), &store, &TracingNotifier);
        assert_eq!(store.cache_len(), 1);

        rule.recovery_actions = vec![RecoveryAction::CleanupState];
        run_recovery_actions(&rule, "minimal_response", &minimal_payload(), &store, &TracingNotifier);
        assert_eq!(store.cache_len(), 0);
    }
}
