//! Edge-case resolution.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::recovery::{run_recovery_actions, IncidentNotifier, TracingNotifier};
use super::rules::EdgeCaseRuleSet;
use super::store::ResolverStore;
use super::strategies::{minimal_payload, FallbackHandler, StrategyRegistry};
use super::types::{
    EdgeCaseResult, EdgeCaseRule, FallbackPayload, FallbackStrategy, ResolveInput,
    ResolverStatistics,
};
use crate::error::StrategyError;

/// Message used when a strategy handler fails.
const HANDLER_FAILURE_MESSAGE: &str = "An unexpected error occurred. Displaying minimal response.";
/// Message used when resolution itself fails.
const CRITICAL_FAILURE_MESSAGE: &str =
    "A critical error occurred. Please try again or contact support.";

/// Detects anomalies in a request and substitutes a safe fallback.
///
/// `resolve` never fails and never panics: every path yields a renderable
/// [`EdgeCaseResult`].
pub struct EdgeCaseResolver {
    rules: EdgeCaseRuleSet,
    strategies: StrategyRegistry,
    notifier: Arc<dyn IncidentNotifier>,
    store: Arc<ResolverStore>,
}

impl EdgeCaseResolver {
    /// Create a resolver over a rule set with built-in handlers, a tracing
    /// notifier and a fresh store.
    pub fn new(rules: EdgeCaseRuleSet) -> Self {
        Self {
            rules,
            strategies: StrategyRegistry::builtin(),
            notifier: Arc::new(TracingNotifier),
            store: Arc::new(ResolverStore::default()),
        }
    }

    /// Replace the handler for one strategy.
    pub fn with_handler(
        mut self,
        strategy: FallbackStrategy,
        handler: Arc<dyn FallbackHandler>,
    ) -> Self {
        self.strategies.register(strategy, handler);
        self
    }

    /// Use a different monitoring notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn IncidentNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Use a shared store.
    pub fn with_store(mut self, store: Arc<ResolverStore>) -> Self {
        self.store = store;
        self
    }

    /// The rule set in use.
    pub fn rules(&self) -> &EdgeCaseRuleSet {
        &self.rules
    }

    /// The store in use.
    pub fn store(&self) -> &Arc<ResolverStore> {
        &self.store
    }

    /// Counters and cache size.
    pub fn statistics(&self) -> ResolverStatistics {
        self.store.snapshot(self.rules.len())
    }

    /// Cases whose rules match the input, in declaration order.
    pub fn detect(&self, input: &ResolveInput<'_>) -> Vec<&EdgeCaseRule> {
        self.rules
            .rules()
            .iter()
            .filter(|rule| rule.matches(input))
            .collect()
    }

    /// Resolve one request.
    pub fn resolve(&self, input: &ResolveInput<'_>) -> EdgeCaseResult {
        let start = Instant::now();

        match catch_unwind(AssertUnwindSafe(|| self.resolve_inner(input, start))) {
            Ok(result) => result,
            Err(panic) => {
                error!(
                    error = %panic_message(panic.as_ref()),
                    "Edge case resolution panicked, returning emergency result"
                );
                self.store.record_outcome(FallbackStrategy::MinimalResponse.as_str(), false);
                EdgeCaseResult {
                    case_detected: None,
                    detected_cases: Vec::new(),
                    handled: false,
                    fallback_applied: FallbackStrategy::MinimalResponse.as_str().to_string(),
                    recovery_successful: false,
                    user_message: CRITICAL_FAILURE_MESSAGE.to_string(),
                    fallback_payload: Some(minimal_payload()),
                    recovery_outcomes: Vec::new(),
                    processing_time_ms: elapsed_ms(start),
                }
            }
        }
    }

    fn resolve_inner(&self, input: &ResolveInput<'_>, start: Instant) -> EdgeCaseResult {
        let matched = self.detect(input);
        let detected_cases: Vec<_> = matched.iter().map(|r| r.case_type).collect();

        // Earliest declared rule wins a priority tie
        let mut winner: Option<&EdgeCaseRule> = None;
        for &rule in &matched {
            if winner.map_or(true, |w| rule.priority > w.priority) {
                winner = Some(rule);
            }
        }

        let Some(rule) = winner else {
            debug!(latency_ms = elapsed_ms(start), "No edge cases detected");
            return EdgeCaseResult::pass_through(elapsed_ms(start));
        };

        let strategy = rule.fallback_strategy;
        let (payload, applied, handled, user_message) = match self.run_strategy(rule, input) {
            Ok(payload) => (payload, strategy.as_str(), true, rule.user_message.clone()),
            Err(e) => {
                error!(
                    rule = %rule.case_type,
                    strategy = %strategy,
                    error = %e,
                    "Fallback strategy failed, using minimal response"
                );
                (
                    minimal_payload(),
                    FallbackStrategy::MinimalResponse.as_str(),
                    false,
                    HANDLER_FAILURE_MESSAGE.to_string(),
                )
            }
        };

        let recovery_outcomes =
            run_recovery_actions(rule, applied, &payload, &self.store, self.notifier.as_ref());
        let recovery_successful = handled && recovery_outcomes.iter().all(|o| o.success);

        self.store.record_outcome(applied, recovery_successful);

        let latency_ms = elapsed_ms(start);
        if handled {
            info!(
                rule = %rule.case_type,
                strategy = %applied,
                detected = detected_cases.len(),
                recovery_successful,
                latency_ms,
                "Edge case resolved"
            );
        } else {
            warn!(
                rule = %rule.case_type,
                strategy = %applied,
                latency_ms,
                "Edge case not handled"
            );
        }

        EdgeCaseResult {
            case_detected: Some(rule.case_type),
            detected_cases,
            handled,
            fallback_applied: applied.to_string(),
            recovery_successful,
            user_message,
            fallback_payload: Some(payload),
            recovery_outcomes,
            processing_time_ms: latency_ms,
        }
    }

    fn run_strategy(
        &self,
        rule: &EdgeCaseRule,
        input: &ResolveInput<'_>,
    ) -> Result<FallbackPayload, StrategyError> {
        let strategy = rule.fallback_strategy;
        let handler = self.strategies.get(strategy).ok_or_else(|| StrategyError::MissingData {
            strategy: strategy.to_string(),
            message: "no handler registered".to_string(),
        })?;

        match catch_unwind(AssertUnwindSafe(|| handler.apply(rule, input))) {
            Ok(result) => result,
            Err(panic) => Err(StrategyError::Failed {
                strategy: strategy.to_string(),
                message: format!("handler panicked: {}", panic_message(panic.as_ref())),
            }),
        }
    }
}

impl Default for EdgeCaseResolver {
    fn default() -> Self {
        Self::new(EdgeCaseRuleSet::builtin())
    }
}

impl std::fmt::Debug for EdgeCaseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeCaseResolver")
            .field("rules", &self.rules.len())
            .field("strategies", &self.strategies)
            .finish()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
