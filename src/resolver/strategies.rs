//! Fallback strategy handlers.
//!
//! Each [`FallbackStrategy`] is served by a [`FallbackHandler`]. The built-in
//! handlers are registered by default and can be replaced per strategy.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::types::{
    ContentAnalysis, EdgeCaseRule, EdgeCaseType, FallbackPayload, FallbackStrategy, ResolveInput,
};
use crate::error::StrategyError;
use crate::preference::{Evidence, Intensity, PreferenceClass, PreferenceSignal};

/// Evidence entries per axis and requests kept by graceful degradation.
const SALVAGE_LIMIT: usize = 3;

/// Produces a fallback payload for a detected edge case.
pub trait FallbackHandler: Send + Sync {
    /// Build the payload for `rule` given the resolver input.
    fn apply(
        &self,
        rule: &EdgeCaseRule,
        input: &ResolveInput<'_>,
    ) -> Result<FallbackPayload, StrategyError>;
}

/// The minimal payload used when everything else fails.
pub fn minimal_payload() -> FallbackPayload {
    FallbackPayload::new(
        PreferenceSignal::new(
            PreferenceClass::Mixed,
            0.3,
            Intensity::Low,
            "Minimal fallback response applied",
        )
        .with_fallback(FallbackStrategy::MinimalResponse),
    )
}

fn default_mixed_signal(reasoning: impl Into<String>) -> PreferenceSignal {
    PreferenceSignal::new(PreferenceClass::Mixed, 0.5, Intensity::Medium, reasoning)
        .with_fallback(FallbackStrategy::DefaultMixed)
}

// ============================================================================
// Built-in Handlers
// ============================================================================

/// Balanced mixed signal at confidence 0.5.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMixedHandler;

impl FallbackHandler for DefaultMixedHandler {
    fn apply(
        &self,
        rule: &EdgeCaseRule,
        _input: &ResolveInput<'_>,
    ) -> Result<FallbackPayload, StrategyError> {
        Ok(FallbackPayload::new(default_mixed_signal(format!(
            "Applied default mixed preference due to {}",
            rule.case_type
        ))))
    }
}

/// Infers a class from which kinds of content the answer has.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentAnalysisHandler;

impl FallbackHandler for ContentAnalysisHandler {
    fn apply(
        &self,
        _rule: &EdgeCaseRule,
        input: &ResolveInput<'_>,
    ) -> Result<FallbackPayload, StrategyError> {
        let Some(profile) = input.content else {
            let signal = PreferenceSignal::new(
                PreferenceClass::Mixed,
                0.6,
                Intensity::Medium,
                "Content analysis fallback: no content profile available",
            )
            .with_fallback(FallbackStrategy::ContentAnalysis);
            return Ok(FallbackPayload::new(signal));
        };

        let analysis = ContentAnalysis::from_profile(profile);
        let (class, confidence) = match (analysis.has_charts, analysis.has_text) {
            (true, false) => (PreferenceClass::Visual, 0.7),
            (false, true) => (PreferenceClass::Text, 0.7),
            _ => (PreferenceClass::Mixed, 0.6),
        };

        let signal = PreferenceSignal::new(
            class,
            confidence,
            Intensity::Medium,
            format!("Content analysis fallback: {}", analysis.summary),
        )
        .with_fallback(FallbackStrategy::ContentAnalysis);

        Ok(FallbackPayload {
            content_analysis: Some(analysis),
            ..FallbackPayload::new(signal)
        })
    }
}

/// Reuses the stored preference from the request context.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalPreferenceHandler;

impl FallbackHandler for HistoricalPreferenceHandler {
    fn apply(
        &self,
        rule: &EdgeCaseRule,
        input: &ResolveInput<'_>,
    ) -> Result<FallbackPayload, StrategyError> {
        let record = input.context.and_then(|c| c.historical_preference.as_ref());

        let historical = record.and_then(|record| match record.validate() {
            Ok(signal) if signal.class != PreferenceClass::Unclear => Some(signal),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    case_type = %rule.case_type,
                    error = %e,
                    "Stored preference is invalid, using default mixed"
                );
                None
            }
        });

        match historical {
            Some(signal) => {
                // validate() already substitutes the default confidence
                let signal = PreferenceSignal::new(
                    signal.class,
                    signal.confidence,
                    signal.intensity,
                    format!("Using historical preference due to {}", rule.case_type),
                )
                .with_evidence(signal.evidence)
                .with_requests(signal.specific_requests)
                .with_fallback(FallbackStrategy::HistoricalPreference);

                Ok(FallbackPayload {
                    historical_data_used: true,
                    ..FallbackPayload::new(signal)
                })
            }
            None => DefaultMixedHandler.apply(rule, input),
        }
    }
}

/// Keeps whatever is valid in the incoming record at reduced confidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct GracefulDegradationHandler;

impl FallbackHandler for GracefulDegradationHandler {
    fn apply(
        &self,
        rule: &EdgeCaseRule,
        input: &ResolveInput<'_>,
    ) -> Result<FallbackPayload, StrategyError> {
        let record = input.signal;

        let class = record
            .and_then(|r| r.parsed_class())
            .filter(|c| *c != PreferenceClass::Unclear)
            .unwrap_or(PreferenceClass::Mixed);
        let salvaged_confidence = record.and_then(|r| r.valid_confidence()).unwrap_or(0.5);
        let confidence = (salvaged_confidence * 0.7).max(0.3);

        let evidence = record
            .map(|r| r.evidence.truncated(SALVAGE_LIMIT))
            .unwrap_or_else(Evidence::default);
        let requests: Vec<String> = record
            .map(|r| {
                r.specific_requests
                    .iter()
                    .take(SALVAGE_LIMIT)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let signal = PreferenceSignal::new(
            class,
            confidence,
            Intensity::Low,
            format!("Graceful degradation applied due to {}", rule.case_type),
        )
        .with_evidence(evidence)
        .with_requests(requests)
        .with_fallback(FallbackStrategy::GracefulDegradation);

        Ok(FallbackPayload::new(signal))
    }
}

/// Mixed signal at 0.4 with an explanation for the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorDisplayHandler;

impl FallbackHandler for ErrorDisplayHandler {
    fn apply(
        &self,
        rule: &EdgeCaseRule,
        _input: &ResolveInput<'_>,
    ) -> Result<FallbackPayload, StrategyError> {
        let explanation = explanation_for(rule.case_type);
        let signal = PreferenceSignal::new(
            PreferenceClass::Mixed,
            0.4,
            Intensity::Medium,
            explanation,
        )
        .with_fallback(FallbackStrategy::ErrorDisplay);

        Ok(FallbackPayload {
            explanation: Some(explanation.to_string()),
            ..FallbackPayload::new(signal)
        })
    }
}

/// Lowest-confidence mixed signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalResponseHandler;

impl FallbackHandler for MinimalResponseHandler {
    fn apply(
        &self,
        _rule: &EdgeCaseRule,
        _input: &ResolveInput<'_>,
    ) -> Result<FallbackPayload, StrategyError> {
        Ok(minimal_payload())
    }
}

/// User-facing explanation for a case type.
pub fn explanation_for(case_type: EdgeCaseType) -> &'static str {
    match case_type {
        EdgeCaseType::EmptyInput => {
            "No personalization preferences provided. Using balanced display."
        }
        EdgeCaseType::MalformedPreferenceData => {
            "Invalid preference format detected. Using default settings."
        }
        EdgeCaseType::ConflictingPreferences => {
            "Conflicting preferences detected. Using balanced approach."
        }
        EdgeCaseType::MissingContent => {
            "Some content is missing. Displaying available information."
        }
        EdgeCaseType::MissingVisualContent => {
            "You prefer charts, but this answer has none. Showing the written explanation."
        }
        EdgeCaseType::MissingTextContent => {
            "You prefer written explanations, but this answer has none. Showing the visuals."
        }
        EdgeCaseType::DegradedPerformance => {
            "Responses are slow right now. Using a simplified layout."
        }
        EdgeCaseType::ParsingError => {
            "Unable to understand preferences. Using default mixed layout."
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Handler per strategy.
#[derive(Clone)]
pub struct StrategyRegistry {
    handlers: HashMap<FallbackStrategy, Arc<dyn FallbackHandler>>,
}

impl StrategyRegistry {
    /// Registry with the built-in handlers.
    pub fn builtin() -> Self {
        let mut handlers: HashMap<FallbackStrategy, Arc<dyn FallbackHandler>> = HashMap::new();
        handlers.insert(FallbackStrategy::DefaultMixed, Arc::new(DefaultMixedHandler));
        handlers.insert(FallbackStrategy::ContentAnalysis, Arc::new(ContentAnalysisHandler));
        handlers.insert(
            FallbackStrategy::HistoricalPreference,
            Arc::new(HistoricalPreferenceHandler),
        );
        handlers.insert(
            FallbackStrategy::GracefulDegradation,
            Arc::new(GracefulDegradationHandler),
        );
        handlers.insert(FallbackStrategy::ErrorDisplay, Arc::new(ErrorDisplayHandler));
        handlers.insert(FallbackStrategy::MinimalResponse, Arc::new(MinimalResponseHandler));
        Self { handlers }
    }

    /// Replace the handler for a strategy.
    pub fn register(&mut self, strategy: FallbackStrategy, handler: Arc<dyn FallbackHandler>) {
        self.handlers.insert(strategy, handler);
    }

    /// Handler for a strategy.
    pub fn get(&self, strategy: FallbackStrategy) -> Option<Arc<dyn FallbackHandler>> {
        self.handlers.get(&strategy).cloned()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut strategies: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        strategies.sort_unstable();
        f.debug_struct("StrategyRegistry")
            .field("strategies", &strategies)
            .finish()
    }
}
