//! Data types for edge-case resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::conditions::Condition;
use crate::adaptation::ContentProfile;
use crate::preference::{PreferenceSignal, SignalRecord};

// ============================================================================
// Edge Case Type
// ============================================================================

/// Kind of anomaly a rule detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCaseType {
    /// No input text and no signal.
    EmptyInput,
    /// Signal fields hold values no signal can carry, or the input is garbled.
    MalformedPreferenceData,
    /// Confident class contradicted by its own evidence.
    ConflictingPreferences,
    /// The answer produced no content blocks.
    MissingContent,
    /// Visual preference with no chart to show.
    MissingVisualContent,
    /// Text preference with no prose to show.
    MissingTextContent,
    /// Request is running slow or erroring.
    DegradedPerformance,
    /// Upstream parsing failed.
    ParsingError,
}

impl EdgeCaseType {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeCaseType::EmptyInput => "empty_input",
            EdgeCaseType::MalformedPreferenceData => "malformed_preference_data",
            EdgeCaseType::ConflictingPreferences => "conflicting_preferences",
            EdgeCaseType::MissingContent => "missing_content",
            EdgeCaseType::MissingVisualContent => "missing_visual_content",
            EdgeCaseType::MissingTextContent => "missing_text_content",
            EdgeCaseType::DegradedPerformance => "degraded_performance",
            EdgeCaseType::ParsingError => "parsing_error",
        }
    }
}

impl std::fmt::Display for EdgeCaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Fallback Strategy
// ============================================================================

/// How a detected edge case is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Balanced mixed signal.
    DefaultMixed,
    /// Infer from the shape of the available content.
    ContentAnalysis,
    /// Reuse the caller's stored preference.
    HistoricalPreference,
    /// Salvage what is valid from the incoming record.
    GracefulDegradation,
    /// Mixed signal plus an explanation for the user.
    ErrorDisplay,
    /// Lowest-confidence mixed signal.
    MinimalResponse,
}

impl FallbackStrategy {
    /// All strategies in declaration order.
    pub const ALL: [FallbackStrategy; 6] = [
        FallbackStrategy::DefaultMixed,
        FallbackStrategy::ContentAnalysis,
        FallbackStrategy::HistoricalPreference,
        FallbackStrategy::GracefulDegradation,
        FallbackStrategy::ErrorDisplay,
        FallbackStrategy::MinimalResponse,
    ];

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackStrategy::DefaultMixed => "default_mixed",
            FallbackStrategy::ContentAnalysis => "content_analysis",
            FallbackStrategy::HistoricalPreference => "historical_preference",
            FallbackStrategy::GracefulDegradation => "graceful_degradation",
            FallbackStrategy::ErrorDisplay => "error_display",
            FallbackStrategy::MinimalResponse => "minimal_response",
        }
    }
}

impl std::fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Recovery Action
// ============================================================================

/// Best-effort side effect run after a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Store the fallback signal in the resolver cache.
    CacheResult,
    /// Write a structured incident log line.
    LogIncident,
    /// Send an incident to the monitoring notifier.
    NotifyMonitoring,
    /// Drop cached state for the case type.
    CleanupState,
}

impl RecoveryAction {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryAction::CacheResult => "cache_result",
            RecoveryAction::LogIncident => "log_incident",
            RecoveryAction::NotifyMonitoring => "notify_monitoring",
            RecoveryAction::CleanupState => "cleanup_state",
        }
    }
}

impl std::fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Edge Case Rule
// ============================================================================

/// A declarative detection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCaseRule {
    /// Case this rule reports.
    pub case_type: EdgeCaseType,
    /// Conditions; the rule matches when any is true.
    pub detection: Vec<Condition>,
    /// Higher wins when several rules match.
    pub priority: i32,
    /// Strategy applied when this rule wins.
    pub fallback_strategy: FallbackStrategy,
    /// Actions run after the fallback, in order.
    #[serde(default)]
    pub recovery_actions: Vec<RecoveryAction>,
    /// Message surfaced to the caller.
    pub user_message: String,
}

impl EdgeCaseRule {
    /// Whether any detection condition holds.
    pub fn matches(&self, input: &ResolveInput<'_>) -> bool {
        self.detection.iter().any(|c| c.evaluate(input))
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Runtime signals about the current request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Elapsed processing time so far.
    #[serde(default)]
    pub processing_time_ms: u64,
    /// Errors seen while producing the answer.
    #[serde(default)]
    pub error_count: u32,
    /// Memory in use by the request.
    #[serde(default)]
    pub memory_bytes: u64,
    /// Most recent stored preference for this user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_preference: Option<SignalRecord>,
}

/// Everything the resolver looks at for one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveInput<'a> {
    /// Raw user text.
    pub text: &'a str,
    /// Signal record, when one was produced or supplied.
    pub signal: Option<&'a SignalRecord>,
    /// Block counts of the answer.
    pub content: Option<&'a ContentProfile>,
    /// Request context.
    pub context: Option<&'a RequestContext>,
}

impl<'a> ResolveInput<'a> {
    /// Input with text only.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    /// Attach a signal record.
    pub fn with_signal(mut self, signal: &'a SignalRecord) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Attach a content profile.
    pub fn with_content(mut self, content: &'a ContentProfile) -> Self {
        self.content = Some(content);
        self
    }

    /// Attach a request context.
    pub fn with_context(mut self, context: &'a RequestContext) -> Self {
        self.context = Some(context);
        self
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// Rough size of the available content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// At most one kind of content.
    Low,
    /// Two kinds.
    Medium,
    /// Three or more kinds.
    High,
}

/// Summary of the answer's content produced by the content-analysis strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// Charts or tables present.
    pub has_charts: bool,
    /// Prose present.
    pub has_text: bool,
    /// Raw data present.
    pub has_data: bool,
    /// Kinds present, in `charts, text, data` order.
    pub content_kinds: Vec<String>,
    /// Complexity estimate.
    pub estimated_complexity: Complexity,
    /// One-line description.
    pub summary: String,
}

impl ContentAnalysis {
    /// Analyze a content profile.
    pub fn from_profile(profile: &ContentProfile) -> Self {
        let has_charts = profile.has_visuals();
        let has_text = profile.has_text();
        let has_data = profile.data_blocks > 0;

        let content_kinds: Vec<String> = [(has_charts, "charts"), (has_text, "text"), (has_data, "data")]
            .into_iter()
            .filter(|(present, _)| *present)
            .map(|(_, kind)| kind.to_string())
            .collect();

        let estimated_complexity = match content_kinds.len() {
            0 | 1 => Complexity::Low,
            2 => Complexity::Medium,
            _ => Complexity::High,
        };

        let summary = if content_kinds.is_empty() {
            "Content structure unclear".to_string()
        } else {
            format!("Content contains: {}", content_kinds.join(", "))
        };

        Self {
            has_charts,
            has_text,
            has_data,
            content_kinds,
            estimated_complexity,
            summary,
        }
    }
}

/// Signal and supporting data produced by a fallback strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackPayload {
    /// Replacement signal.
    pub signal: PreferenceSignal,
    /// Explanation to show the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Content analysis, for the content-analysis strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_analysis: Option<ContentAnalysis>,
    /// Whether a stored preference was used.
    #[serde(default)]
    pub historical_data_used: bool,
}

impl FallbackPayload {
    /// Payload carrying only a signal.
    pub fn new(signal: PreferenceSignal) -> Self {
        Self {
            signal,
            explanation: None,
            content_analysis: None,
            historical_data_used: false,
        }
    }
}

/// Outcome of one recovery action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    /// Action run.
    pub action: RecoveryAction,
    /// Whether it succeeded.
    pub success: bool,
    /// Error text on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of resolving one request. Always renderable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCaseResult {
    /// Winning case, if any rule matched.
    pub case_detected: Option<EdgeCaseType>,
    /// All matched cases in declaration order.
    pub detected_cases: Vec<EdgeCaseType>,
    /// Whether a fallback was applied successfully.
    pub handled: bool,
    /// Strategy name, or `"none"` when nothing matched.
    pub fallback_applied: String,
    /// Whether the fallback and all recovery actions succeeded.
    pub recovery_successful: bool,
    /// Message for the caller.
    pub user_message: String,
    /// Replacement signal and data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_payload: Option<FallbackPayload>,
    /// Per-action outcomes.
    #[serde(default)]
    pub recovery_outcomes: Vec<RecoveryOutcome>,
    /// Wall time spent resolving.
    pub processing_time_ms: u64,
}

impl EdgeCaseResult {
    /// Result for a request with no matching rule.
    pub fn pass_through(processing_time_ms: u64) -> Self {
        Self {
            case_detected: None,
            detected_cases: Vec::new(),
            handled: false,
            fallback_applied: "none".to_string(),
            recovery_successful: true,
            user_message: "No edge cases detected".to_string(),
            fallback_payload: None,
            recovery_outcomes: Vec::new(),
            processing_time_ms,
        }
    }

    /// Replacement signal, if a fallback produced one.
    pub fn fallback_signal(&self) -> Option<&PreferenceSignal> {
        self.fallback_payload.as_ref().map(|p| &p.signal)
    }
}

/// Aggregate resolver counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverStatistics {
    /// Requests where a rule matched.
    pub total_edge_cases: u64,
    /// Requests where the fallback and recovery succeeded.
    pub successful_recoveries: u64,
    /// Uses per applied strategy name.
    pub fallback_usage: BTreeMap<String, u64>,
    /// Entries currently in the fallback cache.
    pub fallback_cache_size: usize,
    /// Rules loaded.
    pub rules_configured: usize,
}

impl ResolverStatistics {
    /// Share of edge cases that recovered, or `0.0` when none were seen.
    pub fn recovery_rate(&self) -> f64 {
        if self.total_edge_cases == 0 {
            0.0
        } else {
            self.successful_recoveries as f64 / self.total_edge_cases as f64
        }
    }
}
