//! Edge-case rule table.

use std::collections::HashSet;

use super::conditions::Condition;
use super::types::{EdgeCaseRule, EdgeCaseType, FallbackStrategy, RecoveryAction};
use crate::adaptation::ContentType;
use crate::error::{RuleError, RuleResult};
use crate::preference::PreferenceClass;

/// Input length above which the input is treated as malformed.
pub const MAX_INPUT_CHARS: usize = 10_000;
/// Processing time above which a request is degraded.
pub const SLOW_REQUEST_MS: u64 = 5_000;
/// Error count above which a request is degraded.
pub const MAX_REQUEST_ERRORS: u32 = 3;
/// Memory above which a request is degraded.
pub const MAX_REQUEST_MEMORY_BYTES: u64 = 100 * 1024 * 1024;

/// Validated edge-case rules in declaration order.
#[derive(Debug, Clone)]
pub struct EdgeCaseRuleSet {
    rules: Vec<EdgeCaseRule>,
}

impl EdgeCaseRuleSet {
    /// Validate a rule list.
    ///
    /// Each rule needs at least one condition and a non-empty message, and a
    /// case type may appear only once.
    pub fn new(rules: Vec<EdgeCaseRule>) -> RuleResult<Self> {
        let mut seen = HashSet::new();

        for rule in &rules {
            let invalid = |reason: &str| RuleError::InvalidEdgeCaseRule {
                case_type: rule.case_type.to_string(),
                reason: reason.to_string(),
            };

            if rule.detection.is_empty() {
                return Err(invalid("no detection conditions"));
            }
            if rule.user_message.trim().is_empty() {
                return Err(invalid("empty user message"));
            }
            if !seen.insert(rule.case_type) {
                return Err(invalid("duplicate case type"));
            }
        }

        Ok(Self { rules })
    }

    /// The built-in rule table.
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[EdgeCaseRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for EdgeCaseRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn rule(
    case_type: EdgeCaseType,
    detection: Vec<Condition>,
    priority: i32,
    fallback_strategy: FallbackStrategy,
    recovery_actions: Vec<RecoveryAction>,
    user_message: &str,
) -> EdgeCaseRule {
    EdgeCaseRule {
        case_type,
        detection,
        priority,
        fallback_strategy,
        recovery_actions,
        user_message: user_message.to_string(),
    }
}

fn builtin_rules() -> Vec<EdgeCaseRule> {
    use RecoveryAction::*;

    vec![
        rule(
            EdgeCaseType::EmptyInput,
            vec![Condition::InputEmpty, Condition::SignalMissing],
            8,
            FallbackStrategy::DefaultMixed,
            vec![LogIncident, CacheResult],
            "No preferences specified. Using balanced layout.",
        ),
        rule(
            EdgeCaseType::MalformedPreferenceData,
            vec![
                Condition::SignalMalformed,
                Condition::InputLongerThan {
                    max_chars: MAX_INPUT_CHARS,
                },
                Condition::UnbalancedMarkers,
            ],
            9,
            FallbackStrategy::GracefulDegradation,
            vec![CleanupState, LogIncident],
            "Invalid data format detected. Using recovered settings.",
        ),
        rule(
            EdgeCaseType::ConflictingPreferences,
            vec![Condition::ConflictingEvidence {
                min_confidence: 0.7,
                ratio: 2,
            }],
            7,
            FallbackStrategy::ContentAnalysis,
            vec![LogIncident],
            "Conflicting preferences detected. Using content-based analysis.",
        ),
        rule(
            EdgeCaseType::MissingContent,
            vec![Condition::NoContentBlocks],
            6,
            FallbackStrategy::ErrorDisplay,
            vec![LogIncident],
            "Some content is unavailable. Displaying what's available.",
        ),
        rule(
            EdgeCaseType::MissingVisualContent,
            vec![Condition::PreferenceWithoutContent {
                class: PreferenceClass::Visual,
                min_confidence: 0.6,
                content_types: vec![ContentType::Chart],
            }],
            6,
            FallbackStrategy::ErrorDisplay,
            vec![LogIncident],
            "Charts are not available for this answer. Showing a written explanation instead.",
        ),
        rule(
            EdgeCaseType::MissingTextContent,
            vec![Condition::PreferenceWithoutContent {
                class: PreferenceClass::Text,
                min_confidence: 0.6,
                content_types: vec![
                    ContentType::Summary,
                    ContentType::DetailedExplanation,
                    ContentType::TextAnalysis,
                    ContentType::Mixed,
                ],
            }],
            6,
            FallbackStrategy::ErrorDisplay,
            vec![LogIncident],
            "A written explanation is not available for this answer. Showing the available visuals.",
        ),
        rule(
            EdgeCaseType::DegradedPerformance,
            vec![
                Condition::ProcessingTimeAbove {
                    ms: SLOW_REQUEST_MS,
                },
                Condition::ErrorCountAbove {
                    count: MAX_REQUEST_ERRORS,
                },
                Condition::MemoryAbove {
                    bytes: MAX_REQUEST_MEMORY_BYTES,
                },
            ],
            5,
            FallbackStrategy::MinimalResponse,
            vec![NotifyMonitoring, LogIncident],
            "Optimizing for performance. Using simplified layout.",
        ),
        rule(
            EdgeCaseType::ParsingError,
            vec![
                Condition::ParseFailureFlagged,
                Condition::ConfidenceAtMost { threshold: 0.0 },
            ],
            8,
            FallbackStrategy::HistoricalPreference,
            vec![LogIncident, CleanupState],
            "Unable to parse preferences. Using previous settings or defaults.",
        ),
    ]
}
