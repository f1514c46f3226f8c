//! Detection conditions.
//!
//! Conditions are data: they serialize as `{"condition": "<name>", ...}` and
//! are interpreted against a [`ResolveInput`].

use serde::{Deserialize, Serialize};

use super::types::ResolveInput;
use crate::adaptation::ContentType;
use crate::preference::PreferenceClass;

/// A single detection predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum Condition {
    /// Input text is empty or whitespace.
    InputEmpty,
    /// Input text is longer than `max_chars` characters.
    InputLongerThan {
        /// Character limit.
        max_chars: usize,
    },
    /// Braces or brackets in the input do not balance by count.
    UnbalancedMarkers,
    /// No signal record was supplied.
    SignalMissing,
    /// The signal record holds an unrecognized class, out-of-range
    /// confidence or unknown intensity.
    SignalMalformed,
    /// The signal record carries the upstream parse-failure flag.
    ParseFailureFlagged,
    /// Valid confidence strictly below `threshold`.
    ConfidenceBelow {
        /// Exclusive upper bound.
        threshold: f64,
    },
    /// Valid confidence at or below `threshold`.
    ConfidenceAtMost {
        /// Inclusive upper bound.
        threshold: f64,
    },
    /// Confident visual or text class whose opposing evidence outnumbers its
    /// own by more than `ratio` times.
    ConflictingEvidence {
        /// Confidence must exceed this.
        min_confidence: f64,
        /// Opposing-to-own evidence ratio that must be exceeded.
        ratio: usize,
    },
    /// A content profile was supplied and has no blocks.
    NoContentBlocks,
    /// Signal has `class` at `min_confidence` or above, but none of
    /// `content_types` is present in the answer.
    PreferenceWithoutContent {
        /// Preference class to check.
        class: PreferenceClass,
        /// Minimum confidence.
        min_confidence: f64,
        /// Content types that would satisfy the preference.
        content_types: Vec<ContentType>,
    },
    /// Context processing time above `ms`.
    ProcessingTimeAbove {
        /// Milliseconds.
        ms: u64,
    },
    /// Context error count above `count`.
    ErrorCountAbove {
        /// Error count.
        count: u32,
    },
    /// Context memory above `bytes`.
    MemoryAbove {
        /// Bytes.
        bytes: u64,
    },
}

impl Condition {
    /// Evaluate against an input. Total: missing data makes a condition false
    /// unless the condition is about that data being missing.
    pub fn evaluate(&self, input: &ResolveInput<'_>) -> bool {
        match self {
            Condition::InputEmpty => input.text.trim().is_empty(),
            Condition::InputLongerThan { max_chars } => input.text.chars().count() > *max_chars,
            Condition::UnbalancedMarkers => {
                let count = |c: char| input.text.chars().filter(|&x| x == c).count();
                count('{') != count('}') || count('[') != count(']')
            }
            Condition::SignalMissing => input.signal.is_none(),
            Condition::SignalMalformed => input.signal.map(|s| s.is_malformed()).unwrap_or(false),
            Condition::ParseFailureFlagged => {
                input.signal.map(|s| s.parsing_error).unwrap_or(false)
            }
            Condition::ConfidenceBelow { threshold } => input
                .signal
                .and_then(|s| s.valid_confidence())
                .map(|c| c < *threshold)
                .unwrap_or(false),
            Condition::ConfidenceAtMost { threshold } => input
                .signal
                .and_then(|s| s.valid_confidence())
                .map(|c| c <= *threshold)
                .unwrap_or(false),
            Condition::ConflictingEvidence {
                min_confidence,
                ratio,
            } => {
                let Some(signal) = input.signal else {
                    return false;
                };
                let confidence = signal.valid_confidence().unwrap_or(0.5);
                if confidence <= *min_confidence {
                    return false;
                }
                let visual = signal.evidence.visual.len();
                let text = signal.evidence.text.len();
                match signal.parsed_class() {
                    Some(PreferenceClass::Visual) => text > visual.saturating_mul(*ratio),
                    Some(PreferenceClass::Text) => visual > text.saturating_mul(*ratio),
                    _ => false,
                }
            }
            Condition::NoContentBlocks => input
                .content
                .map(|profile| profile.total_blocks == 0)
                .unwrap_or(false),
            Condition::PreferenceWithoutContent {
                class,
                min_confidence,
                content_types,
            } => {
                let (Some(signal), Some(profile)) = (input.signal, input.content) else {
                    return false;
                };
                // An empty answer is reported on its own
                if profile.total_blocks == 0 {
                    return false;
                }
                let confident = signal.parsed_class() == Some(*class)
                    && signal
                        .valid_confidence()
                        .map(|c| c >= *min_confidence)
                        .unwrap_or(false);
                confident && content_types.iter().all(|t| profile.count(*t) == 0)
            }
            Condition::ProcessingTimeAbove { ms } => input
                .context
                .map(|c| c.processing_time_ms > *ms)
                .unwrap_or(false),
            Condition::ErrorCountAbove { count } => input
                .context
                .map(|c| c.error_count > *count)
                .unwrap_or(false),
            Condition::MemoryAbove { bytes } => input
                .context
                .map(|c| c.memory_bytes > *bytes)
                .unwrap_or(false),
        }
    }

    /// Condition name as serialized.
    pub fn name(&self) -> &'static str {
        match self {
            Condition::InputEmpty => "input_empty",
            Condition::InputLongerThan { .. } => "input_longer_than",
            Condition::UnbalancedMarkers => "unbalanced_markers",
            Condition::SignalMissing => "signal_missing",
            Condition::SignalMalformed => "signal_malformed",
            Condition::ParseFailureFlagged => "parse_failure_flagged",
            Condition::ConfidenceBelow { .. } => "confidence_below",
            Condition::ConfidenceAtMost { .. } => "confidence_at_most",
            Condition::ConflictingEvidence { .. } => "conflicting_evidence",
            Condition::NoContentBlocks => "no_content_blocks",
            Condition::PreferenceWithoutContent { .. } => "preference_without_content",
            Condition::ProcessingTimeAbove { .. } => "processing_time_above",
            Condition::ErrorCountAbove { .. } => "error_count_above",
            Condition::MemoryAbove { .. } => "memory_above",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::ContentProfile;
    use crate::preference::{Evidence, SignalRecord};
    use crate::resolver::RequestContext;

    #[test]
    fn test_input_conditions() {
        assert!(Condition::InputEmpty.evaluate(&ResolveInput::new("  \n")));
        assert!(!Condition::InputEmpty.evaluate(&ResolveInput::new("charts")));

        let long = "x".repeat(11);
        assert!(Condition::InputLongerThan { max_chars: 10 }.evaluate(&ResolveInput::new(&long)));
        assert!(!Condition::InputLongerThan { max_chars: 11 }.evaluate(&ResolveInput::new(&long)));

        assert!(Condition::UnbalancedMarkers.evaluate(&ResolveInput::new("{ open")));
        assert!(Condition::UnbalancedMarkers.evaluate(&ResolveInput::new("[a, b")));
        assert!(!Condition::UnbalancedMarkers.evaluate(&ResolveInput::new("{[ok]}")));
    }

    #[test]
    fn test_signal_conditions() {
        let bad = SignalRecord::new("holographic", 0.5);
        let good = SignalRecord::new("visual", 0.0);

        assert!(Condition::SignalMissing.evaluate(&ResolveInput::new("x")));
        assert!(!Condition::SignalMissing.evaluate(&ResolveInput::new("x").with_signal(&good)));
        assert!(Condition::SignalMalformed.evaluate(&ResolveInput::new("x").with_signal(&bad)));
        assert!(!Condition::SignalMalformed.evaluate(&ResolveInput::new("x").with_signal(&good)));

        let at_most = Condition::ConfidenceAtMost { threshold: 0.0 };
        assert!(at_most.evaluate(&ResolveInput::new("x").with_signal(&good)));
        let below = Condition::ConfidenceBelow { threshold: 0.0 };
        assert!(!below.evaluate(&ResolveInput::new("x").with_signal(&good)));

        let mut flagged = SignalRecord::new("text", 0.8);
        flagged.parsing_error = true;
        assert!(Condition::ParseFailureFlagged.evaluate(&ResolveInput::new("x").with_signal(&flagged)));
    }

    #[test]
    fn test_conflicting_evidence() {
        let condition = Condition::ConflictingEvidence {
            min_confidence: 0.7,
            ratio: 2,
        };
        let evidence = Evidence {
            visual: vec!["chart".to_string()],
            text: vec!["text".into(), "detail".into(), "summary".into()],
        };
        let record = SignalRecord::new("visual", 0.9).with_evidence(evidence.clone());
        assert!(condition.evaluate(&ResolveInput::new("x").with_signal(&record)));

        let record = SignalRecord::new("visual", 0.7).with_evidence(evidence.clone());
        assert!(!condition.evaluate(&ResolveInput::new("x").with_signal(&record)));

        let record = SignalRecord::new("text", 0.9).with_evidence(evidence);
        assert!(!condition.evaluate(&ResolveInput::new("x").with_signal(&record)));
    }

    #[test]
    fn test_conflicting_evidence_huge_ratio_saturates() {
        let condition = Condition::ConflictingEvidence {
            min_confidence: 0.5,
            ratio: usize::MAX,
        };
        let evidence = Evidence {
            visual: vec!["chart".to_string(), "graph".to_string()],
            text: vec!["text".into(), "detail".into(), "summary".into()],
        };
        let record = SignalRecord::new("visual", 0.9).with_evidence(evidence.clone());
        assert!(!condition.evaluate(&ResolveInput::new("x").with_signal(&record)));

        let record = SignalRecord::new("text", 0.9).with_evidence(evidence);
        assert!(!condition.evaluate(&ResolveInput::new("x").with_signal(&record)));
    }

    #[test]
    fn test_content_conditions() {
        let empty = ContentProfile::default();
        let text_only = ContentProfile {
            total_blocks: 2,
            text_blocks: 2,
            ..ContentProfile::default()
        };
        let record = SignalRecord::new("visual", 0.9);

        assert!(Condition::NoContentBlocks.evaluate(&ResolveInput::new("x").with_content(&empty)));
        assert!(!Condition::NoContentBlocks.evaluate(&ResolveInput::new("x")));

        let condition = Condition::PreferenceWithoutContent {
            class: PreferenceClass::Visual,
            min_confidence: 0.6,
            content_types: vec![ContentType::Chart],
        };
        let input = ResolveInput::new("x").with_signal(&record).with_content(&text_only);
        assert!(condition.evaluate(&input));

        let input = ResolveInput::new("x").with_signal(&record).with_content(&empty);
        assert!(!condition.evaluate(&input));

        let low = SignalRecord::new("visual", 0.5);
        let input = ResolveInput::new("x").with_signal(&low).with_content(&text_only);
        assert!(!condition.evaluate(&input));
    }

    #[test]
    fn test_context_conditions() {
        let context = RequestContext {
            processing_time_ms: 6000,
            error_count: 4,
            memory_bytes: 10,
            historical_preference: None,
        };
        let input = ResolveInput::new("x").with_context(&context);
        assert!(Condition::ProcessingTimeAbove { ms: 5000 }.evaluate(&input));
        assert!(Condition::ErrorCountAbove { count: 3 }.evaluate(&input));
        assert!(!Condition::MemoryAbove { bytes: 10 }.evaluate(&input));
        assert!(!Condition::ErrorCountAbove { count: 3 }.evaluate(&ResolveInput::new("x")));
    }

    #[test]
    fn test_condition_serde_tag() {
        let json = r#"{"condition": "input_longer_than", "max_chars": 10000}"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition, Condition::InputLongerThan { max_chars: 10000 });
        assert_eq!(condition.name(), "input_longer_than");

        let json = serde_json::to_string(&Condition::InputEmpty).unwrap();
        assert_eq!(json, r#"{"condition":"input_empty"}"#);
    }
}
