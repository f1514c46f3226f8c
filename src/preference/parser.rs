//! Lexical preference signal parser.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keywords::{
    self, AxisKeywords, ABBREVIATIONS, INTENSITY_MODIFIERS, NEGATIONS, PHRASE_WEIGHT,
    PRIMARY_WEIGHT, REQUEST_VERBS, SECONDARY_WEIGHT,
};
use super::types::{Evidence, Intensity, PreferenceClass, PreferenceSignal, SignalScores};

/// Minimum axis gap below which a preference is reported as mixed.
const MIXED_MARGIN: f64 = 2.0;
/// Damping applied to both axes when negation swaps them.
const NEGATION_DAMPING: f64 = 0.8;
/// Maximum number of specific requests kept.
const MAX_SPECIFIC_REQUESTS: usize = 5;

/// How negation tokens affect the axis scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegationPolicy {
    /// Swap the visual and text scores and dampen both by 0.8.
    #[default]
    SwapAndDampen,
    /// Leave scores untouched.
    Ignore,
}

impl NegationPolicy {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NegationPolicy::SwapAndDampen => "swap_and_dampen",
            NegationPolicy::Ignore => "ignore",
        }
    }
}

impl std::str::FromStr for NegationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "swap_and_dampen" | "swap" => Ok(NegationPolicy::SwapAndDampen),
            "ignore" | "none" => Ok(NegationPolicy::Ignore),
            _ => Err(format!("Unknown negation policy: {}", s)),
        }
    }
}

/// Raw weighted keyword scores before intensity and negation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AxisScores {
    /// Visual axis.
    pub visual: f64,
    /// Text axis.
    pub text: f64,
}

/// Turns free text into a [`PreferenceSignal`].
///
/// The parser is a pure function of its input and the static keyword tables;
/// it holds no per-request state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct PreferenceParser {
    negation_policy: NegationPolicy,
}

/// Intermediate result of keyword matching on one axis.
struct AxisMatch {
    score: f64,
    terms: Vec<&'static str>,
    phrases: Vec<&'static str>,
}

impl PreferenceParser {
    /// Create a parser with the default negation policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with an explicit negation policy.
    pub fn with_policy(negation_policy: NegationPolicy) -> Self {
        Self { negation_policy }
    }

    /// The active negation policy.
    pub fn negation_policy(&self) -> NegationPolicy {
        self.negation_policy
    }

    /// Parse free text into a preference signal. Never fails.
    pub fn parse(&self, input: &str) -> PreferenceSignal {
        if input.trim().is_empty() {
            return PreferenceSignal::unclear("No input provided or input is too short to analyze.");
        }

        let text = normalize(input);
        let padded = padded_words(&text);

        let visual = match_axis(&text, &keywords::VISUAL);
        let textual = match_axis(&text, &keywords::TEXT);

        let (intensity, intensity_score) = detect_intensity(&padded);
        let multiplier = intensity.score_multiplier();
        let mut visual_score = visual.score * multiplier;
        let mut text_score = textual.score * multiplier;

        let negated = NEGATIONS.iter().any(|n| contains_word(&padded, n));
        let swapped = negated && self.negation_policy == NegationPolicy::SwapAndDampen;
        if swapped {
            let swapped_visual = text_score * NEGATION_DAMPING;
            text_score = visual_score * NEGATION_DAMPING;
            visual_score = swapped_visual;
        }

        let (class, confidence) = decide(visual_score, text_score);

        // Evidence is filed under the axis it ends up supporting.
        let mut evidence = Evidence::default();
        for term in visual.terms.iter().chain(&visual.phrases) {
            if swapped {
                evidence.push_text(term);
            } else {
                evidence.push_visual(term);
            }
        }
        for term in textual.terms.iter().chain(&textual.phrases) {
            if swapped {
                evidence.push_visual(term);
            } else {
                evidence.push_text(term);
            }
        }

        let reasoning = build_reasoning(
            class,
            visual_score,
            text_score,
            &visual,
            &textual,
            intensity,
            negated,
        );

        debug!(
            class = %class,
            confidence = confidence,
            visual_score = visual_score,
            text_score = text_score,
            negated = negated,
            "Parsed preference signal"
        );

        PreferenceSignal::new(class, confidence, intensity, reasoning)
            .with_evidence(evidence)
            .with_requests(extract_specific_requests(&text))
            .with_scores(SignalScores {
                visual: round2(visual_score),
                text: round2(text_score),
                negated,
                intensity_score,
            })
    }

    /// Raw weighted keyword scores for `input`, before intensity and negation.
    pub fn score_axes(&self, input: &str) -> AxisScores {
        let text = normalize(input);
        AxisScores {
            visual: match_axis(&text, &keywords::VISUAL).score,
            text: match_axis(&text, &keywords::TEXT).score,
        }
    }
}

/// Lowercase, collapse whitespace, expand abbreviations on whole words.
pub(crate) fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .replace('\u{2019}', "'")
        .split_whitespace()
        .map(expand_abbreviation)
        .collect::<Vec<_>>()
        .join(" ")
}

fn expand_abbreviation(token: &str) -> String {
    let core = token.trim_matches(|c: char| !c.is_alphanumeric());
    if core.is_empty() {
        return token.to_string();
    }
    match ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == core) {
        Some((abbr, full)) => token.replacen(abbr, full, 1),
        None => token.to_string(),
    }
}

/// Word sequence of the normalized text, space-padded for phrase lookups.
fn padded_words(text: &str) -> String {
    let words: Vec<&str> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
        .map(|w| w.trim_matches(|c| c == '\'' || c == '-'))
        .filter(|w| !w.is_empty())
        .collect();
    format!(" {} ", words.join(" "))
}

fn contains_word(padded: &str, word: &str) -> bool {
    padded.contains(&format!(" {} ", word))
}

fn match_axis(text: &str, table: &AxisKeywords) -> AxisMatch {
    let mut score = 0.0;
    let mut terms = Vec::new();
    let mut phrases = Vec::new();

    for term in table.primary {
        if text.contains(term) {
            score += PRIMARY_WEIGHT;
            terms.push(*term);
        }
    }
    for term in table.secondary {
        if text.contains(term) {
            score += SECONDARY_WEIGHT;
            terms.push(*term);
        }
    }
    for phrase in table.phrases {
        if text.contains(phrase) {
            score += PHRASE_WEIGHT;
            phrases.push(*phrase);
        }
    }

    AxisMatch {
        score,
        terms,
        phrases,
    }
}

/// Intensity level and raw modifier points.
///
/// No modifiers means medium. Any high modifier, or six or more points, means
/// high. Only hedging modifiers means low.
fn detect_intensity(padded: &str) -> (Intensity, u32) {
    let mut points = 0;
    let mut saw_high = false;
    let mut saw_non_low = false;
    let mut found = 0usize;

    for (modifier, level) in INTENSITY_MODIFIERS {
        if contains_word(padded, modifier) {
            found += 1;
            points += keywords::modifier_points(*level);
            saw_high |= *level == Intensity::High;
            saw_non_low |= *level != Intensity::Low;
        }
    }

    let level = if found == 0 {
        Intensity::Medium
    } else if saw_high || points >= 6 {
        Intensity::High
    } else if !saw_non_low {
        Intensity::Low
    } else {
        Intensity::Medium
    };
    (level, points)
}

fn decide(visual: f64, text: f64) -> (PreferenceClass, f64) {
    let total = visual + text;
    if total <= 0.0 {
        return (PreferenceClass::Unclear, 0.0);
    }

    let (class, confidence) = if (visual - text).abs() < MIXED_MARGIN {
        (PreferenceClass::Mixed, (total / 10.0).min(0.8))
    } else if visual > text {
        (PreferenceClass::Visual, (visual / total.max(10.0)).min(1.0))
    } else {
        (PreferenceClass::Text, (text / total.max(10.0)).min(1.0))
    };

    let confidence = round2(confidence);
    if confidence == 0.0 {
        (PreferenceClass::Unclear, 0.0)
    } else {
        (class, confidence)
    }
}

fn build_reasoning(
    class: PreferenceClass,
    visual_score: f64,
    text_score: f64,
    visual: &AxisMatch,
    textual: &AxisMatch,
    intensity: Intensity,
    negated: bool,
) -> String {
    if class == PreferenceClass::Unclear {
        return "Unable to determine clear preference from input. No strong indicators found."
            .to_string();
    }

    let mut parts = vec![match class {
        PreferenceClass::Visual => format!(
            "Strong visual preference detected (score: {:.1} vs {:.1})",
            visual_score, text_score
        ),
        PreferenceClass::Text => format!(
            "Strong text preference detected (score: {:.1} vs {:.1})",
            text_score, visual_score
        ),
        _ => format!(
            "Mixed preference detected (visual: {:.1}, text: {:.1})",
            visual_score, text_score
        ),
    }];

    if !visual.terms.is_empty() {
        parts.push(format!("{} visual keyword(s) found", visual.terms.len()));
    }
    if !textual.terms.is_empty() {
        parts.push(format!("{} text keyword(s) found", textual.terms.len()));
    }
    if !visual.phrases.is_empty() {
        let shown: Vec<&str> = visual.phrases.iter().take(2).copied().collect();
        parts.push(format!("Visual context phrases: {}", shown.join(", ")));
    }
    if !textual.phrases.is_empty() {
        let shown: Vec<&str> = textual.phrases.iter().take(2).copied().collect();
        parts.push(format!("Text context phrases: {}", shown.join(", ")));
    }
    if intensity != Intensity::Medium {
        parts.push(format!("Intensity level: {}", intensity));
    }
    if negated {
        parts.push("Negation detected, axis emphasis flipped".to_string());
    }

    format!("{}.", parts.join(". "))
}

fn request_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        REQUEST_VERBS
            .iter()
            .filter_map(|verb| Regex::new(&format!(r"\b{}\s+(\w+(?:\s+\w+)*)", verb)).ok())
            .collect()
    })
}

fn extract_specific_requests(text: &str) -> Vec<String> {
    let mut requests: Vec<String> = Vec::new();
    for pattern in request_patterns() {
        for captures in pattern.captures_iter(text) {
            if let Some(m) = captures.get(1) {
                let request = m.as_str().to_string();
                if !requests.contains(&request) {
                    requests.push(request);
                }
            }
        }
    }
    requests.truncate(MAX_SPECIFIC_REQUESTS);
    requests
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  Show   ME\tCharts "), "show me charts");
    }

    #[test]
    fn test_normalize_expands_whole_word_abbreviations() {
        assert_eq!(normalize("viz please"), "visualization please");
        assert_eq!(normalize("more info, thanks"), "more information, thanks");
        // Substrings of longer words are left alone
        assert_eq!(normalize("vision and infomercial"), "vision and infomercial");
    }

    #[test]
    fn test_contains_word_boundaries() {
        let padded = padded_words("i know this is not great");
        assert!(contains_word(&padded, "not"));
        assert!(!contains_word(&padded, "no"));
    }

    #[test]
    fn test_detect_intensity_levels() {
        assert_eq!(detect_intensity(&padded_words("charts please")).0, Intensity::Medium);
        assert_eq!(detect_intensity(&padded_words("always charts")).0, Intensity::High);
        assert_eq!(detect_intensity(&padded_words("maybe charts")).0, Intensity::Low);
        assert_eq!(detect_intensity(&padded_words("i usually prefer charts")).0, Intensity::Medium);
        let (level, points) = detect_intensity(&padded_words("usually often mostly"));
        assert_eq!(level, Intensity::High);
        assert_eq!(points, 6);
    }

    #[test]
    fn test_decide_unclear_on_zero() {
        assert_eq!(decide(0.0, 0.0), (PreferenceClass::Unclear, 0.0));
    }

    #[test]
    fn test_decide_mixed_within_margin() {
        let (class, confidence) = decide(6.0, 5.0);
        assert_eq!(class, PreferenceClass::Mixed);
        assert_eq!(confidence, 0.8);

        let (class, confidence) = decide(3.0, 2.0);
        assert_eq!(class, PreferenceClass::Mixed);
        assert_eq!(confidence, 0.5);
    }

    #[test]
    fn test_decide_winner_confidence() {
        let (class, confidence) = decide(6.0, 0.0);
        assert_eq!(class, PreferenceClass::Visual);
        assert_eq!(confidence, 0.6);

        let (class, confidence) = decide(2.0, 20.0);
        assert_eq!(class, PreferenceClass::Text);
        assert_eq!(confidence, 0.91);
    }

    #[test]
    fn test_extract_specific_requests() {
        let requests = extract_specific_requests("show me charts and graphs. i want detail");
        assert_eq!(requests, vec!["charts and graphs", "detail"]);
    }

    #[test]
    fn test_extract_specific_requests_limit() {
        let text = "show me a. show me b. show me c. show me d. show me e. show me f";
        assert_eq!(extract_specific_requests(text).len(), MAX_SPECIFIC_REQUESTS);
    }

    #[test]
    fn test_negation_policy_from_str() {
        assert_eq!("swap_and_dampen".parse::<NegationPolicy>().unwrap(), NegationPolicy::SwapAndDampen);
        assert_eq!("IGNORE".parse::<NegationPolicy>().unwrap(), NegationPolicy::Ignore);
        assert!("zero".parse::<NegationPolicy>().is_err());
    }

    #[test]
    fn test_parse_empty_input() {
        let signal = PreferenceParser::new().parse("   \n\t ");
        assert_eq!(signal.class, PreferenceClass::Unclear);
        assert_eq!(signal.confidence, 0.0);
        assert!(signal.evidence.is_empty());
    }

    #[test]
    fn test_parse_visual_phrase() {
        let signal = PreferenceParser::new().parse("show me charts and graphs");
        assert_eq!(signal.class, PreferenceClass::Visual);
        assert!(signal.confidence >= 0.6);
        assert!(signal.evidence.visual.contains(&"charts".to_string()));
        assert!(signal.evidence.visual.contains(&"show me charts".to_string()));
        assert!(signal.evidence.text.is_empty());
        assert_eq!(signal.specific_requests, vec!["charts and graphs"]);
    }

    #[test]
    fn test_parse_negation_swaps_emphasis() {
        let parser = PreferenceParser::new();
        let signal = parser.parse("I don't want charts or graphs");
        assert!(signal.scores.negated);
        assert_eq!(signal.class, PreferenceClass::Text);

        let ignoring = PreferenceParser::with_policy(NegationPolicy::Ignore);
        let signal = ignoring.parse("I don't want charts or graphs");
        assert_eq!(signal.class, PreferenceClass::Visual);
    }

    #[test]
    fn test_parse_negation_moves_evidence_with_scores() {
        let signal = PreferenceParser::new().parse("I don't want charts or graphs");
        assert!(signal.evidence.visual.is_empty());
        assert!(signal.evidence.text.contains(&"charts".to_string()));
        assert!(signal.evidence.text.contains(&"graphs".to_string()));

        let ignoring = PreferenceParser::with_policy(NegationPolicy::Ignore);
        let signal = ignoring.parse("I don't want charts or graphs");
        assert!(signal.evidence.text.is_empty());
        assert!(signal.evidence.visual.contains(&"charts".to_string()));
    }

    #[test]
    fn test_parse_no_keywords_is_unclear() {
        let signal = PreferenceParser::new().parse("hello there, how are you?");
        assert_eq!(signal.class, PreferenceClass::Unclear);
        assert_eq!(signal.confidence, 0.0);
        assert!(signal.reasoning.contains("Unable to determine"));
    }
}
