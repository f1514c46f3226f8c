//! Data types for preference signals.

use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::resolver::FallbackStrategy;

/// Confidence assumed for a record that carries a valid class but no confidence.
pub const DEFAULT_RECORD_CONFIDENCE: f64 = 0.6;

// ============================================================================
// Preference Class
// ============================================================================

/// Coarse presentation preference inferred for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceClass {
    /// Charts, graphs and other visual content first.
    Visual,
    /// Written explanations first.
    Text,
    /// Balanced presentation.
    Mixed,
    /// No usable evidence.
    Unclear,
}

impl PreferenceClass {
    /// All classes in declaration order.
    pub const ALL: [PreferenceClass; 4] = [
        PreferenceClass::Visual,
        PreferenceClass::Text,
        PreferenceClass::Mixed,
        PreferenceClass::Unclear,
    ];

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceClass::Visual => "visual",
            PreferenceClass::Text => "text",
            PreferenceClass::Mixed => "mixed",
            PreferenceClass::Unclear => "unclear",
        }
    }
}

impl std::fmt::Display for PreferenceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PreferenceClass {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "visual" => Ok(PreferenceClass::Visual),
            "text" => Ok(PreferenceClass::Text),
            "mixed" => Ok(PreferenceClass::Mixed),
            "unclear" => Ok(PreferenceClass::Unclear),
            _ => Err(SignalError::UnknownClass {
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Intensity
// ============================================================================

/// Strength of the preference expression, independent of its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    /// Hedged language ("maybe", "sometimes").
    Low,
    /// Neutral.
    Medium,
    /// Emphatic language ("always", "definitely").
    High,
}

impl Intensity {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }

    /// Multiplier applied to both axis scores while parsing.
    pub fn score_multiplier(&self) -> f64 {
        match self {
            Intensity::Low => 0.7,
            Intensity::Medium => 1.0,
            Intensity::High => 1.5,
        }
    }

    /// Factor applied to priority and size during adaptation.
    pub fn adaptation_factor(&self) -> f64 {
        match self {
            Intensity::Low => 0.7,
            Intensity::Medium => 1.0,
            Intensity::High => 1.3,
        }
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Intensity {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            _ => Err(SignalError::UnknownIntensity {
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Evidence
// ============================================================================

/// Matched keywords and phrases, partitioned by the axis they support.
///
/// Each list holds distinct entries in keyword-table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Evidence for a visual preference.
    #[serde(default)]
    pub visual: Vec<String>,
    /// Evidence for a text preference.
    #[serde(default)]
    pub text: Vec<String>,
}

impl Evidence {
    /// True when neither axis has evidence.
    pub fn is_empty(&self) -> bool {
        self.visual.is_empty() && self.text.is_empty()
    }

    /// Total number of evidence entries.
    pub fn len(&self) -> usize {
        self.visual.len() + self.text.len()
    }

    /// Copy with each axis cut to at most `max` entries.
    pub fn truncated(&self, max: usize) -> Self {
        Self {
            visual: self.visual.iter().take(max).cloned().collect(),
            text: self.text.iter().take(max).cloned().collect(),
        }
    }

    pub(crate) fn push_visual(&mut self, entry: &str) {
        if !self.visual.iter().any(|e| e == entry) {
            self.visual.push(entry.to_string());
        }
    }

    pub(crate) fn push_text(&mut self, entry: &str) {
        if !self.text.iter().any(|e| e == entry) {
            self.text.push(entry.to_string());
        }
    }
}

/// Final axis scores and modifier flags, kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalScores {
    /// Visual axis score after intensity and negation.
    pub visual: f64,
    /// Text axis score after intensity and negation.
    pub text: f64,
    /// Whether a negation token was present.
    pub negated: bool,
    /// Sum of intensity modifier points.
    pub intensity_score: u32,
}

// ============================================================================
// Preference Signal
// ============================================================================

/// The inferred presentation preference for one request.
///
/// Invariant: `confidence == 0` implies `class == Unclear`. Constructors
/// enforce it, so a signal built through this API always satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSignal {
    /// Preference class.
    pub class: PreferenceClass,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Intensity of the expression.
    pub intensity: Intensity,
    /// Matched keywords and phrases.
    pub evidence: Evidence,
    /// Human-readable trace of the decision.
    pub reasoning: String,
    /// Phrases captured after request verbs ("show me ...").
    #[serde(default)]
    pub specific_requests: Vec<String>,
    /// Axis scores and modifiers.
    #[serde(default)]
    pub scores: SignalScores,
    /// Set when the signal was issued by an edge-case fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_strategy: Option<FallbackStrategy>,
}

impl PreferenceSignal {
    /// Create a signal, normalizing confidence into `[0, 1]`.
    pub fn new(
        class: PreferenceClass,
        confidence: f64,
        intensity: Intensity,
        reasoning: impl Into<String>,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let class = if confidence == 0.0 {
            PreferenceClass::Unclear
        } else {
            class
        };
        Self {
            class,
            confidence,
            intensity,
            evidence: Evidence::default(),
            reasoning: reasoning.into(),
            specific_requests: Vec::new(),
            scores: SignalScores::default(),
            fallback_strategy: None,
        }
    }

    /// A signal carrying no evidence at all.
    pub fn unclear(reasoning: impl Into<String>) -> Self {
        Self::new(PreferenceClass::Unclear, 0.0, Intensity::Low, reasoning)
    }

    /// Attach evidence.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    /// Attach specific requests.
    pub fn with_requests(mut self, requests: Vec<String>) -> Self {
        self.specific_requests = requests;
        self
    }

    /// Attach diagnostic scores.
    pub fn with_scores(mut self, scores: SignalScores) -> Self {
        self.scores = scores;
        self
    }

    /// Tag the signal as produced by a fallback strategy.
    pub fn with_fallback(mut self, strategy: FallbackStrategy) -> Self {
        self.fallback_strategy = Some(strategy);
        self
    }

    /// Whether this signal was issued by the edge-case resolver.
    pub fn is_fallback(&self) -> bool {
        self.fallback_strategy.is_some()
    }

    /// Check the `confidence == 0 => unclear` invariant and range.
    pub fn is_consistent(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
            && (self.confidence != 0.0 || self.class == PreferenceClass::Unclear)
    }
}

// ============================================================================
// Signal Record
// ============================================================================

/// Untrusted, serializable form of a preference signal.
///
/// Records arrive from outside the process (stored profiles, caller JSON) and
/// may carry values a [`PreferenceSignal`] cannot represent. The edge-case
/// resolver inspects records rather than signals for that reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Preference class as supplied.
    #[serde(default, alias = "preference")]
    pub class: Option<String>,
    /// Confidence as supplied.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Intensity as supplied.
    #[serde(default)]
    pub intensity: Option<String>,
    /// Evidence lists.
    #[serde(default, alias = "keywords_found")]
    pub evidence: Evidence,
    /// Specific requests.
    #[serde(default)]
    pub specific_requests: Vec<String>,
    /// Set by the producer when parsing failed upstream.
    #[serde(default)]
    pub parsing_error: bool,
}

impl SignalRecord {
    /// Build a record from a class name and confidence.
    pub fn new(class: impl Into<String>, confidence: f64) -> Self {
        Self {
            class: Some(class.into()),
            confidence: Some(confidence),
            ..Self::default()
        }
    }

    /// Attach evidence.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    /// Parsed class, if present and recognized.
    pub fn parsed_class(&self) -> Option<PreferenceClass> {
        self.class.as_deref().and_then(|c| c.parse().ok())
    }

    /// Confidence, if present and inside `[0, 1]`.
    pub fn valid_confidence(&self) -> Option<f64> {
        self.confidence
            .filter(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    /// True when a present field holds a value no signal can carry.
    pub fn is_malformed(&self) -> bool {
        let bad_class = self.class.is_some() && self.parsed_class().is_none();
        let bad_confidence = self.confidence.is_some() && self.valid_confidence().is_none();
        let bad_intensity = self
            .intensity
            .as_deref()
            .map(|i| i.parse::<Intensity>().is_err())
            .unwrap_or(false);
        bad_class || bad_confidence || bad_intensity
    }

    /// Validate into a [`PreferenceSignal`].
    ///
    /// A missing class is reported as [`SignalError::UnknownClass`]; a missing
    /// confidence defaults to [`DEFAULT_RECORD_CONFIDENCE`] and a missing
    /// intensity to medium.
    pub fn validate(&self) -> Result<PreferenceSignal, SignalError> {
        let class: PreferenceClass = self
            .class
            .as_deref()
            .unwrap_or("")
            .parse()?;

        let confidence = match self.confidence {
            Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => c,
            Some(c) => return Err(SignalError::ConfidenceOutOfRange { value: c }),
            None => DEFAULT_RECORD_CONFIDENCE,
        };

        let intensity = match self.intensity.as_deref() {
            Some(i) => i.parse()?,
            None => Intensity::Medium,
        };

        Ok(
            PreferenceSignal::new(class, confidence, intensity, "Validated from record")
                .with_evidence(self.evidence.clone())
                .with_requests(self.specific_requests.clone()),
        )
    }
}

impl From<&PreferenceSignal> for SignalRecord {
    fn from(signal: &PreferenceSignal) -> Self {
        Self {
            class: Some(signal.class.as_str().to_string()),
            confidence: Some(signal.confidence),
            intensity: Some(signal.intensity.as_str().to_string()),
            evidence: signal.evidence.clone(),
            specific_requests: signal.specific_requests.clone(),
            parsing_error: false,
        }
    }
}
