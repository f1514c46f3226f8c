//! Adaptation rule table.

use std::collections::HashMap;

use super::types::{AdaptationRule, ContentType, Position};
use crate::error::{RuleError, RuleResult};
use crate::preference::PreferenceClass;

/// Validated adaptation rules with at most one rule per key.
#[derive(Debug, Clone)]
pub struct AdaptationRuleSet {
    rules: Vec<AdaptationRule>,
    index: HashMap<(PreferenceClass, ContentType), usize>,
}

impl AdaptationRuleSet {
    /// Validate and index a rule list.
    ///
    /// Rejects duplicate `(preference, content_type)` keys, non-finite or
    /// non-positive size multipliers and thresholds outside `[0, 1]`.
    pub fn new(rules: Vec<AdaptationRule>) -> RuleResult<Self> {
        let mut index = HashMap::with_capacity(rules.len());

        for (position, rule) in rules.iter().enumerate() {
            validate_rule(rule)?;
            if index.insert(rule.key(), position).is_some() {
                return Err(RuleError::DuplicateAdaptationRule {
                    preference: rule.preference.to_string(),
                    content_type: rule.content_type.to_string(),
                });
            }
        }

        Ok(Self { rules, index })
    }

    /// The built-in rule table.
    pub fn builtin() -> Self {
        let rules = builtin_rules();
        let index = rules
            .iter()
            .enumerate()
            .map(|(position, rule)| (rule.key(), position))
            .collect();
        Self { rules, index }
    }

    /// Exact lookup by key.
    pub fn lookup(
        &self,
        preference: PreferenceClass,
        content_type: ContentType,
    ) -> Option<&AdaptationRule> {
        self.index
            .get(&(preference, content_type))
            .map(|&position| &self.rules[position])
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[AdaptationRule] {
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

impl Default for AdaptationRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_rule(rule: &AdaptationRule) -> RuleResult<()> {
    let invalid = |reason: &str| RuleError::InvalidAdaptationRule {
        preference: rule.preference.to_string(),
        content_type: rule.content_type.to_string(),
        reason: reason.to_string(),
    };

    if !rule.size_multiplier.is_finite() || rule.size_multiplier <= 0.0 {
        return Err(invalid("size_multiplier must be finite and positive"));
    }
    if !(0.0..=1.0).contains(&rule.visibility_threshold) {
        return Err(invalid("visibility_threshold must be within [0, 1]"));
    }
    Ok(())
}

fn builtin_rules() -> Vec<AdaptationRule> {
    use ContentType::*;
    use PreferenceClass::{Mixed as MixedPref, Text, Visual};
    use Position::*;

    vec![
        AdaptationRule::new(Visual, Chart, 3, 1.5, Top, 0.8),
        AdaptationRule::new(Visual, Summary, 2, 1.2, Top, 0.9),
        AdaptationRule::new(Visual, TextAnalysis, -1, 0.8, Bottom, 0.6),
        AdaptationRule::new(Visual, Table, 1, 1.2, Middle, 0.6),
        AdaptationRule::new(Text, DetailedExplanation, 3, 1.4, Top, 0.9),
        AdaptationRule::new(Text, Summary, 2, 1.2, Top, 0.8),
        AdaptationRule::new(Text, Chart, -2, 0.7, Bottom, 0.4),
        AdaptationRule::new(Text, TextAnalysis, 1, 1.1, Middle, 0.6),
        AdaptationRule::new(MixedPref, Mixed, 1, 1.0, Middle, 0.7),
        AdaptationRule::new(MixedPref, Summary, 2, 1.1, Top, 0.8),
    ]
}
