//! Rule application.

use tracing::debug;

use super::ordering::order_blocks;
use super::rules::AdaptationRuleSet;
use super::types::{
    clamp_priority, clamp_size_weight, AdaptationRule, ContentBlock, ContentBody, ContentType,
};
use crate::preference::{PreferenceClass, PreferenceSignal};

/// Sentences kept as bullets when a block is made scannable.
const KEY_POINT_COUNT: usize = 3;
/// Minimum length before a mixed block gets a lead-in.
const OVERVIEW_MIN_CHARS: usize = 200;

/// Applies adaptation rules to content blocks.
///
/// Pure: the same blocks and signal always produce the same output.
#[derive(Debug, Clone, Default)]
pub struct AdaptationEngine {
    rules: AdaptationRuleSet,
    rewrite_bodies: bool,
}

impl AdaptationEngine {
    /// Create an engine over a rule set. Body rewriting is enabled.
    pub fn new(rules: AdaptationRuleSet) -> Self {
        Self {
            rules,
            rewrite_bodies: true,
        }
    }

    /// Enable or disable body re-presentation.
    pub fn with_body_rewrites(mut self, enabled: bool) -> Self {
        self.rewrite_bodies = enabled;
        self
    }

    /// The rule set in use.
    pub fn rules(&self) -> &AdaptationRuleSet {
        &self.rules
    }

    /// Adapt each block to the signal. Input order is preserved.
    pub fn adapt(&self, blocks: &[ContentBlock], signal: &PreferenceSignal) -> Vec<ContentBlock> {
        let adapted: Vec<ContentBlock> = blocks
            .iter()
            .map(|block| self.adapt_block(block, signal))
            .collect();

        debug!(
            preference = %signal.class,
            confidence = signal.confidence,
            blocks = blocks.len(),
            adapted = adapted.iter().filter(|b| b.metadata.adapted).count(),
            "Blocks adapted"
        );

        adapted
    }

    /// Adapt, then order for the signal's class.
    pub fn arrange(&self, blocks: &[ContentBlock], signal: &PreferenceSignal) -> Vec<ContentBlock> {
        let mut adapted = self.adapt(blocks, signal);
        order_blocks(&mut adapted, signal.class);
        adapted
    }

    /// Adapt one block. Returns an unchanged copy when no rule applies.
    pub fn adapt_block(&self, block: &ContentBlock, signal: &PreferenceSignal) -> ContentBlock {
        let rule = match self.rules.lookup(signal.class, block.content_type) {
            Some(rule) if signal.confidence >= rule.visibility_threshold => rule,
            _ => return block.clone(),
        };

        let confidence_factor = 0.5 + 0.5 * signal.confidence;
        let intensity_factor = signal.intensity.adaptation_factor();
        let factor = confidence_factor * intensity_factor;

        let mut adapted = block.clone();
        adapted.priority =
            clamp_priority((f64::from(block.priority) + f64::from(rule.priority_boost)) * factor);
        adapted.size_weight = clamp_size_weight(block.size_weight * rule.size_multiplier * factor);

        let metadata = &mut adapted.metadata;
        metadata.adapted = true;
        metadata.original_priority = Some(block.priority);
        metadata.original_size_weight = Some(block.size_weight);
        metadata.rule_position = Some(rule.position_preference);
        metadata.confidence_applied = Some(signal.confidence);
        metadata.intensity_applied = Some(signal.intensity);

        if self.rewrite_bodies {
            present_body(&mut adapted, signal.class, rule);
        }

        adapted
    }
}

/// Re-present an adapted block's body for the reader's preference.
///
/// Visual readers get long `text_analysis` prose as key-point bullets. Text
/// readers get a caption on charts. Mixed readers get an "Overview: " lead-in
/// on long `mixed` prose.
pub fn present_body(block: &mut ContentBlock, preference: PreferenceClass, rule: &AdaptationRule) {
    match (preference, rule.content_type) {
        (PreferenceClass::Visual, ContentType::TextAnalysis) => {
            if let ContentBody::Text(text) = &block.body {
                if let Some(scannable) = make_scannable(text) {
                    block.body = ContentBody::Text(scannable);
                }
            }
        }
        (PreferenceClass::Text, ContentType::Chart) => {
            if let ContentBody::Structured(value) = &block.body {
                block.metadata.caption = Some(chart_caption(value, block.metadata.data_points));
            }
        }
        (PreferenceClass::Mixed, ContentType::Mixed) => {
            if let ContentBody::Text(text) = &block.body {
                if text.chars().count() > OVERVIEW_MIN_CHARS && !text.starts_with("Overview: ") {
                    block.body = ContentBody::Text(format!("Overview: {}", text));
                }
            }
        }
        _ => {}
    }
}

fn make_scannable(text: &str) -> Option<String> {
    let sentences: Vec<&str> = text.split(". ").collect();
    if sentences.len() <= KEY_POINT_COUNT {
        return None;
    }

    let mut out = String::from("Key points:\n");
    for sentence in sentences.iter().take(KEY_POINT_COUNT) {
        let sentence = sentence.trim();
        if !sentence.is_empty() {
            out.push_str("• ");
            out.push_str(sentence);
            out.push('\n');
        }
    }
    out.push_str("\nDetails: ");
    out.push_str(&sentences[KEY_POINT_COUNT..].join(". "));
    Some(out)
}

fn chart_caption(value: &serde_json::Value, data_points: usize) -> String {
    let mut caption = format!(
        "Chart Description: This visualization shows {} data points",
        data_points
    );
    if let Some(title) = value.get("title").and_then(|t| t.as_str()) {
        caption.push_str(" for ");
        caption.push_str(title);
    }
    caption.push('.');
    caption
}
