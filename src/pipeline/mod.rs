//! End-to-end personalization.
//!
//! ```text
//! parse → decompose → resolve edge cases → adapt → order → layout
//! ```
//!
//! The resolver runs before adaptation so that a fallback signal, when one
//! is issued, drives the adaptation instead of the parsed signal.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adaptation::{
    decompose, AdaptationEngine, AnswerDocument, ContentBlock, ContentProfile, LayoutPlan,
};
use crate::config::Config;
use crate::error::AppResult;
use crate::preference::{PreferenceParser, PreferenceSignal, SignalRecord};
use crate::resolver::{EdgeCaseResolver, EdgeCaseResult, RequestContext, ResolveInput, ResolverStore};

/// One personalization request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationRequest {
    /// What the user wrote about how they like answers.
    #[serde(default)]
    pub raw_user_text: String,
    /// The generated answer to personalize.
    #[serde(default)]
    pub answer_content: AnswerDocument,
    /// Runtime context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<RequestContext>,
}

/// The personalized answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationResponse {
    /// Signal that drove the adaptation.
    pub preference: PreferenceSignal,
    /// Adapted blocks in presentation order.
    pub ordered_blocks: Vec<ContentBlock>,
    /// Edge-case outcome.
    pub edge_case: EdgeCaseResult,
    /// Chart/text balance hints.
    pub layout: LayoutPlan,
    /// Wall time for the whole request.
    pub processing_time_ms: u64,
}

/// Parser, engine and resolver wired together.
#[derive(Debug)]
pub struct Personalizer {
    parser: PreferenceParser,
    engine: AdaptationEngine,
    resolver: EdgeCaseResolver,
}

impl Personalizer {
    /// Assemble from parts.
    pub fn new(parser: PreferenceParser, engine: AdaptationEngine, resolver: EdgeCaseResolver) -> Self {
        Self {
            parser,
            engine,
            resolver,
        }
    }

    /// Build from configuration, loading rule files where configured.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let (adaptation_rules, edge_case_rules) = config.rule_tables()?.into_sets();

        let parser = PreferenceParser::with_policy(config.parser.negation_policy);
        let engine = AdaptationEngine::new(adaptation_rules)
            .with_body_rewrites(config.adaptation.rewrite_bodies);
        let store = Arc::new(ResolverStore::new(
            config.resolver.cache_capacity,
            config.resolver.cache_ttl_secs,
        ));
        let resolver = EdgeCaseResolver::new(edge_case_rules).with_store(store);

        Ok(Self::new(parser, engine, resolver))
    }

    /// The parser in use.
    pub fn parser(&self) -> &PreferenceParser {
        &self.parser
    }

    /// The resolver in use.
    pub fn resolver(&self) -> &EdgeCaseResolver {
        &self.resolver
    }

    /// Personalize one answer. Never fails.
    pub fn personalize(&self, request: &PersonalizationRequest) -> PersonalizationResponse {
        let start = Instant::now();

        let parsed = self.parser.parse(&request.raw_user_text);
        let blocks = decompose(&request.answer_content);
        let profile = ContentProfile::from_blocks(&blocks);
        let record = SignalRecord::from(&parsed);

        let mut input = ResolveInput::new(&request.raw_user_text)
            .with_signal(&record)
            .with_content(&profile);
        if let Some(context) = &request.context {
            input = input.with_context(context);
        }
        let edge_case = self.resolver.resolve(&input);

        let preference = edge_case.fallback_signal().cloned().unwrap_or(parsed);
        let ordered_blocks = self.engine.arrange(&blocks, &preference);
        let layout = LayoutPlan::for_signal(&preference);

        let processing_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            preference = %preference.class,
            confidence = preference.confidence,
            blocks = ordered_blocks.len(),
            edge_case = edge_case.case_detected.map(|c| c.as_str()).unwrap_or("none"),
            latency_ms = processing_time_ms,
            "Answer personalized"
        );

        PersonalizationResponse {
            preference,
            ordered_blocks,
            edge_case,
            layout,
            processing_time_ms,
        }
    }
}

impl Default for Personalizer {
    fn default() -> Self {
        Self::new(
            PreferenceParser::default(),
            AdaptationEngine::default(),
            EdgeCaseResolver::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::{ChartPayload, ContentType};
    use crate::preference::PreferenceClass;
    use crate::resolver::EdgeCaseType;
    use serde_json::json;

    #[test]
    fn test_visual_request_puts_chart_first() {
        let request = PersonalizationRequest {
            raw_user_text: "I always want charts and graphs, show me visual data".to_string(),
            answer_content: AnswerDocument::from_text("First part.\n\nSecond part.\n\nThird part.")
                .with_chart(ChartPayload::new("bar", json!([1, 2, 3]))),
            context: None,
        };

        let response = Personalizer::default().personalize(&request);
        assert_eq!(response.preference.class, PreferenceClass::Visual);
        assert!(response.edge_case.case_detected.is_none());
        assert_eq!(response.ordered_blocks[0].content_type, ContentType::Chart);
        assert!(response.ordered_blocks[0].metadata.adapted);
        assert!(response.ordered_blocks[0].size_weight > 1.5);
    }

    #[test]
    fn test_empty_request_uses_fallback_signal() {
        let response = Personalizer::default().personalize(&PersonalizationRequest::default());
        assert_eq!(
            response.edge_case.case_detected,
            Some(EdgeCaseType::EmptyInput)
        );
        assert_eq!(response.preference.class, PreferenceClass::Mixed);
        assert!(response.preference.is_fallback());
        assert!(response.ordered_blocks.is_empty());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: PersonalizationRequest =
            serde_json::from_str(r#"{"raw_user_text": "charts please"}"#).unwrap();
        assert_eq!(request.raw_user_text, "charts please");
        assert!(request.answer_content.text.is_empty());
        assert!(request.context.is_none());
    }
}
