//! Content adaptation tests
//!
//! Decomposition, rule application, ordering and layout exercised through
//! the public adaptation API.

use pretty_assertions::assert_eq;
use serde_json::json;

use prefadapt::adaptation::{
    decompose, AdaptationEngine, AdaptationRule, AdaptationRuleSet, AnswerDocument, ChartPayload,
    ContentBlock, ContentBody, ContentProfile, ContentType, LayoutMode, LayoutPlan, Position,
    TablePayload, MAX_PRIORITY, MAX_SIZE_WEIGHT, MIN_PRIORITY, MIN_SIZE_WEIGHT,
};
use prefadapt::error::RuleError;
use prefadapt::preference::{Intensity, PreferenceClass, PreferenceSignal};

fn signal(class: PreferenceClass, confidence: f64, intensity: Intensity) -> PreferenceSignal {
    PreferenceSignal::new(class, confidence, intensity, "test")
}

fn revenue_answer() -> AnswerDocument {
    AnswerDocument::from_text("Revenue climbed steadily.\n\nCosts were flat.")
        .with_chart(ChartPayload::new("bar", json!([1, 2, 3])).with_title("Revenue"))
}

fn types(blocks: &[ContentBlock]) -> Vec<ContentType> {
    blocks.iter().map(|b| b.content_type).collect()
}

// ============================================================================
// Decomposition
// ============================================================================

#[test]
fn test_decompose_orders_sources() {
    let document = revenue_answer()
        .with_table(TablePayload {
            title: Some("Costs".to_string()),
            columns: vec!["month".to_string(), "cost".to_string()],
            rows: vec![vec![json!("jan"), json!(10)]],
        })
        .with_data(json!({"q1": 1, "q2": 2}))
        .with_summary("Revenue is up.");

    let blocks = decompose(&document);

    assert_eq!(
        types(&blocks),
        vec![
            ContentType::Mixed,
            ContentType::Mixed,
            ContentType::Chart,
            ContentType::Table,
            ContentType::RawData,
            ContentType::Summary,
        ]
    );
    let indices: Vec<usize> = blocks.iter().map(|b| b.metadata.source_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(blocks[2].metadata.data_points, 3);
    assert_eq!(blocks[4].metadata.data_points, 2);
}

#[test]
fn test_decompose_empty_document() {
    let blocks = decompose(&AnswerDocument::default());
    assert!(blocks.is_empty());
    assert_eq!(ContentProfile::from_blocks(&blocks).total_blocks, 0);
}

#[test]
fn test_profile_counts() {
    let profile = ContentProfile::from_blocks(&decompose(&revenue_answer()));
    assert_eq!(profile.total_blocks, 3);
    assert_eq!(profile.chart_blocks, 1);
    assert_eq!(profile.text_blocks, 2);
    assert!(profile.has_visuals());
    assert!(profile.has_text());
}

// ============================================================================
// Rule Application
// ============================================================================

#[test]
fn test_confident_visual_reader_gets_chart_first() {
    let blocks = decompose(&revenue_answer());
    let engine = AdaptationEngine::default();

    let arranged = engine.arrange(&blocks, &signal(PreferenceClass::Visual, 1.0, Intensity::High));

    assert_eq!(
        types(&arranged),
        vec![ContentType::Chart, ContentType::Mixed, ContentType::Mixed]
    );
    assert_eq!(arranged[0].priority, 10);
    assert_eq!(arranged[0].metadata.original_priority, Some(7));
    assert_eq!(arranged[0].metadata.rule_position, Some(Position::Top));
}

#[test]
fn test_text_reader_gets_chart_last_with_caption() {
    let blocks = decompose(&revenue_answer());
    let engine = AdaptationEngine::default();

    let arranged = engine.arrange(&blocks, &signal(PreferenceClass::Text, 0.9, Intensity::Medium));

    let last = arranged.last().unwrap();
    assert_eq!(last.content_type, ContentType::Chart);
    assert_eq!(last.priority, 5);
    assert_eq!(
        last.metadata.caption.as_deref(),
        Some("Chart Description: This visualization shows 3 data points for Revenue.")
    );
}

#[test]
fn test_rule_below_threshold_leaves_blocks_unchanged() {
    let blocks = decompose(&revenue_answer());
    let engine = AdaptationEngine::default();

    let adapted = engine.adapt(&blocks, &signal(PreferenceClass::Visual, 0.5, Intensity::Medium));
    assert_eq!(adapted, blocks);
}

#[test]
fn test_body_rewrites_can_be_disabled() {
    let prose = "One fact. Two facts. Three facts. Four facts. Five facts.";
    let block = ContentBlock::text(ContentType::TextAnalysis, prose, 5, 1.0, 0);
    let visual = signal(PreferenceClass::Visual, 0.9, Intensity::Medium);

    let rewritten = AdaptationEngine::default().adapt_block(&block, &visual);
    assert!(rewritten
        .body
        .as_text()
        .unwrap()
        .starts_with("Key points:\n• One fact\n"));

    let untouched = AdaptationEngine::default()
        .with_body_rewrites(false)
        .adapt_block(&block, &visual);
    assert_eq!(untouched.body, ContentBody::Text(prose.to_string()));
    assert!(untouched.metadata.adapted);
}

#[test]
fn test_adaptation_is_deterministic() {
    let blocks = decompose(&revenue_answer().with_summary("In summary, revenue rose."));
    let engine = AdaptationEngine::default();

    for class in PreferenceClass::ALL {
        let s = signal(class, 0.85, Intensity::High);
        assert_eq!(engine.arrange(&blocks, &s), engine.arrange(&blocks, &s));
    }
}

#[test]
fn test_adapted_values_stay_in_range() {
    let engine = AdaptationEngine::default();
    let intensities = [Intensity::Low, Intensity::Medium, Intensity::High];
    let confidences = [0.0, 0.4, 0.8, 0.9, 1.0];

    for content_type in ContentType::ALL {
        for priority in MIN_PRIORITY..=MAX_PRIORITY {
            for size in [MIN_SIZE_WEIGHT, 1.0, MAX_SIZE_WEIGHT] {
                let block = ContentBlock::text(content_type, "body", priority, size, 0);
                for class in PreferenceClass::ALL {
                    for intensity in intensities {
                        for confidence in confidences {
                            let adapted =
                                engine.adapt_block(&block, &signal(class, confidence, intensity));
                            assert!((MIN_PRIORITY..=MAX_PRIORITY).contains(&adapted.priority));
                            assert!(adapted.size_weight >= MIN_SIZE_WEIGHT);
                            assert!(adapted.size_weight <= MAX_SIZE_WEIGHT);
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Rule Table
// ============================================================================

#[test]
fn test_duplicate_rule_rejected() {
    let rule = AdaptationRule::new(
        PreferenceClass::Visual,
        ContentType::Chart,
        3,
        1.5,
        Position::Top,
        0.8,
    );
    let err = AdaptationRuleSet::new(vec![rule.clone(), rule]).unwrap_err();
    assert!(matches!(err, RuleError::DuplicateAdaptationRule { .. }));
}

#[test]
fn test_custom_rule_set_drives_engine() {
    let rules = AdaptationRuleSet::new(vec![AdaptationRule::new(
        PreferenceClass::Mixed,
        ContentType::Chart,
        2,
        1.0,
        Position::Top,
        0.0,
    )])
    .unwrap();
    let engine = AdaptationEngine::new(rules);
    let blocks = decompose(&revenue_answer());

    let arranged = engine.arrange(&blocks, &signal(PreferenceClass::Mixed, 1.0, Intensity::Medium));
    assert_eq!(arranged[0].content_type, ContentType::Chart);
    assert_eq!(arranged[0].priority, 9);
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_layout_follows_preference() {
    let visual = LayoutPlan::for_signal(&signal(PreferenceClass::Visual, 0.9, Intensity::High));
    assert_eq!(visual.layout_mode, LayoutMode::VisualFirst);
    assert!(visual.chart.prominence > visual.text.prominence);

    let text = LayoutPlan::for_signal(&signal(PreferenceClass::Text, 0.9, Intensity::High));
    assert_eq!(text.layout_mode, LayoutMode::TextFirst);
    assert!(text.text.prominence > text.chart.prominence);

    let mixed = LayoutPlan::for_signal(&signal(PreferenceClass::Mixed, 0.5, Intensity::Medium));
    assert_eq!(mixed.layout_mode, LayoutMode::Balanced);
}
