//! Deterministic block ordering.

use std::cmp::Ordering;

use super::types::{ContentBlock, ContentType};
use crate::preference::PreferenceClass;

/// Sort blocks by descending priority, then by the class's type rank, then
/// by source position.
///
/// The ordering is total, so equal inputs always sort the same way.
pub fn order_blocks(blocks: &mut [ContentBlock], preference: PreferenceClass) {
    blocks.sort_by(|a, b| compare_blocks(a, b, preference));
}

/// Comparator used by [`order_blocks`].
pub fn compare_blocks(a: &ContentBlock, b: &ContentBlock, preference: PreferenceClass) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| type_rank(a.content_type, preference).cmp(&type_rank(b.content_type, preference)))
        .then_with(|| a.metadata.source_index.cmp(&b.metadata.source_index))
}

/// Tie-break rank of a content type for a preference. Lower sorts first.
pub fn type_rank(content_type: ContentType, preference: PreferenceClass) -> u8 {
    match preference {
        PreferenceClass::Visual => match content_type {
            ContentType::Chart => 0,
            ContentType::Summary => 1,
            _ => 2,
        },
        PreferenceClass::Text => match content_type {
            ContentType::Summary => 0,
            ContentType::DetailedExplanation => 1,
            ContentType::Chart => 3,
            _ => 2,
        },
        PreferenceClass::Mixed | PreferenceClass::Unclear => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(content_type: ContentType, priority: u8, index: usize) -> ContentBlock {
        ContentBlock::text(content_type, "x", priority, 1.0, index)
    }

    fn chart(priority: u8, index: usize) -> ContentBlock {
        ContentBlock::structured(ContentType::Chart, json!({}), priority, 1.0, index)
    }

    fn types(blocks: &[ContentBlock]) -> Vec<ContentType> {
        blocks.iter().map(|b| b.content_type).collect()
    }

    #[test]
    fn test_priority_dominates() {
        let mut blocks = vec![text(ContentType::Mixed, 3, 0), chart(9, 1)];
        order_blocks(&mut blocks, PreferenceClass::Text);
        assert_eq!(types(&blocks), vec![ContentType::Chart, ContentType::Mixed]);
    }

    #[test]
    fn test_visual_tie_break() {
        let mut blocks = vec![
            text(ContentType::Mixed, 5, 0),
            text(ContentType::Summary, 5, 1),
            chart(5, 2),
        ];
        order_blocks(&mut blocks, PreferenceClass::Visual);
        assert_eq!(
            types(&blocks),
            vec![ContentType::Chart, ContentType::Summary, ContentType::Mixed]
        );
    }

    #[test]
    fn test_text_tie_break() {
        let mut blocks = vec![
            chart(5, 0),
            text(ContentType::Mixed, 5, 1),
            text(ContentType::DetailedExplanation, 5, 2),
            text(ContentType::Summary, 5, 3),
        ];
        order_blocks(&mut blocks, PreferenceClass::Text);
        assert_eq!(
            types(&blocks),
            vec![
                ContentType::Summary,
                ContentType::DetailedExplanation,
                ContentType::Mixed,
                ContentType::Chart
            ]
        );
    }

    #[test]
    fn test_mixed_keeps_source_order() {
        let mut blocks = vec![chart(5, 2), text(ContentType::Summary, 5, 0), text(ContentType::Mixed, 5, 1)];
        order_blocks(&mut blocks, PreferenceClass::Mixed);
        let indices: Vec<usize> = blocks.iter().map(|b| b.metadata.source_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let original = vec![
            text(ContentType::Mixed, 5, 3),
            chart(5, 1),
            text(ContentType::Summary, 7, 0),
            text(ContentType::TextAnalysis, 5, 2),
        ];
        let mut first = original.clone();
        let mut second: Vec<ContentBlock> = original.into_iter().rev().collect();
        order_blocks(&mut first, PreferenceClass::Visual);
        order_blocks(&mut second, PreferenceClass::Visual);
        assert_eq!(first, second);
    }
}
