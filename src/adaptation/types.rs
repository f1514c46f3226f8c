//! Data types for content adaptation.

use serde::{Deserialize, Serialize};

use crate::preference::{Intensity, PreferenceClass};

/// Lowest block priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest block priority.
pub const MAX_PRIORITY: u8 = 10;
/// Smallest size weight.
pub const MIN_SIZE_WEIGHT: f64 = 0.1;
/// Largest size weight.
pub const MAX_SIZE_WEIGHT: f64 = 3.0;

// ============================================================================
// Content Type
// ============================================================================

/// Kind of content a block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Chart payload.
    Chart,
    /// Tabular payload.
    Table,
    /// Summary or conclusion text.
    Summary,
    /// Long-form explanation.
    DetailedExplanation,
    /// Numeric or statistical prose.
    TextAnalysis,
    /// Structured raw data.
    RawData,
    /// Anything else.
    Mixed,
}

impl ContentType {
    /// All content types in declaration order.
    pub const ALL: [ContentType; 7] = [
        ContentType::Chart,
        ContentType::Table,
        ContentType::Summary,
        ContentType::DetailedExplanation,
        ContentType::TextAnalysis,
        ContentType::RawData,
        ContentType::Mixed,
    ];

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Chart => "chart",
            ContentType::Table => "table",
            ContentType::Summary => "summary",
            ContentType::DetailedExplanation => "detailed_explanation",
            ContentType::TextAnalysis => "text_analysis",
            ContentType::RawData => "raw_data",
            ContentType::Mixed => "mixed",
        }
    }

    /// Whether the type is prose.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ContentType::Summary
                | ContentType::DetailedExplanation
                | ContentType::TextAnalysis
                | ContentType::Mixed
        )
    }

    /// Whether the type is rendered as a visual.
    pub fn is_visual(&self) -> bool {
        matches!(self, ContentType::Chart | ContentType::Table)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown content type: {}", s))
    }
}

// ============================================================================
// Content Block
// ============================================================================

/// Payload of a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentBody {
    /// Prose.
    Text(String),
    /// Chart, table or raw data payload.
    Structured(serde_json::Value),
}

impl ContentBody {
    /// The text, if this is a text body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBody::Text(text) => Some(text),
            ContentBody::Structured(_) => None,
        }
    }
}

/// Attributes used for rule matching, ordering ties and audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// Position of the block in its source answer.
    pub source_index: usize,
    /// Word count for text bodies.
    #[serde(default)]
    pub word_count: usize,
    /// Data point or row count for structured bodies.
    #[serde(default)]
    pub data_points: usize,
    /// Whether the text contains digits.
    #[serde(default)]
    pub has_numbers: bool,
    /// Whether the text uses technical vocabulary.
    #[serde(default)]
    pub has_technical_terms: bool,
    /// Chart kind, for chart blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_kind: Option<String>,
    /// Short caption attached for text-preferring readers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Set on blocks produced by adaptation.
    #[serde(default)]
    pub adapted: bool,
    /// Priority before adaptation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_priority: Option<u8>,
    /// Size weight before adaptation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size_weight: Option<f64>,
    /// Position preference of the applied rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_position: Option<Position>,
    /// Signal confidence the rule was applied with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_applied: Option<f64>,
    /// Signal intensity the rule was applied with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity_applied: Option<Intensity>,
}

/// One addressable, reorderable unit of a generated answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Content type.
    pub content_type: ContentType,
    /// Payload.
    pub body: ContentBody,
    /// Priority in `1..=10`, higher surfaces earlier.
    pub priority: u8,
    /// Display share in `0.1..=3.0`.
    pub size_weight: f64,
    /// Matching attributes.
    pub metadata: BlockMetadata,
}

impl ContentBlock {
    /// Create a text block at `source_index`.
    pub fn text(
        content_type: ContentType,
        text: impl Into<String>,
        priority: u8,
        size_weight: f64,
        source_index: usize,
    ) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self {
            content_type,
            body: ContentBody::Text(text),
            priority: clamp_priority(f64::from(priority)),
            size_weight: clamp_size_weight(size_weight),
            metadata: BlockMetadata {
                source_index,
                word_count,
                ..BlockMetadata::default()
            },
        }
    }

    /// Create a structured block at `source_index`.
    pub fn structured(
        content_type: ContentType,
        value: serde_json::Value,
        priority: u8,
        size_weight: f64,
        source_index: usize,
    ) -> Self {
        Self {
            content_type,
            body: ContentBody::Structured(value),
            priority: clamp_priority(f64::from(priority)),
            size_weight: clamp_size_weight(size_weight),
            metadata: BlockMetadata {
                source_index,
                ..BlockMetadata::default()
            },
        }
    }
}

/// Round and clamp a computed priority into `1..=10`.
pub fn clamp_priority(value: f64) -> u8 {
    if !value.is_finite() {
        return MIN_PRIORITY;
    }
    let rounded = value.round().clamp(f64::from(MIN_PRIORITY), f64::from(MAX_PRIORITY));
    // rounded is an integer in [1, 10]
    rounded as u8
}

/// Clamp a computed size weight into `0.1..=3.0`.
pub fn clamp_size_weight(value: f64) -> f64 {
    if !value.is_finite() {
        return MIN_SIZE_WEIGHT;
    }
    value.clamp(MIN_SIZE_WEIGHT, MAX_SIZE_WEIGHT)
}

// ============================================================================
// Adaptation Rule
// ============================================================================

/// Where a rule would like its blocks placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Near the start.
    Top,
    /// In the middle.
    Middle,
    /// Near the end.
    Bottom,
}

/// Static adjustment keyed by `(preference, content_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationRule {
    /// Preference class the rule applies to.
    pub preference: PreferenceClass,
    /// Content type the rule applies to.
    pub content_type: ContentType,
    /// Signed priority adjustment.
    pub priority_boost: i32,
    /// Size weight multiplier.
    pub size_multiplier: f64,
    /// Placement hint.
    pub position_preference: Position,
    /// Minimum signal confidence for the rule to apply.
    pub visibility_threshold: f64,
}

impl AdaptationRule {
    /// Create a rule.
    pub fn new(
        preference: PreferenceClass,
        content_type: ContentType,
        priority_boost: i32,
        size_multiplier: f64,
        position_preference: Position,
        visibility_threshold: f64,
    ) -> Self {
        Self {
            preference,
            content_type,
            priority_boost,
            size_multiplier,
            position_preference,
            visibility_threshold,
        }
    }

    /// Lookup key.
    pub fn key(&self) -> (PreferenceClass, ContentType) {
        (self.preference, self.content_type)
    }
}

// ============================================================================
// Answer Document
// ============================================================================

/// A chart payload produced by the answer generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    /// Chart kind (line, bar, pie, ...).
    pub kind: String,
    /// Chart title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Series data.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Whether the chart is interactive.
    #[serde(default)]
    pub interactive: bool,
}

impl ChartPayload {
    /// Create a chart with data points.
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            title: None,
            data,
            interactive: false,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of data points in the series.
    pub fn data_points(&self) -> usize {
        match &self.data {
            serde_json::Value::Array(points) => points.len(),
            serde_json::Value::Object(map) => map
                .get("data")
                .and_then(|d| d.as_array())
                .map(|points| points.len())
                .unwrap_or(0),
            _ => 0,
        }
    }
}

/// A table payload produced by the answer generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    /// Table title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column headers.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Rows.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// A generated answer: free text plus optional chart, table and data payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerDocument {
    /// Explanation text.
    #[serde(default)]
    pub text: String,
    /// Chart payloads.
    #[serde(default)]
    pub charts: Vec<ChartPayload>,
    /// Table payloads.
    #[serde(default)]
    pub tables: Vec<TablePayload>,
    /// Raw data payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Standalone summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnswerDocument {
    /// An answer with text only.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Add a chart.
    pub fn with_chart(mut self, chart: ChartPayload) -> Self {
        self.charts.push(chart);
        self
    }

    /// Add a table.
    pub fn with_table(mut self, table: TablePayload) -> Self {
        self.tables.push(table);
        self
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the raw data payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

// ============================================================================
// Content Profile
// ============================================================================

/// Block counts by kind, used by edge-case detection and content analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentProfile {
    /// All blocks.
    pub total_blocks: usize,
    /// Chart blocks.
    pub chart_blocks: usize,
    /// Table blocks.
    pub table_blocks: usize,
    /// Prose blocks.
    pub text_blocks: usize,
    /// Raw data blocks.
    pub data_blocks: usize,
}

impl ContentProfile {
    /// Count blocks by kind.
    pub fn from_blocks(blocks: &[ContentBlock]) -> Self {
        let mut profile = Self {
            total_blocks: blocks.len(),
            ..Self::default()
        };
        for block in blocks {
            match block.content_type {
                ContentType::Chart => profile.chart_blocks += 1,
                ContentType::Table => profile.table_blocks += 1,
                ContentType::RawData => profile.data_blocks += 1,
                _ => profile.text_blocks += 1,
            }
        }
        profile
    }

    /// Number of blocks of the given type.
    pub fn count(&self, content_type: ContentType) -> usize {
        match content_type {
            ContentType::Chart => self.chart_blocks,
            ContentType::Table => self.table_blocks,
            ContentType::RawData => self.data_blocks,
            // Prose types are only counted in aggregate
            _ => self.text_blocks,
        }
    }

    /// Whether any chart or table is present.
    pub fn has_visuals(&self) -> bool {
        self.chart_blocks + self.table_blocks > 0
    }

    /// Whether any prose is present.
    pub fn has_text(&self) -> bool {
        self.text_blocks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_type_from_str() {
        for content_type in ContentType::ALL {
            assert_eq!(content_type.as_str().parse::<ContentType>().unwrap(), content_type);
        }
        assert!("video".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_clamp_priority() {
        assert_eq!(clamp_priority(-4.0), 1);
        assert_eq!(clamp_priority(4.4), 4);
        assert_eq!(clamp_priority(4.5), 5);
        assert_eq!(clamp_priority(42.0), 10);
        assert_eq!(clamp_priority(f64::NAN), 1);
    }

    #[test]
    fn test_clamp_size_weight() {
        assert_eq!(clamp_size_weight(0.0), 0.1);
        assert_eq!(clamp_size_weight(9.0), 3.0);
        assert_eq!(clamp_size_weight(1.2), 1.2);
        assert_eq!(clamp_size_weight(f64::INFINITY), 0.1);
    }

    #[test]
    fn test_block_constructors_clamp() {
        let block = ContentBlock::text(ContentType::Summary, "one two three", 0, 10.0, 2);
        assert_eq!(block.priority, 1);
        assert_eq!(block.size_weight, 3.0);
        assert_eq!(block.metadata.word_count, 3);
        assert_eq!(block.metadata.source_index, 2);
        assert!(!block.metadata.adapted);
    }

    #[test]
    fn test_chart_data_points() {
        let chart = ChartPayload::new("line", json!([1, 2, 3]));
        assert_eq!(chart.data_points(), 3);

        let chart = ChartPayload::new("bar", json!({"data": [{"x": 1}, {"x": 2}]}));
        assert_eq!(chart.data_points(), 2);

        let chart = ChartPayload::new("pie", json!(null));
        assert_eq!(chart.data_points(), 0);
    }

    #[test]
    fn test_content_body_serialization() {
        let body = ContentBody::Text("hello".to_string());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, json!({"kind": "text", "value": "hello"}));
    }

    #[test]
    fn test_answer_document_deserialize_minimal() {
        let doc: AnswerDocument = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(doc.text, "hi");
        assert!(doc.charts.is_empty());
        assert!(doc.summary.is_none());
    }

    #[test]
    fn test_content_profile_counts() {
        let blocks = vec![
            ContentBlock::structured(ContentType::Chart, json!({}), 7, 1.5, 0),
            ContentBlock::text(ContentType::Summary, "s", 8, 0.8, 1),
            ContentBlock::text(ContentType::Mixed, "m", 5, 1.0, 2),
            ContentBlock::structured(ContentType::RawData, json!([]), 4, 1.0, 3),
        ];
        let profile = ContentProfile::from_blocks(&blocks);
        assert_eq!(profile.total_blocks, 4);
        assert_eq!(profile.chart_blocks, 1);
        assert_eq!(profile.text_blocks, 2);
        assert_eq!(profile.data_blocks, 1);
        assert!(profile.has_visuals());
        assert!(profile.has_text());
    }
}
