//! Splitting a generated answer into content blocks.

use serde_json::{json, Value};
use tracing::debug;

use super::types::{
    clamp_priority, clamp_size_weight, AnswerDocument, ChartPayload, ContentBlock, ContentType,
    TablePayload,
};

const SUMMARY_TERMS: &[&str] = &["summary", "conclusion", "overview", "tldr"];
const DETAILED_TERMS: &[&str] = &["detailed", "comprehensive", "step-by-step", "analysis"];
const STATISTIC_TERMS: &[&str] = &["statistics", "data shows"];
const TECHNICAL_TERMS: &[&str] = &[
    "algorithm",
    "implementation",
    "configuration",
    "optimization",
    "parameter",
    "variable",
    "function",
    "method",
    "api",
    "database",
    "framework",
    "library",
    "dependency",
    "architecture",
    "protocol",
];

const CHART_PRIORITY: u8 = 7;
const CHART_WEIGHT: f64 = 1.5;
const TABLE_PRIORITY: u8 = 6;
const TABLE_WEIGHT: f64 = 1.2;
const RAW_DATA_PRIORITY: u8 = 4;
const RAW_DATA_WEIGHT: f64 = 1.0;
const SUMMARY_PRIORITY: u8 = 8;
const SUMMARY_WEIGHT: f64 = 0.8;

/// Split an answer into blocks.
///
/// Blocks are emitted as text sections, charts, tables, raw data, then the
/// standalone summary. `metadata.source_index` is the emission position.
pub fn decompose(document: &AnswerDocument) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();

    for (i, section) in split_sections(&document.text).into_iter().enumerate() {
        blocks.push(text_section_block(&section, i, blocks.len()));
    }

    for chart in &document.charts {
        blocks.push(chart_block(chart, blocks.len()));
    }

    for table in &document.tables {
        blocks.push(table_block(table, blocks.len()));
    }

    if let Some(data) = document.data.as_ref().filter(|d| !d.is_null()) {
        let mut block = ContentBlock::structured(
            ContentType::RawData,
            data.clone(),
            RAW_DATA_PRIORITY,
            RAW_DATA_WEIGHT,
            blocks.len(),
        );
        block.metadata.data_points = match data {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 1,
        };
        blocks.push(block);
    }

    if let Some(summary) = document.summary.as_deref().map(str::trim) {
        if !summary.is_empty() {
            let mut block = ContentBlock::text(
                ContentType::Summary,
                summary,
                SUMMARY_PRIORITY,
                SUMMARY_WEIGHT,
                blocks.len(),
            );
            block.metadata.has_numbers = has_numbers(summary);
            blocks.push(block);
        }
    }

    debug!(
        blocks = blocks.len(),
        charts = document.charts.len(),
        tables = document.tables.len(),
        "Answer decomposed"
    );

    blocks
}

/// Split text on blank lines, `===` / `---` rule lines and markdown headers.
///
/// Returned sections are trimmed and non-empty.
pub fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || is_rule_line(stripped) {
            flush_section(&mut current, &mut sections);
        } else if stripped.starts_with('#') {
            flush_section(&mut current, &mut sections);
            current.push(line);
        } else {
            current.push(line);
        }
    }
    flush_section(&mut current, &mut sections);

    sections
}

fn flush_section(current: &mut Vec<&str>, sections: &mut Vec<String>) {
    let joined = current.join("\n");
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        sections.push(trimmed.to_string());
    }
    current.clear();
}

/// Classify a prose section.
pub fn classify_text(section: &str) -> ContentType {
    let lower = section.to_lowercase();
    if SUMMARY_TERMS.iter().any(|t| lower.contains(t)) {
        ContentType::Summary
    } else if DETAILED_TERMS.iter().any(|t| lower.contains(t)) {
        ContentType::DetailedExplanation
    } else if has_statistics(section) || STATISTIC_TERMS.iter().any(|t| lower.contains(t)) {
        ContentType::TextAnalysis
    } else {
        ContentType::Mixed
    }
}

fn text_section_block(section: &str, index: usize, source_index: usize) -> ContentBlock {
    let lower = section.to_lowercase();

    let mut priority = 8i64.saturating_sub(index as i64).max(1);
    if lower.contains("summary") || lower.contains("conclusion") {
        priority += 2;
    } else if lower.contains("introduction") || lower.contains("overview") {
        priority += 1;
    }

    let size_weight = section.chars().count() as f64 / 1000.0;

    let mut block = ContentBlock::text(
        classify_text(section),
        section,
        clamp_priority(priority as f64),
        clamp_size_weight(size_weight),
        source_index,
    );
    block.metadata.has_numbers = has_numbers(section);
    block.metadata.has_technical_terms = TECHNICAL_TERMS.iter().any(|t| lower.contains(t));
    block
}

fn chart_block(chart: &ChartPayload, source_index: usize) -> ContentBlock {
    let body = json!({
        "kind": chart.kind,
        "title": chart.title,
        "data": chart.data,
        "interactive": chart.interactive,
    });
    let mut block = ContentBlock::structured(
        ContentType::Chart,
        body,
        CHART_PRIORITY,
        CHART_WEIGHT,
        source_index,
    );
    block.metadata.data_points = chart.data_points();
    block.metadata.chart_kind = Some(chart.kind.clone());
    block
}

fn table_block(table: &TablePayload, source_index: usize) -> ContentBlock {
    let body = json!({
        "title": table.title,
        "columns": table.columns,
        "rows": table.rows,
    });
    let mut block = ContentBlock::structured(
        ContentType::Table,
        body,
        TABLE_PRIORITY,
        TABLE_WEIGHT,
        source_index,
    );
    block.metadata.data_points = table.rows.len();
    block
}

fn is_rule_line(line: &str) -> bool {
    line.len() >= 3 && (line.chars().all(|c| c == '=') || line.chars().all(|c| c == '-'))
}

fn has_numbers(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// A digit followed later on the same line by `%`, or `$` directly before a digit.
fn has_statistics(text: &str) -> bool {
    let percent = text.lines().any(|line| {
        line.find(|c: char| c.is_ascii_digit())
            .map(|pos| line[pos..].contains('%'))
            .unwrap_or(false)
    });
    let currency = text
        .char_indices()
        .filter(|(_, c)| *c == '$')
        .any(|(pos, _)| {
            text[pos + 1..]
                .chars()
                .next()
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
        });
    percent || currency
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sections_delimiters() {
        let text = "Intro line\n\nSecond part\n===\nThird part\n---\n# Header\nUnder header";
        let sections = split_sections(text);
        assert_eq!(
            sections,
            vec![
                "Intro line",
                "Second part",
                "Third part",
                "# Header\nUnder header"
            ]
        );
    }

    #[test]
    fn test_split_sections_empty() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n  \n===\n").is_empty());
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify_text("In conclusion, it works."), ContentType::Summary);
        assert_eq!(
            classify_text("A comprehensive walk through the steps."),
            ContentType::DetailedExplanation
        );
        assert_eq!(classify_text("Revenue grew 12% in Q3."), ContentType::TextAnalysis);
        assert_eq!(classify_text("It cost $40 per unit."), ContentType::TextAnalysis);
        assert_eq!(classify_text("The data shows a trend."), ContentType::TextAnalysis);
        assert_eq!(classify_text("Plain prose here."), ContentType::Mixed);
    }

    #[test]
    fn test_has_statistics() {
        assert!(has_statistics("up 5 points, or 10%"));
        assert!(!has_statistics("100 percent"));
        assert!(!has_statistics("cost in $"));
        assert!(!has_statistics("%\n5"));
    }

    #[test]
    fn test_text_section_priorities() {
        let doc = AnswerDocument::from_text(
            "First section.\n\nIntroduction to the topic.\n\nIn summary, done.",
        );
        let blocks = decompose(&doc);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].priority, 8);
        // 7 + 1 for introduction
        assert_eq!(blocks[1].priority, 8);
        // 6 + 2 for summary
        assert_eq!(blocks[2].priority, 8);
        assert_eq!(blocks[2].content_type, ContentType::Summary);
    }

    #[test]
    fn test_late_sections_floor_at_one() {
        let text = (0..12)
            .map(|i| format!("Section number {}", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let blocks = decompose(&AnswerDocument::from_text(text));
        assert_eq!(blocks.len(), 12);
        assert!(blocks.iter().all(|b| b.priority >= 1));
        assert_eq!(blocks[11].priority, 1);
    }

    #[test]
    fn test_size_weight_from_length() {
        let long = "word ".repeat(400);
        let blocks = decompose(&AnswerDocument::from_text(long.trim()));
        assert!((blocks[0].size_weight - 1.999).abs() < 1e-9);

        let blocks = decompose(&AnswerDocument::from_text("tiny"));
        assert_eq!(blocks[0].size_weight, 0.1);
    }

    #[test]
    fn test_structured_payloads() {
        let doc = AnswerDocument::from_text("Some text.")
            .with_chart(ChartPayload::new("line", json!([1, 2, 3])).with_title("Sales"))
            .with_table(TablePayload {
                title: None,
                columns: vec!["a".to_string()],
                rows: vec![vec![json!(1)], vec![json!(2)]],
            })
            .with_data(json!({"x": 1}))
            .with_summary("Sales went up.");

        let blocks = decompose(&doc);
        let types: Vec<ContentType> = blocks.iter().map(|b| b.content_type).collect();
        assert_eq!(
            types,
            vec![
                ContentType::Mixed,
                ContentType::Chart,
                ContentType::Table,
                ContentType::RawData,
                ContentType::Summary
            ]
        );

        let chart = &blocks[1];
        assert_eq!(chart.priority, 7);
        assert_eq!(chart.size_weight, 1.5);
        assert_eq!(chart.metadata.data_points, 3);
        assert_eq!(chart.metadata.chart_kind.as_deref(), Some("line"));

        assert_eq!(blocks[2].priority, 6);
        assert_eq!(blocks[2].metadata.data_points, 2);
        assert_eq!(blocks[3].priority, 4);
        assert_eq!(blocks[4].priority, 8);
        assert_eq!(blocks[4].size_weight, 0.8);

        let indices: Vec<usize> = blocks.iter().map(|b| b.metadata.source_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_document_has_no_blocks() {
        assert!(decompose(&AnswerDocument::default()).is_empty());
        let doc = AnswerDocument {
            summary: Some("   ".to_string()),
            data: Some(json!(null)),
            ..AnswerDocument::default()
        };
        assert!(decompose(&doc).is_empty());
    }

    #[test]
    fn test_technical_terms_flag() {
        let blocks = decompose(&AnswerDocument::from_text("Tune the API parameter."));
        assert!(blocks[0].metadata.has_technical_terms);
        assert!(!blocks[0].metadata.has_numbers);
    }
}
