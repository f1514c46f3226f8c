//! Chart/text balance hints for renderers.

use serde::{Deserialize, Serialize};

use super::types::Position;
use crate::preference::{Intensity, PreferenceClass, PreferenceSignal};

/// Which side of the answer leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Charts lead.
    VisualFirst,
    /// Prose leads.
    TextFirst,
    /// Neither leads.
    Balanced,
}

/// How prose should be formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormatting {
    /// Full paragraphs.
    Paragraph,
    /// Bullet points.
    Bullets,
}

/// Chart presentation hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    /// Prominence in `1..=10`.
    pub prominence: u8,
    /// Placement.
    pub position: Position,
    /// Whether to render the chart title.
    pub show_title: bool,
    /// Whether to render the legend.
    pub show_legend: bool,
}

/// Prose presentation hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayout {
    /// Prominence in `1..=10`.
    pub prominence: u8,
    /// Placement.
    pub position: Position,
    /// Whether to show summaries.
    pub show_summary: bool,
    /// Whether to show detailed sections.
    pub show_details: bool,
    /// Paragraphs or bullets.
    pub formatting: TextFormatting,
}

/// Balance between charts and prose for one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    /// Chart hints.
    pub chart: ChartLayout,
    /// Prose hints.
    pub text: TextLayout,
    /// Leading side.
    pub layout_mode: LayoutMode,
    /// Share of space given to charts, in `0..=100`.
    pub balance_ratio: f64,
}

impl LayoutPlan {
    /// Derive the plan from a signal's class, confidence and intensity.
    pub fn for_signal(signal: &PreferenceSignal) -> Self {
        let c = signal.confidence;
        let (chart, text, layout_mode, balance_ratio) = match signal.class {
            PreferenceClass::Visual => (
                (7 + (c * 3.0) as i32).min(10),
                (5 - (c * 2.0) as i32).max(1),
                LayoutMode::VisualFirst,
                70.0 + c * 20.0,
            ),
            PreferenceClass::Text => (
                (5 - (c * 2.0) as i32).max(1),
                (7 + (c * 3.0) as i32).min(10),
                LayoutMode::TextFirst,
                30.0 - c * 20.0,
            ),
            PreferenceClass::Mixed | PreferenceClass::Unclear => (5, 5, LayoutMode::Balanced, 50.0),
        };

        let multiplier = match signal.intensity {
            Intensity::High => 1.3,
            Intensity::Medium => 1.0,
            Intensity::Low => 0.8,
        };
        let chart = prominence(chart, multiplier);
        let text = prominence(text, multiplier);

        Self {
            chart: ChartLayout {
                prominence: chart,
                position: if layout_mode == LayoutMode::VisualFirst {
                    Position::Top
                } else {
                    Position::Middle
                },
                show_title: chart >= 5,
                show_legend: chart >= 6,
            },
            text: TextLayout {
                prominence: text,
                position: if layout_mode == LayoutMode::TextFirst {
                    Position::Top
                } else {
                    Position::Middle
                },
                show_summary: text >= 5,
                show_details: text >= 7,
                formatting: if text >= 6 {
                    TextFormatting::Paragraph
                } else {
                    TextFormatting::Bullets
                },
            },
            layout_mode,
            balance_ratio: balance_ratio.clamp(0.0, 100.0),
        }
    }
}

impl Default for LayoutPlan {
    fn default() -> Self {
        Self {
            chart: ChartLayout {
                prominence: 5,
                position: Position::Middle,
                show_title: true,
                show_legend: true,
            },
            text: TextLayout {
                prominence: 5,
                position: Position::Middle,
                show_summary: true,
                show_details: true,
                formatting: TextFormatting::Paragraph,
            },
            layout_mode: LayoutMode::Balanced,
            balance_ratio: 50.0,
        }
    }
}

fn prominence(base: i32, multiplier: f64) -> u8 {
    // truncation toward zero, then into range
    ((f64::from(base) * multiplier) as i32).clamp(1, 10) as u8
}
