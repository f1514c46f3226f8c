//! Static keyword tables for preference scoring.
//!
//! Terms are matched as substrings of the normalized input. Modifiers and
//! negations are matched as whole words, except multi-word entries which are
//! matched as phrases.

use super::types::Intensity;

/// Weight of a primary term hit.
pub const PRIMARY_WEIGHT: f64 = 3.0;
/// Weight of a secondary term hit.
pub const SECONDARY_WEIGHT: f64 = 2.0;
/// Weight of a context phrase hit.
pub const PHRASE_WEIGHT: f64 = 4.0;

/// Keyword tiers for one preference axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisKeywords {
    /// Strong, direct terms.
    pub primary: &'static [&'static str],
    /// Weaker, related terms.
    pub secondary: &'static [&'static str],
    /// Multi-word context phrases.
    pub phrases: &'static [&'static str],
}

/// Visual axis keywords.
pub const VISUAL: AxisKeywords = AxisKeywords {
    primary: &[
        "chart",
        "charts",
        "graph",
        "graphs",
        "visual",
        "visuals",
        "diagram",
        "diagrams",
        "plot",
        "plots",
        "visualization",
        "visualizations",
        "infographic",
        "infographics",
    ],
    secondary: &[
        "show",
        "display",
        "see",
        "look",
        "watch",
        "view",
        "picture",
        "image",
        "graphic",
        "graphics",
        "dashboard",
        "pie chart",
        "bar chart",
        "line graph",
        "scatter plot",
    ],
    phrases: &[
        "prefer charts",
        "like graphs",
        "visual data",
        "show me charts",
        "data visualization",
        "graphical representation",
        "visual format",
        "chart format",
        "graph form",
        "visual display",
        "pictorial",
        "visual learner",
        "see data",
        "visual representation",
    ],
};

/// Text axis keywords.
pub const TEXT: AxisKeywords = AxisKeywords {
    primary: &[
        "text",
        "explanation",
        "explanations",
        "detail",
        "details",
        "description",
        "descriptions",
        "analysis",
        "breakdown",
        "summary",
        "summaries",
        "narrative",
        "written",
    ],
    secondary: &[
        "explain",
        "describe",
        "elaborate",
        "discuss",
        "analyze",
        "tell",
        "write",
        "read",
        "understand",
        "comprehensive",
        "thorough",
        "detailed",
        "in-depth",
        "step-by-step",
    ],
    phrases: &[
        "detailed explanations",
        "text format",
        "written analysis",
        "comprehensive breakdown",
        "thorough explanation",
        "in detail",
        "step by step",
        "text-based",
        "descriptive analysis",
        "narrative format",
        "written summary",
        "textual information",
    ],
};

/// Abbreviations expanded during normalization (whole words only).
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("viz", "visualization"),
    ("vis", "visual"),
    ("imgs", "images"),
    ("pics", "pictures"),
    ("info", "information"),
    ("desc", "description"),
    ("expl", "explanation"),
];

/// Negation words and phrases.
pub const NEGATIONS: &[&str] = &[
    "not",
    "don't",
    "dont",
    "doesn't",
    "won't",
    "can't",
    "shouldn't",
    "wouldn't",
    "no",
    "never",
    "none",
    "neither",
    "nor",
    "without",
    "avoid",
    "dislike",
    "hate",
    "against",
    "opposite",
    "instead of",
    "rather than",
];

/// Intensity modifiers with their level.
pub const INTENSITY_MODIFIERS: &[(&str, Intensity)] = &[
    ("always", Intensity::High),
    ("definitely", Intensity::High),
    ("absolutely", Intensity::High),
    ("certainly", Intensity::High),
    ("strongly", Intensity::High),
    ("really", Intensity::High),
    ("very", Intensity::High),
    ("extremely", Intensity::High),
    ("usually", Intensity::Medium),
    ("often", Intensity::Medium),
    ("generally", Intensity::Medium),
    ("typically", Intensity::Medium),
    ("mostly", Intensity::Medium),
    ("prefer", Intensity::Medium),
    ("like", Intensity::Medium),
    ("sometimes", Intensity::Low),
    ("occasionally", Intensity::Low),
    ("maybe", Intensity::Low),
    ("perhaps", Intensity::Low),
    ("might", Intensity::Low),
    ("could", Intensity::Low),
    ("somewhat", Intensity::Low),
];

/// Points contributed by a modifier of the given level.
pub fn modifier_points(level: Intensity) -> u32 {
    match level {
        Intensity::High => 3,
        Intensity::Medium => 2,
        Intensity::Low => 1,
    }
}

/// Request verbs whose following words are captured as specific requests.
pub const REQUEST_VERBS: &[&str] = &[
    "show me",
    "i want",
    "i need",
    "prefer",
    "like",
    "display",
    "include",
];
