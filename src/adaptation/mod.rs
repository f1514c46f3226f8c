//! Content adaptation.
//!
//! Decomposes a generated answer into [`ContentBlock`]s, adjusts their
//! priority and size for a [`PreferenceSignal`](crate::preference::PreferenceSignal)
//! and orders them for presentation:
//! - [`decompose`]: answer document to blocks
//! - [`AdaptationEngine`]: rule lookup by `(preference, content_type)`
//! - [`order_blocks`]: deterministic ordering
//! - [`LayoutPlan`]: chart/text balance hints
//!
//! # Scaling
//!
//! ```text
//! cf = 0.5 + 0.5 · confidence
//! priority' = clamp(1, 10, round((priority + boost) · cf · intensity))
//! size'     = clamp(0.1, 3.0, size · multiplier · cf · intensity)
//! ```

mod decompose;
mod engine;
mod layout;
mod ordering;
mod rules;
mod types;

pub use decompose::{classify_text, decompose, split_sections};
pub use engine::{present_body, AdaptationEngine};
pub use layout::{ChartLayout, LayoutMode, LayoutPlan, TextFormatting, TextLayout};
pub use ordering::{compare_blocks, order_blocks, type_rank};
pub use rules::AdaptationRuleSet;
pub use types::*;
