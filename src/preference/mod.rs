//! Preference signal parsing.
//!
//! This module turns free-text personalization input into a
//! [`PreferenceSignal`]:
//! - [`PreferenceParser`]: lexical scoring over visual and text keyword tiers
//! - [`SignalRecord`]: untrusted, serializable signal shape used by the resolver
//! - [`NegationPolicy`]: tunable handling of negation tokens
//!
//! # Scoring
//!
//! ```text
//! normalize → keyword tiers (3 / 2 / 4) → intensity ×(0.7 | 1.0 | 1.5) → negation → decision
//! ```

pub mod keywords;
mod parser;
mod types;

pub use parser::{AxisScores, NegationPolicy, PreferenceParser};
pub use types::*;
