//! # Prefadapt
//!
//! Preference-adaptive answer personalization: infers how a user likes
//! answers presented from free text, reshapes a generated answer to match,
//! and falls back safely when inputs are empty, malformed or contradictory.
//!
//! ## Features
//!
//! - **Preference Parsing**: Lexical visual/text scoring with intensity and negation handling
//! - **Content Adaptation**: Rule-driven priority and size adjustment of answer blocks
//! - **Deterministic Ordering**: Stable, preference-aware block ordering
//! - **Layout Planning**: Chart/text balance hints for renderers
//! - **Edge Case Resolution**: Declarative detection rules with fallback strategies and recovery
//!
//! ## Architecture
//!
//! ```text
//! user text ─→ PreferenceParser ─→ SignalRecord ─┐
//!                                                ├─→ EdgeCaseResolver ─→ signal ─→ AdaptationEngine ─→ ordered blocks
//! answer ────→ decompose ─→ ContentProfile ──────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use prefadapt::adaptation::{AnswerDocument, ChartPayload};
//! use prefadapt::pipeline::{PersonalizationRequest, Personalizer};
//!
//! let request = PersonalizationRequest {
//!     raw_user_text: "I always want charts and graphs".to_string(),
//!     answer_content: AnswerDocument::from_text("Revenue grew this quarter.")
//!         .with_chart(ChartPayload::new("bar", serde_json::json!([3, 5, 8]))),
//!     context: None,
//! };
//!
//! let response = Personalizer::default().personalize(&request);
//! assert_eq!(response.preference.class.as_str(), "visual");
//! ```

#![warn(missing_docs)]

/// Content decomposition, adaptation rules, ordering and layout.
pub mod adaptation;
/// Configuration management and rule table loading.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// End-to-end personalization pipeline.
pub mod pipeline;
/// Preference signal parsing.
pub mod preference;
/// Edge-case detection, fallback strategies and recovery.
pub mod resolver;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use pipeline::{PersonalizationRequest, PersonalizationResponse, Personalizer};
