//! Edge-case resolution.
//!
//! Detects anomalous requests (empty input, malformed or conflicting
//! signals, missing content, degraded runtime conditions) and substitutes a
//! safe fallback signal:
//! - [`EdgeCaseRuleSet`]: declarative rules built from [`Condition`]s
//! - [`EdgeCaseResolver`]: detection, strategy dispatch and recovery
//! - [`FallbackHandler`]: one handler per [`FallbackStrategy`]
//! - [`ResolverStore`]: counters and fallback cache, shared via `Arc`
//!
//! # Flow
//!
//! ```text
//! evaluate rules → highest priority wins → handler → recovery actions → statistics
//! ```

mod conditions;
mod engine;
mod recovery;
mod rules;
mod store;
mod strategies;
mod types;

pub use conditions::Condition;
pub use engine::EdgeCaseResolver;
pub use recovery::{Incident, IncidentNotifier, TracingNotifier};
pub use rules::{
    EdgeCaseRuleSet, MAX_INPUT_CHARS, MAX_REQUEST_ERRORS, MAX_REQUEST_MEMORY_BYTES,
    SLOW_REQUEST_MS,
};
pub use store::{CachedFallback, ResolverStore, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};
pub use strategies::{
    explanation_for, minimal_payload, ContentAnalysisHandler, DefaultMixedHandler,
    ErrorDisplayHandler, FallbackHandler, GracefulDegradationHandler, HistoricalPreferenceHandler,
    MinimalResponseHandler, StrategyRegistry,
};
pub use types::*;
