use std::env;
use std::path::PathBuf;

use crate::error::AppError;
use crate::preference::NegationPolicy;
use crate::resolver::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};

mod rules;

pub use rules::{load_rule_tables, RuleTables};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub parser: ParserConfig,
    pub adaptation: AdaptationConfig,
    pub resolver: ResolverConfig,
    pub request: RequestConfig,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Preference parser configuration
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    pub negation_policy: NegationPolicy,
}

/// Content adaptation configuration
#[derive(Debug, Clone)]
pub struct AdaptationConfig {
    /// Re-present adapted bodies (key points, chart captions, lead-ins)
    pub rewrite_bodies: bool,
    /// JSON file overriding the built-in adaptation rules
    pub rules_path: Option<PathBuf>,
}

/// Edge-case resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// JSON file overriding the built-in edge-case rules
    pub rules_path: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

/// Per-request limits
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let parser = ParserConfig {
            negation_policy: match env::var("NEGATION_POLICY") {
                Ok(value) => value.parse().map_err(|message| AppError::Config { message })?,
                Err(_) => NegationPolicy::default(),
            },
        };

        let adaptation = AdaptationConfig {
            rewrite_bodies: env::var("REWRITE_BODIES")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(true),
            rules_path: path_var("ADAPTATION_RULES_PATH"),
        };

        let resolver = ResolverConfig {
            rules_path: path_var("EDGE_CASE_RULES_PATH"),
            cache_ttl_secs: env::var("FALLBACK_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: env::var("FALLBACK_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
        };

        Ok(Config {
            logging,
            parser,
            adaptation,
            resolver,
            request,
        })
    }

    /// Load the rule tables named by this configuration, falling back to the
    /// built-in tables where no path is set
    pub fn rule_tables(&self) -> Result<RuleTables, AppError> {
        let builtin = RuleTables::builtin();

        let adaptation = match &self.adaptation.rules_path {
            Some(path) => load_rule_tables(path)?.adaptation.or(builtin.adaptation),
            None => builtin.adaptation,
        };
        let edge_cases = match &self.resolver.rules_path {
            Some(path) => load_rule_tables(path)?.edge_cases.or(builtin.edge_cases),
            None => builtin.edge_cases,
        };

        Ok(RuleTables {
            adaptation,
            edge_cases,
        })
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            rewrite_bodies: true,
            rules_path: None,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}
