use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Rule table error: {0}")]
    Rules(#[from] RuleError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rule table validation errors, raised at configuration-load time
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("Duplicate adaptation rule for ({preference}, {content_type})")]
    DuplicateAdaptationRule {
        preference: String,
        content_type: String,
    },

    #[error("Invalid adaptation rule for ({preference}, {content_type}): {reason}")]
    InvalidAdaptationRule {
        preference: String,
        content_type: String,
        reason: String,
    },

    #[error("Invalid edge case rule {case_type}: {reason}")]
    InvalidEdgeCaseRule { case_type: String, reason: String },
}

/// Errors from validating an untrusted preference signal record
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    #[error("Unknown preference class: {value}")]
    UnknownClass { value: String },

    #[error("Confidence out of range: {value}")]
    ConfidenceOutOfRange { value: f64 },

    #[error("Unknown intensity: {value}")]
    UnknownIntensity { value: String },
}

/// Fallback strategy handler errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Missing data for {strategy}: {message}")]
    MissingData { strategy: String, message: String },

    #[error("Strategy {strategy} failed: {message}")]
    Failed { strategy: String, message: String },
}

/// Recovery action errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecoveryError {
    #[error("Monitoring notification failed: {message}")]
    Notifier { message: String },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for rule table loading
pub type RuleResult<T> = Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "bad log format".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: bad log format");
    }

    #[test]
    fn test_rule_error_display() {
        let err = RuleError::DuplicateAdaptationRule {
            preference: "visual".to_string(),
            content_type: "chart".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate adaptation rule for (visual, chart)"
        );

        let err = RuleError::InvalidEdgeCaseRule {
            case_type: "empty_input".to_string(),
            reason: "no detection conditions".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid edge case rule empty_input: no detection conditions"
        );
    }

    #[test]
    fn test_signal_error_display() {
        let err = SignalError::UnknownClass {
            value: "holographic".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown preference class: holographic");

        let err = SignalError::ConfidenceOutOfRange { value: 2.0 };
        assert_eq!(err.to_string(), "Confidence out of range: 2");
    }

    #[test]
    fn test_strategy_error_display() {
        let err = StrategyError::MissingData {
            strategy: "historical_preference".to_string(),
            message: "no history".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing data for historical_preference: no history"
        );

        let err = StrategyError::Failed {
            strategy: "content_analysis".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Strategy content_analysis failed: boom");
    }

    #[test]
    fn test_recovery_error_display() {
        let err = RecoveryError::Notifier {
            message: "endpoint down".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Monitoring notification failed: endpoint down"
        );
    }

    #[test]
    fn test_rule_error_conversion_to_app_error() {
        let rule_err = RuleError::DuplicateAdaptationRule {
            preference: "text".to_string(),
            content_type: "summary".to_string(),
        };
        let app_err: AppError = rule_err.into();
        assert!(matches!(app_err, AppError::Rules(_)));
        assert!(app_err.to_string().contains("Duplicate adaptation rule"));
    }

    #[test]
    fn test_json_error_conversion_to_app_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Json(_)));
    }
}
