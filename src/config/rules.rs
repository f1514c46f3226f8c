//! Rule tables loaded from JSON.
//!
//! A rule file may carry either table or both:
//!
//! ```json
//! {
//!   "adaptation_rules": [{"preference": "visual", "content_type": "chart", ...}],
//!   "edge_case_rules": [{"case_type": "empty_input", "detection": [...], ...}]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adaptation::{AdaptationRule, AdaptationRuleSet};
use crate::error::{AppError, AppResult};
use crate::resolver::{EdgeCaseRule, EdgeCaseRuleSet};

/// Serialized shape of a rule file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    adaptation_rules: Option<Vec<AdaptationRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edge_case_rules: Option<Vec<EdgeCaseRule>>,
}

/// Validated rule tables. A `None` table was not present in the source.
#[derive(Debug, Clone, Default)]
pub struct RuleTables {
    /// Adaptation rules, keyed by preference and content type.
    pub adaptation: Option<AdaptationRuleSet>,
    /// Edge-case detection rules.
    pub edge_cases: Option<EdgeCaseRuleSet>,
}

impl RuleTables {
    /// Both built-in tables.
    pub fn builtin() -> Self {
        Self {
            adaptation: Some(AdaptationRuleSet::builtin()),
            edge_cases: Some(EdgeCaseRuleSet::builtin()),
        }
    }

    /// Parse and validate tables from JSON.
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let file: RuleFile = serde_json::from_str(json)?;

        let adaptation = file
            .adaptation_rules
            .map(AdaptationRuleSet::new)
            .transpose()?;
        let edge_cases = file
            .edge_case_rules
            .map(EdgeCaseRuleSet::new)
            .transpose()?;

        Ok(Self {
            adaptation,
            edge_cases,
        })
    }

    /// Serialize the present tables as pretty JSON.
    pub fn to_json_pretty(&self) -> AppResult<String> {
        let file = RuleFile {
            adaptation_rules: self.adaptation.as_ref().map(|r| r.rules().to_vec()),
            edge_case_rules: self.edge_cases.as_ref().map(|r| r.rules().to_vec()),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Resolve missing tables to the built-in ones.
    pub fn into_sets(self) -> (AdaptationRuleSet, EdgeCaseRuleSet) {
        (
            self.adaptation.unwrap_or_default(),
            self.edge_cases.unwrap_or_default(),
        )
    }
}

/// Read and validate a rule file.
pub fn load_rule_tables(path: &Path) -> AppResult<RuleTables> {
    let json = fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let tables = RuleTables::from_json_str(&json)?;

    info!(
        path = %path.display(),
        adaptation_rules = tables.adaptation.as_ref().map(|r| r.len()).unwrap_or(0),
        edge_case_rules = tables.edge_cases.as_ref().map(|r| r.len()).unwrap_or(0),
        "Rule tables loaded"
    );

    Ok(tables)
}
