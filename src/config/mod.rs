//! Dispatcher configuration
//!
//! `DispatchSettings` is the serializable form (JSON, Python dict);
//! `DispatchConfig` holds the compiled patterns used while parsing.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{RequisiteError, Result};
use crate::requisite::parser::{ParseLimits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOKENS};

/// Trailing "- Must be completed prior to taking this course." notes
pub const MUST_COMMENTARY_PATTERN: &str = r"\s*[-–—]?\s*\bMust\b.*";

/// ". A grade average of 70% is recommended." sentences
pub const RECOMMENDATION_PATTERN: &str = r"\.\s*A grade average of.*?is recommended\.";

/// Serializable dispatcher settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Inputs meaning "no requirement", compared case-insensitively after trimming
    pub absent_markers: Vec<String>,
    /// Regexes for non-logical commentary, removed before splitting
    pub commentary_patterns: Vec<String>,
    /// Token limit per chunk
    pub max_tokens: usize,
    /// Bracket nesting limit per chunk
    pub max_depth: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        DispatchSettings {
            absent_markers: vec!["none".to_string(), "n/a".to_string()],
            commentary_patterns: vec![
                RECOMMENDATION_PATTERN.to_string(),
                MUST_COMMENTARY_PATTERN.to_string(),
            ],
            max_tokens: DEFAULT_MAX_TOKENS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Compiled dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    absent_markers: Vec<String>,
    commentary: Vec<Regex>,
    limits: ParseLimits,
}

static DEFAULT_CONFIG: Lazy<DispatchConfig> = Lazy::new(|| {
    DispatchConfig::from_settings(DispatchSettings::default())
        .expect("default commentary patterns compile")
});

impl DispatchConfig {
    /// Compile settings; commentary patterns are case-insensitive
    pub fn from_settings(settings: DispatchSettings) -> Result<Self> {
        if settings.max_tokens == 0 {
            return Err(RequisiteError::InvalidConfig(
                "max_tokens must be positive".to_string(),
            ));
        }
        if settings.max_depth == 0 {
            return Err(RequisiteError::InvalidConfig(
                "max_depth must be positive".to_string(),
            ));
        }

        let commentary = settings
            .commentary_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        RequisiteError::InvalidConfig(format!(
                            "commentary pattern '{}': {}",
                            pattern, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DispatchConfig {
            absent_markers: settings
                .absent_markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .collect(),
            commentary,
            limits: ParseLimits {
                max_tokens: settings.max_tokens,
                max_depth: settings.max_depth,
            },
        })
    }

    /// Read settings from a JSON object; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: DispatchSettings = serde_json::from_str(json)?;
        Self::from_settings(settings)
    }

    /// The lazily compiled default configuration
    pub fn global() -> &'static DispatchConfig {
        &DEFAULT_CONFIG
    }

    /// Whether `text` is empty or one of the absent markers
    pub fn is_absent(&self, text: &str) -> bool {
        let text = text.trim();
        text.is_empty() || self.absent_markers.iter().any(|m| text.eq_ignore_ascii_case(m))
    }

    pub fn commentary(&self) -> &[Regex] {
        &self.commentary
    }

    pub fn max_tokens(&self) -> usize {
        self.limits.max_tokens
    }

    pub fn max_depth(&self) -> usize {
        self.limits.max_depth
    }

    pub fn limits(&self) -> ParseLimits {
        self.limits
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_absent_markers() {
        let config = DispatchConfig::global();
        assert!(config.is_absent(""));
        assert!(config.is_absent("  None "));
        assert!(config.is_absent("N/A"));
        assert!(!config.is_absent("CIS*1910"));
    }

    #[test]
    fn test_from_json_partial() {
        let config = DispatchConfig::from_json(r#"{"max_tokens": 32, "absent_markers": ["TBA"]}"#)
            .unwrap();
        assert_eq!(config.max_tokens(), 32);
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
        assert!(config.is_absent("tba"));
        assert!(!config.is_absent("none"));
        assert_eq!(config.commentary().len(), 2);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let settings = DispatchSettings {
            commentary_patterns: vec!["(unclosed".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            DispatchConfig::from_settings(settings),
            Err(RequisiteError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_token_limit_rejected() {
        let settings = DispatchSettings {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(DispatchConfig::from_settings(settings).is_err());
    }

    #[test]
    fn test_zero_depth_limit_rejected() {
        let settings = DispatchSettings {
            max_depth: 0,
            ..Default::default()
        };
        assert!(DispatchConfig::from_settings(settings).is_err());
    }

    #[test]
    fn test_depth_limit_from_json() {
        let config = DispatchConfig::from_json(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config.limits().max_depth, 8);
        assert_eq!(config.limits().max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_must_commentary_stops_at_line_end() {
        let config = DispatchConfig::global();
        let must = &config.commentary()[1];
        let text = "CIS*1910 - Must be completed first.\nCIS*2500";
        assert_eq!(must.replace_all(text, ""), "CIS*1910\nCIS*2500");
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            DispatchConfig::from_json("{not json"),
            Err(RequisiteError::Json(_))
        ));
    }
}
