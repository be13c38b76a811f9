//! Top-level entry point for raw requisite strings
//!
//! Cleans catalog commentary, splits on `;` and runs each chunk through the
//! parse -> transform -> canonicalize pipeline. Every failure becomes a
//! `PARSE_ERROR` node for its chunk; nothing is raised to the caller.

use std::borrow::Cow;

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::requisite::{canonicalize, parse_with_limits, transform, RequisiteExpression};

/// Parse a raw requisite string with the default configuration
///
/// # Examples
/// ```
/// use prereq_core::{parse_prereq, RequisiteExpression};
///
/// let nodes = parse_prereq(Some("CIS*1910; CIS*2500"));
/// assert_eq!(
///     nodes,
///     vec![
///         RequisiteExpression::course("CIS*1910"),
///         RequisiteExpression::course("CIS*2500"),
///     ]
/// );
/// ```
pub fn parse_prereq(raw_text: Option<&str>) -> Vec<RequisiteExpression> {
    parse_prereq_with(raw_text, DispatchConfig::global())
}

/// Parse a raw requisite string into one canonical node per `;` chunk
pub fn parse_prereq_with(raw_text: Option<&str>, config: &DispatchConfig) -> Vec<RequisiteExpression> {
    let raw_text = match raw_text {
        Some(text) if !config.is_absent(text) => text,
        _ => return vec![RequisiteExpression::no_requisites()],
    };

    let cleaned = strip_commentary(raw_text, config);
    split_chunks(&cleaned)
        .map(|chunk| parse_chunk_with(chunk, config))
        .collect()
}

/// Parse one already split chunk with the default configuration
pub fn parse_chunk(chunk: &str) -> RequisiteExpression {
    parse_chunk_with(chunk, DispatchConfig::global())
}

/// Parse one chunk; failures become `PARSE_ERROR` carrying the chunk as given
pub fn parse_chunk_with(chunk: &str, config: &DispatchConfig) -> RequisiteExpression {
    let chunk = chunk.trim();
    match run_pipeline(chunk, config) {
        Ok(node) => node,
        Err(e) => {
            tracing::debug!(chunk, error = %e, "requisite chunk rejected");
            RequisiteExpression::parse_error(e.to_string(), chunk)
        }
    }
}

fn run_pipeline(chunk: &str, config: &DispatchConfig) -> Result<RequisiteExpression> {
    let upper = chunk.to_uppercase();
    let tree = parse_with_limits(&upper, config.limits())?;
    let node = transform(&tree)?;
    Ok(canonicalize(node))
}

/// Remove trailing commentary that is not part of the logical requirement
pub fn strip_commentary<'a>(text: &'a str, config: &DispatchConfig) -> Cow<'a, str> {
    let mut cleaned = Cow::Borrowed(text);
    for pattern in config.commentary() {
        if pattern.is_match(&cleaned) {
            let replaced = pattern.replace_all(&cleaned, "").into_owned();
            tracing::debug!(pattern = pattern.as_str(), "stripped requisite commentary");
            cleaned = Cow::Owned(replaced);
        }
    }
    cleaned
}

/// Trimmed, non-empty `;`-separated chunks in input order
pub fn split_chunks(text: &str) -> impl Iterator<Item = &str> {
    text.split(';').map(str::trim).filter(|chunk| !chunk.is_empty())
}
