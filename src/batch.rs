//! Concurrent parsing of many requisite strings
//!
//! Each input is parsed on tokio's blocking pool. Results are gathered by
//! index, so the output order always matches the input order regardless of
//! which task finishes first.

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::config::DispatchConfig;
use crate::dispatch::parse_prereq_with;
use crate::error::RequisiteError;
use crate::requisite::RequisiteExpression;

/// Parse every input concurrently, returning results in input order
///
/// A task that fails (panics or is cancelled) yields a single `PARSE_ERROR`
/// for its own input; the other inputs are unaffected.
pub async fn parse_many(
    inputs: Vec<Option<String>>,
    config: Arc<DispatchConfig>,
) -> Vec<Vec<RequisiteExpression>> {
    let inputs: Arc<[Option<String>]> = inputs.into();
    let mut slots: Vec<Option<Vec<RequisiteExpression>>> = vec![None; inputs.len()];
    let mut tasks = JoinSet::new();

    for index in 0..inputs.len() {
        let inputs = Arc::clone(&inputs);
        let config = Arc::clone(&config);
        tasks.spawn_blocking(move || (index, parse_prereq_with(inputs[index].as_deref(), &config)));
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, nodes)) => slots[index] = Some(nodes),
            Err(e) => {
                // The index is lost with the task; unfilled slots are resolved below
                tracing::warn!(error = %e, "requisite parse task failed");
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.unwrap_or_else(|| task_failed(inputs[index].as_deref())))
        .collect()
}

fn task_failed(input: Option<&str>) -> Vec<RequisiteExpression> {
    let err = RequisiteError::TaskFailed("parse task did not complete".to_string());
    vec![RequisiteExpression::parse_error(
        err.to_string(),
        input.unwrap_or_default().trim(),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_many_preserves_order() {
        let inputs: Vec<Option<String>> = (0..64)
            .map(|i| Some(format!("CIS*{}", 1000 + i)))
            .collect();
        let results = parse_many(inputs, Arc::new(DispatchConfig::default())).await;

        assert_eq!(results.len(), 64);
        for (i, nodes) in results.iter().enumerate() {
            assert_eq!(
                nodes,
                &vec![RequisiteExpression::course(format!("CIS*{}", 1000 + i))]
            );
        }
    }

    #[tokio::test]
    async fn test_parse_many_mixed_inputs() {
        let inputs = vec![
            None,
            Some("CIS*1910; CIS*2500".to_string()),
            Some("not a requirement".to_string()),
        ];
        let results = parse_many(inputs, Arc::new(DispatchConfig::default())).await;

        assert_eq!(results[0], vec![RequisiteExpression::no_requisites()]);
        assert_eq!(results[1].len(), 2);
        assert!(results[2][0].is_parse_error());
    }

    #[test]
    fn test_task_failure_keeps_input_text() {
        let nodes = task_failed(Some("  CIS*1910 "));
        match &nodes[..] {
            [RequisiteExpression::ParseError { error, chunk }] => {
                assert_eq!(chunk, "CIS*1910");
                assert!(error.starts_with("Parse task failed"), "{}", error);
            }
            other => panic!("Expected one PARSE_ERROR, got {:?}", other),
        }
        assert!(task_failed(None)[0].is_parse_error());
    }

    #[tokio::test]
    async fn test_parse_many_deep_nesting_does_not_abort() {
        let deep = format!("{}CIS*1910{}", "[".repeat(255), "]".repeat(255));
        let inputs = vec![Some(deep), Some("CIS*2500".to_string())];
        let results = parse_many(inputs, Arc::new(DispatchConfig::default())).await;

        assert!(results[0][0].is_parse_error());
        assert_eq!(results[1], vec![RequisiteExpression::course("CIS*2500")]);
    }

    #[tokio::test]
    async fn test_parse_many_empty() {
        let results = parse_many(Vec::new(), Arc::new(DispatchConfig::default())).await;
        assert!(results.is_empty());
    }
}
