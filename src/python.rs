//! Python bindings for the ETL transform stage
//!
//! Results cross the boundary as JSON strings shaped like the course schema's
//! requisite objects; the Python side loads them with `json.loads`.

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;

use crate::backend;
use crate::batch;
use crate::config::{DispatchConfig, DispatchSettings};
use crate::dispatch;
use crate::error::RequisiteError;

// ============================================================================
// Cached Configuration
// ============================================================================

/// Configuration installed by `init_config`
static CACHED_CONFIG: OnceCell<RwLock<Arc<DispatchConfig>>> = OnceCell::new();

fn current_config() -> Arc<DispatchConfig> {
    match CACHED_CONFIG.get() {
        Some(cached) => Arc::clone(&cached.read()),
        None => Arc::new(DispatchConfig::global().clone()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| RequisiteError::from(e).into())
}

// ============================================================================
// Python Functions
// ============================================================================

/// Install dispatcher settings (call once at startup, may be called again)
///
/// # Arguments
/// * `settings` - dict with optional keys `absent_markers` (list[str]),
///   `commentary_patterns` (list[str]), `max_tokens` (int) and `max_depth` (int)
#[pyfunction]
fn init_config(settings: &Bound<'_, PyDict>) -> PyResult<()> {
    let mut parsed = DispatchSettings::default();
    if let Some(markers) = settings.get_item("absent_markers")? {
        parsed.absent_markers = markers.extract()?;
    }
    if let Some(patterns) = settings.get_item("commentary_patterns")? {
        parsed.commentary_patterns = patterns.extract()?;
    }
    if let Some(max_tokens) = settings.get_item("max_tokens")? {
        parsed.max_tokens = max_tokens.extract()?;
    }
    if let Some(max_depth) = settings.get_item("max_depth")? {
        parsed.max_depth = max_depth.extract()?;
    }

    let config = Arc::new(DispatchConfig::from_settings(parsed)?);

    // If already initialized, swap the config in place
    let cached = CACHED_CONFIG.get_or_init(|| RwLock::new(Arc::clone(&config)));
    *cached.write() = config;

    Ok(())
}

/// Check if config is initialized
#[pyfunction]
fn is_config_initialized() -> bool {
    CACHED_CONFIG.get().is_some()
}

/// Parse one raw requisite string
///
/// # Returns
/// JSON array with one object per `;`-separated chunk
#[pyfunction]
#[pyo3(signature = (raw_text=None))]
fn parse_prereq(raw_text: Option<String>) -> PyResult<String> {
    let config = current_config();
    let nodes = dispatch::parse_prereq_with(raw_text.as_deref(), &config);
    to_json(&nodes)
}

/// Parse many raw requisite strings without blocking the asyncio loop
///
/// # Returns
/// An awaitable resolving to one JSON array per input, in input order
///
/// # Example (Python)
/// ```python
/// results = await parse_prereq_batch_async(["CIS*1910; CIS*2500", None])
/// ```
#[pyfunction]
fn parse_prereq_batch_async<'py>(
    py: Python<'py>,
    raw_texts: Vec<Option<String>>,
) -> PyResult<Bound<'py, PyAny>> {
    let config = current_config();

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let results = batch::parse_many(raw_texts, config).await;
        results.iter().map(to_json).collect::<PyResult<Vec<String>>>()
    })
}

/// Normalize a reply from the API-based parser into a canonical JSON object
#[pyfunction]
fn normalize_backend_reply(raw_text: &str, reply: &str) -> PyResult<String> {
    to_json(&backend::normalize_reply(raw_text, reply))
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn prereq_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_config, m)?)?;
    m.add_function(wrap_pyfunction!(is_config_initialized, m)?)?;
    m.add_function(wrap_pyfunction!(parse_prereq, m)?)?;
    m.add_function(wrap_pyfunction!(parse_prereq_batch_async, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_backend_reply, m)?)?;
    Ok(())
}
