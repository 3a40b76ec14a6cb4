//! Scalar time-series logging
//!
//! Trainers report named scalars keyed by epoch through the [`MetricsSink`]
//! trait. A sink is optional: training never depends on one being attached.
//!
//! - **`ScalarHistory`**: in-memory series, serializable to JSON
//! - **`SharedHistory`**: a cloneable handle so the caller can read the
//!   history after handing a sink to a trainer
//!
//! # Example
//!
//! ```
//! use fairtrain::tracking::{MetricsSink, ScalarHistory};
//!
//! let mut history = ScalarHistory::new();
//! history.add_scalar("test/acc", 0.81, 0);
//! history.add_scalars("regs", &[("l0".to_string(), 0.02), ("l1".to_string(), 0.05)], 0);
//! assert_eq!(history.last("regs/l1"), Some(0.05));
//! ```

pub mod storage;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub use storage::{read_json, write_json};

/// Receiver for named scalar series
pub trait MetricsSink: Send {
    /// Record one value of series `tag` at `epoch`
    fn add_scalar(&mut self, tag: &str, value: f32, epoch: usize);

    /// Record a group of related values as `tag/name` series
    fn add_scalars(&mut self, tag: &str, values: &[(String, f32)], epoch: usize) {
        for (name, value) in values {
            self.add_scalar(&format!("{tag}/{name}"), *value, epoch);
        }
    }
}

/// A single metric data point
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricEntry {
    pub value: f32,
    pub step: usize,
}

/// In-memory scalar series, ordered by tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarHistory {
    series: BTreeMap<String, Vec<MetricEntry>>,
}

impl ScalarHistory {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// All points of one series
    pub fn series(&self, tag: &str) -> Option<&[MetricEntry]> {
        self.series.get(tag).map(Vec::as_slice)
    }

    /// Most recent value of a series
    pub fn last(&self, tag: &str) -> Option<f32> {
        self.series.get(tag).and_then(|s| s.last()).map(|e| e.value)
    }

    /// Recorded tags, sorted
    pub fn tags(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl MetricsSink for ScalarHistory {
    fn add_scalar(&mut self, tag: &str, value: f32, epoch: usize) {
        self.series
            .entry(tag.to_string())
            .or_default()
            .push(MetricEntry { value, step: epoch });
    }
}

/// Cloneable handle to a [`ScalarHistory`] behind a mutex
#[derive(Debug, Clone, Default)]
pub struct SharedHistory(Arc<Mutex<ScalarHistory>>);

impl SharedHistory {
    /// Empty shared history
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current history
    pub fn snapshot(&self) -> ScalarHistory {
        match self.0.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MetricsSink for SharedHistory {
    fn add_scalar(&mut self, tag: &str, value: f32, epoch: usize) {
        match self.0.lock() {
            Ok(mut history) => history.add_scalar(tag, value, epoch),
            Err(poisoned) => poisoned.into_inner().add_scalar(tag, value, epoch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_scalar_appends() {
        let mut h = ScalarHistory::new();
        h.add_scalar("test/loss", 0.9, 0);
        h.add_scalar("test/loss", 0.7, 1);
        let s = h.series("test/loss").unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[1], MetricEntry { value: 0.7, step: 1 });
        assert_eq!(h.last("test/loss"), Some(0.7));
        assert!(h.last("missing").is_none());
    }

    #[test]
    fn test_add_scalars_prefixes_tag() {
        let mut h = ScalarHistory::new();
        h.add_scalars("regs", &[("l0".into(), 0.1), ("l1".into(), 0.2)], 3);
        assert_eq!(h.tags(), vec!["regs/l0", "regs/l1"]);
    }

    #[test]
    fn test_shared_history_visible_through_clone() {
        let handle = SharedHistory::new();
        let mut sink: Box<dyn MetricsSink> = Box::new(handle.clone());
        sink.add_scalar("renyi", 0.01, 0);
        assert_eq!(handle.snapshot().last("renyi"), Some(0.01));
    }
}
