//! Normalized metric log emitted for every meter sample

use serde::Serialize;
use serde::ser::SerializeStruct;

use crate::utils::time::{millis_to_iso, millis_to_nanos};

/// Separator between a label name and its value in `__labels__`
pub const LABEL_KV_SEPARATOR: &str = "#$#";

/// Separator between labels in `__labels__`
pub const LABEL_SEPARATOR: &str = "|";

pub const FIELD_NAME: &str = "__name__";
pub const FIELD_LABELS: &str = "__labels__";
pub const FIELD_TIME_NANO: &str = "__time_nano__";
pub const FIELD_VALUE: &str = "__value__";

/// Single metric label. Ordering is by name, then by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MetricLabel {
    pub name: String,
    pub value: String,
}

impl MetricLabel {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered label list. Duplicates are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Labels(Vec<MetricLabel>);

impl Labels {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(MetricLabel::new(name, value));
    }

    /// Sort ascending by name, ties broken by value
    pub fn sort(&mut self) {
        self.0.sort();
    }

    /// Copy of this label set with one extra label, re-sorted
    pub fn with_label(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut labels = Self::with_capacity(self.0.len() + 1);
        labels.0.extend_from_slice(&self.0);
        labels.push(name, value);
        labels.sort();
        labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricLabel> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|label| label.name == name)
            .map(|label| label.value.as_str())
    }

    /// Render as `name#$#value|name#$#value` in current order
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|label| format!("{}{}{}", label.name, LABEL_KV_SEPARATOR, label.value))
            .collect::<Vec<_>>()
            .join(LABEL_SEPARATOR)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| MetricLabel::new(name, value))
                .collect(),
        )
    }
}

/// One emitted metric sample
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLog {
    pub name: String,
    pub timestamp_ms: i64,
    pub labels: Labels,
    /// Already formatted numeric value
    pub value: String,
}

impl MetricLog {
    pub fn new(
        name: impl Into<String>,
        timestamp_ms: i64,
        value: impl Into<String>,
        labels: Labels,
    ) -> Self {
        Self {
            name: name.into(),
            timestamp_ms,
            labels,
            value: value.into(),
        }
    }

    /// Flat key/value layout consumed by log-oriented collectors
    pub fn fields(&self) -> [(&'static str, String); 4] {
        [
            (FIELD_NAME, self.name.clone()),
            (FIELD_LABELS, self.labels.render()),
            (
                FIELD_TIME_NANO,
                millis_to_nanos(self.timestamp_ms).to_string(),
            ),
            (FIELD_VALUE, self.value.clone()),
        ]
    }
}

impl Serialize for MetricLog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MetricLog", 5)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("timestamp", &millis_to_iso(self.timestamp_ms))?;
        state.serialize_field("timestamp_ms", &self.timestamp_ms)?;
        state.serialize_field("labels", &self.labels)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}
