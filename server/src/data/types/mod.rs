//! Shared data types for emitted records

mod metric_log;

pub use metric_log::{
    FIELD_LABELS, FIELD_NAME, FIELD_TIME_NANO, FIELD_VALUE, LABEL_KV_SEPARATOR, LABEL_SEPARATOR,
    Labels, MetricLabel, MetricLog,
};
