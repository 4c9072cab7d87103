//! Cumulative histogram reconstruction
//!
//! Agents report each bucket with the number of observations that fell into it.
//! Downstream consumers expect Prometheus style `le` buckets where every count
//! includes all lower buckets, closed by a `+Inf` bucket holding the total.

use crate::data::types::{Labels, MetricLog};
use crate::proto::MeterBucketValue;
use crate::utils::number::format_float;

/// Label carrying the bucket boundary on `_bucket` records
pub const LABEL_LE: &str = "le";

pub const SUFFIX_BUCKET: &str = "_bucket";
pub const SUFFIX_COUNT: &str = "_count";
pub const SUFFIX_SUM: &str = "_sum";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulativeBucket {
    pub le: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeHistogram {
    /// Ascending buckets, always terminated by `le = +Inf`
    pub buckets: Vec<CumulativeBucket>,
    pub count: i64,
    /// Approximation: every observation is counted at its bucket boundary
    pub sum: f64,
}

/// Convert per-bucket counts into a cumulative histogram.
///
/// The first reported bucket only seeds the running total; each later bucket
/// emits the total accumulated before it under its own boundary.
pub fn convert_histogram(values: &[MeterBucketValue]) -> CumulativeHistogram {
    let mut buckets = Vec::with_capacity(values.len().max(1));
    let mut total: i64 = 0;
    let mut sum = 0.0;

    for (index, value) in values.iter().enumerate() {
        sum += value.count as f64 * value.bucket;
        if index == 0 {
            total = value.count;
            continue;
        }
        buckets.push(CumulativeBucket {
            le: value.bucket,
            count: total,
        });
        total = total.saturating_add(value.count);
    }

    buckets.push(CumulativeBucket {
        le: f64::INFINITY,
        count: total,
    });

    CumulativeHistogram {
        buckets,
        count: total,
        sum,
    }
}

impl CumulativeHistogram {
    /// Expand into `_bucket` records (one per bucket, with an `le` label),
    /// followed by `_count` and `_sum`. `labels` must already be sorted.
    pub fn to_metric_logs(&self, name: &str, timestamp_ms: i64, labels: &Labels) -> Vec<MetricLog> {
        let mut logs = Vec::with_capacity(self.buckets.len() + 2);
        let bucket_name = format!("{}{}", name, SUFFIX_BUCKET);

        for bucket in &self.buckets {
            logs.push(MetricLog::new(
                bucket_name.clone(),
                timestamp_ms,
                bucket.count.to_string(),
                labels.with_label(LABEL_LE, format_float(bucket.le)),
            ));
        }

        logs.push(MetricLog::new(
            format!("{}{}", name, SUFFIX_COUNT),
            timestamp_ms,
            self.count.to_string(),
            labels.clone(),
        ));
        logs.push(MetricLog::new(
            format!("{}{}", name, SUFFIX_SUM),
            timestamp_ms,
            format_float(self.sum),
            labels.clone(),
        ));

        logs
    }
}
