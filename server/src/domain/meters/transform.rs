//! Meter to metric log transformation

use crate::data::types::{Labels, MetricLog};
use crate::proto::meter_data::Metric;
use crate::proto::{Label, MeterData, MeterHistogram, MeterSingleValue};
use crate::utils::number::format_float;

use super::histogram::convert_histogram;

/// Label injected with the reporting service name
pub const LABEL_SERVICE: &str = "service";

/// Label injected with the reporting service instance
pub const LABEL_SERVICE_INSTANCE: &str = "serviceInstance";

/// Resolved session identity and timestamp for one meter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterContext<'a> {
    pub service: &'a str,
    pub service_instance: &'a str,
    pub timestamp_ms: i64,
}

/// Convert one meter into metric logs. Holds no state between calls.
pub fn transform_meter(meter: &MeterData, ctx: &MeterContext<'_>) -> Vec<MetricLog> {
    match &meter.metric {
        Some(Metric::SingleValue(single)) => vec![single_value_log(single, ctx)],
        Some(Metric::Histogram(histogram)) => histogram_logs(histogram, ctx),
        None => Vec::new(),
    }
}

fn single_value_log(single: &MeterSingleValue, ctx: &MeterContext<'_>) -> MetricLog {
    MetricLog::new(
        single.name.clone(),
        ctx.timestamp_ms,
        format_float(single.value),
        session_labels(&single.labels, ctx),
    )
}

fn histogram_logs(histogram: &MeterHistogram, ctx: &MeterContext<'_>) -> Vec<MetricLog> {
    let labels = session_labels(&histogram.labels, ctx);
    convert_histogram(&histogram.values).to_metric_logs(&histogram.name, ctx.timestamp_ms, &labels)
}

/// Wire labels plus the two identity labels, sorted by name then value
fn session_labels(wire: &[Label], ctx: &MeterContext<'_>) -> Labels {
    let mut labels = Labels::with_capacity(wire.len() + 2);
    for label in wire {
        labels.push(label.name.clone(), label.value.clone());
    }
    labels.push(LABEL_SERVICE, ctx.service);
    labels.push(LABEL_SERVICE_INSTANCE, ctx.service_instance);
    labels.sort();
    labels
}
