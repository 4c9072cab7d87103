//! SkyWalking v3 meter protocol
//!
//! Message layouts follow `language-agent/Meter.proto` and `common/Command.proto`.
//! The `MeterReportService` server and client are generated by `build.rs`.

/// A name/value label attached to a meter.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

/// One histogram bucket as reported by the agent: the bucket boundary and the
/// number of observations that fell into it (not cumulative).
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeterBucketValue {
    #[prost(double, tag = "1")]
    pub bucket: f64,
    #[prost(int64, tag = "2")]
    pub count: i64,
    #[prost(bool, tag = "3")]
    pub is_negative_infinity: bool,
}

/// Gauge/counter style meter.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeterSingleValue {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub labels: ::prost::alloc::vec::Vec<Label>,
    #[prost(double, tag = "3")]
    pub value: f64,
}

/// Histogram meter with per-bucket counts in ascending bucket order.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeterHistogram {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub labels: ::prost::alloc::vec::Vec<Label>,
    #[prost(message, repeated, tag = "3")]
    pub values: ::prost::alloc::vec::Vec<MeterBucketValue>,
}

/// One message of a meter report stream.
///
/// Agents only fill `service`, `service_instance` and `timestamp` on the first
/// message(s) of a stream; later messages leave them empty / zero.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeterData {
    #[prost(oneof = "meter_data::Metric", tags = "1, 2")]
    pub metric: ::core::option::Option<meter_data::Metric>,
    #[prost(string, tag = "3")]
    pub service: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub service_instance: ::prost::alloc::string::String,
    /// Milliseconds since the Unix epoch, `<= 0` when unset.
    #[prost(int64, tag = "5")]
    pub timestamp: i64,
}

/// Nested message and enum types in `MeterData`.
pub mod meter_data {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Metric {
        #[prost(message, tag = "1")]
        SingleValue(super::MeterSingleValue),
        #[prost(message, tag = "2")]
        Histogram(super::MeterHistogram),
    }
}

/// Batch of meters sent through `collectBatch`.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeterDataCollection {
    #[prost(message, repeated, tag = "1")]
    pub meter_data: ::prost::alloc::vec::Vec<MeterData>,
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyStringValuePair {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

/// Command pushed back to the agent.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Command {
    #[prost(string, tag = "1")]
    pub command: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub args: ::prost::alloc::vec::Vec<KeyStringValuePair>,
}

/// Response of every meter report call. The receiver always answers with an
/// empty command list.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Commands {
    #[prost(message, repeated, tag = "1")]
    pub commands: ::prost::alloc::vec::Vec<Command>,
}

include!(concat!(env!("OUT_DIR"), "/skywalking.v3.MeterReportService.rs"));
