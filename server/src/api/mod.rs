//! Network-facing services

pub mod grpc;

pub use grpc::{MeterGrpcServer, MeterReportReceiver};
