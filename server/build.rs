//! Generates the SkyWalking `MeterReportService` gRPC stubs.
//!
//! Message types are declared by hand in `src/proto/mod.rs`, so the service is
//! described with tonic-build's manual builder and no `protoc` is required.

use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

fn main() {
    let collect = Method::builder()
        .name("collect")
        .route_name("collect")
        .input_type("crate::proto::MeterData")
        .output_type("crate::proto::Commands")
        .codec_path(CODEC)
        .client_streaming()
        .build();

    let collect_batch = Method::builder()
        .name("collect_batch")
        .route_name("collectBatch")
        .input_type("crate::proto::MeterDataCollection")
        .output_type("crate::proto::Commands")
        .codec_path(CODEC)
        .client_streaming()
        .build();

    let service = Service::builder()
        .name("MeterReportService")
        .package("skywalking.v3")
        .method(collect)
        .method(collect_batch)
        .build();

    Builder::new().compile(&[service]);

    println!("cargo:rerun-if-changed=build.rs");
}
