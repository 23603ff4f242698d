//! Generates the protobuf messages and tonic clients from `proto/`.
//!
//! `protox` parses the schemas in-process, so no system `protoc` is needed.

const PROTOS: &[&str] = &[
    "proto/apex/v1/apex.proto",
    "proto/billing/v1/billing.proto",
    "proto/gravity/v1/gravity.proto",
    "proto/sn13/v1/sn13_validator.proto",
];

/// Apex and billing messages are encoded as JSON lines and logged.
const SERDE_ATTRIBUTES: &str = "#[derive(serde::Serialize, serde::Deserialize)]\n#[serde(rename_all = \"camelCase\", default)]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let file_descriptors = protox::compile(PROTOS, ["proto"])?;

    tonic_build::configure()
        .build_server(false)
        .type_attribute(".apex.v1", SERDE_ATTRIBUTES)
        .type_attribute(".billing.v1", SERDE_ATTRIBUTES)
        .compile_fds(file_descriptors)?;

    for proto in PROTOS {
        println!("cargo:rerun-if-changed={proto}");
    }
    Ok(())
}
