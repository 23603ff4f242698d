//! Protobuf messages and gRPC client stubs
//!
//! Generated at build time from `proto/` by `tonic-build`. Each module holds
//! the `prost` message types of one package and a `*_service_client` module
//! with the `tonic` client.
//!
//! Apex and billing messages additionally derive `serde` (camelCase, every
//! field defaulted) so they can be encoded as JSON lines and logged.

#![allow(clippy::all, missing_docs)]

pub mod apex {
    tonic::include_proto!("apex.v1");
}

pub mod billing {
    tonic::include_proto!("billing.v1");
}

pub mod gravity {
    tonic::include_proto!("gravity.v1");
}

pub mod sn13 {
    tonic::include_proto!("sn13.v1");
}
