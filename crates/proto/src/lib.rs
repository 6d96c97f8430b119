//! # milvus-client-proto
//!
//! Protobuf messages for the slice of the Milvus service contract this client
//! speaks: search, mutation results, and the index lifecycle RPCs.
//!
//! Messages are declared by hand with `prost` derives instead of being
//! generated at build time, so the workspace builds without `protoc`. Field
//! numbers and enum values mirror `common.proto`, `schema.proto` and
//! `milvus.proto` of the service; only fields the client reads or writes are
//! declared, unknown fields are skipped on decode.

#![allow(
    missing_docs,
    unused_qualifications,
    trivial_casts,
    trivial_numeric_casts,
    clippy::derive_partial_eq_without_eq,
    reason = "prost derive output for wire messages"
)]

pub mod common;
pub mod milvus;
pub mod schema;
