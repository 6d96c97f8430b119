//! Shared Milvus helpers.

use milvus_client_proto::common::{KeyValuePair, MsgBase, MsgType};
use std::collections::BTreeMap;

/// Request header for `msg_type`; ids and timestamps are assigned by the proxy.
pub fn msg_base(msg_type: MsgType) -> MsgBase {
    MsgBase {
        msg_type: msg_type as i32,
        ..MsgBase::default()
    }
}

/// Collect key/value pairs into a map; later duplicates win.
pub fn key_value_map(pairs: Vec<KeyValuePair>) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|pair| (pair.key, pair.value))
        .collect()
}

/// Empty strings mean "absent" on the wire.
pub fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
