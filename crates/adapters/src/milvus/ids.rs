//! Identifier union codec.

use milvus_client_domain::IdentifierUnion;
use milvus_client_proto::schema::{Ids, LongArray, StringArray, ids::IdField};

/// Decode a wire id set.
///
/// The populated oneof branch decides the variant. An absent message, an
/// absent or unknown branch and an empty list all decode to
/// [`IdentifierUnion::None`].
#[must_use]
pub fn decode_ids(ids: Option<Ids>) -> IdentifierUnion {
    match ids.and_then(|ids| ids.id_field) {
        Some(IdField::IntId(LongArray { data })) if !data.is_empty() => {
            IdentifierUnion::IntIds(data)
        },
        Some(IdField::StrId(StringArray { data })) if !data.is_empty() => {
            IdentifierUnion::StringIds(data)
        },
        _ => IdentifierUnion::None,
    }
}

/// Encode an id set, populating only the branch matching the variant.
#[must_use]
pub fn encode_ids(ids: &IdentifierUnion) -> Ids {
    let id_field = match ids {
        IdentifierUnion::None => None,
        IdentifierUnion::IntIds(data) => Some(IdField::IntId(LongArray { data: data.clone() })),
        IdentifierUnion::StringIds(data) => {
            Some(IdField::StrId(StringArray { data: data.clone() }))
        },
    };
    Ids { id_field }
}
