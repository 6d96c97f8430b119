//! Query vector encoding into the search placeholder group.
//!
//! Float vectors are written as consecutive little-endian IEEE-754 `f32`
//! values; packed binary vectors are copied as-is. Every query vector becomes
//! its own buffer inside a single placeholder value tagged [`PLACEHOLDER_TAG`].

use bytes::BytesMut;
use milvus_client_domain::{SearchParamError, SearchVectors};
use milvus_client_proto::common::{PlaceholderGroup, PlaceholderType, PlaceholderValue};
use milvus_client_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use prost::Message;

/// Tag of the placeholder slot referenced by search requests.
pub const PLACEHOLDER_TAG: &str = "$0";

const F32_WIDTH: usize = size_of::<f32>();

/// Query vectors serialized for the wire, one buffer per vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedVectors {
    kind: PlaceholderType,
    buffers: Vec<Vec<u8>>,
}

impl EncodedVectors {
    /// Wire discriminant of the vectors.
    #[must_use]
    pub const fn kind(&self) -> PlaceholderType {
        self.kind
    }

    /// Per-vector buffers, in query order.
    #[must_use]
    pub fn buffers(&self) -> &[Vec<u8>] {
        &self.buffers
    }

    /// All buffers back to back, with no separators.
    #[must_use]
    pub fn concatenated(&self) -> Vec<u8> {
        self.buffers.concat()
    }

    /// Wrap the buffers into the single-entry placeholder group.
    #[must_use]
    pub fn into_placeholder_group(self) -> PlaceholderGroup {
        PlaceholderGroup {
            placeholders: vec![PlaceholderValue {
                tag: PLACEHOLDER_TAG.to_owned(),
                r#type: self.kind as i32,
                values: self.buffers,
            }],
        }
    }
}

/// Encode query vectors; an empty set is a validation error.
pub fn encode_vectors(vectors: &SearchVectors) -> Result<EncodedVectors> {
    if vectors.is_empty() {
        return Err(SearchParamError::MissingVectors.into());
    }

    let encoded = match vectors {
        SearchVectors::Float(vectors) => EncodedVectors {
            kind: PlaceholderType::FloatVector,
            buffers: vectors.iter().map(|vector| float_vector_to_bytes(vector)).collect(),
        },
        SearchVectors::Binary(vectors) => EncodedVectors {
            kind: PlaceholderType::BinaryVector,
            buffers: vectors.clone(),
        },
    };
    Ok(encoded)
}

/// Encode query vectors and serialize the placeholder group message.
pub fn encode_placeholder_group(vectors: &SearchVectors) -> Result<Vec<u8>> {
    let group = encode_vectors(vectors)?.into_placeholder_group();
    let mut buf = BytesMut::with_capacity(group.encoded_len());
    group.encode(&mut buf).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("vector", "vdb_invalid_request"),
            format!("failed to encode placeholder group: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    Ok(buf.to_vec())
}

/// Serialize one float vector as little-endian `f32` values.
#[must_use]
pub fn float_vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * F32_WIDTH);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Split a little-endian buffer back into vectors of `dim` floats.
///
/// Fails when `dim` is zero or the buffer is not a whole number of vectors.
pub fn float_vectors_from_bytes(bytes: &[u8], dim: usize) -> Result<Vec<Vec<f32>>> {
    let stride = dim.checked_mul(F32_WIDTH).filter(|stride| *stride > 0);
    let Some(stride) = stride.filter(|stride| bytes.len() % stride == 0) else {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            format!(
                "buffer of {} bytes does not hold whole vectors of dimension {dim}",
                bytes.len()
            ),
        )
        .with_metadata("dim", dim.to_string())
        .with_metadata("len", bytes.len().to_string()));
    };

    bytes
        .chunks_exact(stride)
        .map(|vector| {
            vector
                .chunks_exact(F32_WIDTH)
                .map(|word| <[u8; F32_WIDTH]>::try_from(word).map(f32::from_le_bytes))
                .collect::<std::result::Result<Vec<f32>, _>>()
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|error| {
            ErrorEnvelope::invariant(
                ErrorCode::internal(),
                format!("vector chunking produced a partial word: {error}"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn two_four_dim_vectors_make_two_sixteen_byte_buffers() -> Result<()> {
        let vectors = SearchVectors::Float(vec![
            vec![0.1, 0.2, 0.3, 0.4],
            vec![1.0, -1.0, 0.0, f32::MAX],
        ]);

        let encoded = encode_vectors(&vectors)?;
        assert_eq!(encoded.kind(), PlaceholderType::FloatVector);
        assert_eq!(encoded.buffers().len(), 2);
        assert!(encoded.buffers().iter().all(|buffer| buffer.len() == 16));
        assert_eq!(encoded.concatenated().len(), 32);
        Ok(())
    }

    #[test]
    fn floats_are_little_endian() {
        assert_eq!(float_vector_to_bytes(&[1.0]), vec![0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(
            float_vector_to_bytes(&[-2.5, 0.0]),
            vec![0x00, 0x00, 0x20, 0xc0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn big_endian_host_representation_is_swapped() {
        let vector = [3.25_f32, -0.5, 1e-3];
        // bytes as a big-endian host would hold them in memory
        let native_be: Vec<u8> = vector.iter().flat_map(|value| value.to_be_bytes()).collect();
        let swapped: Vec<u8> = native_be
            .chunks_exact(4)
            .flat_map(|word| word.iter().rev().copied())
            .collect();

        assert_eq!(float_vector_to_bytes(&vector), swapped);
    }

    #[test]
    fn binary_vectors_pass_through() -> Result<()> {
        let vectors = SearchVectors::Binary(vec![vec![0b1010_1010, 0xff], vec![0x00, 0x01]]);
        let encoded = encode_vectors(&vectors)?;
        assert_eq!(encoded.kind(), PlaceholderType::BinaryVector);
        assert_eq!(
            encoded.buffers(),
            &[vec![0b1010_1010, 0xff], vec![0x00, 0x01]]
        );
        Ok(())
    }

    #[test]
    fn empty_vector_set_is_rejected() {
        for vectors in [SearchVectors::Float(Vec::new()), SearchVectors::Binary(Vec::new())] {
            let error = encode_vectors(&vectors).expect_err("empty");
            assert_eq!(error.code, ErrorCode::new("search", "missing_vectors"));
        }
    }

    #[test]
    fn placeholder_group_decodes_with_tag_and_type() -> Result<()> {
        let bytes = encode_placeholder_group(&SearchVectors::Float(vec![vec![1.0, 2.0]]))?;
        let group = PlaceholderGroup::decode(bytes.as_slice()).expect("decode");

        assert_eq!(group.placeholders.len(), 1);
        let value = group.placeholders.first().expect("placeholder");
        assert_eq!(value.tag, "$0");
        assert_eq!(value.r#type, PlaceholderType::FloatVector as i32);
        assert_eq!(value.values, vec![float_vector_to_bytes(&[1.0, 2.0])]);
        Ok(())
    }

    #[test]
    fn ragged_buffers_fail_to_split() {
        assert!(float_vectors_from_bytes(&[0; 12], 2).is_err());
        assert!(float_vectors_from_bytes(&[0; 8], 0).is_err());
    }

    proptest! {
        #[test]
        fn float_round_trip_is_exact(
            dim in 1_usize..16,
            rows in prop::collection::vec(prop::collection::vec(any::<f32>(), 16), 1..8),
        ) {
            let vectors: Vec<Vec<f32>> = rows
                .into_iter()
                .map(|row| row.into_iter().take(dim).collect())
                .collect();
            let encoded = encode_vectors(&SearchVectors::Float(vectors.clone()))
                .expect("encode");

            let decoded = float_vectors_from_bytes(&encoded.concatenated(), dim)
                .expect("decode");

            prop_assert_eq!(decoded.len(), vectors.len());
            for (left, right) in decoded.iter().zip(&vectors) {
                let left: Vec<u32> = left.iter().map(|value| value.to_bits()).collect();
                let right: Vec<u32> = right.iter().map(|value| value.to_bits()).collect();
                prop_assert_eq!(left, right);
            }
        }
    }
}
