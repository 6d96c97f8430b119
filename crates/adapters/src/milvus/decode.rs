//! Response decoding into domain values.
//!
//! Every decoder checks the reply status first. Enumerated values go through
//! explicit tables; anything outside a table is a [`DecodeError`], never a
//! default.

use crate::milvus::error::{MilvusErrorContext, ensure_status_ok};
use crate::milvus::ids::decode_ids;
use crate::milvus::shared::{key_value_map, non_empty};
use milvus_client_domain::{
    FieldColumn, HybridTimestamp, IndexBuildProgress, IndexInfo, IndexState, IndexStateReport,
    MutationOutcome, SearchResults,
};
use milvus_client_proto::common::{IndexState as WireIndexState, Status};
use milvus_client_proto::milvus::{
    DescribeIndexResponse, GetIndexBuildProgressResponse, GetIndexStateResponse, MutationResult,
    SearchResults as WireSearchResults,
};
use milvus_client_proto::schema::{FieldData, field_data, scalar_field, vector_field};
use milvus_client_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::fmt;

/// A reply field that does not fit the client's model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Index state integer outside the known table.
    UnknownIndexState {
        /// Raw wire value.
        value: i32,
    },
    /// A search reply carried no result data.
    MissingSearchResults,
    /// Hit ids and scores have different lengths.
    MisalignedHits {
        /// Number of ids.
        ids: usize,
        /// Number of scores.
        scores: usize,
    },
    /// A per-query hit count is negative.
    NegativeLimit {
        /// Query position.
        query: usize,
        /// Raw hit count.
        limit: i64,
    },
    /// Per-query hit counts do not add up to the number of ids.
    MisalignedLimits {
        /// Sum of the hit counts, `None` when it overflows.
        limits_sum: Option<i64>,
        /// Number of ids.
        ids: usize,
    },
    /// A field column carries no or unsupported data.
    UnsupportedFieldData {
        /// Field name.
        field: String,
        /// Kind of payload found.
        payload: &'static str,
    },
    /// A vector column declares a non-positive dimension.
    InvalidVectorDimension {
        /// Field name.
        field: String,
        /// Raw dimension.
        dim: i64,
    },
}

impl DecodeError {
    fn error_code() -> ErrorCode {
        ErrorCode::new("vector", "vdb_invalid_response")
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownIndexState { value } => write!(formatter, "unknown index state {value}"),
            Self::MissingSearchResults => formatter.write_str("missing search results"),
            Self::MisalignedHits { ids, scores } => {
                write!(formatter, "search returned {ids} ids but {scores} scores")
            },
            Self::NegativeLimit { query, limit } => {
                write!(formatter, "negative hit count {limit} for query {query}")
            },
            Self::MisalignedLimits {
                limits_sum: Some(sum),
                ids,
            } => write!(formatter, "hit counts sum to {sum} but search returned {ids} ids"),
            Self::MisalignedLimits {
                limits_sum: None,
                ids,
            } => write!(formatter, "hit counts overflow for {ids} returned ids"),
            Self::UnsupportedFieldData { field, payload } => {
                write!(formatter, "unsupported {payload} data for field {field}")
            },
            Self::InvalidVectorDimension { field, dim } => {
                write!(formatter, "invalid vector dimension {dim} for field {field}")
            },
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for ErrorEnvelope {
    fn from(error: DecodeError) -> Self {
        let message = error.to_string();
        let envelope =
            Self::unexpected(DecodeError::error_code(), message, ErrorClass::NonRetriable);

        match error {
            DecodeError::UnknownIndexState { value } => envelope
                .with_metadata("field", "state")
                .with_metadata("value", value.to_string()),
            DecodeError::MissingSearchResults => envelope.with_metadata("field", "results"),
            DecodeError::MisalignedHits { ids, scores } => envelope
                .with_metadata("field", "ids")
                .with_metadata("ids", ids.to_string())
                .with_metadata("scores", scores.to_string()),
            DecodeError::NegativeLimit { query, limit } => envelope
                .with_metadata("field", "topks")
                .with_metadata("query", query.to_string())
                .with_metadata("value", limit.to_string()),
            DecodeError::MisalignedLimits { limits_sum, ids } => {
                let envelope = envelope
                    .with_metadata("field", "topks")
                    .with_metadata("ids", ids.to_string());
                match limits_sum {
                    Some(sum) => envelope.with_metadata("limits_sum", sum.to_string()),
                    None => envelope,
                }
            },
            DecodeError::UnsupportedFieldData { field, payload } => envelope
                .with_metadata("field", field)
                .with_metadata("payload", payload),
            DecodeError::InvalidVectorDimension { field, dim } => envelope
                .with_metadata("field", field)
                .with_metadata("value", dim.to_string()),
        }
    }
}

/// Map a wire index state through the exhaustive state table.
pub fn decode_index_state(value: i32) -> std::result::Result<IndexState, DecodeError> {
    let state = WireIndexState::try_from(value)
        .map_err(|_| DecodeError::UnknownIndexState { value })?;
    Ok(match state {
        WireIndexState::IndexStateNone => IndexState::None,
        WireIndexState::Unissued => IndexState::Unissued,
        WireIndexState::InProgress => IndexState::InProgress,
        WireIndexState::Finished => IndexState::Finished,
        WireIndexState::Failed => IndexState::Failed,
        WireIndexState::Retry => IndexState::Retry,
    })
}

/// Check a bare status reply (create / drop index).
pub fn decode_status(status: &Status, ctx: &MilvusErrorContext) -> Result<()> {
    ensure_status_ok(Some(status), ctx)
}

/// Decode a write reply.
///
/// Partial row failures are not an error; they are reported through the
/// outcome's success and error index lists.
pub fn decode_mutation_result(
    response: MutationResult,
    ctx: &MilvusErrorContext,
) -> Result<MutationOutcome> {
    ensure_status_ok(response.status.as_ref(), ctx)?;

    Ok(MutationOutcome::builder()
        .acknowledged(response.acknowledged)
        .counts(response.insert_cnt, response.delete_cnt, response.upsert_cnt)
        .row_indexes(response.succ_index, response.err_index)
        .timestamp(HybridTimestamp::from_raw(response.timestamp))
        .ids(decode_ids(response.ids))
        .build())
}

/// Decode an index build progress reply; counts are copied unchanged.
pub fn decode_index_build_progress(
    response: &GetIndexBuildProgressResponse,
    ctx: &MilvusErrorContext,
) -> Result<IndexBuildProgress> {
    ensure_status_ok(response.status.as_ref(), ctx)?;
    Ok(IndexBuildProgress::new(
        response.indexed_rows,
        response.total_rows,
    ))
}

/// Decode an index state reply.
pub fn decode_index_state_response(
    response: GetIndexStateResponse,
    ctx: &MilvusErrorContext,
) -> Result<IndexStateReport> {
    ensure_status_ok(response.status.as_ref(), ctx)?;
    let state = decode_index_state(response.state).map_err(|error| annotated(error, ctx))?;
    Ok(IndexStateReport {
        state,
        fail_reason: non_empty(response.fail_reason),
    })
}

/// Decode a describe-index reply into one entry per index.
pub fn decode_describe_index(
    response: DescribeIndexResponse,
    ctx: &MilvusErrorContext,
) -> Result<Vec<IndexInfo>> {
    ensure_status_ok(response.status.as_ref(), ctx)?;

    response
        .index_descriptions
        .into_iter()
        .map(|description| {
            let state =
                decode_index_state(description.state).map_err(|error| annotated(error, ctx))?;
            Ok(IndexInfo {
                field_name: description.field_name,
                index_name: description.index_name,
                index_id: description.index_id,
                params: key_value_map(description.params),
                indexed_rows: description.indexed_rows,
                total_rows: description.total_rows,
                pending_index_rows: description.pending_index_rows,
                state,
                fail_reason: non_empty(description.index_state_fail_reason),
            })
        })
        .collect()
}

/// Decode a search reply.
pub fn decode_search_results(
    response: WireSearchResults,
    ctx: &MilvusErrorContext,
) -> Result<SearchResults> {
    ensure_status_ok(response.status.as_ref(), ctx)?;
    let data = response
        .results
        .ok_or_else(|| annotated(DecodeError::MissingSearchResults, ctx))?;

    let ids = decode_ids(data.ids);
    if ids.len() != data.scores.len() {
        return Err(annotated(
            DecodeError::MisalignedHits {
                ids: ids.len(),
                scores: data.scores.len(),
            },
            ctx,
        ));
    }
    check_limits(&data.topks, ids.len()).map_err(|error| annotated(error, ctx))?;

    let mut fields = BTreeMap::new();
    for field in data.fields_data {
        let (name, column) = decode_field_column(field).map_err(|error| annotated(error, ctx))?;
        fields.insert(name, column);
    }

    Ok(SearchResults {
        collection: response.collection_name,
        num_queries: data.num_queries,
        top_k: data.top_k,
        ids,
        scores: data.scores,
        limits: data.topks,
        fields,
    })
}

/// Per-query hit counts must be non-negative and cover every returned id.
fn check_limits(limits: &[i64], ids: usize) -> std::result::Result<(), DecodeError> {
    let mut total: i64 = 0;
    for (query, &limit) in limits.iter().enumerate() {
        if limit < 0 {
            return Err(DecodeError::NegativeLimit { query, limit });
        }
        total = total
            .checked_add(limit)
            .ok_or(DecodeError::MisalignedLimits {
                limits_sum: None,
                ids,
            })?;
    }
    if usize::try_from(total).ok() != Some(ids) {
        return Err(DecodeError::MisalignedLimits {
            limits_sum: Some(total),
            ids,
        });
    }
    Ok(())
}

/// Decode one returned column.
pub fn decode_field_column(
    field: FieldData,
) -> std::result::Result<(String, FieldColumn), DecodeError> {
    let name = field.field_name;
    let column = match field.field {
        Some(field_data::Field::Scalars(scalars)) => match scalars.data {
            Some(scalar_field::Data::BoolData(array)) => FieldColumn::Bool(array.data),
            Some(scalar_field::Data::IntData(array)) => FieldColumn::Int(array.data),
            Some(scalar_field::Data::LongData(array)) => FieldColumn::Long(array.data),
            Some(scalar_field::Data::FloatData(array)) => FieldColumn::Float(array.data),
            Some(scalar_field::Data::DoubleData(array)) => FieldColumn::Double(array.data),
            Some(scalar_field::Data::StringData(array)) => FieldColumn::String(array.data),
            Some(scalar_field::Data::BytesData(_)) => {
                return Err(DecodeError::UnsupportedFieldData {
                    field: name,
                    payload: "bytes",
                });
            },
            None => {
                return Err(DecodeError::UnsupportedFieldData {
                    field: name,
                    payload: "empty scalar",
                });
            },
        },
        Some(field_data::Field::Vectors(vectors)) => {
            let Some(dim) = usize::try_from(vectors.dim).ok().filter(|dim| *dim > 0) else {
                return Err(DecodeError::InvalidVectorDimension {
                    field: name,
                    dim: vectors.dim,
                });
            };
            match vectors.data {
                Some(vector_field::Data::FloatVector(array)) => FieldColumn::FloatVector {
                    dim,
                    values: array.data,
                },
                Some(vector_field::Data::BinaryVector(values)) => {
                    FieldColumn::BinaryVector { dim, values }
                },
                None => {
                    return Err(DecodeError::UnsupportedFieldData {
                        field: name,
                        payload: "empty vector",
                    });
                },
            }
        },
        None => {
            return Err(DecodeError::UnsupportedFieldData {
                field: name,
                payload: "missing",
            });
        },
    };
    Ok((name, column))
}

fn annotated(error: DecodeError, ctx: &MilvusErrorContext) -> ErrorEnvelope {
    ctx.annotate(error.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use milvus_client_domain::{Id, IdentifierUnion};
    use milvus_client_proto::common::{ErrorCode as WireErrorCode, KeyValuePair};
    use milvus_client_proto::milvus::IndexDescription;
    use milvus_client_proto::schema::{
        FloatArray, Ids, LongArray, ScalarField, SearchResultData, StringArray, VectorField,
        ids::IdField,
    };
    use std::time::{Duration, UNIX_EPOCH};

    fn ctx() -> MilvusErrorContext {
        MilvusErrorContext::new("decode", "docs")
    }

    #[test]
    fn index_state_table_is_exhaustive_and_strict() {
        let table = [
            (0, IndexState::None),
            (1, IndexState::Unissued),
            (2, IndexState::InProgress),
            (3, IndexState::Finished),
            (4, IndexState::Failed),
            (5, IndexState::Retry),
        ];
        for (raw, state) in table {
            assert_eq!(decode_index_state(raw), Ok(state));
        }
        assert_eq!(
            decode_index_state(6),
            Err(DecodeError::UnknownIndexState { value: 6 })
        );
        assert_eq!(
            decode_index_state(-1),
            Err(DecodeError::UnknownIndexState { value: -1 })
        );
    }

    #[test]
    fn unknown_state_surfaces_as_invalid_response() {
        let response = GetIndexStateResponse {
            status: None,
            state: 99,
            fail_reason: String::new(),
        };
        let error = decode_index_state_response(response, &ctx()).expect_err("unknown state");
        assert_eq!(error.code, ErrorCode::new("vector", "vdb_invalid_response"));
        assert_eq!(error.metadata_value("value"), Some("99"));
        assert_eq!(error.metadata_value("collection"), Some("docs"));
        assert!(!error.class.is_retriable());
    }

    #[test]
    fn mutation_with_int_ids_decodes() -> Result<()> {
        let physical_ms = 1_700_000_000_123_u64;
        let response = MutationResult {
            status: None,
            ids: Some(Ids {
                id_field: Some(IdField::IntId(LongArray {
                    data: vec![101, 102],
                })),
            }),
            succ_index: vec![0],
            err_index: vec![1],
            acknowledged: true,
            insert_cnt: 2,
            delete_cnt: 0,
            upsert_cnt: 0,
            timestamp: (physical_ms << 18) | 3,
        };

        let outcome = decode_mutation_result(response, &ctx())?;
        assert_eq!(outcome.ids(), &IdentifierUnion::IntIds(vec![101, 102]));
        assert_eq!(outcome.ids().as_string_ids(), None);
        assert_eq!(outcome.insert_count(), 2);
        assert_eq!(outcome.success_index(), &[0]);
        assert_eq!(outcome.error_index(), &[1]);
        assert!(outcome.has_row_errors());
        assert!(outcome.acknowledged());
        assert_eq!(
            outcome.timestamp(),
            UNIX_EPOCH + Duration::from_millis(physical_ms)
        );
        Ok(())
    }

    #[test]
    fn failed_status_wins_over_payload() {
        let response = MutationResult {
            status: Some(Status {
                error_code: WireErrorCode::CollectionNotExists as i32,
                reason: "collection not found[collection=docs]".to_owned(),
                ..Status::default()
            }),
            insert_cnt: 5,
            ..MutationResult::default()
        };
        let error = decode_mutation_result(response, &ctx()).expect_err("status");
        assert_eq!(
            error.code,
            ErrorCode::new("vector", "vdb_collection_not_found")
        );
    }

    #[test]
    fn progress_counts_are_copied() -> Result<()> {
        let done = decode_index_build_progress(
            &GetIndexBuildProgressResponse {
                status: None,
                indexed_rows: 500,
                total_rows: 500,
            },
            &ctx(),
        )?;
        assert!(done.is_complete());

        let pending = decode_index_build_progress(
            &GetIndexBuildProgressResponse {
                status: None,
                indexed_rows: 499,
                total_rows: 500,
            },
            &ctx(),
        )?;
        assert!(!pending.is_complete());
        assert_eq!(pending.indexed_rows(), 499);
        Ok(())
    }

    #[test]
    fn describe_index_maps_params_and_reason() -> Result<()> {
        let response = DescribeIndexResponse {
            status: None,
            index_descriptions: vec![IndexDescription {
                index_name: "embedding_idx".to_owned(),
                index_id: 7,
                params: vec![
                    KeyValuePair {
                        key: "index_type".to_owned(),
                        value: "HNSW".to_owned(),
                    },
                    KeyValuePair {
                        key: "metric_type".to_owned(),
                        value: "L2".to_owned(),
                    },
                ],
                field_name: "embedding".to_owned(),
                indexed_rows: 10,
                total_rows: 20,
                state: WireIndexState::Failed as i32,
                index_state_fail_reason: "out of memory".to_owned(),
                pending_index_rows: 10,
            }],
        };

        let infos = decode_describe_index(response, &ctx())?;
        let info = infos.first().expect("one index");
        assert_eq!(infos.len(), 1);
        assert_eq!(info.index_name, "embedding_idx");
        assert_eq!(info.params.get("index_type").map(String::as_str), Some("HNSW"));
        assert_eq!(info.state, IndexState::Failed);
        assert_eq!(info.fail_reason.as_deref(), Some("out of memory"));
        assert!(!info.progress().is_complete());
        Ok(())
    }

    fn search_reply(scores: Vec<f32>) -> WireSearchResults {
        WireSearchResults {
            status: None,
            results: Some(SearchResultData {
                num_queries: 2,
                top_k: 2,
                fields_data: vec![
                    FieldData {
                        field_name: "title".to_owned(),
                        field: Some(field_data::Field::Scalars(ScalarField {
                            data: Some(scalar_field::Data::StringData(StringArray {
                                data: vec!["a".into(), "b".into(), "c".into()],
                            })),
                        })),
                        ..FieldData::default()
                    },
                    FieldData {
                        field_name: "embedding".to_owned(),
                        field: Some(field_data::Field::Vectors(VectorField {
                            dim: 2,
                            data: Some(vector_field::Data::FloatVector(FloatArray {
                                data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
                            })),
                        })),
                        ..FieldData::default()
                    },
                ],
                scores,
                ids: Some(Ids {
                    id_field: Some(IdField::StrId(StringArray {
                        data: vec!["x".into(), "y".into(), "z".into()],
                    })),
                }),
                topks: vec![2, 1],
                output_fields: vec!["title".to_owned(), "embedding".to_owned()],
            }),
            collection_name: "docs".to_owned(),
        }
    }

    #[test]
    fn search_results_split_per_query() -> Result<()> {
        let results = decode_search_results(search_reply(vec![0.9, 0.8, 0.7]), &ctx())?;

        assert_eq!(results.collection, "docs");
        assert_eq!(results.limits, vec![2, 1]);
        let second = results.hits(1).expect("second query");
        assert_eq!(second.len(), 1);
        assert_eq!(second.first().map(|hit| &hit.id), Some(&Id::Str("z".into())));
        assert_eq!(
            results.field("embedding").map(FieldColumn::len),
            Some(3)
        );
        Ok(())
    }

    #[test]
    fn misaligned_scores_are_rejected() {
        let error =
            decode_search_results(search_reply(vec![0.9]), &ctx()).expect_err("misaligned");
        assert_eq!(error.code, ErrorCode::new("vector", "vdb_invalid_response"));
        assert_eq!(error.metadata_value("scores"), Some("1"));
    }

    fn with_limits(topks: Vec<i64>) -> WireSearchResults {
        let mut reply = search_reply(vec![0.9, 0.8, 0.7]);
        if let Some(data) = reply.results.as_mut() {
            data.topks = topks;
        }
        reply
    }

    #[test]
    fn limits_not_covering_every_id_are_rejected() {
        let error = decode_search_results(with_limits(vec![1, 1]), &ctx()).expect_err("short");
        assert_eq!(error.code, ErrorCode::new("vector", "vdb_invalid_response"));
        assert_eq!(error.metadata_value("field"), Some("topks"));
        assert_eq!(error.metadata_value("limits_sum"), Some("2"));
        assert_eq!(error.metadata_value("ids"), Some("3"));

        let error = decode_search_results(with_limits(vec![2, 2]), &ctx()).expect_err("long");
        assert_eq!(error.metadata_value("limits_sum"), Some("4"));
    }

    #[test]
    fn negative_limits_are_rejected() {
        let error = decode_search_results(with_limits(vec![4, -1]), &ctx()).expect_err("negative");
        assert_eq!(error.metadata_value("query"), Some("1"));
        assert_eq!(error.metadata_value("value"), Some("-1"));
    }

    #[test]
    fn huge_limits_are_rejected() {
        assert_eq!(
            check_limits(&[i64::MAX], 3),
            Err(DecodeError::MisalignedLimits {
                limits_sum: Some(i64::MAX),
                ids: 3,
            })
        );
        assert_eq!(
            check_limits(&[i64::MAX, 1], 3),
            Err(DecodeError::MisalignedLimits {
                limits_sum: None,
                ids: 3,
            })
        );

        let error =
            decode_search_results(with_limits(vec![i64::MAX]), &ctx()).expect_err("huge");
        assert_eq!(error.metadata_value("field"), Some("topks"));
    }

    #[test]
    fn missing_results_are_rejected() {
        let reply = WireSearchResults {
            results: None,
            ..search_reply(Vec::new())
        };
        let error = decode_search_results(reply, &ctx()).expect_err("no results");
        assert_eq!(error.metadata_value("field"), Some("results"));
    }

    #[test]
    fn unsupported_columns_are_rejected() {
        let field = FieldData {
            field_name: "blob".to_owned(),
            field: Some(field_data::Field::Scalars(ScalarField {
                data: Some(scalar_field::Data::BytesData(Default::default())),
            })),
            ..FieldData::default()
        };
        assert_eq!(
            decode_field_column(field),
            Err(DecodeError::UnsupportedFieldData {
                field: "blob".to_owned(),
                payload: "bytes",
            })
        );

        let field = FieldData {
            field_name: "vec".to_owned(),
            field: Some(field_data::Field::Vectors(VectorField { dim: 0, data: None })),
            ..FieldData::default()
        };
        assert_eq!(
            decode_field_column(field),
            Err(DecodeError::InvalidVectorDimension {
                field: "vec".to_owned(),
                dim: 0,
            })
        );
    }
}
