//! Index lifecycle values: targets, creation parameters, state and progress.

use crate::search::MetricType;
use milvus_client_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Build state of an index as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexState {
    /// No state recorded.
    None,
    /// Build not yet scheduled.
    Unissued,
    /// Build running.
    InProgress,
    /// Build finished successfully.
    Finished,
    /// Build failed.
    Failed,
    /// Build is being retried.
    Retry,
}

impl IndexState {
    /// Returns true for states the build never leaves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Unissued => "unissued",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Retry => "retry",
        }
    }
}

impl fmt::Display for IndexState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Index algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexType {
    /// Sentinel for "not chosen"; rejected when creating an index.
    Invalid,
    /// Brute-force scan.
    Flat,
    /// Inverted file with raw vectors.
    IvfFlat,
    /// Inverted file with product quantization.
    IvfPq,
    /// Inverted file with scalar quantization.
    IvfSq8,
    /// Hierarchical navigable small world graph.
    Hnsw,
    /// Refined HNSW with raw vectors.
    RhnswFlat,
    /// Refined HNSW with product quantization.
    RhnswPq,
    /// Refined HNSW with scalar quantization.
    RhnswSq,
    /// Random projection trees.
    Annoy,
    /// Brute-force scan over binary vectors.
    BinFlat,
    /// Inverted file over binary vectors.
    BinIvfFlat,
    /// Let the service pick.
    #[serde(rename = "AUTOINDEX")]
    AutoIndex,
}

impl IndexType {
    /// Name sent in `extra_params`.
    #[must_use]
    pub const fn as_wire_str(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Flat => "FLAT",
            Self::IvfFlat => "IVF_FLAT",
            Self::IvfPq => "IVF_PQ",
            Self::IvfSq8 => "IVF_SQ8",
            Self::Hnsw => "HNSW",
            Self::RhnswFlat => "RHNSW_FLAT",
            Self::RhnswPq => "RHNSW_PQ",
            Self::RhnswSq => "RHNSW_SQ",
            Self::Annoy => "ANNOY",
            Self::BinFlat => "BIN_FLAT",
            Self::BinIvfFlat => "BIN_IVF_FLAT",
            Self::AutoIndex => "AUTOINDEX",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_wire_str())
    }
}

/// Validation failures for index requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexParamError {
    /// Collection name is blank.
    BlankCollectionName,
    /// Field name is blank.
    BlankFieldName,
    /// An explicit index name is blank.
    BlankIndexName,
    /// Index type is the invalid sentinel.
    InvalidIndexType,
    /// Metric type is the invalid sentinel.
    InvalidMetricType,
    /// An extra parameter key is blank.
    BlankParameterKey,
}

impl IndexParamError {
    fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::BlankCollectionName => "invalid_collection_name",
            Self::BlankFieldName => "invalid_field_name",
            Self::BlankIndexName => "invalid_index_name",
            Self::InvalidIndexType => "invalid_index_type",
            Self::InvalidMetricType => "invalid_metric_type",
            Self::BlankParameterKey => "invalid_parameter_key",
        };
        ErrorCode::new("index", code)
    }
}

impl fmt::Display for IndexParamError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::BlankCollectionName => "collectionName must be non-empty",
            Self::BlankFieldName => "fieldName must be non-empty",
            Self::BlankIndexName => "indexName must be non-empty when set",
            Self::InvalidIndexType => "index type is invalid",
            Self::InvalidMetricType => "metric type is invalid",
            Self::BlankParameterKey => "parameter keys must be non-empty",
        };
        formatter.write_str(message)
    }
}

impl std::error::Error for IndexParamError {}

impl From<IndexParamError> for ErrorEnvelope {
    fn from(error: IndexParamError) -> Self {
        Self::expected(error.error_code(), error.to_string())
    }
}

/// Collection field (and optionally a named index on it) addressed by an index call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexTarget {
    collection: String,
    field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_name: Option<String>,
}

impl IndexTarget {
    /// Address the default index of `field` in `collection`.
    pub fn new(
        collection: impl Into<String>,
        field: impl Into<String>,
    ) -> Result<Self, IndexParamError> {
        let collection = collection.into();
        let field = field.into();
        if collection.trim().is_empty() {
            return Err(IndexParamError::BlankCollectionName);
        }
        if field.trim().is_empty() {
            return Err(IndexParamError::BlankFieldName);
        }
        Ok(Self {
            collection,
            field,
            index_name: None,
        })
    }

    /// Address a named index instead of the field's default one.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Result<Self, IndexParamError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IndexParamError::BlankIndexName);
        }
        self.index_name = Some(name);
        Ok(self)
    }

    /// Collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Explicit index name, if any.
    #[must_use]
    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    /// Index name as sent on the wire; empty selects the field's default index.
    #[must_use]
    pub fn wire_index_name(&self) -> &str {
        self.index_name.as_deref().unwrap_or_default()
    }
}

/// Validated parameters for creating an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexParams {
    target: IndexTarget,
    index_type: Option<IndexType>,
    metric_type: Option<MetricType>,
    params: BTreeMap<String, String>,
}

impl CreateIndexParams {
    /// Start a builder for `target`.
    #[must_use]
    pub fn builder(target: IndexTarget) -> CreateIndexParamsBuilder {
        CreateIndexParamsBuilder {
            target,
            index_type: None,
            metric_type: None,
            params: BTreeMap::new(),
            error: None,
        }
    }

    /// Addressed field and index.
    #[must_use]
    pub const fn target(&self) -> &IndexTarget {
        &self.target
    }

    /// Requested index type; `None` lets the service decide.
    #[must_use]
    pub const fn index_type(&self) -> Option<IndexType> {
        self.index_type
    }

    /// Requested metric; `None` lets the service decide.
    #[must_use]
    pub const fn metric_type(&self) -> Option<MetricType> {
        self.metric_type
    }

    /// Algorithm-specific build parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

/// Builder for [`CreateIndexParams`].
#[derive(Debug, Clone)]
pub struct CreateIndexParamsBuilder {
    target: IndexTarget,
    index_type: Option<IndexType>,
    metric_type: Option<MetricType>,
    params: BTreeMap<String, String>,
    error: Option<IndexParamError>,
}

impl CreateIndexParamsBuilder {
    /// Index algorithm.
    #[must_use]
    pub const fn index_type(mut self, index_type: IndexType) -> Self {
        self.index_type = Some(index_type);
        self
    }

    /// Distance metric.
    #[must_use]
    pub const fn metric_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = Some(metric_type);
        self
    }

    /// Build parameter such as `nlist` or `M`.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if key.trim().is_empty() {
            if self.error.is_none() {
                self.error = Some(IndexParamError::BlankParameterKey);
            }
            return self;
        }
        self.params.insert(key, value.into());
        self
    }

    /// Validate and freeze the parameters.
    pub fn build(self) -> Result<CreateIndexParams, IndexParamError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.index_type == Some(IndexType::Invalid) {
            return Err(IndexParamError::InvalidIndexType);
        }
        if self.metric_type == Some(MetricType::Invalid) {
            return Err(IndexParamError::InvalidMetricType);
        }
        Ok(CreateIndexParams {
            target: self.target,
            index_type: self.index_type,
            metric_type: self.metric_type,
            params: self.params,
        })
    }
}

/// Rows indexed so far against the rows to index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexBuildProgress {
    indexed_rows: i64,
    total_rows: i64,
}

impl IndexBuildProgress {
    /// Progress snapshot from raw counts.
    #[must_use]
    pub const fn new(indexed_rows: i64, total_rows: i64) -> Self {
        Self {
            indexed_rows,
            total_rows,
        }
    }

    /// Rows indexed so far.
    #[must_use]
    pub const fn indexed_rows(&self) -> i64 {
        self.indexed_rows
    }

    /// Rows to index.
    #[must_use]
    pub const fn total_rows(&self) -> i64 {
        self.total_rows
    }

    /// True once every row is indexed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total_rows >= 0 && self.indexed_rows == self.total_rows
    }
}

impl fmt::Display for IndexBuildProgress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.indexed_rows, self.total_rows)
    }
}

/// State of an index together with the failure reason, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStateReport {
    /// Current build state.
    pub state: IndexState,
    /// Service-provided failure reason; `None` when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
}

/// One index as described by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    /// Indexed field.
    pub field_name: String,
    /// Index name.
    pub index_name: String,
    /// Service-assigned index id.
    pub index_id: i64,
    /// Build parameters, including `index_type` and `metric_type`.
    pub params: BTreeMap<String, String>,
    /// Rows indexed so far.
    pub indexed_rows: i64,
    /// Rows to index.
    pub total_rows: i64,
    /// Rows waiting to be indexed.
    pub pending_index_rows: i64,
    /// Build state.
    pub state: IndexState,
    /// Failure reason when the build failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
}

impl IndexInfo {
    /// Build progress of this index.
    #[must_use]
    pub const fn progress(&self) -> IndexBuildProgress {
        IndexBuildProgress::new(self.indexed_rows, self.total_rows)
    }
}
