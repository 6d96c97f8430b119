//! Search parameters: validated, immutable description of one vector search.

use crate::consistency::{ConsistencyLevel, GUARANTEE_EVENTUALLY_TS};
use milvus_client_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Database used when none is named.
pub const DEFAULT_DATABASE_NAME: &str = "default";

/// Smallest accepted `topK`.
pub const MIN_TOP_K: i64 = 1;

/// Largest accepted `topK`.
pub const MAX_TOP_K: i64 = 16_384;

/// Round-decimal value meaning "do not round scores".
pub const DEFAULT_ROUND_DECIMAL: i64 = -1;

/// Distance metric used to rank hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricType {
    /// Sentinel for "not chosen"; never valid in a request.
    #[default]
    Invalid,
    /// Euclidean distance.
    L2,
    /// Inner product.
    Ip,
    /// Cosine similarity.
    Cosine,
    /// Jaccard distance (binary vectors).
    Jaccard,
    /// Tanimoto distance (binary vectors).
    Tanimoto,
    /// Hamming distance (binary vectors).
    Hamming,
    /// Superstructure relation (binary vectors).
    Superstructure,
    /// Substructure relation (binary vectors).
    Substructure,
}

impl MetricType {
    const ALL: [Self; 9] = [
        Self::Invalid,
        Self::L2,
        Self::Ip,
        Self::Cosine,
        Self::Jaccard,
        Self::Tanimoto,
        Self::Hamming,
        Self::Superstructure,
        Self::Substructure,
    ];

    /// Uppercase name sent on the wire.
    #[must_use]
    pub const fn as_wire_str(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::L2 => "L2",
            Self::Ip => "IP",
            Self::Cosine => "COSINE",
            Self::Jaccard => "JACCARD",
            Self::Tanimoto => "TANIMOTO",
            Self::Hamming => "HAMMING",
            Self::Superstructure => "SUPERSTRUCTURE",
            Self::Substructure => "SUBSTRUCTURE",
        }
    }

    /// Parse a wire name, ignoring ASCII case.
    #[must_use]
    pub fn from_wire_str(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_wire_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_wire_str())
    }
}

/// Query vectors of a search: dense floats or packed bits, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchVectors {
    /// Dense float vectors, one `Vec<f32>` per query.
    Float(Vec<Vec<f32>>),
    /// Packed binary vectors, one byte array per query.
    Binary(Vec<Vec<u8>>),
}

impl SearchVectors {
    /// Number of query vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float(vectors) => vectors.len(),
            Self::Binary(vectors) => vectors.len(),
        }
    }

    /// Returns true when there is no query vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-vector element count of each query (floats or bytes).
    fn widths(&self) -> Vec<usize> {
        match self {
            Self::Float(vectors) => vectors.iter().map(Vec::len).collect(),
            Self::Binary(vectors) => vectors.iter().map(Vec::len).collect(),
        }
    }
}

/// Validation failures for search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchParamError {
    /// Collection name is blank.
    BlankCollectionName,
    /// Vector field name is blank.
    BlankVectorFieldName,
    /// Database name is blank.
    BlankDatabaseName,
    /// No output field was requested.
    EmptyOutputFields,
    /// An output field name is blank.
    BlankOutputField,
    /// A partition name is blank.
    BlankPartitionName,
    /// The filter expression is blank.
    BlankFilterExpr,
    /// An extra parameter key is blank.
    BlankParameterKey,
    /// `topK` is outside `[1, 16384]`.
    TopKOutOfRange {
        /// Rejected value.
        value: i64,
    },
    /// The guarantee timestamp override is negative.
    NegativeGuaranteeTimestamp {
        /// Rejected value.
        value: i64,
    },
    /// The travel timestamp is negative.
    NegativeTravelTimestamp {
        /// Rejected value.
        value: i64,
    },
    /// Metric type is still the invalid sentinel.
    InvalidMetricType,
    /// No query vector was supplied.
    MissingVectors,
    /// A query vector has no elements.
    EmptyVector {
        /// Position of the vector in the query set.
        index: usize,
    },
    /// Query vectors do not share one dimension.
    RaggedVectors {
        /// Position of the first mismatching vector.
        index: usize,
        /// Width of the first vector.
        expected: usize,
        /// Width of the mismatching vector.
        actual: usize,
    },
}

impl SearchParamError {
    fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::BlankCollectionName => "invalid_collection_name",
            Self::BlankVectorFieldName => "invalid_vector_field",
            Self::BlankDatabaseName => "invalid_database_name",
            Self::EmptyOutputFields => "missing_output_fields",
            Self::BlankOutputField => "invalid_output_field",
            Self::BlankPartitionName => "invalid_partition_name",
            Self::BlankFilterExpr => "invalid_filter_expr",
            Self::BlankParameterKey => "invalid_parameter_key",
            Self::TopKOutOfRange { .. } => "invalid_top_k",
            Self::NegativeGuaranteeTimestamp { .. } => "invalid_guarantee_timestamp",
            Self::NegativeTravelTimestamp { .. } => "invalid_travel_timestamp",
            Self::InvalidMetricType => "invalid_metric_type",
            Self::MissingVectors => "missing_vectors",
            Self::EmptyVector { .. } | Self::RaggedVectors { .. } => "invalid_vectors",
        };
        ErrorCode::new("search", code)
    }
}

impl fmt::Display for SearchParamError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankCollectionName => formatter.write_str("collectionName must be non-empty"),
            Self::BlankVectorFieldName => formatter.write_str("vectorFieldName must be non-empty"),
            Self::BlankDatabaseName => formatter.write_str("dbName must be non-empty"),
            Self::EmptyOutputFields => formatter.write_str("outputFields must be non-empty"),
            Self::BlankOutputField => formatter.write_str("output field names must be non-empty"),
            Self::BlankPartitionName => formatter.write_str("partition names must be non-empty"),
            Self::BlankFilterExpr => formatter.write_str("expr must be non-empty when set"),
            Self::BlankParameterKey => formatter.write_str("parameter keys must be non-empty"),
            Self::TopKOutOfRange { value } => write!(
                formatter,
                "topK must be within [{MIN_TOP_K}, {MAX_TOP_K}], got {value}"
            ),
            Self::NegativeGuaranteeTimestamp { value } => {
                write!(formatter, "guaranteeTimestamp must be >= 0, got {value}")
            },
            Self::NegativeTravelTimestamp { value } => {
                write!(formatter, "travelTimestamp must be >= 0, got {value}")
            },
            Self::InvalidMetricType => formatter.write_str("metric type is invalid"),
            Self::MissingVectors => formatter.write_str("search vectors must be non-empty"),
            Self::EmptyVector { index } => {
                write!(formatter, "search vector {index} has no elements")
            },
            Self::RaggedVectors {
                index,
                expected,
                actual,
            } => write!(
                formatter,
                "search vector {index} has width {actual}, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for SearchParamError {}

impl From<SearchParamError> for ErrorEnvelope {
    fn from(error: SearchParamError) -> Self {
        let mut envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            SearchParamError::TopKOutOfRange { value }
            | SearchParamError::NegativeGuaranteeTimestamp { value }
            | SearchParamError::NegativeTravelTimestamp { value } => {
                envelope = envelope.with_metadata("value", value.to_string());
            },
            SearchParamError::EmptyVector { index } => {
                envelope = envelope.with_metadata("index", index.to_string());
            },
            SearchParamError::RaggedVectors {
                index,
                expected,
                actual,
            } => {
                envelope = envelope
                    .with_metadata("index", index.to_string())
                    .with_metadata("expected", expected.to_string())
                    .with_metadata("actual", actual.to_string());
            },
            SearchParamError::BlankCollectionName
            | SearchParamError::BlankVectorFieldName
            | SearchParamError::BlankDatabaseName
            | SearchParamError::EmptyOutputFields
            | SearchParamError::BlankOutputField
            | SearchParamError::BlankPartitionName
            | SearchParamError::BlankFilterExpr
            | SearchParamError::BlankParameterKey
            | SearchParamError::InvalidMetricType
            | SearchParamError::MissingVectors => {},
        }

        envelope
    }
}

/// Validated description of one search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    database: String,
    collection: String,
    vector_field: String,
    top_k: u32,
    metric_type: MetricType,
    consistency_level: Option<ConsistencyLevel>,
    guarantee_timestamp: u64,
    travel_timestamp: u64,
    round_decimal: i64,
    ignore_growing: bool,
    output_fields: Vec<String>,
    partition_names: Vec<String>,
    filter_expr: Option<String>,
    extra_params: BTreeMap<String, String>,
    vectors: SearchVectors,
}

impl SearchParameters {
    /// Start a builder from the required collection, vector field and output fields.
    pub fn builder<I, S>(
        collection: impl Into<String>,
        vector_field: impl Into<String>,
        output_fields: I,
    ) -> SearchParametersBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let builder = SearchParametersBuilder {
            database: DEFAULT_DATABASE_NAME.to_owned(),
            collection: collection.into(),
            vector_field: vector_field.into(),
            top_k: 0,
            metric_type: MetricType::Invalid,
            consistency_level: Some(ConsistencyLevel::Bounded),
            guarantee_timestamp: GUARANTEE_EVENTUALLY_TS,
            travel_timestamp: 0,
            round_decimal: DEFAULT_ROUND_DECIMAL,
            ignore_growing: false,
            output_fields: Vec::new(),
            partition_names: Vec::new(),
            filter_expr: None,
            extra_params: BTreeMap::new(),
            vectors: None,
            error: None,
        };
        output_fields
            .into_iter()
            .fold(builder, |builder, field| builder.add_output_field(field))
    }

    /// Database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Name of the vector field searched.
    #[must_use]
    pub fn vector_field(&self) -> &str {
        &self.vector_field
    }

    /// Hits requested per query, within `[1, 16384]`.
    #[must_use]
    pub const fn top_k(&self) -> u32 {
        self.top_k
    }

    /// Distance metric (never [`MetricType::Invalid`]).
    #[must_use]
    pub const fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// Requested consistency level; `None` means "use the explicit guarantee timestamp".
    #[must_use]
    pub const fn consistency_level(&self) -> Option<ConsistencyLevel> {
        self.consistency_level
    }

    /// Explicit guarantee timestamp override.
    #[must_use]
    pub const fn guarantee_timestamp(&self) -> u64 {
        self.guarantee_timestamp
    }

    /// Travel timestamp (0 reads the latest data).
    #[must_use]
    pub const fn travel_timestamp(&self) -> u64 {
        self.travel_timestamp
    }

    /// Decimal places scores are rounded to; -1 disables rounding.
    #[must_use]
    pub const fn round_decimal(&self) -> i64 {
        self.round_decimal
    }

    /// Whether growing segments are skipped.
    #[must_use]
    pub const fn ignore_growing(&self) -> bool {
        self.ignore_growing
    }

    /// Output field names, in insertion order.
    #[must_use]
    pub fn output_fields(&self) -> &[String] {
        &self.output_fields
    }

    /// Partition filter, in insertion order.
    #[must_use]
    pub fn partition_names(&self) -> &[String] {
        &self.partition_names
    }

    /// Boolean filter expression.
    #[must_use]
    pub fn filter_expr(&self) -> Option<&str> {
        self.filter_expr.as_deref()
    }

    /// Extra index-specific parameters, keyed uniquely.
    #[must_use]
    pub const fn extra_params(&self) -> &BTreeMap<String, String> {
        &self.extra_params
    }

    /// Query vectors.
    #[must_use]
    pub const fn vectors(&self) -> &SearchVectors {
        &self.vectors
    }

    /// Number of query vectors.
    #[must_use]
    pub fn nq(&self) -> usize {
        self.vectors.len()
    }
}

/// Builder for [`SearchParameters`].
///
/// Setters never fail; the first invalid input is remembered and reported by
/// [`SearchParametersBuilder::build`].
#[derive(Debug, Clone)]
pub struct SearchParametersBuilder {
    database: String,
    collection: String,
    vector_field: String,
    top_k: i64,
    metric_type: MetricType,
    consistency_level: Option<ConsistencyLevel>,
    guarantee_timestamp: u64,
    travel_timestamp: u64,
    round_decimal: i64,
    ignore_growing: bool,
    output_fields: Vec<String>,
    partition_names: Vec<String>,
    filter_expr: Option<String>,
    extra_params: BTreeMap<String, String>,
    vectors: Option<SearchVectors>,
    error: Option<SearchParamError>,
}

impl SearchParametersBuilder {
    /// Search dense float vectors; replaces any binary vectors.
    #[must_use]
    pub fn float_vectors(mut self, vectors: Vec<Vec<f32>>) -> Self {
        self.vectors = Some(SearchVectors::Float(vectors));
        self
    }

    /// Search packed binary vectors; replaces any float vectors.
    #[must_use]
    pub fn binary_vectors(mut self, vectors: Vec<Vec<u8>>) -> Self {
        self.vectors = Some(SearchVectors::Binary(vectors));
        self
    }

    /// Set the query vectors directly.
    #[must_use]
    pub fn vectors(mut self, vectors: SearchVectors) -> Self {
        self.vectors = Some(vectors);
        self
    }

    /// Hits requested per query.
    #[must_use]
    pub fn top_k(mut self, top_k: i64) -> Self {
        if !(MIN_TOP_K..=MAX_TOP_K).contains(&top_k) {
            return self.fail(SearchParamError::TopKOutOfRange { value: top_k });
        }
        self.top_k = top_k;
        self
    }

    /// Distance metric.
    #[must_use]
    pub const fn metric_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = metric_type;
        self
    }

    /// Consistency level used to derive the guarantee timestamp.
    #[must_use]
    pub const fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = Some(level);
        self
    }

    /// Send the explicit guarantee timestamp unchanged.
    #[must_use]
    pub const fn no_consistency_level(mut self) -> Self {
        self.consistency_level = None;
        self
    }

    /// Explicit guarantee timestamp, used when no level applies.
    #[must_use]
    pub fn guarantee_timestamp(mut self, timestamp: i64) -> Self {
        match u64::try_from(timestamp) {
            Ok(timestamp) => {
                self.guarantee_timestamp = timestamp;
                self
            },
            Err(_) => self.fail(SearchParamError::NegativeGuaranteeTimestamp { value: timestamp }),
        }
    }

    /// Travel timestamp for time-travel reads.
    #[must_use]
    pub fn travel_timestamp(mut self, timestamp: i64) -> Self {
        match u64::try_from(timestamp) {
            Ok(timestamp) => {
                self.travel_timestamp = timestamp;
                self
            },
            Err(_) => self.fail(SearchParamError::NegativeTravelTimestamp { value: timestamp }),
        }
    }

    /// Decimal places scores are rounded to (-1 disables rounding).
    #[must_use]
    pub const fn round_decimal(mut self, decimals: i64) -> Self {
        self.round_decimal = decimals;
        self
    }

    /// Skip growing segments.
    #[must_use]
    pub const fn ignore_growing(mut self, ignore: bool) -> Self {
        self.ignore_growing = ignore;
        self
    }

    /// Boolean filter expression; blank expressions are rejected.
    #[must_use]
    pub fn filter_expr(mut self, expr: impl Into<String>) -> Self {
        let expr = expr.into();
        if expr.trim().is_empty() {
            return self.fail(SearchParamError::BlankFilterExpr);
        }
        self.filter_expr = Some(expr);
        self
    }

    /// Add an output field unless already present.
    #[must_use]
    pub fn add_output_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if field.trim().is_empty() {
            return self.fail(SearchParamError::BlankOutputField);
        }
        if !self.output_fields.contains(&field) {
            self.output_fields.push(field);
        }
        self
    }

    /// Add a partition to search unless already present.
    #[must_use]
    pub fn add_partition_name(mut self, partition: impl Into<String>) -> Self {
        let partition = partition.into();
        if partition.trim().is_empty() {
            return self.fail(SearchParamError::BlankPartitionName);
        }
        if !self.partition_names.contains(&partition) {
            self.partition_names.push(partition);
        }
        self
    }

    /// Add several partitions, in order.
    #[must_use]
    pub fn partition_names<I, S>(self, partitions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        partitions
            .into_iter()
            .fold(self, |builder, partition| builder.add_partition_name(partition))
    }

    /// Extra index-specific parameter; a later value replaces an earlier one.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if key.trim().is_empty() {
            return self.fail(SearchParamError::BlankParameterKey);
        }
        self.extra_params.insert(key, value.into());
        self
    }

    /// Target database.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Validate and freeze the parameters.
    pub fn build(self) -> Result<SearchParameters, SearchParamError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.collection.trim().is_empty() {
            return Err(SearchParamError::BlankCollectionName);
        }
        if self.vector_field.trim().is_empty() {
            return Err(SearchParamError::BlankVectorFieldName);
        }
        if self.output_fields.is_empty() {
            return Err(SearchParamError::EmptyOutputFields);
        }
        let top_k = u32::try_from(self.top_k)
            .ok()
            .filter(|_| (MIN_TOP_K..=MAX_TOP_K).contains(&self.top_k))
            .ok_or(SearchParamError::TopKOutOfRange { value: self.top_k })?;
        if self.metric_type == MetricType::Invalid {
            return Err(SearchParamError::InvalidMetricType);
        }
        let vectors = self.vectors.ok_or(SearchParamError::MissingVectors)?;
        validate_vectors(&vectors)?;
        if self.database.trim().is_empty() {
            return Err(SearchParamError::BlankDatabaseName);
        }

        Ok(SearchParameters {
            database: self.database,
            collection: self.collection,
            vector_field: self.vector_field,
            top_k,
            metric_type: self.metric_type,
            consistency_level: self.consistency_level,
            guarantee_timestamp: self.guarantee_timestamp,
            travel_timestamp: self.travel_timestamp,
            round_decimal: self.round_decimal,
            ignore_growing: self.ignore_growing,
            output_fields: self.output_fields,
            partition_names: self.partition_names,
            filter_expr: self.filter_expr,
            extra_params: self.extra_params,
            vectors,
        })
    }

    fn fail(mut self, error: SearchParamError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }
}

fn validate_vectors(vectors: &SearchVectors) -> Result<(), SearchParamError> {
    let widths = vectors.widths();
    let Some(&expected) = widths.first() else {
        return Err(SearchParamError::MissingVectors);
    };
    if expected == 0 {
        return Err(SearchParamError::EmptyVector { index: 0 });
    }
    widths
        .iter()
        .enumerate()
        .find(|(_, width)| **width != expected)
        .map_or(Ok(()), |(index, &actual)| {
            if actual == 0 {
                Err(SearchParamError::EmptyVector { index })
            } else {
                Err(SearchParamError::RaggedVectors {
                    index,
                    expected,
                    actual,
                })
            }
        })
}
