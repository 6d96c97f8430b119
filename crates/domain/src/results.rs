//! Decoded search results.

use crate::ids::{Id, IdentifierUnion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One column of returned entity data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum FieldColumn {
    /// Boolean scalars.
    Bool(Vec<bool>),
    /// 8/16/32-bit integer scalars.
    Int(Vec<i32>),
    /// 64-bit integer scalars.
    Long(Vec<i64>),
    /// 32-bit float scalars.
    Float(Vec<f32>),
    /// 64-bit float scalars.
    Double(Vec<f64>),
    /// String scalars.
    String(Vec<String>),
    /// Dense float vectors, flattened row-major.
    FloatVector {
        /// Floats per vector.
        dim: usize,
        /// Flattened vector data.
        values: Vec<f32>,
    },
    /// Packed binary vectors, flattened row-major.
    BinaryVector {
        /// Bits per vector.
        dim: usize,
        /// Flattened packed bytes.
        values: Vec<u8>,
    },
}

impl FieldColumn {
    /// Number of rows in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(values) => values.len(),
            Self::Int(values) => values.len(),
            Self::Long(values) => values.len(),
            Self::Float(values) => values.len(),
            Self::Double(values) => values.len(),
            Self::String(values) => values.len(),
            Self::FloatVector { dim, values } => values.len().checked_div(*dim).unwrap_or(0),
            Self::BinaryVector { dim, values } => {
                values.len().checked_div(dim.div_ceil(8)).unwrap_or(0)
            },
        }
    }

    /// Returns true when the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single hit of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Primary key of the matched entity.
    pub id: Id,
    /// Distance or similarity score.
    pub score: f32,
    /// Row of this hit in [`SearchResults::fields`] columns.
    pub row: usize,
}

/// Flattened results of a (possibly multi-query) search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Collection searched.
    pub collection: String,
    /// Number of queries.
    pub num_queries: i64,
    /// Requested hits per query.
    pub top_k: i64,
    /// Primary keys of all hits, query after query.
    pub ids: IdentifierUnion,
    /// Scores of all hits, aligned with `ids`.
    pub scores: Vec<f32>,
    /// Hits actually returned per query.
    pub limits: Vec<i64>,
    /// Output field columns, aligned with `ids`.
    pub fields: BTreeMap<String, FieldColumn>,
}

impl SearchResults {
    /// Hits of query `query_index`, or `None` when the query does not exist
    /// or its hit counts are malformed.
    ///
    /// Rows past the end of `ids` are never yielded.
    #[must_use]
    pub fn hits(&self, query_index: usize) -> Option<Vec<SearchHit>> {
        let count = usize::try_from(*self.limits.get(query_index)?).ok()?;
        let start = self
            .limits
            .iter()
            .take(query_index)
            .try_fold(0_usize, |total, limit| {
                total.checked_add(usize::try_from(*limit).ok()?)
            })?;
        let end = start.checked_add(count)?.min(self.ids.len());

        let hits = (start.min(end)..end)
            .filter_map(|row| {
                let id = self.ids.get(row)?;
                let score = *self.scores.get(row)?;
                Some(SearchHit { id, score, row })
            })
            .collect();
        Some(hits)
    }

    /// Column of an output field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldColumn> {
        self.fields.get(name)
    }
}
