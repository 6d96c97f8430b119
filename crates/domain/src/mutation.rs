//! Outcome of an insert, delete or upsert.

use crate::hybrid_time::HybridTimestamp;
use crate::ids::IdentifierUnion;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Immutable snapshot of a write acknowledged by the service.
///
/// Rows that failed inside an accepted batch are listed in
/// [`MutationOutcome::error_index`]; that is not an error of the call itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    acknowledged: bool,
    insert_count: i64,
    delete_count: i64,
    upsert_count: i64,
    success_index: Vec<u32>,
    error_index: Vec<u32>,
    timestamp: HybridTimestamp,
    ids: IdentifierUnion,
}

impl MutationOutcome {
    /// Start a builder; every field defaults to zero or empty.
    #[must_use]
    pub fn builder() -> MutationOutcomeBuilder {
        MutationOutcomeBuilder::default()
    }

    /// Whether the service acknowledged the write.
    #[must_use]
    pub const fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Rows inserted.
    #[must_use]
    pub const fn insert_count(&self) -> i64 {
        self.insert_count
    }

    /// Rows deleted.
    #[must_use]
    pub const fn delete_count(&self) -> i64 {
        self.delete_count
    }

    /// Rows upserted.
    #[must_use]
    pub const fn upsert_count(&self) -> i64 {
        self.upsert_count
    }

    /// Batch positions that were written.
    #[must_use]
    pub fn success_index(&self) -> &[u32] {
        &self.success_index
    }

    /// Batch positions that failed.
    #[must_use]
    pub fn error_index(&self) -> &[u32] {
        &self.error_index
    }

    /// Returns true when some rows of the batch failed.
    #[must_use]
    pub fn has_row_errors(&self) -> bool {
        !self.error_index.is_empty()
    }

    /// Hybrid timestamp of the write.
    #[must_use]
    pub const fn hybrid_timestamp(&self) -> HybridTimestamp {
        self.timestamp
    }

    /// Wall-clock time of the write.
    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp.to_system_time()
    }

    /// Identifiers of the affected rows.
    #[must_use]
    pub const fn ids(&self) -> &IdentifierUnion {
        &self.ids
    }
}

/// Builder for [`MutationOutcome`].
#[derive(Debug, Clone, Default)]
pub struct MutationOutcomeBuilder {
    acknowledged: bool,
    insert_count: i64,
    delete_count: i64,
    upsert_count: i64,
    success_index: Vec<u32>,
    error_index: Vec<u32>,
    timestamp: Option<HybridTimestamp>,
    ids: IdentifierUnion,
}

impl MutationOutcomeBuilder {
    /// Acknowledged flag.
    #[must_use]
    pub const fn acknowledged(mut self, acknowledged: bool) -> Self {
        self.acknowledged = acknowledged;
        self
    }

    /// Insert, delete and upsert counts.
    #[must_use]
    pub const fn counts(mut self, inserted: i64, deleted: i64, upserted: i64) -> Self {
        self.insert_count = inserted;
        self.delete_count = deleted;
        self.upsert_count = upserted;
        self
    }

    /// Per-row success and error positions.
    #[must_use]
    pub fn row_indexes(mut self, success: Vec<u32>, errors: Vec<u32>) -> Self {
        self.success_index = success;
        self.error_index = errors;
        self
    }

    /// Hybrid timestamp of the write.
    #[must_use]
    pub const fn timestamp(mut self, timestamp: HybridTimestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Identifiers of the affected rows.
    #[must_use]
    pub fn ids(mut self, ids: IdentifierUnion) -> Self {
        self.ids = ids;
        self
    }

    /// Freeze the outcome.
    #[must_use]
    pub fn build(self) -> MutationOutcome {
        MutationOutcome {
            acknowledged: self.acknowledged,
            insert_count: self.insert_count,
            delete_count: self.delete_count,
            upsert_count: self.upsert_count,
            success_index: self.success_index,
            error_index: self.error_index,
            timestamp: self.timestamp.unwrap_or(HybridTimestamp::from_raw(0)),
            ids: self.ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn partial_batch_failure_is_data_not_error() {
        let outcome = MutationOutcome::builder()
            .acknowledged(true)
            .counts(3, 0, 0)
            .row_indexes(vec![0, 2], vec![1])
            .ids(IdentifierUnion::IntIds(vec![10, 12]))
            .build();

        assert!(outcome.acknowledged());
        assert_eq!(outcome.insert_count(), 3);
        assert_eq!(outcome.success_index(), [0, 2]);
        assert_eq!(outcome.error_index(), [1]);
        assert!(outcome.has_row_errors());
        assert_eq!(outcome.ids().as_int_ids(), Some(&[10, 12][..]));
    }

    #[test]
    fn timestamp_converts_from_hybrid_time() {
        let outcome = MutationOutcome::builder()
            .timestamp(HybridTimestamp::compose(1_000, 7))
            .build();

        assert_eq!(outcome.hybrid_timestamp().logical(), 7);
        assert_eq!(
            outcome.timestamp(),
            UNIX_EPOCH + Duration::from_millis(1_000)
        );
    }

    #[test]
    fn defaults_are_empty() {
        let outcome = MutationOutcome::builder().build();
        assert!(!outcome.acknowledged());
        assert!(!outcome.has_row_errors());
        assert_eq!(outcome.ids(), &IdentifierUnion::None);
        assert_eq!(outcome.timestamp(), UNIX_EPOCH);
    }
}
