//! Tagged identifier union for primary keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary keys returned or addressed by the service.
///
/// Exactly one branch is active; the tag is explicit rather than inferred from
/// which list happens to be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum IdentifierUnion {
    /// No identifiers, or an id kind this client does not know.
    #[default]
    None,
    /// 64-bit integer primary keys.
    IntIds(Vec<i64>),
    /// String primary keys.
    StringIds(Vec<String>),
}

impl IdentifierUnion {
    /// Number of identifiers in the active branch.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::IntIds(ids) => ids.len(),
            Self::StringIds(ids) => ids.len(),
        }
    }

    /// Returns true when no identifier is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integer ids, when that branch is active.
    #[must_use]
    pub fn as_int_ids(&self) -> Option<&[i64]> {
        match self {
            Self::IntIds(ids) => Some(ids),
            Self::None | Self::StringIds(_) => None,
        }
    }

    /// String ids, when that branch is active.
    #[must_use]
    pub fn as_string_ids(&self) -> Option<&[String]> {
        match self {
            Self::StringIds(ids) => Some(ids),
            Self::None | Self::IntIds(_) => None,
        }
    }

    /// Identifier at `index` in the active branch.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Id> {
        match self {
            Self::None => None,
            Self::IntIds(ids) => ids.get(index).copied().map(Id::Int),
            Self::StringIds(ids) => ids.get(index).cloned().map(Id::Str),
        }
    }
}

impl From<Vec<i64>> for IdentifierUnion {
    fn from(ids: Vec<i64>) -> Self {
        Self::IntIds(ids)
    }
}

impl From<Vec<String>> for IdentifierUnion {
    fn from(ids: Vec<String>) -> Self {
        Self::StringIds(ids)
    }
}

/// A single primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// Integer primary key.
    Int(i64),
    /// String primary key.
    Str(String),
}

impl fmt::Display for Id {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(formatter, "{id}"),
            Self::Str(id) => formatter.write_str(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn accessors_follow_the_active_branch() {
        let ids = IdentifierUnion::IntIds(vec![101, 102]);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.as_int_ids(), Some(&[101, 102][..]));
        assert_eq!(ids.as_string_ids(), None);
        assert_eq!(ids.get(1), Some(Id::Int(102)));
        assert_eq!(ids.get(2), None);

        let ids = IdentifierUnion::from(vec!["a".to_owned()]);
        assert_eq!(ids.as_int_ids(), None);
        assert_eq!(ids.get(0), Some(Id::Str("a".to_owned())));

        assert!(IdentifierUnion::None.is_empty());
        assert_eq!(IdentifierUnion::None.get(0), None);
    }

    #[test]
    fn serializes_with_explicit_tag() -> Result<(), Box<dyn Error>> {
        let value = serde_json::to_value(IdentifierUnion::IntIds(vec![7]))?;
        assert_eq!(value, serde_json::json!({ "type": "int_ids", "data": [7] }));

        let value = serde_json::to_value(IdentifierUnion::None)?;
        assert_eq!(value, serde_json::json!({ "type": "none" }));
        Ok(())
    }

    #[test]
    fn id_display_is_plain() {
        assert_eq!(Id::Int(5).to_string(), "5");
        assert_eq!(Id::Str("doc-1".to_owned()).to_string(), "doc-1");
    }
}
