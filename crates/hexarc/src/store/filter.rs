//! Document filter algebra.
//!
//! Filters select documents by their JSON bodies. Fields are addressed by
//! dot-separated paths (`"owner.name"`), leaves combine with `And`/`Or`/`Not`,
//! and every store adapter evaluates the same algebra, so a filter behaves
//! identically against the in-memory and the `SQLite` store.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A predicate over document bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field at path equals the value exactly.
    Eq(String, Value),
    /// Field at path is absent or differs from the value.
    Ne(String, Value),
    /// Field at path is greater than the value (numbers and strings).
    Gt(String, Value),
    /// Field at path is less than the value (numbers and strings).
    Lt(String, Value),
    /// Field at path is present.
    Exists(String),
    /// All inner filters match. Empty matches everything.
    And(Vec<Filter>),
    /// At least one inner filter matches. Empty matches nothing.
    Or(Vec<Filter>),
    /// The inner filter does not match.
    Not(Box<Filter>),
}

impl Filter {
    /// Field at `path` equals `value` by exact JSON equality.
    #[must_use]
    pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(path.into(), value.into())
    }

    /// Field at `path` is absent or not equal to `value`.
    #[must_use]
    pub fn not_equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne(path.into(), value.into())
    }

    /// Field at `path` is greater than `value`.
    ///
    /// Only number-to-number and string-to-string comparisons match; any
    /// other pairing, or an absent field, does not.
    #[must_use]
    pub fn greater_than(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(path.into(), value.into())
    }

    /// Field at `path` is less than `value`.
    #[must_use]
    pub fn less_than(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(path.into(), value.into())
    }

    /// Field at `path` is present, whatever its value.
    #[must_use]
    pub fn exists(path: impl Into<String>) -> Self {
        Self::Exists(path.into())
    }

    /// All of the given filters match.
    #[must_use]
    pub fn all_of(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Any of the given filters match.
    #[must_use]
    pub fn any_of(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// The given filter does not match.
    #[must_use]
    pub fn negate(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Evaluate this filter against a document body.
    #[must_use]
    pub fn matches(&self, body: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq(path, value) => resolve(body, path).is_some_and(|field| field == value),
            Self::Ne(path, value) => resolve(body, path).map_or(true, |field| field != value),
            Self::Gt(path, value) => resolve(body, path)
                .and_then(|field| compare(field, value))
                .is_some_and(Ordering::is_gt),
            Self::Lt(path, value) => resolve(body, path)
                .and_then(|field| compare(field, value))
                .is_some_and(Ordering::is_lt),
            Self::Exists(path) => resolve(body, path).is_some(),
            Self::And(filters) => filters.iter().all(|filter| filter.matches(body)),
            Self::Or(filters) => filters.iter().any(|filter| filter.matches(body)),
            Self::Not(filter) => !filter.matches(body),
        }
    }
}

/// Walk a dot-separated path into a JSON body.
pub(crate) fn resolve<'v>(body: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = body;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Order two JSON values when they are comparable.
///
/// Numbers compare as floats and strings lexicographically; everything else
/// is unordered.
fn compare(field: &Value, value: &Value) -> Option<Ordering> {
    match (field, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}
