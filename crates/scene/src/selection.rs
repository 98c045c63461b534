use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::catalogue::json_type_name;

/// How many features may be selected at once.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SelectionLimit {
    #[default]
    Unlimited,
    /// At most `n` features (`n >= 1`).
    Max(u64),
    /// Between `min` and `max` features (`1 <= min < max`).
    Range { min: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionLimitError {
    NotANumber,
    NotAnInteger(f64),
    NotPositive(f64),
    WrongLength(usize),
    NotAscending { min: u64, max: u64 },
    UnsupportedType(&'static str),
}

impl std::fmt::Display for SelectionLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionLimitError::NotANumber => write!(f, "selection limit is NaN"),
            SelectionLimitError::NotAnInteger(v) => {
                write!(f, "selection limit must be an integer, got {v}")
            }
            SelectionLimitError::NotPositive(v) => {
                write!(f, "selection limit must be 1 or greater, got {v}")
            }
            SelectionLimitError::WrongLength(len) => {
                write!(f, "selection limit range must have exactly 2 values, got {len}")
            }
            SelectionLimitError::NotAscending { min, max } => write!(
                f,
                "selection limit range must be strictly ascending, got [{min}, {max}]"
            ),
            SelectionLimitError::UnsupportedType(found) => write!(
                f,
                "selection limit must be null, an integer, or a 2-integer range, got {found}"
            ),
        }
    }
}

impl std::error::Error for SelectionLimitError {}

impl SelectionLimit {
    /// Parses a decoded configuration value; `null` means unlimited.
    pub fn from_value(value: &Value) -> Result<Self, SelectionLimitError> {
        match value {
            Value::Null => Ok(SelectionLimit::Unlimited),
            Value::Number(n) => {
                let n = n.as_f64().ok_or(SelectionLimitError::NotANumber)?;
                Self::from_number(n)
            }
            Value::Array(items) => {
                let [min, max] = items.as_slice() else {
                    return Err(SelectionLimitError::WrongLength(items.len()));
                };
                let min = positive_integer_value(min)?;
                let max = positive_integer_value(max)?;
                Self::range(min, max)
            }
            other => Err(SelectionLimitError::UnsupportedType(json_type_name(other))),
        }
    }

    pub fn from_number(n: f64) -> Result<Self, SelectionLimitError> {
        positive_integer(n).map(SelectionLimit::Max)
    }

    pub fn range(min: u64, max: u64) -> Result<Self, SelectionLimitError> {
        if min == 0 {
            return Err(SelectionLimitError::NotPositive(0.0));
        }
        if min >= max {
            return Err(SelectionLimitError::NotAscending { min, max });
        }
        Ok(SelectionLimit::Range { min, max })
    }

    pub fn min(&self) -> u64 {
        match self {
            SelectionLimit::Unlimited => 0,
            SelectionLimit::Max(_) => 1,
            SelectionLimit::Range { min, .. } => *min,
        }
    }

    pub fn max(&self) -> Option<u64> {
        match self {
            SelectionLimit::Unlimited => None,
            SelectionLimit::Max(n) => Some(*n),
            SelectionLimit::Range { max, .. } => Some(*max),
        }
    }
}

fn positive_integer(n: f64) -> Result<u64, SelectionLimitError> {
    if n.is_nan() {
        return Err(SelectionLimitError::NotANumber);
    }
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(SelectionLimitError::NotAnInteger(n));
    }
    if n < 1.0 {
        return Err(SelectionLimitError::NotPositive(n));
    }
    Ok(n as u64)
}

fn positive_integer_value(value: &Value) -> Result<u64, SelectionLimitError> {
    match value {
        Value::Number(n) => positive_integer(n.as_f64().ok_or(SelectionLimitError::NotANumber)?),
        other => Err(SelectionLimitError::UnsupportedType(json_type_name(other))),
    }
}

/// Outcome of validating a selection-limit configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionLimitValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `None` (absent) and `null` are both valid.
pub fn validate_selection_limit(value: Option<&Value>) -> SelectionLimitValidation {
    let result = match value {
        None => Ok(SelectionLimit::Unlimited),
        Some(v) => SelectionLimit::from_value(v),
    };
    match result {
        Ok(_) => SelectionLimitValidation {
            valid: true,
            reason: None,
        },
        Err(e) => SelectionLimitValidation {
            valid: false,
            reason: Some(e.to_string()),
        },
    }
}

/// Deterministic set of selected feature ids bounded by a [`SelectionLimit`].
///
/// Ordering contract:
/// - Iteration yields ids in ascending lexical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
    limit: SelectionLimit,
}

impl Selection {
    pub fn new(limit: SelectionLimit) -> Self {
        Self {
            ids: BTreeSet::new(),
            limit,
        }
    }

    pub fn limit(&self) -> SelectionLimit {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_full(&self) -> bool {
        self.limit
            .max()
            .is_some_and(|max| self.ids.len() as u64 >= max)
    }

    /// Adds `id` to the selection.
    ///
    /// With a cap of one the new id replaces the current one; any other full
    /// selection refuses the id. Returns `true` if the set changed.
    pub fn select(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.ids.contains(&id) {
            return false;
        }
        if self.is_full() {
            if self.limit != SelectionLimit::Max(1) {
                return false;
            }
            self.ids.clear();
        }
        self.ids.insert(id)
    }

    /// Returns `true` if the set changed.
    pub fn deselect(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn toggle(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.ids.contains(&id) {
            return self.deselect(&id);
        }
        self.select(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether the current size is acceptable for submission.
    pub fn satisfies_limit(&self) -> bool {
        let len = self.ids.len() as u64;
        len >= self.limit.min() && self.limit.max().is_none_or(|max| len <= max)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}
