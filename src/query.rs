//! The wrapped query abstraction: the four base operations and the data
//! structures that flow through them.
//!
//! The host engine provides the base implementation of [`QueryOps`]; this
//! crate only decorates it. Every structure here is rebuilt per evaluation
//! and never cached across requests.

use std::collections::HashMap;

use crate::domain::{GroupBy, Issue, QueryContext};

/// UI type of a filter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    List,
    /// List where "none"/"any" are also selectable.
    ListOptional,
    Date,
    Text,
    Integer,
}

/// Descriptor for one filterable field: its UI type, its position in the
/// filter dropdown, and the selectable (label, id) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub filter_type: FilterType,
    pub order: u32,
    pub values: Vec<(String, String)>,
}

/// All filterable fields, keyed by field name. Merging a new entry under an
/// existing key is last-write-wins.
pub type FilterCatalog = HashMap<String, FilterSpec>;

/// A relation path to eager-load alongside the primary records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludePath {
    /// A direct association, e.g. `status`.
    Relation(String),
    /// An association reached through another, e.g. `deliverable.contract`.
    Nested(String, String),
}

impl IncludePath {
    pub fn relation(name: impl Into<String>) -> Self {
        Self::Relation(name.into())
    }

    pub fn nested(through: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Nested(through.into(), target.into())
    }
}

impl std::fmt::Display for IncludePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relation(name) => write!(f, "{}", name),
            Self::Nested(through, target) => write!(f, "{}.{}", through, target),
        }
    }
}

/// Options passed into the two execution paths (fetch and grouped count).
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Relation paths to eager-load. Decorators append here; duplicates are
    /// dropped so the downstream loader sees each path once.
    pub includes: Vec<IncludePath>,
    /// The compiled filter conditions of the query (its WHERE fragment).
    pub conditions: String,
    /// Grouping state, when the consumer asked for grouped counts.
    pub group_by: Option<GroupBy>,
}

impl ExecutionOptions {
    /// Append an include hint unless an equal one is already present.
    /// Existing hints keep their positions.
    pub fn push_include(&mut self, path: IncludePath) {
        if !self.includes.contains(&path) {
            self.includes.push(path);
        }
    }
}

/// Grouped counts keyed by group value; `None` is the null-group bucket.
pub type GroupedCounts = HashMap<Option<String>, u64>;

/// Errors surfaced by the query operations.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The operator is not defined for the given filter field.
    UnsupportedOperator { field: String, operator: String },
    /// The filter value is malformed for the given field/operator.
    InvalidFilterValue { field: String, message: String },
    /// The delegated data-access call failed; carries the original message.
    Execution(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedOperator { field, operator } => {
                write!(f, "unsupported operator '{}' for filter field '{}'", operator, field)
            }
            Self::InvalidFilterValue { field, message } => {
                write!(f, "invalid value for filter field '{}': {}", field, message)
            }
            Self::Execution(message) => write!(f, "query execution failed: {}", message),
        }
    }
}

impl std::error::Error for QueryError {}

/// The four operations of the base query. Each decorator in this crate
/// implements this trait over an inner `Box<dyn QueryOps>`, intercepting the
/// operations it owns and delegating the rest verbatim.
pub trait QueryOps {
    /// The filter catalog available in the given context.
    fn available_filters(&self, ctx: &QueryContext) -> FilterCatalog;

    /// Translate one (field, operator, value) filter into a SQL boolean
    /// expression. `values` is empty for the presence operators.
    fn sql_for_field(
        &self,
        field: &str,
        operator: &str,
        values: &[String],
    ) -> Result<String, QueryError>;

    /// Fetch the records matched by the query's current conditions.
    fn fetch_records(&self, options: ExecutionOptions) -> Result<Vec<Issue>, QueryError>;

    /// Count matched records per group value. `None` when grouping is not
    /// active.
    fn count_by_group(
        &self,
        options: ExecutionOptions,
    ) -> Result<Option<GroupedCounts>, QueryError>;
}
