//! Eager-load augmenter decorators.
//!
//! Rendering a fetched issue's deliverable or contract label must not issue
//! one query per row, so the execution paths get the relation paths pushed
//! into their include hints up front. The predicates themselves never depend
//! on these hints.

use crate::domain::{Issue, QueryContext};
use crate::query::{ExecutionOptions, FilterCatalog, GroupedCounts, IncludePath, QueryError, QueryOps};

/// Adds the `deliverable` relation to the fetch path.
///
/// Used with grouping
pub struct DeliverableIncludes {
    inner: Box<dyn QueryOps>,
}

impl DeliverableIncludes {
    pub fn new(inner: Box<dyn QueryOps>) -> Self {
        Self { inner }
    }
}

impl QueryOps for DeliverableIncludes {
    fn available_filters(&self, ctx: &QueryContext) -> FilterCatalog {
        self.inner.available_filters(ctx)
    }

    fn sql_for_field(
        &self,
        field: &str,
        operator: &str,
        values: &[String],
    ) -> Result<String, QueryError> {
        self.inner.sql_for_field(field, operator, values)
    }

    fn fetch_records(&self, mut options: ExecutionOptions) -> Result<Vec<Issue>, QueryError> {
        options.push_include(IncludePath::relation("deliverable"));
        self.inner.fetch_records(options)
    }

    fn count_by_group(
        &self,
        options: ExecutionOptions,
    ) -> Result<Option<GroupedCounts>, QueryError> {
        self.inner.count_by_group(options)
    }
}

/// Adds the `deliverable -> contract` path to the fetch and grouped-count
/// paths.
///
/// Used with grouping
pub struct ContractIncludes {
    inner: Box<dyn QueryOps>,
}

impl ContractIncludes {
    pub fn new(inner: Box<dyn QueryOps>) -> Self {
        Self { inner }
    }
}

impl QueryOps for ContractIncludes {
    fn available_filters(&self, ctx: &QueryContext) -> FilterCatalog {
        self.inner.available_filters(ctx)
    }

    fn sql_for_field(
        &self,
        field: &str,
        operator: &str,
        values: &[String],
    ) -> Result<String, QueryError> {
        self.inner.sql_for_field(field, operator, values)
    }

    fn fetch_records(&self, mut options: ExecutionOptions) -> Result<Vec<Issue>, QueryError> {
        options.push_include(IncludePath::nested("deliverable", "contract"));
        self.inner.fetch_records(options)
    }

    fn count_by_group(
        &self,
        mut options: ExecutionOptions,
    ) -> Result<Option<GroupedCounts>, QueryError> {
        options.push_include(IncludePath::nested("deliverable", "contract"));
        self.inner.count_by_group(options)
    }
}
