//! Catalog-extension decorators adding the `deliverable_id` and
//! `contract_id` filter fields.
//!
//! Both fields exist only inside a project; a context without one leaves the
//! base catalog untouched. The display orders are fixed so the two fields
//! always land after the base fields, deliverable before contract.

use crate::domain::{Issue, QueryContext};
use crate::query::{
    ExecutionOptions, FilterCatalog, FilterSpec, FilterType, GroupedCounts, QueryError, QueryOps,
};

pub const DELIVERABLE_FIELD: &str = "deliverable_id";

/// Display order of the deliverable filter, after the base fields.
pub const DELIVERABLE_FILTER_ORDER: u32 = 15;

/// Display order of the contract filter, after the deliverable filter.
pub const CONTRACT_FILTER_ORDER: u32 = 16;

/// Adds the `deliverable_id` filter, its values being the project's
/// deliverables sorted by title.
pub struct DeliverableFilters {
    inner: Box<dyn QueryOps>,
}

impl DeliverableFilters {
    pub fn new(inner: Box<dyn QueryOps>) -> Self {
        Self { inner }
    }
}

impl QueryOps for DeliverableFilters {
    fn available_filters(&self, ctx: &QueryContext) -> FilterCatalog {
        let mut catalog = self.inner.available_filters(ctx);
        if let Some(project) = &ctx.project {
            catalog.insert(
                DELIVERABLE_FIELD.to_string(),
                FilterSpec {
                    filter_type: FilterType::ListOptional,
                    order: DELIVERABLE_FILTER_ORDER,
                    values: project
                        .deliverables_by_title()
                        .iter()
                        .map(|d| (d.title.clone(), d.id.to_string()))
                        .collect(),
                },
            );
        }
        catalog
    }

    fn sql_for_field(
        &self,
        field: &str,
        operator: &str,
        values: &[String],
    ) -> Result<String, QueryError> {
        self.inner.sql_for_field(field, operator, values)
    }

    fn fetch_records(&self, options: ExecutionOptions) -> Result<Vec<Issue>, QueryError> {
        self.inner.fetch_records(options)
    }

    fn count_by_group(
        &self,
        options: ExecutionOptions,
    ) -> Result<Option<GroupedCounts>, QueryError> {
        self.inner.count_by_group(options)
    }
}

/// Adds the `contract_id` filter, its values being the project's contracts
/// sorted by name.
pub struct ContractFilters {
    inner: Box<dyn QueryOps>,
}

impl ContractFilters {
    pub fn new(inner: Box<dyn QueryOps>) -> Self {
        Self { inner }
    }
}

impl QueryOps for ContractFilters {
    fn available_filters(&self, ctx: &QueryContext) -> FilterCatalog {
        let mut catalog = self.inner.available_filters(ctx);
        if let Some(project) = &ctx.project {
            catalog.insert(
                crate::predicate::CONTRACT_FIELD.to_string(),
                FilterSpec {
                    filter_type: FilterType::ListOptional,
                    order: CONTRACT_FILTER_ORDER,
                    values: project
                        .contracts_by_name()
                        .iter()
                        .map(|c| (c.name.clone(), c.id.to_string()))
                        .collect(),
                },
            );
        }
        catalog
    }

    fn sql_for_field(
        &self,
        field: &str,
        operator: &str,
        values: &[String],
    ) -> Result<String, QueryError> {
        self.inner.sql_for_field(field, operator, values)
    }

    fn fetch_records(&self, options: ExecutionOptions) -> Result<Vec<Issue>, QueryError> {
        self.inner.fetch_records(options)
    }

    fn count_by_group(
        &self,
        options: ExecutionOptions,
    ) -> Result<Option<GroupedCounts>, QueryError> {
        self.inner.count_by_group(options)
    }
}
