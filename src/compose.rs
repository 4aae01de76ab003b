//! Wires the extension decorators around a base query in a fixed order.
//!
//! The chain is static configuration, not something computed at runtime:
//! every process builds the same chain, and each decorator calls through to
//! the next exactly once per operation. Consumer-facing order:
//!
//! ```text
//! deliverable catalog -> contract catalog -> predicate dispatch
//!   -> deliverable includes -> contract includes
//!   -> grouped-count override -> base query
//! ```

use crate::config::TableConfig;
use crate::filters::{ContractFilters, DeliverableFilters};
use crate::grouping::{GroupedCounting, RecordStore};
use crate::includes::{ContractIncludes, DeliverableIncludes};
use crate::predicate::FieldPredicates;
use crate::query::QueryOps;

/// Wrap `base` with the full extension chain.
///
/// `tables` feeds the generated SQL fragments; `store` backs the
/// grouped-count override.
pub fn extend_query(
    base: Box<dyn QueryOps>,
    tables: TableConfig,
    store: Box<dyn RecordStore>,
) -> Box<dyn QueryOps> {
    // Innermost first: each wrapper below sees the previous one as `inner`.
    let query: Box<dyn QueryOps> = Box::new(GroupedCounting::new(base, store));
    let query: Box<dyn QueryOps> = Box::new(ContractIncludes::new(query));
    let query: Box<dyn QueryOps> = Box::new(DeliverableIncludes::new(query));
    let query: Box<dyn QueryOps> = Box::new(FieldPredicates::new(query, tables));
    let query: Box<dyn QueryOps> = Box::new(ContractFilters::new(query));
    Box::new(DeliverableFilters::new(query))
}
