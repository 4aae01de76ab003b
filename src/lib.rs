//! Query extensions that add contract and deliverable filtering to an
//! existing issue query pipeline.
//!
//! The host engine owns the query object itself: its filter catalog, its
//! filter-to-SQL translation for the built-in fields, and its two execution
//! paths (record fetch and grouped count). This crate layers extra behavior
//! around those four operations without touching the base implementation:
//!
//! - two new project-scoped filter fields (`deliverable_id`, `contract_id`),
//! - SQL predicate translation for the `contract_id` field, which reaches
//!   the contract through the issue's optional deliverable link,
//! - eager-load hints so rendering joined labels needs no per-row queries,
//! - a grouped-count implementation that accepts include hints and handles
//!   the all-null group edge case the base path trips over.
//!
//! Everything is wired as a fixed chain of decorators; see [`compose`].

pub mod compose;
pub mod config;
pub mod domain;
pub mod filters;
pub mod grouping;
pub mod includes;
pub mod predicate;
pub mod query;

pub use compose::extend_query;
pub use config::TableConfig;
pub use domain::{Contract, CustomField, Deliverable, FieldFormat, GroupBy, Issue, Project, QueryContext};
pub use query::{
    ExecutionOptions, FilterCatalog, FilterSpec, FilterType, GroupedCounts, IncludePath,
    QueryError, QueryOps,
};
