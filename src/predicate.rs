//! SQL predicate translation for the extension-owned filter fields.
//!
//! The base query already translates its own fields; this module only owns
//! `contract_id`. Field dispatch is a name → strategy map looked up once per
//! call, with everything unregistered falling through to the wrapped
//! translator untouched.

use std::collections::HashMap;

use crate::config::TableConfig;
use crate::domain::{Issue, QueryContext};
use crate::query::{ExecutionOptions, FilterCatalog, GroupedCounts, QueryError, QueryOps};

/// The filter field this crate translates itself.
pub const CONTRACT_FIELD: &str = "contract_id";

/// Escape a value for embedding inside a single-quoted SQL string literal.
///
/// Doubling the quote character is enough to neutralize it in standard SQL;
/// anything else is carried through verbatim.
pub fn quote_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Translation of one owned filter field into a SQL boolean expression.
pub trait PredicateStrategy {
    fn sql_for(&self, operator: &str, values: &[String]) -> Result<String, QueryError>;
}

/// Predicate for `contract_id`. An issue has no direct contract link; the
/// path is contracts > deliverables > issues, so every form works off the
/// issue's `deliverable_id` foreign key.
pub struct ContractPredicate {
    tables: TableConfig,
}

impl ContractPredicate {
    pub fn new(tables: TableConfig) -> Self {
        Self { tables }
    }

    /// Subquery selecting the ids of deliverables owned by any of the given
    /// contracts. Keeps the exact shape the host engine's compiled statement
    /// expects, including the outer parentheses.
    fn deliverable_subquery(&self, values: &[String]) -> Result<String, QueryError> {
        if values.is_empty() {
            return Err(QueryError::InvalidFilterValue {
                field: CONTRACT_FIELD.to_string(),
                message: "expected at least one contract id".to_string(),
            });
        }
        let contracts = values
            .iter()
            .map(|v| format!("'{}'", quote_string(v)))
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!(
            "(SELECT id from {table} where {table}.contract_id IN ({contracts}))",
            table = self.tables.deliverables,
            contracts = contracts,
        ))
    }
}

impl PredicateStrategy for ContractPredicate {
    fn sql_for(&self, operator: &str, values: &[String]) -> Result<String, QueryError> {
        let issues = &self.tables.issues;
        match operator {
            "=" => {
                let inner_select = self.deliverable_subquery(values)?;
                Ok(format!("{}.deliverable_id IN ({})", issues, inner_select))
            }
            "!" => {
                // NOT IN alone would drop issues with a null deliverable_id;
                // those are exactly the ones with no contract at all.
                let inner_select = self.deliverable_subquery(values)?;
                Ok(format!(
                    "({table}.deliverable_id IS NULL OR {table}.deliverable_id NOT IN ({inner}))",
                    table = issues,
                    inner = inner_select,
                ))
            }
            // If it has a deliverable, it must have a contract
            "*" => Ok(format!("{}.deliverable_id IS NOT NULL", issues)),
            // If it doesn't have a deliverable, it can't have a contract
            "!*" => Ok(format!("{}.deliverable_id IS NULL", issues)),
            other => Err(QueryError::UnsupportedOperator {
                field: CONTRACT_FIELD.to_string(),
                operator: other.to_string(),
            }),
        }
    }
}

/// Decorator routing `sql_for_field` calls through the strategy map. Fields
/// with no registered strategy go to the inner translator verbatim, errors
/// included.
pub struct FieldPredicates {
    inner: Box<dyn QueryOps>,
    strategies: HashMap<String, Box<dyn PredicateStrategy>>,
}

impl FieldPredicates {
    pub fn new(inner: Box<dyn QueryOps>, tables: TableConfig) -> Self {
        let mut strategies: HashMap<String, Box<dyn PredicateStrategy>> = HashMap::new();
        strategies.insert(
            CONTRACT_FIELD.to_string(),
            Box::new(ContractPredicate::new(tables)),
        );
        Self { inner, strategies }
    }

    /// Register a strategy for another owned field. Last registration wins.
    pub fn register(&mut self, field: impl Into<String>, strategy: Box<dyn PredicateStrategy>) {
        self.strategies.insert(field.into(), strategy);
    }
}

impl QueryOps for FieldPredicates {
    fn available_filters(&self, ctx: &QueryContext) -> FilterCatalog {
        self.inner.available_filters(ctx)
    }

    fn sql_for_field(
        &self,
        field: &str,
        operator: &str,
        values: &[String],
    ) -> Result<String, QueryError> {
        match self.strategies.get(field) {
            Some(strategy) => strategy.sql_for(operator, values),
            None => self.inner.sql_for_field(field, operator, values),
        }
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
