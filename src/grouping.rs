//! Grouped-count override.
//!
//! The base count-by-group path cannot take include hints, so this decorator
//! replaces it wholesale: it runs the grouped count against the data store
//! itself, carrying the accumulated includes, and papers over the store
//! quirk where an all-null group column surfaces as a "no groupable rows"
//! error instead of an empty result.

use std::collections::HashMap;

use crate::domain::{Issue, QueryContext};
use crate::query::{
    ExecutionOptions, FilterCatalog, GroupedCounts, IncludePath, QueryError, QueryOps,
};

/// Raw grouped counts as returned by the store, keyed by the stored column
/// value. `None` is the null bucket.
pub type RawGroupCounts = HashMap<Option<String>, u64>;

/// Failure modes of the data-access collaborator.
#[derive(Debug)]
pub enum StoreError {
    /// The grouped count found no groupable rows. Raised by some backends
    /// when every matching record has a null group value.
    NoGroupableRows,
    /// Any other data-access failure.
    Other(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoGroupableRows => write!(f, "no groupable rows"),
            Self::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

/// The read side of the record store, as far as counting is concerned.
pub trait RecordStore {
    /// Count records per distinct value of `group_column`, restricted by
    /// `conditions`, eager-loading `includes`.
    fn count_grouped(
        &self,
        group_column: &str,
        includes: &[IncludePath],
        conditions: &str,
    ) -> Result<RawGroupCounts, StoreError>;

    /// Ungrouped count of the records matching `conditions`.
    fn count(&self, conditions: &str) -> Result<u64, StoreError>;
}

/// Decorator replacing `count_by_group`. The other three operations pass
/// through to the base query untouched.
pub struct GroupedCounting {
    inner: Box<dyn QueryOps>,
    store: Box<dyn RecordStore>,
}

impl GroupedCounting {
    pub fn new(inner: Box<dyn QueryOps>, store: Box<dyn RecordStore>) -> Self {
        Self { inner, store }
    }
}

fn execution_error(err: StoreError) -> QueryError {
    QueryError::Execution(err.to_string())
}

impl QueryOps for GroupedCounting {
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

    fn fetch_records(&self, options: ExecutionOptions) -> Result<Vec<Issue>, QueryError> {
        self.inner.fetch_records(options)
    }

    fn count_by_group(
        &self,
        options: ExecutionOptions,
    ) -> Result<Option<GroupedCounts>, QueryError> {
        let Some(group) = &options.group_by else {
            return Ok(None);
        };

        // Label rendering always touches status and project, so those two
        // are seeded ahead of whatever the decorators above pushed in.
        let mut includes = vec![IncludePath::relation("status"), IncludePath::relation("project")];
        for path in &options.includes {
            if !includes.contains(path) {
                includes.push(path.clone());
            }
        }

        let mut counts =
            match self.store.count_grouped(&group.column, &includes, &options.conditions) {
                Ok(counts) => counts,
                Err(StoreError::NoGroupableRows) => {
                    // Every matching record sits in the null bucket.
                    let total =
                        self.store.count(&options.conditions).map_err(execution_error)?;
                    let mut counts = RawGroupCounts::new();
                    counts.insert(None, total);
                    counts
                }
                Err(err) => return Err(execution_error(err)),
            };

        if let Some(field) = &group.custom_field {
            // Re-key through the field's cast; colliding keys overwrite.
            counts = counts
                .into_iter()
                .map(|(key, count)| (key.map(|raw| field.cast_value(&raw)), count))
                .collect();
        }

        Ok(Some(counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomField, FieldFormat, GroupBy};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NullBase;

    impl QueryOps for NullBase {
        fn available_filters(&self, _ctx: &QueryContext) -> FilterCatalog {
            FilterCatalog::new()
        }

        fn sql_for_field(
            &self,
            _field: &str,
            _operator: &str,
            _values: &[String],
        ) -> Result<String, QueryError> {
            Ok(String::new())
        }

        fn fetch_records(&self, _options: ExecutionOptions) -> Result<Vec<Issue>, QueryError> {
            Ok(vec![])
        }

        fn count_by_group(
            &self,
            _options: ExecutionOptions,
        ) -> Result<Option<GroupedCounts>, QueryError> {
            panic!("the override must not delegate grouped counts");
        }
    }

    /// Store scripted per test.
    struct FakeStore {
        grouped: Result<RawGroupCounts, StoreError>,
        total: u64,
        seen_includes: RefCell<Vec<IncludePath>>,
    }

    impl FakeStore {
        fn returning(grouped: Result<RawGroupCounts, StoreError>) -> Self {
            Self { grouped, total: 0, seen_includes: RefCell::new(vec![]) }
        }
    }

    impl RecordStore for FakeStore {
        fn count_grouped(
            &self,
            _group_column: &str,
            includes: &[IncludePath],
            _conditions: &str,
        ) -> Result<RawGroupCounts, StoreError> {
            *self.seen_includes.borrow_mut() = includes.to_vec();
            match &self.grouped {
                Ok(counts) => Ok(counts.clone()),
                Err(StoreError::NoGroupableRows) => Err(StoreError::NoGroupableRows),
                Err(StoreError::Other(err)) => {
                    Err(StoreError::Other(anyhow::anyhow!("{}", err)))
                }
            }
        }

        fn count(&self, _conditions: &str) -> Result<u64, StoreError> {
            Ok(self.total)
        }
    }

    fn grouped_options(column: &str) -> ExecutionOptions {
        ExecutionOptions {
            group_by: Some(GroupBy::column(column)),
            ..ExecutionOptions::default()
        }
    }

    fn counts(pairs: &[(Option<&str>, u64)]) -> RawGroupCounts {
        pairs
            .iter()
            .map(|(key, count)| (key.map(|k| k.to_string()), *count))
            .collect()
    }

    #[test]
    fn no_grouping_yields_no_result() {
        let query = GroupedCounting::new(
            Box::new(NullBase),
            Box::new(FakeStore::returning(Ok(RawGroupCounts::new()))),
        );
        assert_eq!(query.count_by_group(ExecutionOptions::default()).unwrap(), None);
    }

    #[test]
    fn grouped_counts_pass_through() {
        // Records with group values [1, null, 1].
        let store = FakeStore::returning(Ok(counts(&[(Some("1"), 2), (None, 1)])));
        let query = GroupedCounting::new(Box::new(NullBase), Box::new(store));

        let result = query.count_by_group(grouped_options("priority_id")).unwrap().unwrap();
        assert_eq!(result, counts(&[(Some("1"), 2), (None, 1)]));
    }

    #[test]
    fn all_null_groups_collapse_to_the_total() {
        let mut store = FakeStore::returning(Err(StoreError::NoGroupableRows));
        store.total = 7;
        let query = GroupedCounting::new(Box::new(NullBase), Box::new(store));

        let result = query.count_by_group(grouped_options("deliverable_id")).unwrap().unwrap();
        assert_eq!(result, counts(&[(None, 7)]));
    }

    #[test]
    fn other_store_failures_propagate_with_their_message() {
        let store = FakeStore::returning(Err(StoreError::Other(anyhow::anyhow!(
            "deadlock detected"
        ))));
        let query = GroupedCounting::new(Box::new(NullBase), Box::new(store));

        let err = query.count_by_group(grouped_options("priority_id")).unwrap_err();
        assert_eq!(err, QueryError::Execution("deadlock detected".to_string()));
    }

    #[test]
    fn custom_field_groups_are_rekeyed_through_the_cast() {
        let store = FakeStore::returning(Ok(counts(&[(Some("5"), 3), (None, 1)])));
        let query = GroupedCounting::new(Box::new(NullBase), Box::new(store));

        let mut options = grouped_options("cf_2");
        options.group_by.as_mut().unwrap().custom_field = Some(CustomField {
            name: "severity".to_string(),
            format: FieldFormat::Enumeration(vec![("5".to_string(), "High".to_string())]),
        });

        let result = query.count_by_group(options).unwrap().unwrap();
        assert_eq!(result, counts(&[(Some("High"), 3), (None, 1)]));
    }

    #[test]
    fn colliding_cast_keys_collapse() {
        let store = FakeStore::returning(Ok(counts(&[(Some("5"), 3), (Some("6"), 2)])));
        let query = GroupedCounting::new(Box::new(NullBase), Box::new(store));

        let mut options = grouped_options("cf_2");
        options.group_by.as_mut().unwrap().custom_field = Some(CustomField {
            name: "severity".to_string(),
            format: FieldFormat::Enumeration(vec![
                ("5".to_string(), "High".to_string()),
                ("6".to_string(), "High".to_string()),
            ]),
        });

        let result = query.count_by_group(options).unwrap().unwrap();
        assert_eq!(result.len(), 1);
        assert!(result.contains_key(&Some("High".to_string())));
    }

    #[test]
    fn status_and_project_are_seeded_before_caller_includes() {
        let store = Rc::new(FakeStore::returning(Ok(RawGroupCounts::new())));
        let query = GroupedCounting::new(Box::new(NullBase), Box::new(SharedStore(Rc::clone(&store))));

        let mut options = grouped_options("priority_id");
        options.push_include(IncludePath::nested("deliverable", "contract"));
        options.push_include(IncludePath::relation("status")); // already seeded

        query.count_by_group(options).unwrap();
        assert_eq!(
            *store.seen_includes.borrow(),
            vec![
                IncludePath::relation("status"),
                IncludePath::relation("project"),
                IncludePath::nested("deliverable", "contract"),
            ]
        );
    }

    /// Handle so a test can keep its store after handing it to the
    /// decorator.
    struct SharedStore(Rc<FakeStore>);

    impl RecordStore for SharedStore {
        fn count_grouped(
            &self,
            group_column: &str,
            includes: &[IncludePath],
            conditions: &str,
        ) -> Result<RawGroupCounts, StoreError> {
            self.0.count_grouped(group_column, includes, conditions)
        }

        fn count(&self, conditions: &str) -> Result<u64, StoreError> {
            self.0.count(conditions)
        }
    }
}
