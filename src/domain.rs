//! Read models and execution context shared by the query extensions.
//!
//! These are the shapes the extensions need from the host application, not
//! the host's persistence models. Everything here is request-scoped data.

/// A contract within a project. Contracts are reached from an issue through
/// its deliverable: contracts > deliverables > issues.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: i64,
    pub name: String,
}

/// A deliverable within a project, owned by exactly one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Deliverable {
    pub id: i64,
    pub title: String,
    pub contract_id: i64,
}

/// The primary record the wrapped query fetches. An issue may or may not be
/// linked to a deliverable.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: i64,
    pub subject: String,
    pub deliverable_id: Option<i64>,
}

/// A project with its deliverables and contracts. Filter values are built
/// from these collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i64,
    pub identifier: String,
    pub deliverables: Vec<Deliverable>,
    pub contracts: Vec<Contract>,
}

impl Project {
    /// Deliverables sorted by title, for display in filter value lists.
    pub fn deliverables_by_title(&self) -> Vec<&Deliverable> {
        let mut sorted: Vec<&Deliverable> = self.deliverables.iter().collect();
        sorted.sort_by(|a, b| a.title.cmp(&b.title));
        sorted
    }

    /// Contracts sorted by name, for display in filter value lists.
    pub fn contracts_by_name(&self) -> Vec<&Contract> {
        let mut sorted: Vec<&Contract> = self.contracts.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }
}

/// Execution context for a query evaluation. The project is optional: the
/// extra filters only exist inside a project, never in a cross-project view.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    pub project: Option<Project>,
}

impl QueryContext {
    pub fn for_project(project: Project) -> Self {
        Self { project: Some(project) }
    }
}

/// Grouping state of a query: the SQL column (or expression) to group by,
/// and the custom field definition when the column is a custom field.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub column: String,
    pub custom_field: Option<CustomField>,
}

impl GroupBy {
    pub fn column(column: impl Into<String>) -> Self {
        Self { column: column.into(), custom_field: None }
    }
}

/// A custom field definition with a declared value format. Raw group keys
/// coming back from the data store are cast through this before they are
/// shown to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomField {
    pub name: String,
    pub format: FieldFormat,
}

/// Value format of a custom field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFormat {
    Text,
    Int,
    Bool,
    /// Enumerated values stored as ids, displayed as labels: (id, label).
    Enumeration(Vec<(String, String)>),
}

impl CustomField {
    /// Cast a raw stored value into its domain representation.
    ///
    /// Enumeration ids resolve to their label; unknown ids pass through
    /// unchanged. Booleans are stored as `"1"`/`"0"`.
    pub fn cast_value(&self, raw: &str) -> String {
        match &self.format {
            FieldFormat::Text | FieldFormat::Int => raw.to_string(),
            FieldFormat::Bool => {
                if raw == "1" || raw == "true" {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            FieldFormat::Enumeration(values) => values
                .iter()
                .find(|(id, _)| id == raw)
                .map(|(_, label)| label.clone())
                .unwrap_or_else(|| raw.to_string()),
        }
    }
}
