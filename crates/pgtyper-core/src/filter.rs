use serde::{Deserialize, Serialize};

use crate::catalog::ColumnDescriptor;

/// Schema used when the caller does not name one.
pub const DEFAULT_SCHEMA: &str = "public";

/// A list given either natively or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListSpec {
    Joined(String),
    List(Vec<String>),
}

impl ListSpec {
    /// Trimmed, non-empty entries in the order given.
    pub fn entries(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            ListSpec::Joined(value) => value.split(',').collect(),
            ListSpec::List(values) => values.iter().flat_map(|value| value.split(',')).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for ListSpec {
    fn default() -> Self {
        ListSpec::List(Vec::new())
    }
}

impl From<&str> for ListSpec {
    fn from(value: &str) -> Self {
        ListSpec::Joined(value.to_string())
    }
}

impl From<Vec<String>> for ListSpec {
    fn from(values: Vec<String>) -> Self {
        ListSpec::List(values)
    }
}

impl From<Vec<&str>> for ListSpec {
    fn from(values: Vec<&str>) -> Self {
        ListSpec::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Schema and table selection handed to the catalog query.
///
/// Include and exclude sets are kept apart so the query can apply both; a
/// schema named in both sets is excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    pub include_schemas: Vec<String>,
    pub exclude_schemas: Vec<String>,
    pub exclude_tables: Vec<String>,
}

impl CatalogFilter {
    /// Build a filter from a schema list (entries prefixed with `!` exclude)
    /// and a list of table names to drop. An empty schema list selects
    /// `public`; a list holding only exclusions selects nothing.
    pub fn new(schema: &ListSpec, exclude: &ListSpec) -> Self {
        let mut include_schemas = Vec::new();
        let mut exclude_schemas = Vec::new();

        let entries = schema.entries();
        if entries.is_empty() {
            include_schemas.push(DEFAULT_SCHEMA.to_string());
        }
        for entry in entries {
            match entry.strip_prefix('!') {
                Some(name) => push_unique(&mut exclude_schemas, name.trim()),
                None => push_unique(&mut include_schemas, &entry),
            }
        }

        let mut exclude_tables = Vec::new();
        for table in exclude.entries() {
            push_unique(&mut exclude_tables, &table);
        }

        Self {
            include_schemas,
            exclude_schemas,
            exclude_tables,
        }
    }

    /// Whether a column belongs to a selected table.
    pub fn allows(&self, column: &ColumnDescriptor) -> bool {
        self.include_schemas.contains(&column.schema)
            && !self.exclude_schemas.contains(&column.schema)
            && !self.exclude_tables.contains(&column.table)
    }

    /// Drop every column outside the selection, keeping catalog order.
    pub fn apply(&self, columns: Vec<ColumnDescriptor>) -> Vec<ColumnDescriptor> {
        columns
            .into_iter()
            .filter(|column| self.allows(column))
            .collect()
    }
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self::new(&ListSpec::default(), &ListSpec::default())
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !list.iter().any(|item| item == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(schema: &str, table: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            schema: schema.to_string(),
            table: table.to_string(),
            column: "id".to_string(),
            nullable: false,
            default: None,
            data_type: "integer".to_string(),
            udt: "int4".to_string(),
        }
    }

    #[test]
    fn defaults_to_public_schema() {
        let filter = CatalogFilter::default();
        assert_eq!(filter.include_schemas, vec!["public"]);
        assert!(filter.exclude_schemas.is_empty());
        assert!(filter.exclude_tables.is_empty());
    }

    #[test]
    fn splits_comma_separated_entries() {
        let spec = ListSpec::from(" public , log,!secret ");
        assert_eq!(spec.entries(), vec!["public", "log", "!secret"]);

        let filter = CatalogFilter::new(&spec, &ListSpec::from("migrations, knex_lock"));
        assert_eq!(filter.include_schemas, vec!["public", "log"]);
        assert_eq!(filter.exclude_schemas, vec!["secret"]);
        assert_eq!(filter.exclude_tables, vec!["migrations", "knex_lock"]);
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let filter = CatalogFilter::new(
            &ListSpec::from(vec!["public", "audit", "!audit"]),
            &ListSpec::default(),
        );
        assert!(filter.allows(&column("public", "user")));
        assert!(!filter.allows(&column("audit", "event")));
    }

    #[test]
    fn excludes_tables_in_every_schema() {
        let filter = CatalogFilter::new(
            &ListSpec::from(vec!["public", "log"]),
            &ListSpec::from(vec!["migrations"]),
        );
        let kept = filter.apply(vec![
            column("log", "migrations"),
            column("log", "messages"),
            column("public", "migrations"),
            column("secret", "keys"),
        ]);
        let tables: Vec<_> = kept
            .iter()
            .map(|col| format!("{}.{}", col.schema, col.table))
            .collect();
        assert_eq!(tables, vec!["log.messages"]);
    }

    #[test]
    fn only_exclusions_select_no_schema() {
        let filter = CatalogFilter::new(&ListSpec::from("!secret"), &ListSpec::default());
        assert!(filter.include_schemas.is_empty());
        assert_eq!(filter.exclude_schemas, vec!["secret"]);
        assert!(!filter.allows(&column("public", "user")));
        assert!(!filter.allows(&column("secret", "keys")));
    }

    #[test]
    fn empty_schema_list_selects_public() {
        let filter = CatalogFilter::new(&ListSpec::from(" , "), &ListSpec::default());
        assert_eq!(filter.include_schemas, vec!["public"]);
        assert!(filter.allows(&column("public", "user")));
    }
}
