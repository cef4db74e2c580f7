use heck::ToUpperCamelCase;

use crate::catalog::ColumnDescriptor;
use crate::error::Result;
use crate::filter::DEFAULT_SCHEMA;
use crate::overrides::{NameCategory, NameOverrides, WILDCARD};

/// PascalCase a catalog identifier (`identity_provider` -> `IdentityProvider`).
pub fn pascal_case(raw: &str) -> String {
    raw.to_upper_camel_case()
}

/// PascalCase an enum label after replacing `.` and `-` with `_`.
pub fn enum_member_case(label: &str) -> String {
    pascal_case(&label.replace(['.', '-'], "_"))
}

/// Whether `name` can be emitted as a bare property key
/// (`^[A-Za-z_$][A-Za-z0-9_$]*$`).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
        }
        _ => false,
    }
}

/// Property key for a record field: bare when valid, quoted otherwise.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// Single-quoted string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Identifiers derived for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Composite type name (`LogMessages`, `User`).
    pub type_name: String,
    /// Runtime string naming the table (`log.messages`, `user`).
    pub runtime: String,
}

/// Derives emitted identifiers, consulting the name override map.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    overrides: &'a NameOverrides,
}

impl<'a> NameResolver<'a> {
    pub fn new(overrides: &'a NameOverrides) -> Self {
        Self { overrides }
    }

    pub fn table(&self, column: &ColumnDescriptor) -> Result<String> {
        self.resolve(column, NameCategory::Table)
    }

    pub fn schema(&self, column: &ColumnDescriptor) -> Result<String> {
        self.resolve(column, NameCategory::Schema)
    }

    pub fn column(&self, column: &ColumnDescriptor) -> Result<String> {
        self.resolve(column, NameCategory::Column)
    }

    /// Composite type name and runtime string for the column's table.
    pub fn table_names(&self, column: &ColumnDescriptor) -> Result<TableNames> {
        let table = self.table(column)?;
        let schema = self.schema(column)?;

        let default_schema = schema == DEFAULT_SCHEMA
            || (column.schema == DEFAULT_SCHEMA && schema == pascal_case(DEFAULT_SCHEMA));

        let type_name = if default_schema {
            table
        } else {
            format!("{}{}", pascal_case(&schema), table)
        };

        let runtime = if column.schema == DEFAULT_SCHEMA {
            column.table.clone()
        } else {
            format!("{}.{}", column.schema, column.table)
        };

        Ok(TableNames { type_name, runtime })
    }

    /// Name of an enum declaration. Only literal overrides apply here.
    pub fn enum_name(&self, key: &str) -> String {
        self.literal(key).unwrap_or_else(|| pascal_case(key))
    }

    /// Name of one enum member, overridable with `enum.label`.
    pub fn enum_member(&self, key: &str, label: &str) -> String {
        self.literal(&format!("{key}.{label}"))
            .unwrap_or_else(|| enum_member_case(label))
    }

    fn literal(&self, key: &str) -> Option<String> {
        self.overrides
            .get(key)
            .and_then(|entry| entry.as_literal())
            .map(str::to_string)
    }

    fn resolve(&self, column: &ColumnDescriptor, category: NameCategory) -> Result<String> {
        let (default, keys) = match category {
            NameCategory::Column => (
                column.column.clone(),
                vec![column.qualified_column(), column.column.clone()],
            ),
            NameCategory::Table => (pascal_case(&column.table), vec![column.table.clone()]),
            NameCategory::Schema => (pascal_case(&column.schema), vec![column.schema.clone()]),
        };

        let mut value = None;
        for key in keys.iter().filter(|key| key.as_str() != WILDCARD) {
            if let Some(entry) = self.overrides.get(key) {
                if let Some(resolved) = entry.resolve_name(key, column, category, &default)? {
                    tracing::trace!(
                        event = "name_override_applied",
                        category = %category,
                        key = %key
                    );
                    value = Some(resolved);
                    break;
                }
            }
        }
        let value = value.unwrap_or(default);

        match self.overrides.wildcard() {
            Some(entry) => Ok(entry
                .resolve_name(WILDCARD, column, category, &value)?
                .unwrap_or(value)),
            None => Ok(value),
        }
    }
}
