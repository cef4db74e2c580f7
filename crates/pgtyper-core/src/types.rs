use std::collections::BTreeMap;

use crate::catalog::ColumnDescriptor;
use crate::error::Result;
use crate::overrides::{TypeOverrides, WILDCARD};

pub const STRING: &str = "string";
pub const NUMBER: &str = "number";
pub const BOOLEAN: &str = "boolean";
pub const DATE: &str = "Date";
pub const JSON_OBJECT: &str = "Record<string, unknown>";
pub const JSON_ARRAY: &str = "unknown[]";
pub const UNKNOWN: &str = "unknown";
pub const BUFFER: &str = "Buffer";
pub const INTERVAL: &str = "IPostgresInterval";

/// Broad family of a built-in storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Boolean,
    String,
    Number,
    DateTime,
    Json,
    Binary,
    Interval,
}

/// Classify a storage tag (`int4`, `_text` element `text`) or a generic
/// catalog type name (`integer`, `character varying`).
pub fn storage_kind(tag: &str) -> Option<StorageKind> {
    let kind = match tag {
        "bool" | "boolean" => StorageKind::Boolean,
        "text" | "citext" | "money" | "numeric" | "int8" | "bigint" | "char" | "character"
        | "bpchar" | "varchar" | "character varying" | "time" | "timetz"
        | "time without time zone" | "time with time zone" | "tsquery" | "tsvector" | "uuid"
        | "xml" | "cidr" | "inet" | "macaddr" => StorageKind::String,
        "smallint" | "integer" | "int" | "int2" | "int4" | "real" | "float" | "float4"
        | "float8" | "double precision" | "oid" => StorageKind::Number,
        "date" | "timestamp" | "timestamptz" | "timestamp without time zone"
        | "timestamp with time zone" => StorageKind::DateTime,
        "json" | "jsonb" => StorageKind::Json,
        "bytea" => StorageKind::Binary,
        "interval" => StorageKind::Interval,
        _ => return None,
    };
    Some(kind)
}

/// JSON columns are typed from the shape of their default value.
pub fn json_type(default: Option<&str>) -> &'static str {
    match default {
        Some(value) if value.starts_with("'{") => JSON_OBJECT,
        Some(value) if value.starts_with("'[") => JSON_ARRAY,
        _ => UNKNOWN,
    }
}

/// Switches for the three type override tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeOverrideTiers {
    /// Honor `table.column` keys.
    pub table_column: bool,
    /// Honor `column` keys.
    pub column: bool,
    /// Honor storage type keys (`int8`, `jsonb`, ...).
    pub storage_type: bool,
}

impl Default for TypeOverrideTiers {
    fn default() -> Self {
        Self {
            table_column: true,
            column: true,
            storage_type: true,
        }
    }
}

/// Maps column descriptors to emitted type expressions.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    enum_names: &'a BTreeMap<String, String>,
    overrides: &'a TypeOverrides,
    tiers: TypeOverrideTiers,
}

impl<'a> TypeMapper<'a> {
    /// `enum_names` maps catalog enum names to their resolved declaration names.
    pub fn new(
        enum_names: &'a BTreeMap<String, String>,
        overrides: &'a TypeOverrides,
        tiers: TypeOverrideTiers,
    ) -> Self {
        Self {
            enum_names,
            overrides,
            tiers,
        }
    }

    /// Full type expression for a column, wildcard hook included.
    pub fn map(&self, column: &ColumnDescriptor) -> Result<String> {
        let base = self.base_type(column);
        let mut expr = self.override_type(column, base)?;

        if column.is_array() {
            expr.push_str("[]");
        }
        if column.nullable {
            expr.push_str(" | null");
        }

        match self.overrides.wildcard() {
            Some(entry) => Ok(entry
                .resolve_type(WILDCARD, column, &expr)?
                .unwrap_or(expr)),
            None => Ok(expr),
        }
    }

    /// Type derived from the catalog alone, before overrides and suffixes.
    pub fn base_type(&self, column: &ColumnDescriptor) -> String {
        let storage = column.storage_type();

        if let Some(kind) = storage_kind(storage) {
            return self.kind_type(kind, column).to_string();
        }
        if let Some(name) = self.enum_names.get(storage) {
            return name.clone();
        }
        match storage_kind(&column.data_type) {
            Some(kind) => self.kind_type(kind, column).to_string(),
            None => UNKNOWN.to_string(),
        }
    }

    fn kind_type(&self, kind: StorageKind, column: &ColumnDescriptor) -> &'static str {
        match kind {
            StorageKind::Boolean => BOOLEAN,
            StorageKind::String => STRING,
            StorageKind::Number => NUMBER,
            StorageKind::DateTime => DATE,
            StorageKind::Json => json_type(column.default.as_deref()),
            StorageKind::Binary => BUFFER,
            StorageKind::Interval => INTERVAL,
        }
    }

    fn override_type(&self, column: &ColumnDescriptor, base: String) -> Result<String> {
        let tiers = [
            (self.tiers.table_column, column.qualified_column()),
            (self.tiers.column, column.column.clone()),
            (self.tiers.storage_type, column.storage_type().to_string()),
        ];

        for (enabled, key) in tiers {
            if !enabled || key == WILDCARD {
                continue;
            }
            if let Some(entry) = self.overrides.get(&key) {
                if let Some(replacement) = entry.resolve_type(&key, column, &base)? {
                    return Ok(replacement);
                }
            }
        }

        Ok(base)
    }
}
