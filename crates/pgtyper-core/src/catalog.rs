use async_trait::async_trait;

use crate::error::Result;
use crate::filter::CatalogFilter;

/// One member label of a database enum type.
///
/// Rows sharing a `key` belong to the same enum and arrive in the enum's
/// declared member order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub key: String,
    pub value: String,
}

impl EnumEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Column metadata as reported by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub nullable: bool,
    pub default: Option<String>,
    /// Generic catalog type (`ARRAY`, `USER-DEFINED`, `integer`, ...).
    pub data_type: String,
    /// Underlying storage type name (`_text`, `int4`, an enum name, ...).
    pub udt: String,
}

impl ColumnDescriptor {
    /// Whether the catalog reports this column as an array.
    pub fn is_array(&self) -> bool {
        self.data_type == "ARRAY"
    }

    /// Storage tag of the column, or of its element type for arrays.
    pub fn storage_type(&self) -> &str {
        if self.is_array() {
            self.udt.strip_prefix('_').unwrap_or(&self.udt)
        } else {
            &self.udt
        }
    }

    /// `table.column`, the key used by the most specific override tier.
    pub fn qualified_column(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

/// Source of catalog metadata for one generation pass.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// All enum members visible to the connection, ordered by enum name then
    /// member definition order.
    async fn list_enums(&self) -> Result<Vec<EnumEntry>>;

    /// Columns of the tables selected by `filter`, ordered by schema, table,
    /// then ordinal position.
    async fn list_columns(&self, filter: &CatalogFilter) -> Result<Vec<ColumnDescriptor>>;

    /// Release the underlying connection.
    async fn close(&self) -> Result<()>;
}
