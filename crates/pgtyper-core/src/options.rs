use crate::error::{Error, Result};
use crate::filter::{CatalogFilter, DEFAULT_SCHEMA, ListSpec};
use crate::overrides::{NameOverrides, TypeOverrides};
use crate::types::TypeOverrideTiers;

pub const DEFAULT_TABLES_ENUM_NAME: &str = "Table";
pub const DEFAULT_TABLES_TYPE_NAME: &str = "Tables";

/// Options that control one generation pass.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Name overrides for tables, schemas, columns and enums.
    pub overrides: NameOverrides,
    /// Type overrides for columns.
    pub type_overrides: TypeOverrides,
    pub type_tiers: TypeOverrideTiers,
    /// Raw text written after the banner.
    pub prefix: Option<String>,
    /// Raw text written after all declarations.
    pub suffix: Option<String>,
    /// Schemas to include; entries prefixed with `!` are excluded.
    pub schema: ListSpec,
    /// Tables to omit regardless of schema.
    pub exclude: ListSpec,
    pub tables_enum_name: String,
    pub tables_type_name: String,
    /// Emit the runtime-name-to-type map after the table registry.
    pub emit_table_map: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            overrides: NameOverrides::new(),
            type_overrides: TypeOverrides::new(),
            type_tiers: TypeOverrideTiers::default(),
            prefix: None,
            suffix: None,
            schema: ListSpec::List(vec![DEFAULT_SCHEMA.to_string()]),
            exclude: ListSpec::default(),
            tables_enum_name: DEFAULT_TABLES_ENUM_NAME.to_string(),
            tables_type_name: DEFAULT_TABLES_TYPE_NAME.to_string(),
            emit_table_map: true,
        }
    }
}

impl GenerateOptions {
    /// Catalog selection derived from `schema` and `exclude`.
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter::new(&self.schema, &self.exclude)
    }

    /// Reject options that cannot produce valid declarations.
    pub fn validate(&self) -> Result<()> {
        if self.tables_enum_name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tables enum name must not be empty".to_string(),
            ));
        }
        if self.emit_table_map && self.tables_type_name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tables type name must not be empty".to_string(),
            ));
        }
        if self.emit_table_map && self.tables_enum_name == self.tables_type_name {
            return Err(Error::InvalidConfig(format!(
                "tables enum and tables type share the name `{}`",
                self.tables_enum_name
            )));
        }
        Ok(())
    }
}
