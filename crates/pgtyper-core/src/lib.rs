//! Schema-to-type mapping engine for pgtyper.
//!
//! Turns catalog rows (enum members and column descriptors) into TypeScript
//! declarations: one enum per database enum, a table registry, a map from
//! table names to record types, and one record type per table. Naming and
//! typing decisions can be overridden per table, column, storage type, or
//! through a wildcard hook that runs last.

pub mod catalog;
pub mod emit;
pub mod error;
pub mod filter;
pub mod generate;
pub mod naming;
pub mod options;
pub mod overrides;
pub mod types;

pub use catalog::{Catalog, ColumnDescriptor, EnumEntry};
pub use emit::{Document, Emitter};
pub use error::{BoxError, Error, Result};
pub use filter::{CatalogFilter, DEFAULT_SCHEMA, ListSpec};
pub use generate::{GenerationReport, build_document, generate};
pub use naming::{NameResolver, TableNames, pascal_case};
pub use options::GenerateOptions;
pub use overrides::{
    NameCategory, NameOverrides, Override, OverrideMap, ResolverResult, TypeOverrides, WILDCARD,
};
pub use types::{TypeMapper, TypeOverrideTiers};
