//! Caller-supplied overrides for emitted names and types.
//!
//! Both maps share one shape: keys are exact names (`table`, `table.column`,
//! `column`, a storage type tag) or the wildcard `*`, and each entry is either
//! a literal replacement or a resolver callable. A resolver returning
//! `Ok(None)` has no opinion and lets resolution continue.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::catalog::ColumnDescriptor;
use crate::error::{BoxError, Error, Result};

/// Key of the override that runs after every other tier.
pub const WILDCARD: &str = "*";

/// Outcome of a resolver callable.
pub type ResolverResult = std::result::Result<Option<String>, BoxError>;

/// Name resolver: `(column, category, value so far)`.
pub type NameResolverFn =
    dyn Fn(&ColumnDescriptor, NameCategory, &str) -> ResolverResult + Send + Sync;

/// Type resolver: `(column, type so far)`.
pub type TypeResolverFn = dyn Fn(&ColumnDescriptor, &str) -> ResolverResult + Send + Sync;

/// Which identifier a name override is resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameCategory {
    Table,
    Schema,
    Column,
}

impl NameCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            NameCategory::Table => "table",
            NameCategory::Schema => "schema",
            NameCategory::Column => "column",
        }
    }
}

impl fmt::Display for NameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single override entry.
pub enum Override<F: ?Sized> {
    Literal(String),
    Resolver(Arc<F>),
}

impl<F: ?Sized> Override<F> {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Override::Literal(value) => Some(value),
            Override::Resolver(_) => None,
        }
    }
}

impl<F: ?Sized> Clone for Override<F> {
    fn clone(&self) -> Self {
        match self {
            Override::Literal(value) => Override::Literal(value.clone()),
            Override::Resolver(resolver) => Override::Resolver(Arc::clone(resolver)),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Override<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Override::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Override::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl Override<NameResolverFn> {
    pub(crate) fn resolve_name(
        &self,
        key: &str,
        column: &ColumnDescriptor,
        category: NameCategory,
        current: &str,
    ) -> Result<Option<String>> {
        match self {
            Override::Literal(value) => Ok(Some(value.clone())),
            Override::Resolver(resolver) => {
                resolver(column, category, current).map_err(|err| Error::override_failed(key, err))
            }
        }
    }
}

impl Override<TypeResolverFn> {
    pub(crate) fn resolve_type(
        &self,
        key: &str,
        column: &ColumnDescriptor,
        current: &str,
    ) -> Result<Option<String>> {
        match self {
            Override::Literal(value) => Ok(Some(value.clone())),
            Override::Resolver(resolver) => {
                resolver(column, current).map_err(|err| Error::override_failed(key, err))
            }
        }
    }
}

/// Overrides keyed by exact name, plus the optional wildcard.
pub struct OverrideMap<F: ?Sized> {
    entries: BTreeMap<String, Override<F>>,
}

/// Overrides for table, schema, column and enum names.
pub type NameOverrides = OverrideMap<NameResolverFn>;

/// Overrides for emitted column types.
pub type TypeOverrides = OverrideMap<TypeResolverFn>;

impl<F: ?Sized> OverrideMap<F> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: Override<F>) {
        self.entries.insert(key.into(), entry);
    }

    /// Add a literal replacement.
    pub fn with_literal(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Override::Literal(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Override<F>> {
        self.entries.get(key)
    }

    pub fn wildcard(&self) -> Option<&Override<F>> {
        self.entries.get(WILDCARD)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NameOverrides {
    /// Add a resolver callable.
    pub fn with_resolver<R>(mut self, key: impl Into<String>, resolver: R) -> Self
    where
        R: Fn(&ColumnDescriptor, NameCategory, &str) -> ResolverResult + Send + Sync + 'static,
    {
        let resolver: Arc<NameResolverFn> = Arc::new(resolver);
        self.insert(key, Override::Resolver(resolver));
        self
    }
}

impl TypeOverrides {
    /// Add a resolver callable.
    pub fn with_resolver<R>(mut self, key: impl Into<String>, resolver: R) -> Self
    where
        R: Fn(&ColumnDescriptor, &str) -> ResolverResult + Send + Sync + 'static,
    {
        let resolver: Arc<TypeResolverFn> = Arc::new(resolver);
        self.insert(key, Override::Resolver(resolver));
        self
    }
}

impl<F: ?Sized> Default for OverrideMap<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> Clone for OverrideMap<F> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for OverrideMap<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<F: ?Sized> FromIterator<(String, String)> for OverrideMap<F> {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key, Override::Literal(value)))
                .collect(),
        }
    }
}
