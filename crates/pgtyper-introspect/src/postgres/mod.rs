use sqlx::PgPool;

use pgtyper_core::{Catalog, CatalogFilter, ColumnDescriptor, EnumEntry, Result};

mod mapper;
mod queries;

/// Catalog reader for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a new catalog reader using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Catalog for PostgresCatalog {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn list_enums(&self) -> Result<Vec<EnumEntry>> {
        let raw = queries::list_enum_members(&self.pool).await?;
        tracing::debug!(event = "enum_query_finished", rows = raw.len());
        Ok(mapper::map_enums(raw))
    }

    async fn list_columns(&self, filter: &CatalogFilter) -> Result<Vec<ColumnDescriptor>> {
        let raw = queries::list_columns(&self.pool, filter).await?;
        tracing::debug!(
            event = "column_query_finished",
            rows = raw.len(),
            include = ?filter.include_schemas,
            exclude = ?filter.exclude_schemas
        );
        Ok(mapper::map_columns(raw))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
