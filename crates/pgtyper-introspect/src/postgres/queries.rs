use sqlx::PgPool;

use pgtyper_core::{CatalogFilter, Result};

#[derive(Debug, sqlx::FromRow)]
pub struct RawEnumMember {
    pub name: String,
    pub label: String,
}

pub async fn list_enum_members(pool: &PgPool) -> Result<Vec<RawEnumMember>> {
    sqlx::query_as::<_, RawEnumMember>(
        r#"
        select
          t.typname::text as name,
          e.enumlabel::text as label
        from pg_type t
        join pg_enum e on e.enumtypid = t.oid
        order by t.typname, e.enumsortorder
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|err| pgtyper_core::Error::Db(err.to_string()))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    pub data_type: String,
    pub udt_name: String,
}

pub async fn list_columns(pool: &PgPool, filter: &CatalogFilter) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          c.table_schema::text as table_schema,
          c.table_name::text as table_name,
          c.column_name::text as column_name,
          (c.is_nullable = 'YES') as is_nullable,
          c.column_default::text as column_default,
          c.data_type::text as data_type,
          c.udt_name::text as udt_name
        from information_schema.columns c
        where c.table_schema::text = any($1)
          and not (c.table_schema::text = any($2))
          and not (c.table_name::text = any($3))
        order by c.table_schema, c.table_name, c.ordinal_position
        "#,
    )
    .bind(&filter.include_schemas)
    .bind(&filter.exclude_schemas)
    .bind(&filter.exclude_tables)
    .fetch_all(pool)
    .await
    .map_err(|err| pgtyper_core::Error::Db(err.to_string()))
}
