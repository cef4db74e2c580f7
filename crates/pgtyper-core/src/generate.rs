use std::collections::{BTreeMap, HashMap};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::catalog::{Catalog, ColumnDescriptor, EnumEntry};
use crate::emit::{Document, Emitter, EnumDecl, EnumMember, FieldDecl, TableDecl};
use crate::error::{Error, Result};
use crate::naming::NameResolver;
use crate::options::GenerateOptions;
use crate::types::TypeMapper;

/// Counts describing one finished generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub enums: usize,
    pub tables: usize,
    pub columns: usize,
}

/// Read the catalog and write type declarations to `output`.
///
/// Takes ownership of both resources: the output is shut down and the catalog
/// closed exactly once, whether generation succeeds or fails. On error the
/// output is incomplete and should be discarded.
pub async fn generate<C, W>(
    catalog: C,
    mut output: W,
    options: &GenerateOptions,
) -> Result<GenerationReport>
where
    C: Catalog,
    W: AsyncWrite + Unpin,
{
    let result = run(&catalog, &mut output, options).await;

    let shutdown = output.shutdown().await.map_err(Error::from);
    let closed = catalog.close().await;

    if let Err(err) = &result {
        tracing::warn!(event = "generation_failed", engine = catalog.engine(), error = %err);
    }

    let report = result?;
    shutdown?;
    closed?;
    Ok(report)
}

async fn run<C, W>(catalog: &C, output: &mut W, options: &GenerateOptions) -> Result<GenerationReport>
where
    C: Catalog + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    options.validate()?;
    let filter = options.filter();

    let enums = catalog.list_enums().await?;
    tracing::debug!(event = "catalog_enums_loaded", rows = enums.len());

    let columns = filter.apply(catalog.list_columns(&filter).await?);
    tracing::debug!(
        event = "catalog_columns_loaded",
        rows = columns.len(),
        schemas = ?filter.include_schemas
    );

    let document = build_document(&enums, &columns, options)?;
    let report = GenerationReport {
        enums: document.enums.len(),
        tables: document.tables.len(),
        columns: columns.len(),
    };

    Emitter::new(output).document(&document).await?;
    tracing::debug!(
        event = "generation_finished",
        enums = report.enums,
        tables = report.tables,
        columns = report.columns
    );

    Ok(report)
}

/// Resolve names and types for catalog rows that already passed the filter.
pub fn build_document(
    enums: &[EnumEntry],
    columns: &[ColumnDescriptor],
    options: &GenerateOptions,
) -> Result<Document> {
    let names = NameResolver::new(&options.overrides);

    let enum_decls = group_enums(enums, &names);
    let enum_names: BTreeMap<String, String> = group_keys(enums)
        .into_iter()
        .zip(enum_decls.iter())
        .map(|(key, decl)| (key.to_string(), decl.name.clone()))
        .collect();

    let types = TypeMapper::new(&enum_names, &options.type_overrides, options.type_tiers);

    let mut tables: Vec<TableDecl> = Vec::new();
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();

    for column in columns {
        let key = (column.schema.as_str(), column.table.as_str());
        let index = match positions.get(&key) {
            Some(index) => *index,
            None => {
                let table_names = names.table_names(column)?;
                tables.push(TableDecl {
                    type_name: table_names.type_name,
                    runtime: table_names.runtime,
                    fields: Vec::new(),
                });
                positions.insert(key, tables.len() - 1);
                tables.len() - 1
            }
        };

        tables[index].fields.push(FieldDecl {
            name: names.column(column)?,
            ty: types.map(column)?,
        });
    }

    Ok(Document {
        prefix: options.prefix.clone(),
        enums: enum_decls,
        tables_enum_name: options.tables_enum_name.clone(),
        tables_type_name: options.tables_type_name.clone(),
        emit_table_map: options.emit_table_map,
        tables,
        suffix: options.suffix.clone(),
    })
}

/// Distinct enum keys in first-appearance order.
fn group_keys(enums: &[EnumEntry]) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    for entry in enums {
        if !keys.contains(&entry.key.as_str()) {
            keys.push(&entry.key);
        }
    }
    keys
}

fn group_enums(enums: &[EnumEntry], names: &NameResolver<'_>) -> Vec<EnumDecl> {
    group_keys(enums)
        .into_iter()
        .map(|key| EnumDecl {
            name: names.enum_name(key),
            members: enums
                .iter()
                .filter(|entry| entry.key == key)
                .map(|entry| EnumMember {
                    name: names.enum_member(key, &entry.value),
                    value: entry.value.clone(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::NameOverrides;

    fn column(schema: &str, table: &str, name: &str, udt: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            schema: schema.to_string(),
            table: table.to_string(),
            column: name.to_string(),
            nullable: false,
            default: None,
            data_type: "USER-DEFINED".to_string(),
            udt: udt.to_string(),
        }
    }

    #[test]
    fn groups_non_contiguous_enum_rows() {
        let rows = vec![
            EnumEntry::new("mood", "happy"),
            EnumEntry::new("color", "red"),
            EnumEntry::new("mood", "sad"),
        ];
        let overrides = NameOverrides::new();
        let decls = group_enums(&rows, &NameResolver::new(&overrides));

        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "Mood");
        let labels: Vec<_> = decls[0].members.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(labels, vec!["happy", "sad"]);
        assert_eq!(decls[1].name, "Color");
    }

    #[test]
    fn enum_columns_use_overridden_enum_name() {
        let rows = vec![EnumEntry::new("mood", "happy")];
        let options = GenerateOptions {
            overrides: NameOverrides::new().with_literal("mood", "Feeling"),
            ..GenerateOptions::default()
        };
        let doc = build_document(
            &rows,
            &[column("public", "person", "current_mood", "mood")],
            &options,
        )
        .unwrap();

        assert_eq!(doc.enums[0].name, "Feeling");
        assert_eq!(doc.tables[0].fields[0].ty, "Feeling");
    }

    #[test]
    fn keeps_tables_in_first_appearance_order() {
        let columns = vec![
            column("public", "user", "id", "int4"),
            column("log", "messages", "id", "int4"),
            column("public", "user", "name", "text"),
        ];
        let doc = build_document(&[], &columns, &GenerateOptions::default()).unwrap();

        let order: Vec<_> = doc.tables.iter().map(|t| t.type_name.as_str()).collect();
        assert_eq!(order, vec!["User", "LogMessages"]);
        let fields: Vec<_> = doc.tables[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["id", "name"]);
    }
}
