//! TypeScript rendering of resolved declarations.
//!
//! Every block is rendered to a string ending in a newline and written as a
//! unit; consecutive blocks are separated by exactly one blank line.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::naming::{property_key, quote};

/// Banner written at the top of every generated file.
pub const BANNER: &str = "// This file was generated by pgtyper. Do not edit it by hand.\n\
// Regenerate it from the database schema instead.\n";

/// One `Name = 'label'` member of an enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: String,
}

/// An enum declaration for one database enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMember>,
}

/// One property of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: String,
}

/// A record type for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDecl {
    pub type_name: String,
    pub runtime: String,
    pub fields: Vec<FieldDecl>,
}

/// Everything one generated file contains, in emission order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub prefix: Option<String>,
    pub enums: Vec<EnumDecl>,
    pub tables_enum_name: String,
    pub tables_type_name: String,
    pub emit_table_map: bool,
    pub tables: Vec<TableDecl>,
    pub suffix: Option<String>,
}

pub fn render_enum(decl: &EnumDecl) -> String {
    let mut out = format!("export enum {} {{\n", decl.name);
    for member in &decl.members {
        out.push_str(&format!("  {} = {},\n", member.name, quote(&member.value)));
    }
    out.push_str("}\n");
    out
}

/// Registry enum naming every emitted table.
pub fn render_table_registry(name: &str, tables: &[TableDecl]) -> String {
    let mut out = format!("export enum {name} {{\n");
    for table in tables {
        out.push_str(&format!("  {} = {},\n", table.type_name, quote(&table.runtime)));
    }
    out.push_str("}\n");
    out
}

/// Map from each table's runtime string to its record type.
pub fn render_table_map(name: &str, tables: &[TableDecl]) -> String {
    let mut out = format!("export type {name} = {{\n");
    for table in tables {
        out.push_str(&format!("  {}: {};\n", quote(&table.runtime), table.type_name));
    }
    out.push_str("};\n");
    out
}

pub fn render_record(decl: &TableDecl) -> String {
    let mut out = format!("export type {} = {{\n", decl.type_name);
    for field in &decl.fields {
        out.push_str(&format!("  {}: {};\n", property_key(&field.name), field.ty));
    }
    out.push_str("};\n");
    out
}

/// Writes blocks to the output sink.
pub struct Emitter<'w, W: ?Sized> {
    out: &'w mut W,
    blocks: usize,
}

impl<'w, W> Emitter<'w, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    pub fn new(out: &'w mut W) -> Self {
        Self { out, blocks: 0 }
    }

    /// Number of blocks written so far.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Write one block, preceded by a blank line unless it is the first.
    /// Trailing line breaks are normalised to a single newline.
    pub async fn block(&mut self, text: &str) -> Result<()> {
        if self.blocks > 0 {
            self.out.write_all(b"\n").await?;
        }
        let body = text.trim_end_matches(['\n', '\r']);
        self.out.write_all(body.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.blocks += 1;
        Ok(())
    }

    /// Write a whole document in the fixed block order.
    pub async fn document(&mut self, doc: &Document) -> Result<()> {
        self.block(BANNER).await?;

        if let Some(prefix) = doc.prefix.as_deref().filter(|text| !text.is_empty()) {
            self.block(prefix).await?;
        }

        for decl in &doc.enums {
            self.block(&render_enum(decl)).await?;
        }

        if !doc.tables.is_empty() {
            self.block(&render_table_registry(&doc.tables_enum_name, &doc.tables))
                .await?;
            if doc.emit_table_map {
                self.block(&render_table_map(&doc.tables_type_name, &doc.tables))
                    .await?;
            }
            for table in &doc.tables {
                self.block(&render_record(table)).await?;
            }
        }

        if let Some(suffix) = doc.suffix.as_deref().filter(|text| !text.is_empty()) {
            self.block(suffix).await?;
        }

        self.out.flush().await?;
        Ok(())
    }
}
