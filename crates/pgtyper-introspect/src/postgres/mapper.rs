use pgtyper_core::{ColumnDescriptor, EnumEntry};

use super::queries::{RawColumn, RawEnumMember};

pub fn map_enums(raw: Vec<RawEnumMember>) -> Vec<EnumEntry> {
    raw.into_iter()
        .map(|member| EnumEntry {
            key: member.name,
            value: member.label,
        })
        .collect()
}

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnDescriptor> {
    raw.into_iter()
        .map(|col| ColumnDescriptor {
            schema: col.table_schema,
            table: col.table_name,
            column: col.column_name,
            nullable: col.is_nullable,
            default: col.column_default,
            data_type: col.data_type,
            udt: col.udt_name,
        })
        .collect()
}
