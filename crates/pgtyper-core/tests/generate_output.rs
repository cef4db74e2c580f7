use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use pgtyper_core::{
    Catalog, CatalogFilter, ColumnDescriptor, EnumEntry, Error, GenerateOptions, ListSpec,
    NameOverrides, Result, TypeOverrides, generate,
};
use tokio::io::AsyncWrite;

#[derive(Default, Clone)]
struct Counters {
    closes: Arc<AtomicUsize>,
    shutdowns: Arc<AtomicUsize>,
}

struct MemoryCatalog {
    enums: Vec<EnumEntry>,
    columns: Vec<ColumnDescriptor>,
    fail_columns: bool,
    counters: Counters,
}

#[async_trait]
impl Catalog for MemoryCatalog {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn list_enums(&self) -> Result<Vec<EnumEntry>> {
        Ok(self.enums.clone())
    }

    async fn list_columns(&self, _filter: &CatalogFilter) -> Result<Vec<ColumnDescriptor>> {
        if self.fail_columns {
            return Err(Error::Db("permission denied for schema log".to_string()));
        }
        Ok(self.columns.clone())
    }

    async fn close(&self) -> Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct RecordingSink {
    buffer: Arc<Mutex<Vec<u8>>>,
    counters: Counters,
}

impl AsyncWrite for RecordingSink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}

fn column(
    schema: &str,
    table: &str,
    name: &str,
    data_type: &str,
    udt: &str,
    nullable: bool,
    default: Option<&str>,
) -> ColumnDescriptor {
    ColumnDescriptor {
        schema: schema.to_string(),
        table: table.to_string(),
        column: name.to_string(),
        nullable,
        default: default.map(str::to_string),
        data_type: data_type.to_string(),
        udt: udt.to_string(),
    }
}

fn fixture_enums() -> Vec<EnumEntry> {
    vec![
        EnumEntry::new("identity_provider", "google"),
        EnumEntry::new("identity_provider", "facebook"),
        EnumEntry::new("identity_provider", "linkedin"),
    ]
}

fn fixture_columns() -> Vec<ColumnDescriptor> {
    vec![
        column("public", "user", "id", "integer", "int4", false, Some("nextval('user_id_seq'::regclass)")),
        column("public", "user", "email", "text", "text", true, None),
        column("public", "user", "provider", "USER-DEFINED", "identity_provider", false, None),
        column("public", "user", "settings", "jsonb", "jsonb", false, Some("'{}'::jsonb")),
        column("public", "user", "tags", "ARRAY", "_text", true, None),
        column("public", "user", "1invalid", "text", "text", false, None),
        column("log", "messages", "id", "bigint", "int8", false, None),
        column("log", "messages", "body", "text", "text", false, None),
        column("log", "messages", "created_at", "timestamp with time zone", "timestamptz", false, Some("now()")),
        column("secret", "keys", "value", "text", "text", false, None),
    ]
}

fn catalog(counters: &Counters) -> MemoryCatalog {
    MemoryCatalog {
        enums: fixture_enums(),
        columns: fixture_columns(),
        fail_columns: false,
        counters: counters.clone(),
    }
}

fn options() -> GenerateOptions {
    GenerateOptions {
        overrides: NameOverrides::new().with_literal("identity_provider.linkedin", "LinkedIn"),
        schema: ListSpec::from(vec!["public", "log", "secret", "!secret"]),
        ..GenerateOptions::default()
    }
}

async fn render(options: &GenerateOptions) -> (Result<String>, Counters) {
    let counters = Counters::default();
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = RecordingSink {
        buffer: Arc::clone(&buffer),
        counters: counters.clone(),
    };

    let result = generate(catalog(&counters), sink, options).await;
    let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    (result.map(|_| text), counters)
}

const EXPECTED: &str = "\
// This file was generated by pgtyper. Do not edit it by hand.
// Regenerate it from the database schema instead.

export enum IdentityProvider {
  Google = 'google',
  Facebook = 'facebook',
  LinkedIn = 'linkedin',
}

export enum Table {
  User = 'user',
  LogMessages = 'log.messages',
}

export type Tables = {
  'user': User;
  'log.messages': LogMessages;
};

export type User = {
  id: number;
  email: string | null;
  provider: IdentityProvider;
  settings: Record<string, unknown>;
  tags: string[] | null;
  '1invalid': string;
};

export type LogMessages = {
  id: string;
  body: string;
  created_at: Date;
};
";

#[tokio::test]
async fn generates_full_declaration_file() {
    let (text, counters) = render(&options()).await;
    assert_eq!(text.unwrap(), EXPECTED);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn output_is_identical_across_runs() {
    let (first, _) = render(&options()).await;
    let (second, _) = render(&options()).await;
    assert_eq!(first.unwrap(), second.unwrap());
}

#[tokio::test]
async fn excluded_schema_never_reaches_output() {
    let (text, _) = render(&options()).await;
    let text = text.unwrap();
    assert!(!text.contains("SecretKeys"));
    assert!(!text.contains("secret.keys"));
}

#[tokio::test]
async fn prefix_suffix_and_table_map_toggle() {
    let opts = GenerateOptions {
        prefix: Some("import type { IPostgresInterval } from 'postgres-interval';".to_string()),
        suffix: Some("export default Table;".to_string()),
        emit_table_map: false,
        exclude: ListSpec::from("messages"),
        ..options()
    };
    let (text, _) = render(&opts).await;
    let text = text.unwrap();

    assert!(text.contains(
        "instead.\n\nimport type { IPostgresInterval } from 'postgres-interval';\n\nexport enum IdentityProvider"
    ));
    assert!(text.ends_with("};\n\nexport default Table;\n"));
    assert!(!text.contains("export type Tables"));
    assert!(!text.contains("LogMessages"));
}

#[tokio::test]
async fn type_override_tiers_and_wildcard() {
    let opts = GenerateOptions {
        type_overrides: TypeOverrides::new()
            .with_literal("user.id", "UserId")
            .with_literal("id", "RowId")
            .with_literal("text", "Text")
            .with_resolver("*", |col, current| {
                Ok((col.schema == "log").then(|| format!("{current} | appended")))
            }),
        ..options()
    };
    let (text, _) = render(&opts).await;
    let text = text.unwrap();

    assert!(text.contains("  id: UserId;\n  email: Text | null;"));
    assert!(text.contains("  tags: Text[] | null;"));
    assert!(text.contains("  id: RowId | appended;\n  body: Text | appended;"));
    assert!(text.contains("  created_at: Date | appended;"));
}

#[tokio::test]
async fn name_wildcard_renames_columns() {
    let opts = GenerateOptions {
        overrides: NameOverrides::new()
            .with_literal("user", "Account")
            .with_resolver("*", |_, category, current| {
                Ok(match category {
                    pgtyper_core::NameCategory::Column => Some(current.to_uppercase()),
                    _ => None,
                })
            }),
        ..options()
    };
    let (text, _) = render(&opts).await;
    let text = text.unwrap();

    assert!(text.contains("export type Account = {\n  ID: number;\n  EMAIL: string | null;"));
    assert!(text.contains("  Account = 'user',"));
    assert!(text.contains("  'user': Account;"));
    assert!(text.contains("  '1INVALID': string;"));
}

#[tokio::test]
async fn catalog_failure_still_releases_resources() {
    let counters = Counters::default();
    let mut failing = catalog(&counters);
    failing.fail_columns = true;
    let sink = RecordingSink {
        buffer: Arc::new(Mutex::new(Vec::new())),
        counters: counters.clone(),
    };

    let err = generate(failing, sink, &options()).await.unwrap_err();
    assert!(matches!(err, Error::Db(_)));
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn resolver_failure_propagates_after_cleanup() {
    let opts = GenerateOptions {
        type_overrides: TypeOverrides::new()
            .with_resolver("jsonb", |col, _| Err(format!("no mapping for {}", col.column).into())),
        ..options()
    };
    let (result, counters) = render(&opts).await;

    match result {
        Err(Error::Override { key, message }) => {
            assert_eq!(key, "jsonb");
            assert_eq!(message, "no mapping for settings");
        }
        other => panic!("expected override error, got {other:?}"),
    }
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
}
