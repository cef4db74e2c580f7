use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use pgtyper_core::{GenerateOptions, ListSpec, TypeOverrideTiers};

use crate::CliError;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pgtyper.toml";

/// Where generated declarations are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_path(path: PathBuf) -> Self {
        if path.as_os_str() == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(path)
        }
    }
}

/// Settings read from `pgtyper.toml`. Every field is optional; command-line
/// flags take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub output: Option<PathBuf>,
    pub schema: Option<ListSpec>,
    pub exclude: Option<ListSpec>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub tables_enum_name: Option<String>,
    pub tables_type_name: Option<String>,
    pub emit_table_map: Option<bool>,
    pub override_table_column_types: Option<bool>,
    pub override_column_types: Option<bool>,
    pub override_default_types: Option<bool>,
    pub overrides: BTreeMap<String, String>,
    pub type_overrides: BTreeMap<String, String>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub output: Option<PathBuf>,
    pub schema: Vec<String>,
    pub exclude: Vec<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub tables_enum_name: Option<String>,
    pub tables_type_name: Option<String>,
    pub no_table_map: bool,
    pub no_table_column_type_overrides: bool,
    pub no_column_type_overrides: bool,
    pub no_default_type_overrides: bool,
}

/// Load an explicit config file, or the default one when it exists.
pub fn load_config(path: Option<&Path>) -> Result<Option<ConfigFile>, CliError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(None);
            }
            default
        }
    };

    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    tracing::debug!(event = "config_loaded", path = %path.display());
    Ok(Some(config))
}

pub fn parse_config(content: &str) -> Result<ConfigFile, CliError> {
    Ok(toml::from_str(content)?)
}

/// Merge file settings and flags into generation options and an output target.
pub fn resolve_options(
    file: ConfigFile,
    flags: FlagOverrides,
) -> (GenerateOptions, OutputTarget) {
    let defaults = GenerateOptions::default();

    let schema = if flags.schema.is_empty() {
        file.schema.unwrap_or(defaults.schema)
    } else {
        ListSpec::List(flags.schema)
    };
    let exclude = if flags.exclude.is_empty() {
        file.exclude.unwrap_or(defaults.exclude)
    } else {
        ListSpec::List(flags.exclude)
    };

    let type_tiers = TypeOverrideTiers {
        table_column: !flags.no_table_column_type_overrides
            && file
                .override_table_column_types
                .unwrap_or(defaults.type_tiers.table_column),
        column: !flags.no_column_type_overrides
            && file
                .override_column_types
                .unwrap_or(defaults.type_tiers.column),
        storage_type: !flags.no_default_type_overrides
            && file
                .override_default_types
                .unwrap_or(defaults.type_tiers.storage_type),
    };

    let options = GenerateOptions {
        overrides: file.overrides.into_iter().collect(),
        type_overrides: file.type_overrides.into_iter().collect(),
        type_tiers,
        prefix: flags.prefix.or(file.prefix),
        suffix: flags.suffix.or(file.suffix),
        schema,
        exclude,
        tables_enum_name: flags
            .tables_enum_name
            .or(file.tables_enum_name)
            .unwrap_or(defaults.tables_enum_name),
        tables_type_name: flags
            .tables_type_name
            .or(file.tables_type_name)
            .unwrap_or(defaults.tables_type_name),
        emit_table_map: !flags.no_table_map && file.emit_table_map.unwrap_or(true),
    };

    let output = flags
        .output
        .or(file.output)
        .map(OutputTarget::from_path)
        .unwrap_or(OutputTarget::Stdout);

    (options, output)
}
