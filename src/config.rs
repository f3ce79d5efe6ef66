//! Pipeline configuration
//!
//! Values resolve in increasing precedence: built-in defaults, an optional
//! YAML file, `ETL_*` environment variables, then command-line flags (applied
//! by the caller).

use crate::loader::CleanDataLoader;
use crate::model::columns;
use crate::storage::{CsvExport, SqliteSink, SqliteSource};
use crate::transform::CleaningTransformer;

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given, if it exists
pub const DEFAULT_CONFIG_FILE: &str = "etl.yml";

pub const ENV_SOURCE: &str = "ETL_SOURCE";
pub const ENV_SINK: &str = "ETL_SINK";
pub const ENV_EXPORT_PATH: &str = "ETL_EXPORT_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw SQLite database
    pub source: PathBuf,
    /// SQLite database receiving the `*_clean` tables
    pub sink: PathBuf,
    /// Denormalized flat-file export
    pub export_path: PathBuf,
    pub export: ExportConfig,
    pub transform: TransformConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Keys pulled out of the contact column, in output order
    pub contact_fields: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("cademycode.db"),
            sink: PathBuf::from("cademycode_clean.db"),
            export_path: PathBuf::from("clean_data.csv"),
            export: ExportConfig::default(),
            transform: TransformConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            contact_fields: vec![columns::EMAIL.to_string(), columns::PHONE.to_string()],
        }
    }
}

impl PipelineConfig {
    /// Read a YAML config file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve defaults, the config file and the environment
    ///
    /// An explicit `config` path must exist. Without one, `etl.yml` in the
    /// working directory is read when present.
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let mut resolved = match config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                log::debug!("Using config file {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        resolved.apply_env();
        Ok(resolved)
    }

    /// Override paths from `ETL_SOURCE`, `ETL_SINK` and `ETL_EXPORT_PATH`
    pub fn apply_env(&mut self) {
        let vars = [
            (ENV_SOURCE, &mut self.source),
            (ENV_SINK, &mut self.sink),
            (ENV_EXPORT_PATH, &mut self.export_path),
        ];
        for (var, field) in vars {
            if let Ok(value) = std::env::var(var)
                && !value.trim().is_empty()
            {
                log::debug!("{} overrides {}", var, field.display());
                *field = PathBuf::from(value.trim());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.transform.contact_fields.is_empty() {
            return Err(eyre!("transform.contact_fields must name at least one field"));
        }
        Ok(())
    }

    /// Export delimiter as a single byte
    pub fn delimiter_byte(&self) -> Result<u8> {
        let delimiter = self.export.delimiter;
        if !delimiter.is_ascii() {
            return Err(eyre!(
                "Export delimiter must be a single ASCII character, got {:?}",
                delimiter
            ));
        }
        Ok(delimiter as u8)
    }

    pub fn extractor(&self) -> SqliteSource {
        SqliteSource::new(&self.source)
    }

    pub fn transformer(&self) -> CleaningTransformer {
        CleaningTransformer::with_contact_fields(self.transform.contact_fields.clone())
    }

    pub fn loader(&self) -> Result<CleanDataLoader> {
        let export = CsvExport::new(&self.export_path).with_delimiter(self.delimiter_byte()?);
        Ok(CleanDataLoader::new(SqliteSink::new(&self.sink), export))
    }
}
