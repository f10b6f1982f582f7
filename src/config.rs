use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::IngestError;
use crate::parser::location::DEFAULT_COUNTRY;

const CONFIG_FILE: &str = "job_ingest";
const ENV_PREFIX: &str = "JOBS";

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub output_dir: PathBuf,
    pub default_country: String,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    database_url: Option<String>,
    output_dir: Option<PathBuf>,
    default_country: Option<String>,
}

impl Settings {
    /// `.env`, then optional `job_ingest.toml`, then `JOBS_*` environment
    /// variables. A database URL is mandatory.
    pub fn load() -> Result<Self, IngestError> {
        let _ = dotenvy::dotenv();
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, IngestError> {
        let raw: RawSettings = builder.build()?.try_deserialize()?;

        let database_url = raw
            .database_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                IngestError::Config(format!(
                    "database url is not set (use {}_DATABASE_URL or database_url in {}.toml)",
                    ENV_PREFIX, CONFIG_FILE
                ))
            })?;

        Ok(Settings {
            database_url,
            output_dir: raw.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            default_country: raw
                .default_country
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        })
    }
}
