use crate::cli::ServeArgs;
use crate::config::ServerConfig;
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "raiment-dev.json";

/// Prefix for environment overrides (`RAIMENT_DEV_PORT`, `RAIMENT_DEV_OUT_DIR`, ...).
pub const ENV_PREFIX: &str = "RAIMENT_DEV_";

/// The subset of CLI flags that were actually given.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strip_prefix: Option<String>,
}

impl From<&ServeArgs> for CliOverrides {
    fn from(args: &ServeArgs) -> Self {
        Self {
            title: args.title.clone(),
            port: args.port,
            out_dir: args.out_dir.clone(),
            timestamp_file: args.timestamp_file.clone(),
            default_file: args.fallback.clone(),
            strip_prefix: args.strip_prefix.clone(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &ServeArgs) -> Result<Self> {
        let config_file = match &args.config {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.clone()).into());
            }
            Some(path) => Some(path.clone()),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        figment = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(CliOverrides::from(args)));

        let config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: format!("Check {} syntax and {}* variables", CONFIG_FILE_NAME, ENV_PREFIX),
        })?;

        config.validate()?;
        Ok(config)
    }
}
