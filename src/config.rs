use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::strip::blocks::BlockMarkers;

const CONFIG_ENV: &str = "TAGSTRIP_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub url_decode: bool,
    pub entity_decode: bool,
    /// Blocks dropped with their content, stripped in this order.
    pub blocks: Vec<BlockMarkers>,
    pub log_level: Option<String>,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            url_decode: true,
            entity_decode: true,
            blocks: BlockMarkers::html_defaults(),
            log_level: Some("info".to_string()),
        }
    }
}

impl StripConfig {
    /// Load from `explicit`, else `$TAGSTRIP_CONFIG`, else the first default
    /// location that exists, else defaults. Env overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path));
                }
                Self::load_from_file(&path)?
            }
            None => match locate_default_config(Path::new("")) {
                Some(path) => Self::load_from_file(&path)?,
                None => Self::default(),
            },
        };

        let config = config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents, path)
    }

    fn apply_env_overrides(mut self) -> Result<Self> {
        if let Some(v) = parse_optional_env("TAGSTRIP_URL_DECODE")? {
            self.url_decode = v;
        }
        if let Some(v) = parse_optional_env("TAGSTRIP_ENTITY_DECODE")? {
            self.entity_decode = v;
        }
        if let Ok(level) = std::env::var("TAGSTRIP_LOG_LEVEL") {
            self.log_level = Some(level);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, b) in self.blocks.iter().enumerate() {
            if b.start.is_empty() || b.end.is_empty() {
                return Err(Error::InvalidMarker(format!(
                    "block {} has an empty marker (start {:?}, end {:?})",
                    i, b.start, b.end
                )));
            }
        }
        Ok(())
    }
}

fn parse_optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) => v.trim().parse::<T>().map(Some).map_err(|e| Error::Env {
            key: key.to_string(),
            message: e.to_string(),
        }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::Env {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

/// First existing default config under `base` (empty path for the cwd).
fn locate_default_config(base: &Path) -> Option<PathBuf> {
    let candidates = [
        base.join("tagstrip.yaml"),
        base.join("config").join("tagstrip.yaml"),
    ];
    candidates.into_iter().find(|p| p.exists())
}
