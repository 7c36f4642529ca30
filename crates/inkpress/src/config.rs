//! Configuration file (inkpress.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inkpress_static::BuildConfig;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "inkpress.toml";

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct SourceConfig {
    #[serde(default = "default_source_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ThemeConfig {
    #[serde(default = "default_theme_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct BuildSettings {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: default_source_dir(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            dir: default_theme_dir(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            page_size: default_page_size(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    BuildConfig::default().source_dir
}
fn default_theme_dir() -> PathBuf {
    BuildConfig::default().template_dir
}
fn default_output() -> PathBuf {
    BuildConfig::default().output_dir
}
fn default_page_size() -> usize {
    BuildConfig::default().page_size
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("{} not found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

impl ConfigFile {
    /// Resolve into a [`BuildConfig`]. Relative directories are taken relative to
    /// `base`, the directory holding the config file; `output` overrides the
    /// configured output directory as given.
    pub fn into_build_config(self, base: &Path, output: Option<PathBuf>) -> BuildConfig {
        BuildConfig {
            source_dir: base.join(self.source.dir),
            template_dir: base.join(self.theme.dir),
            output_dir: output.unwrap_or_else(|| base.join(self.build.output)),
            page_size: self.build.page_size,
        }
    }
}

/// Load `path` and resolve it into a [`BuildConfig`].
pub fn build_config(path: &Path, output: Option<PathBuf>) -> Result<BuildConfig> {
    let base = path.parent().unwrap_or(Path::new(""));
    Ok(load(path)?.into_build_config(base, output))
}
