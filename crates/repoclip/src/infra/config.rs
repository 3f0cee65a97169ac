//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".repoclip/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub ignore: Ignore,
    #[serde(default)]
    pub export: Export,
}

/// Unset fields fall through to earlier layers; a layer may set an empty list or the
/// default size to reset what an earlier one chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub max_file_bytes: Option<u64>,
}

impl Defaults {
    fn default_max_file_bytes() -> u64 {
        1024 * 1024
    }

    /// Extension allow-list; empty means every extension.
    pub fn extensions(&self) -> &[String] {
        self.extensions.as_deref().unwrap_or_default()
    }

    /// Size limit for compiled files; 0 disables it.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
            .unwrap_or_else(Self::default_max_file_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ignore {
    /// Directory names excluded wherever they appear.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Raw gitignore lines, applied in order.
    #[serde(default)]
    pub globs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Export {
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    include_diff: Option<bool>,
}

impl Export {
    fn default_template() -> &'static str {
        "markdown"
    }

    fn default_include_diff() -> bool {
        true
    }

    /// Built-in template name or path to a template file.
    pub fn template(&self) -> String {
        self.template
            .clone()
            .unwrap_or_else(|| Self::default_template().to_owned())
    }

    pub fn include_diff(&self) -> bool {
        self.include_diff
            .unwrap_or_else(Self::default_include_diff)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    template: Option<String>,
    extensions: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            template: env::var("REPOCLIP_TEMPLATE").ok(),
            extensions: env::var("REPOCLIP_EXTENSIONS").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(template: &str, extensions: &str) -> Self {
        Self {
            template: Some(template.to_owned()),
            extensions: Some(extensions.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, the workspace config under `root`,
    /// and env overrides.
    pub fn load(root: &Path) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH));
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            ignore: merge_ignore(self.ignore, other.ignore),
            export: merge_export(self.export, other.export),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        extensions: overlay.extensions.or(base.extensions),
        max_file_bytes: overlay.max_file_bytes.or(base.max_file_bytes),
    }
}

// Glob order is significant for negations, so layers are appended rather than sorted.
fn merge_ignore(base: Ignore, overlay: Ignore) -> Ignore {
    Ignore {
        paths: append_unique(base.paths, overlay.paths),
        globs: append_unique(base.globs, overlay.globs),
    }
}

fn append_unique(mut base: Vec<String>, overlay: Vec<String>) -> Vec<String> {
    for item in overlay {
        if !base.contains(&item) {
            base.push(item);
        }
    }
    base
}

fn merge_export(mut base: Export, overlay: Export) -> Export {
    if let Some(value) = overlay.template {
        base.template = Some(value);
    }
    if let Some(value) = overlay.include_diff {
        base.include_diff = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("repoclip/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(template) = env.template.filter(|value| !value.trim().is_empty()) {
        config.export.template = Some(template);
    }
    if let Some(extensions) = env.extensions {
        let parsed = split_list(&extensions);
        if !parsed.is_empty() {
            config.defaults.extensions = Some(parsed);
        }
    }
    config
}

/// Split a comma or whitespace separated list, dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(|ch: char| ch == ',' || ch.is_whitespace())
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
