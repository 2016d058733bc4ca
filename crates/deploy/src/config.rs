//! Layered configuration: built-in defaults, then `Forgechain.toml`, then the environment.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{DeploymentDescriptor, ExtractorKind, Registry, UnresolvedPolicy};

/// The default name for the configuration file.
pub const CONFIG_FILENAME: &str = "Forgechain.toml";

/// Prefix of environment variables overriding the configuration.
///
/// Nested keys are separated by `__`, e.g. `FORGECHAIN_TOOL__BINARY`.
pub const ENV_PREFIX: &str = "FORGECHAIN_";

/// Default binary for the deployment tool.
pub const DEFAULT_TOOL_BINARY: &str = "forge";

/// How the deployment tool is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Binary of the deployment tool.
    pub binary: String,
    /// Send legacy transactions.
    pub legacy: bool,
    /// Working directory of every tool invocation. Defaults to the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
    /// Extra arguments appended after the base flags, e.g. `--broadcast`.
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Parser used on the tool output.
    pub extractor: ExtractorKind,
    /// Behaviour for arguments naming an undeployed contract.
    pub on_unresolved: UnresolvedPolicy,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_TOOL_BINARY.to_string(),
            legacy: true,
            workdir: None,
            extra_args: Vec::new(),
            extractor: ExtractorKind::default(),
            on_unresolved: UnresolvedPolicy::default(),
        }
    }
}

/// Complete configuration: tool settings and the contract table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub tool: ToolConfig,
    /// Contract table keyed by name.
    #[serde(default)]
    pub contracts: BTreeMap<String, DeploymentDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            contracts: Registry::builtin().into_entries(),
        }
    }
}

impl Config {
    /// Build the provider stack without extracting it.
    ///
    /// Entries of the file are merged field by field over the built-in table.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => {
                let config_path = if path.is_dir() {
                    path.join(CONFIG_FILENAME)
                } else {
                    path.to_path_buf()
                };
                if !config_path.exists() {
                    anyhow::bail!("Configuration file not found: {}", config_path.display());
                }
                figment = figment.merge(Toml::file(config_path));
            }
            None => {
                let default_path = PathBuf::from(CONFIG_FILENAME);
                if default_path.exists() {
                    tracing::debug!(
                        path = %default_path.display(),
                        "Using local configuration file"
                    );
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load the configuration.
    ///
    /// `path` may point at a TOML file or a directory containing [`CONFIG_FILENAME`].
    /// Without a path, `./Forgechain.toml` is used if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?
            .extract()
            .context("Failed to load configuration")?;

        tracing::debug!(
            binary = %config.tool.binary,
            contracts = config.contracts.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Build a registry from the contract table.
    pub fn registry(&self) -> Registry {
        Registry::from_entries(self.contracts.clone())
    }
}
