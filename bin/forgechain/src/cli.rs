use std::path::PathBuf;

use clap::Parser;
use forgechain_deploy::{DumpFormat, ExtractorKind, OrderingMode, ToolConfig, UnresolvedPolicy};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "forgechain")]
#[command(
    author,
    version,
    about = "Deploy a chain of dependent contracts with forge create"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "FORGECHAIN_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Forgechain.toml configuration file, or a directory containing one.
    ///
    /// If not provided, ./Forgechain.toml is used when it exists.
    #[arg(short, long, alias = "conf", env = "FORGECHAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// The deployment tool binary. Overrides `tool.binary`.
    #[arg(long, env = "FORGECHAIN_FORGE_BIN")]
    pub forge_bin: Option<String>,

    /// Working directory of the deployment tool, usually the foundry project root.
    /// Overrides `tool.workdir`.
    #[arg(long, env = "FORGECHAIN_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// How the deployed address is read from the tool output. Overrides `tool.extractor`.
    ///
    /// `json` passes `--json` to the tool.
    #[arg(long, env = "FORGECHAIN_EXTRACTOR")]
    pub extractor: Option<ExtractorKind>,

    /// Deployment order: as given on the command line, or sorted by dependencies.
    #[arg(long, env = "FORGECHAIN_ORDER", default_value_t = OrderingMode::Given)]
    pub order: OrderingMode,

    /// What to do when an argument names a contract without an address.
    /// Overrides `tool.on_unresolved`.
    #[arg(long, env = "FORGECHAIN_ON_UNRESOLVED")]
    pub on_unresolved: Option<UnresolvedPolicy>,

    /// Keep contracts that already have a recorded address instead of redeploying them.
    #[arg(long, env = "FORGECHAIN_SKIP_DEPLOYED")]
    pub skip_deployed: bool,

    /// Send EIP-1559 transactions instead of legacy ones.
    #[arg(long, env = "FORGECHAIN_NO_LEGACY")]
    pub no_legacy: bool,

    /// Format of the state printed once the batch ends.
    #[arg(long, env = "FORGECHAIN_DUMP", default_value_t = DumpFormat::Table)]
    pub dump: DumpFormat,

    /// The URL of the RPC endpoint to deploy to.
    #[arg(env = "FORGECHAIN_RPC_URL")]
    pub rpc_url: String,

    /// Private key of the deployer.
    #[arg(env = "FORGECHAIN_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Contracts to deploy, in order.
    #[arg(required = true, num_args = 1..)]
    pub contracts: Vec<String>,
}

impl Cli {
    /// Apply command line overrides on top of the loaded tool configuration.
    pub fn apply_overrides(&self, tool: &mut ToolConfig) {
        if let Some(binary) = &self.forge_bin {
            tool.binary = binary.clone();
        }
        if let Some(workdir) = &self.workdir {
            tool.workdir = Some(workdir.clone());
        }
        if let Some(extractor) = self.extractor {
            tool.extractor = extractor;
        }
        if let Some(policy) = self.on_unresolved {
            tool.on_unresolved = policy;
        }
        if self.no_legacy {
            tool.legacy = false;
        }
    }
}
