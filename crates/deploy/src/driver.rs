//! The deployment driver: runs `forge create` for each requested contract and
//! threads deployed addresses into later constructor arguments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    AddressExtractor, ExtractorKind, ForgeCreateCmdBuilder, ProcessRunner, Registry, ToolConfig,
    ToolRunner,
    cmd::redact_private_key,
    descriptor::DeploymentDescriptor,
    error::{DeployError, Result},
};

/// Network endpoint and signing key handed to the tool.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub rpc_url: String,
    pub private_key: String,
}

impl Credentials {
    pub fn new(rpc_url: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Order in which a batch is deployed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderingMode {
    /// Deploy in the order the caller listed the contracts.
    #[default]
    Given,
    /// Sort the requested contracts by their constructor argument references.
    Dependencies,
}

/// Options for [`Driver::deploy_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub ordering: OrderingMode,
    /// Keep contracts that already have an address instead of redeploying them.
    pub skip_deployed: bool,
}

/// A contract deployed by this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub name: String,
    pub address: String,
}

/// Outcome of a fully successful batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Contracts deployed, in deployment order.
    pub deployed: Vec<Deployment>,
    /// Contracts skipped because they already had an address.
    pub skipped: Vec<String>,
}

/// Sequential deployment driver owning the [`Registry`].
#[derive(Debug)]
pub struct Driver<R = ProcessRunner, E = ExtractorKind> {
    registry: Registry,
    tool: ToolConfig,
    credentials: Credentials,
    runner: R,
    extractor: E,
}

impl Driver {
    /// Create a driver spawning real processes and using the extractor selected in `tool`.
    pub fn new(registry: Registry, tool: ToolConfig, credentials: Credentials) -> Self {
        let extractor = tool.extractor;
        Self {
            registry,
            tool,
            credentials,
            runner: ProcessRunner,
            extractor,
        }
    }
}

impl<R, E> Driver<R, E> {
    /// Replace the tool runner.
    pub fn with_runner<R2: ToolRunner>(self, runner: R2) -> Driver<R2, E> {
        Driver {
            registry: self.registry,
            tool: self.tool,
            credentials: self.credentials,
            runner,
            extractor: self.extractor,
        }
    }

    /// Replace the output parser.
    pub fn with_extractor<E2: AddressExtractor>(self, extractor: E2) -> Driver<R, E2> {
        Driver {
            registry: self.registry,
            tool: self.tool,
            credentials: self.credentials,
            runner: self.runner,
            extractor,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }
}

impl<R: ToolRunner, E: AddressExtractor> Driver<R, E> {
    /// Assemble the tool invocation for `descriptor`, resolving its constructor arguments.
    pub fn build_command(&self, descriptor: &DeploymentDescriptor) -> Result<Vec<String>> {
        let src = descriptor
            .src
            .as_deref()
            .ok_or_else(|| DeployError::NotDeployable {
                name: descriptor.name.clone(),
            })?;

        let args = self
            .registry
            .resolve_args(descriptor, self.tool.on_unresolved)?;

        Ok(ForgeCreateCmdBuilder::new(
            self.credentials.rpc_url.as_str(),
            self.credentials.private_key.as_str(),
            src,
        )
        .binary(self.tool.binary.as_str())
        .legacy(self.tool.legacy)
        .extra_args(self.extractor.tool_flags().iter().copied())
        .extra_args(self.tool.extra_args.iter().cloned())
        .constructor_args(args)
        .build())
    }

    /// Deploy a single contract and record its address.
    ///
    /// Fails before running the tool if the contract already has an address
    /// that is not marked stale.
    pub async fn deploy_one(&mut self, name: &str) -> Result<String> {
        let descriptor = self.registry.descriptor(name)?;
        if let Some(address) = &descriptor.address {
            if !self.registry.is_stale(name) {
                return Err(DeployError::AddressAlreadyRecorded {
                    name: name.to_string(),
                    address: address.clone(),
                });
            }
        }

        let cmd = self.build_command(descriptor)?;

        tracing::info!(
            contract = name,
            command = %redact_private_key(&cmd),
            workdir = ?self.tool.workdir,
            "Deploying contract..."
        );

        let output = self
            .runner
            .run(name, &cmd, self.tool.workdir.as_deref())
            .await?;

        let address = self.extractor.extract(&output)?;
        self.registry.record_address(name, address.clone())?;

        tracing::info!(contract = name, address = %address, "Contract deployed");

        Ok(address)
    }

    /// Deploy `names` one after the other.
    ///
    /// Every name is validated before anything runs. The recorded addresses of
    /// the contracts about to be deployed are marked stale: they stay in the
    /// registry but arguments referencing them only resolve once the contract
    /// is redeployed in this batch. The first failure aborts the batch; the
    /// addresses recorded before it and the ones of contracts never attempted
    /// are kept in the registry.
    pub async fn deploy_batch(
        &mut self,
        names: &[String],
        options: BatchOptions,
    ) -> Result<BatchReport> {
        for name in names {
            self.registry.descriptor(name)?;
        }

        let order = match options.ordering {
            OrderingMode::Given => names.to_vec(),
            OrderingMode::Dependencies => {
                let order = self.registry.dependency_order(names)?;
                tracing::debug!(order = ?order, "Sorted contracts by dependencies");
                order
            }
        };

        let mut report = BatchReport::default();
        let mut pending = Vec::with_capacity(order.len());

        for name in order {
            let descriptor = self.registry.descriptor(&name)?;
            if options.skip_deployed && descriptor.is_deployed() {
                tracing::info!(contract = %name, "Contract already deployed, skipping");
                report.skipped.push(name);
                continue;
            }
            if descriptor.src.is_none() {
                return Err(DeployError::NotDeployable { name });
            }
            pending.push(name);
        }

        for name in &pending {
            if self.registry.get(name).is_some_and(|d| d.is_deployed()) {
                tracing::debug!(contract = %name, "Recorded address will be replaced");
                self.registry.mark_stale(name)?;
            }
        }

        tracing::info!(contracts = ?pending, "Starting deployment batch...");

        for name in pending {
            let address = self.deploy_one(&name).await?;
            report.deployed.push(Deployment { name, address });
        }

        tracing::info!(
            deployed = report.deployed.len(),
            skipped = report.skipped.len(),
            "Deployment batch complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeploymentDescriptor;

    fn driver(registry: Registry) -> Driver {
        Driver::new(
            registry,
            ToolConfig::default(),
            Credentials::new("http://localhost:8545", "0xkey"),
        )
    }

    #[test]
    fn test_build_command_resolves_addresses() {
        let registry = Registry::from_iter([
            DeploymentDescriptor::external("Token", "0xfeed"),
            DeploymentDescriptor::new("Pool", "src/Pool.sol:Pool").args(["Token", "100"]),
        ]);
        let driver = driver(registry);
        let pool = driver.registry().get("Pool").unwrap().clone();

        let cmd = driver.build_command(&pool).expect("Failed to build command");
        assert_eq!(
            cmd,
            vec![
                "forge",
                "create",
                "--legacy",
                "--rpc-url",
                "http://localhost:8545",
                "--constructor-args",
                "0xfeed",
                "100",
                "--private-key",
                "0xkey",
                "src/Pool.sol:Pool",
            ]
        );
    }

    #[test]
    fn test_build_command_without_args() {
        let registry = Registry::from_iter([DeploymentDescriptor::new("A", "src/A.sol:A")]);
        let driver = driver(registry);
        let a = driver.registry().get("A").unwrap().clone();

        let cmd = driver.build_command(&a).unwrap();
        assert!(!cmd.iter().any(|arg| arg == "--constructor-args"));
    }

    #[test]
    fn test_build_command_json_extractor_flag() {
        let registry = Registry::from_iter([DeploymentDescriptor::new("A", "src/A.sol:A")]);
        let tool = ToolConfig {
            extractor: ExtractorKind::Json,
            extra_args: vec!["--broadcast".to_string()],
            ..Default::default()
        };
        let driver = Driver::new(registry, tool, Credentials::new("http://rpc", "0xkey"));
        let a = driver.registry().get("A").unwrap().clone();

        let cmd = driver.build_command(&a).unwrap();
        assert_eq!(
            &cmd[..5],
            ["forge", "create", "--legacy", "--json", "--broadcast"]
        );
    }

    #[test]
    fn test_build_command_external_contract() {
        let registry = Registry::from_iter([DeploymentDescriptor::external("WETH", "0x1")]);
        let driver = driver(registry);
        let weth = driver.registry().get("WETH").unwrap().clone();

        assert!(matches!(
            driver.build_command(&weth),
            Err(DeployError::NotDeployable { .. })
        ));
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let credentials = Credentials::new("http://rpc", "0xsecret");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("0xsecret"));
        assert!(rendered.contains("http://rpc"));
    }
}
