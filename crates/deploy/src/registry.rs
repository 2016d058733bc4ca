//! The deployment registry: every known contract keyed by name.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    DeploymentDescriptor,
    error::{DeployError, Result},
};

/// What to do with a constructor argument naming a contract that has no address yet.
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
pub enum UnresolvedPolicy {
    /// Abort the deployment with [`DeployError::UnresolvedDependency`].
    #[default]
    Fail,
    /// Pass an empty string to the tool and log a warning.
    Empty,
}

/// A constructor argument token after lookup in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedArg<'a> {
    /// The token is not a registry key and is passed through unchanged.
    Literal(&'a str),
    /// The token named a deployed contract.
    Address(&'a str),
    /// The token named a contract that has not been deployed, or whose
    /// recorded address is stale.
    Unresolved,
}

/// Owned mapping from contract name to [`DeploymentDescriptor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    contracts: BTreeMap<String, DeploymentDescriptor>,
    /// Contracts whose recorded address is about to be replaced.
    stale: BTreeSet<String>,
}

impl Registry {
    /// Build a registry from `name -> descriptor` entries, filling in each descriptor's name.
    pub fn from_entries(entries: BTreeMap<String, DeploymentDescriptor>) -> Self {
        let contracts = entries
            .into_iter()
            .map(|(name, mut descriptor)| {
                descriptor.name = name.clone();
                (name, descriptor)
            })
            .collect();
        Self {
            contracts,
            stale: BTreeSet::new(),
        }
    }

    /// The hand-maintained contract graph shipped with the tool.
    ///
    /// Addresses are those of the last recorded deployment; `AccountManager`
    /// has never been deployed and `WETH` is an external token.
    pub fn builtin() -> Self {
        Self::from_iter([
            DeploymentDescriptor::new("RiskEngine", "src/core/RiskEngine.sol:RiskEngine")
                .args(["FeedAggregator"])
                .address("0x3cfbf9cd019a8f936f56f69da81e6fcf3626b058"),
            DeploymentDescriptor::new("UserRegistry", "src/core/UserRegistry.sol:UserRegistry")
                .address("0x6db5119954d7626227476e3f5c6ff503258870d0"),
            DeploymentDescriptor::new(
                "DefaultRateModel",
                "src/core/DefaultRateModel.sol:DefaultRateModel",
            )
            .address("0x12b6687510d78c05ba6f3a421763934ca7784a11"),
            DeploymentDescriptor::new(
                "FeedAggregator",
                "src/priceFeeds/FeedAggregator.sol:FeedAggregator",
            )
            .args(["WETH"])
            .address("0x8e9e2604b3e221ffbbe8c63048e89aa0c45e925d"),
            DeploymentDescriptor::new("Account", "src/core/Account.sol:Account")
                .address("0xf8cfff57a017f588d8aecd5aacac9a6345612745"),
            DeploymentDescriptor::new("Beacon", "src/proxy/Beacon.sol:Beacon")
                .args(["Account"])
                .address("0x61ddaf7853a9e9183602db775a07aa18006ff97c"),
            DeploymentDescriptor::new(
                "AccountFactory",
                "src/core/AccountFactory.sol:AccountFactory",
            )
            .args(["Beacon"])
            .address("0xfaa4a292aaeb8c498dc1adb44afafee003f077d7"),
            DeploymentDescriptor::new(
                "AccountManager",
                "src/core/AccountManager.sol:AccountManager",
            )
            .args(["RiskEngine", "AccountFactory", "UserRegistry"]),
            DeploymentDescriptor::external("WETH", "0xfaa4a292aaeb8c498dc1adb44afafee003f077d7"),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&DeploymentDescriptor> {
        self.contracts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeploymentDescriptor> {
        self.contracts.values()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Convert back into `name -> descriptor` entries.
    pub fn into_entries(self) -> BTreeMap<String, DeploymentDescriptor> {
        self.contracts
    }

    /// Look up a descriptor, failing on unknown names.
    pub fn descriptor(&self, name: &str) -> Result<&DeploymentDescriptor> {
        self.get(name).ok_or_else(|| DeployError::UnknownContract {
            name: name.to_string(),
        })
    }

    /// Resolve a single constructor argument token.
    pub fn resolve_argument<'a>(&'a self, token: &'a str) -> ResolvedArg<'a> {
        match self.contracts.get(token) {
            None => ResolvedArg::Literal(token),
            Some(DeploymentDescriptor {
                address: Some(address),
                ..
            }) if !self.stale.contains(token) => ResolvedArg::Address(address),
            Some(_) => ResolvedArg::Unresolved,
        }
    }

    /// Resolve all constructor arguments of `descriptor`, in order.
    pub fn resolve_args(
        &self,
        descriptor: &DeploymentDescriptor,
        policy: UnresolvedPolicy,
    ) -> Result<Vec<String>> {
        descriptor
            .args
            .iter()
            .map(|token| match self.resolve_argument(token) {
                ResolvedArg::Literal(value) | ResolvedArg::Address(value) => {
                    Ok(value.to_string())
                }
                ResolvedArg::Unresolved => match policy {
                    UnresolvedPolicy::Fail => Err(DeployError::UnresolvedDependency {
                        contract: descriptor.name.clone(),
                        dependency: token.clone(),
                    }),
                    UnresolvedPolicy::Empty => {
                        tracing::warn!(
                            contract = %descriptor.name,
                            dependency = %token,
                            "Dependency has no deployed address, passing an empty argument"
                        );
                        Ok(String::new())
                    }
                },
            })
            .collect()
    }

    /// Record the deployed address of `name`.
    ///
    /// An address can only be recorded once, unless the previous one was marked stale.
    pub fn record_address(&mut self, name: &str, address: impl Into<String>) -> Result<()> {
        let descriptor = self
            .contracts
            .get_mut(name)
            .ok_or_else(|| DeployError::UnknownContract {
                name: name.to_string(),
            })?;

        if let Some(existing) = &descriptor.address {
            if !self.stale.contains(name) {
                return Err(DeployError::AddressAlreadyRecorded {
                    name: name.to_string(),
                    address: existing.clone(),
                });
            }
        }

        descriptor.address = Some(address.into());
        self.stale.remove(name);
        Ok(())
    }

    /// Forget the recorded address of `name`, returning the previous value.
    pub fn clear_address(&mut self, name: &str) -> Result<Option<String>> {
        let previous = self
            .contracts
            .get_mut(name)
            .map(|descriptor| descriptor.address.take())
            .ok_or_else(|| DeployError::UnknownContract {
                name: name.to_string(),
            })?;
        self.stale.remove(name);
        Ok(previous)
    }

    /// Keep the recorded address of `name` visible but stop resolving it.
    ///
    /// The next [`Registry::record_address`] replaces it.
    pub fn mark_stale(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(DeployError::UnknownContract {
                name: name.to_string(),
            });
        }
        self.stale.insert(name.to_string());
        Ok(())
    }

    /// Whether `name` holds an address that is about to be replaced.
    pub fn is_stale(&self, name: &str) -> bool {
        self.stale.contains(name)
    }

    /// Order `names` so that every contract comes after the requested contracts
    /// its constructor arguments reference.
    ///
    /// Only edges between requested names are considered. Among contracts that
    /// are ready at the same time the caller's order is kept.
    pub fn dependency_order(&self, names: &[String]) -> Result<Vec<String>> {
        let requested: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut emitted: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&String> = names.iter().collect();
        let mut ordered = Vec::with_capacity(names.len());

        while !remaining.is_empty() {
            let ready = remaining.iter().position(|name| {
                self.descriptor(name).is_ok_and(|descriptor| {
                    descriptor.args.iter().all(|arg| {
                        !requested.contains(arg.as_str()) || emitted.contains(arg.as_str())
                    })
                })
            });

            match ready {
                Some(index) => {
                    let name = remaining.remove(index);
                    emitted.insert(name.as_str());
                    ordered.push(name.clone());
                }
                None => {
                    // Unknown names are reported before they can stall the sort.
                    if let Some(unknown) = remaining.iter().find(|name| !self.contains(name)) {
                        return Err(DeployError::UnknownContract {
                            name: unknown.to_string(),
                        });
                    }
                    return Err(DeployError::CyclicDependency {
                        names: remaining.into_iter().cloned().collect(),
                    });
                }
            }
        }

        Ok(ordered)
    }
}

impl FromIterator<DeploymentDescriptor> for Registry {
    fn from_iter<I: IntoIterator<Item = DeploymentDescriptor>>(iter: I) -> Self {
        Self {
            contracts: iter
                .into_iter()
                .map(|descriptor| (descriptor.name.clone(), descriptor))
                .collect(),
            stale: BTreeSet::new(),
        }
    }
}
