//! Deployment descriptors.

use serde::{Deserialize, Serialize};

/// Static description of one contract deployment and, once deployed, its address.
///
/// The name is the registry key and is not part of the serialized form:
/// descriptors live in a `[contracts.<name>]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentDescriptor {
    #[serde(skip)]
    pub name: String,
    /// Source locator handed to the tool, e.g. `src/core/Account.sol:Account`.
    ///
    /// Entries without a locator are external contracts that can only be referenced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Constructor argument tokens. A token naming another registry entry is
    /// replaced by that entry's address.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Deployed address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl DeploymentDescriptor {
    /// Create a deployable descriptor with no recorded address.
    pub fn new(name: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src: Some(src.into()),
            args: Vec::new(),
            address: None,
        }
    }

    /// Create a reference-only descriptor for a contract deployed elsewhere.
    pub fn external(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src: None,
            args: Vec::new(),
            address: Some(address.into()),
        }
    }

    /// Set the constructor argument tokens.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set a previously recorded address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn is_deployed(&self) -> bool {
        self.address.is_some()
    }
}
