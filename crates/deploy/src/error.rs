//! Error types for contract deployments.

use std::process::ExitStatus;

use thiserror::Error;

/// Result type alias for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

/// Errors raised while resolving, running or recording a deployment.
#[derive(Error, Debug)]
pub enum DeployError {
    /// The external tool could not be started at all.
    #[error("Failed to launch {program}: {source}")]
    ToolInvocation {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran but exited with a non-zero status.
    #[error("{program} exited with {status} while deploying {contract}")]
    ToolExited {
        program: String,
        contract: String,
        status: ExitStatus,
    },

    /// The tool output did not have the expected shape.
    #[error("Failed to parse deployed address from tool output: {reason}")]
    OutputParse { reason: String },

    /// A constructor argument names a contract that has no usable address.
    #[error("Argument {dependency} of {contract} has no deployed address yet")]
    UnresolvedDependency {
        contract: String,
        dependency: String,
    },

    /// The name is not in the registry.
    #[error("Unknown contract: {name}")]
    UnknownContract { name: String },

    /// The contract is only known by address and has no source locator.
    #[error("Contract {name} has no source locator and cannot be deployed")]
    NotDeployable { name: String },

    /// The contract already has an address and would be overwritten.
    #[error("Contract {name} already has an address recorded ({address})")]
    AddressAlreadyRecorded { name: String, address: String },

    /// The requested contracts reference each other in a loop.
    #[error("Cyclic dependency between contracts: {}", names.join(", "))]
    CyclicDependency { names: Vec<String> },
}

impl DeployError {
    pub(crate) fn output_parse(reason: impl Into<String>) -> Self {
        Self::OutputParse {
            reason: reason.into(),
        }
    }
}
