//! forgechain-deploy - Sequential `forge create` deployments with address propagation.
//!
//! This crate keeps a [`Registry`] of contract deployments, runs the external
//! deployment tool for each requested contract through the [`Driver`], parses
//! the deployed address from the tool output and feeds it into the constructor
//! arguments of the contracts deployed after it.

mod cmd;
pub use cmd::{ForgeCreateCmdBuilder, redact_private_key};

mod config;
pub use config::{CONFIG_FILENAME, Config, DEFAULT_TOOL_BINARY, ENV_PREFIX, ToolConfig};

mod descriptor;
pub use descriptor::DeploymentDescriptor;

mod driver;
pub use driver::{BatchOptions, BatchReport, Credentials, Deployment, Driver, OrderingMode};

pub mod error;
pub use error::{DeployError, Result};

mod extractor;
pub use extractor::{AddressExtractor, ExtractorKind, JsonExtractor, PositionalExtractor};

mod registry;
pub use registry::{Registry, ResolvedArg, UnresolvedPolicy};

pub mod report;
pub use report::DumpFormat;

mod runner;
pub use runner::{ProcessRunner, ToolRunner};
