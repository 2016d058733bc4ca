//! Parsers turning the deployment tool's stdout into a deployed address.

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

/// Adapter between the tool's output format and the driver.
pub trait AddressExtractor {
    /// Extract the deployed address from the complete stdout of one tool run.
    fn extract(&self, output: &str) -> Result<String>;

    /// Extra flags the tool needs to produce output this extractor understands.
    fn tool_flags(&self) -> &[&'static str] {
        &[]
    }
}

/// Reads the human-readable report of `forge create`:
///
/// ```text
/// Deployer: 0x...
/// Deployed to: 0x...
/// Transaction hash: 0x...
/// ```
///
/// The address is the text following the character after the second `:` up to
/// the next newline. The parser is positional and does not look at the labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalExtractor;

impl AddressExtractor for PositionalExtractor {
    fn extract(&self, output: &str) -> Result<String> {
        let (colon, _) = output
            .match_indices(':')
            .nth(1)
            .ok_or_else(|| DeployError::output_parse("expected at least two ':' in output"))?;

        let mut rest = output[colon + 1..].chars();
        rest.next()
            .ok_or_else(|| DeployError::output_parse("output ends right after the second ':'"))?;
        let rest = rest.as_str();

        let end = rest
            .find('\n')
            .ok_or_else(|| DeployError::output_parse("no newline after the deployed address"))?;

        Ok(rest[..end].to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOutput {
    deployed_to: String,
}

/// Reads the `--json` report of `forge create` and returns its `deployedTo` field.
///
/// Compiler chatter before the JSON object is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl AddressExtractor for JsonExtractor {
    fn extract(&self, output: &str) -> Result<String> {
        output
            .match_indices('{')
            .find_map(|(start, _)| {
                serde_json::Deserializer::from_str(&output[start..])
                    .into_iter::<CreateOutput>()
                    .next()
                    .and_then(|parsed| parsed.ok())
            })
            .map(|parsed| parsed.deployed_to)
            .ok_or_else(|| DeployError::output_parse("no JSON object with a `deployedTo` field"))
    }

    fn tool_flags(&self) -> &[&'static str] {
        &["--json"]
    }
}

/// Runtime selection of an [`AddressExtractor`].
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
pub enum ExtractorKind {
    #[default]
    Positional,
    Json,
}

impl AddressExtractor for ExtractorKind {
    fn extract(&self, output: &str) -> Result<String> {
        match self {
            ExtractorKind::Positional => PositionalExtractor.extract(output),
            ExtractorKind::Json => JsonExtractor.extract(output),
        }
    }

    fn tool_flags(&self) -> &[&'static str] {
        match self {
            ExtractorKind::Positional => &[],
            ExtractorKind::Json => &["--json"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORGE_REPORT: &str = "Deployer: 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\n\
        Deployed to: 0x5FbDB2315678afecb367f032d93F642f64180aa3\n\
        Transaction hash: 0x4e1a9d4c2b1c7d7f0c6d9b0e5a3f2e1d0c9b8a7f6e5d4c3b2a1f0e9d8c7b6a5f\n";

    #[test]
    fn test_positional_lowercase_fixture() {
        let output = "deployer: 0xABC\ndeployed to: 0x1234\ntransaction hash: 0xdead\n";
        assert_eq!(PositionalExtractor.extract(output).unwrap(), "0x1234");
    }

    #[test]
    fn test_positional_forge_report() {
        assert_eq!(
            PositionalExtractor.extract(FORGE_REPORT).unwrap(),
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
    }

    #[test]
    fn test_positional_skips_exactly_one_character() {
        // No space after the colon: the first character of the value is dropped.
        let output = "a:1\nb:0x99\n";
        assert_eq!(PositionalExtractor.extract(output).unwrap(), "x99");

        // Two spaces: one is kept.
        let output = "a: 1\nb:  0x99\n";
        assert_eq!(PositionalExtractor.extract(output).unwrap(), " 0x99");
    }

    #[test]
    fn test_positional_colons_on_one_line() {
        // The second colon does not have to be on the second line.
        let output = "time: 12:30 done\nnext\n";
        assert_eq!(PositionalExtractor.extract(output).unwrap(), "0 done");
    }

    #[test]
    fn test_positional_compiler_preamble_without_colons() {
        let output = format!("Compiling 3 files with Solc 0.8.20\n{FORGE_REPORT}");
        assert_eq!(
            PositionalExtractor.extract(&output).unwrap(),
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
    }

    #[test]
    fn test_positional_too_few_colons() {
        let err = PositionalExtractor
            .extract("Deployer: 0xabc\n")
            .expect_err("Only one colon");
        assert!(matches!(err, DeployError::OutputParse { .. }));
        assert!(PositionalExtractor.extract("").is_err());
    }

    #[test]
    fn test_positional_missing_newline() {
        let err = PositionalExtractor
            .extract("Deployer: 0xabc\nDeployed to: 0x1234")
            .expect_err("No trailing newline");
        assert!(matches!(err, DeployError::OutputParse { .. }));
    }

    #[test]
    fn test_positional_nothing_after_colon() {
        assert!(PositionalExtractor.extract("a: 1\nb:").is_err());
    }

    #[test]
    fn test_json_extract() {
        let output = r#"Compiling 1 files with Solc 0.8.20
Solc 0.8.20 finished in 1.2s
{
  "deployer": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
  "deployedTo": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
  "transactionHash": "0xabc"
}
"#;
        assert_eq!(
            JsonExtractor.extract(output).unwrap(),
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
    }

    #[test]
    fn test_json_missing_field() {
        let err = JsonExtractor
            .extract(r#"{"deployer": "0x1"}"#)
            .expect_err("No deployedTo");
        assert!(matches!(err, DeployError::OutputParse { .. }));
        assert!(JsonExtractor.extract(FORGE_REPORT).is_err());
    }

    #[test]
    fn test_extractor_kind_flags() {
        assert!(ExtractorKind::Positional.tool_flags().is_empty());
        assert_eq!(ExtractorKind::Json.tool_flags(), &["--json"]);
        let kind: ExtractorKind = "json".parse().unwrap();
        assert_eq!(kind, ExtractorKind::Json);
    }
}
