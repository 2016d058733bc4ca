//! Rendering of the final registry state.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use crate::{DeploymentDescriptor, Registry};

/// Output format of the state dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DumpFormat {
    #[default]
    Table,
    Toml,
    Json,
}

/// Render the descriptors of `names` in the requested format.
///
/// Unknown names are ignored. The table keeps the order of `names`; TOML and
/// JSON are keyed by contract name.
pub fn render(registry: &Registry, names: &[String], format: DumpFormat) -> Result<String> {
    let descriptors: Vec<&DeploymentDescriptor> =
        names.iter().filter_map(|name| registry.get(name)).collect();

    match format {
        DumpFormat::Table => Ok(render_table(&descriptors)),
        DumpFormat::Toml => {
            let entries: BTreeMap<&str, &DeploymentDescriptor> = descriptors
                .iter()
                .map(|descriptor| (descriptor.name.as_str(), *descriptor))
                .collect();
            toml::to_string_pretty(&entries).context("Failed to serialize registry to TOML")
        }
        DumpFormat::Json => {
            let entries: BTreeMap<&str, &DeploymentDescriptor> = descriptors
                .iter()
                .map(|descriptor| (descriptor.name.as_str(), *descriptor))
                .collect();
            serde_json::to_string_pretty(&entries).context("Failed to serialize registry to JSON")
        }
    }
}

fn render_table(descriptors: &[&DeploymentDescriptor]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Contract", "Source", "Arguments", "Address"]);

    for descriptor in descriptors {
        table.add_row(vec![
            descriptor.name.clone(),
            descriptor.src.clone().unwrap_or_else(|| "-".to_string()),
            descriptor.args.join(", "),
            descriptor
                .address
                .clone()
                .unwrap_or_else(|| "not deployed".to_string()),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::from_iter([
            DeploymentDescriptor::new("X", "src/X.sol:X").address("0x1234"),
            DeploymentDescriptor::new("Y", "src/Y.sol:Y").args(["X"]),
        ])
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_table() {
        let rendered = render(&registry(), &names(&["X", "Y"]), DumpFormat::Table).unwrap();
        assert!(rendered.contains("Contract"));
        assert!(rendered.contains("0x1234"));
        assert!(rendered.contains("not deployed"));
    }

    #[test]
    fn test_render_json_only_requested() {
        let rendered = render(&registry(), &names(&["Y", "Missing"]), DumpFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["Y"]["src"], "src/Y.sol:Y");
        assert_eq!(value["Y"]["args"][0], "X");
        assert!(value.get("X").is_none());
        assert!(value.get("Missing").is_none());
    }

    #[test]
    fn test_render_toml_round_trips_into_config_entries() {
        let rendered = render(&registry(), &names(&["X", "Y"]), DumpFormat::Toml).unwrap();
        let entries: BTreeMap<String, DeploymentDescriptor> = toml::from_str(&rendered).unwrap();

        assert_eq!(Registry::from_entries(entries), registry());
    }
}
