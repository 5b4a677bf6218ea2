// ABOUTME: Pristine node and mirror-node settings captured at build time.
// ABOUTME: Init layers changes on top of these; CleanUp restores them.

use super::network::ConfigEntry;
use crate::error::{Error, Result};
use serde::Deserialize;

const ORIGINAL: &str = include_str!("data/original-node-configuration.yml");

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OriginalNodeConfiguration {
    /// Contents of the consensus node's `bootstrap.properties`.
    pub bootstrap_properties: Vec<ConfigEntry>,
    pub turbo_node_properties: TurboNodeProperties,
    /// Mirror importer `downloader.local` block used in debug mode.
    pub local: serde_yaml::Value,
    /// Mirror monitor `nodes` for the single-node network.
    pub full_node_properties: serde_yaml::Value,
    /// Mirror monitor `nodes` for the multi-node network.
    pub multi_node_properties: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TurboNodeProperties {
    pub data_path: String,
    pub sources: serde_yaml::Value,
}

impl OriginalNodeConfiguration {
    pub fn load() -> Result<Self> {
        serde_yaml::from_str(ORIGINAL).map_err(|source| Error::EmbeddedConfig {
            name: "original node",
            source,
        })
    }

    /// The original `bootstrap.properties` text, one `key=value` per line.
    pub fn bootstrap_text(&self) -> String {
        render_properties(&self.bootstrap_properties)
    }
}

pub(crate) fn render_properties<'a>(entries: impl IntoIterator<Item = &'a ConfigEntry>) -> String {
    entries
        .into_iter()
        .map(|entry| format!("{}={}\n", entry.key, entry.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_configuration_parses() {
        let config = OriginalNodeConfiguration::load().unwrap();
        assert!(!config.bootstrap_properties.is_empty());
        assert!(config.full_node_properties.is_sequence());
        assert!(config.multi_node_properties.is_sequence());
    }

    #[test]
    fn bootstrap_text_is_line_per_property() {
        let config = OriginalNodeConfiguration::load().unwrap();
        let text = config.bootstrap_text();
        assert_eq!(text.lines().count(), config.bootstrap_properties.len());
        assert!(text.ends_with('\n'));
        assert!(text.lines().all(|line| line.contains('=')));
    }
}
