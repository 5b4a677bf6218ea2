// ABOUTME: Per-network image tags, relay environment and node properties.
// ABOUTME: Embedded YAML documents for local, mainnet, testnet and previewnet.

use crate::error::{Error, Result};
use crate::types::NetworkType;
use serde::{Deserialize, Deserializer};

const LOCAL: &str = include_str!("data/local.yml");
const MAINNET: &str = include_str!("data/mainnet.yml");
const TESTNET: &str = include_str!("data/testnet.yml");
const PREVIEWNET: &str = include_str!("data/previewnet.yml");

/// One `key=value` pair; scalar YAML values are kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfiguration {
    pub image_tags: Vec<ConfigEntry>,
    #[serde(default)]
    pub env: Vec<ConfigEntry>,
    #[serde(default)]
    pub node_properties: Vec<ConfigEntry>,
}

impl NetworkConfiguration {
    pub fn for_network(network: NetworkType) -> Result<Self> {
        let document = match network {
            NetworkType::Local => LOCAL,
            NetworkType::Mainnet => MAINNET,
            NetworkType::Testnet => TESTNET,
            NetworkType::Previewnet => PREVIEWNET,
        };
        serde_yaml::from_str(document).map_err(|source| Error::EmbeddedConfig {
            name: "network",
            source,
        })
    }

    /// Image tags followed by relay environment entries.
    pub fn environment(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.image_tags.iter().chain(self.env.iter())
    }
}

pub(crate) fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, found {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_network_document_parses() {
        for network in [
            NetworkType::Local,
            NetworkType::Mainnet,
            NetworkType::Testnet,
            NetworkType::Previewnet,
        ] {
            let config = NetworkConfiguration::for_network(network).unwrap();
            assert!(
                config.image_tags.iter().any(|e| e.key == "NETWORK_NODE_IMAGE_TAG"),
                "{network} is missing the node image tag"
            );
        }
    }

    #[test]
    fn numeric_values_keep_their_text() {
        let yaml = "image_tags: []\nnode_properties:\n  - key: contracts.chainId\n    value: 296\n";
        let config: NetworkConfiguration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.node_properties[0].value, "296");
    }
}
