use serde::{Deserialize, Serialize};

/// Connection/configuration blob handed to the node module on initialize.
/// The controller passes it through unchanged; field names follow the
/// module's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    pub host: String,
    pub tcp_port: u16,
    pub key: Option<String>,
    pub cluster_id: u32,
    pub relay: bool,
    pub relay_topics: Vec<String>,
    pub shards: Vec<u16>,
    pub max_message_size: String,
    pub dns_discovery: bool,
    pub dns_discovery_url: Option<String>,
    pub discv5_discovery: bool,
    pub num_shards_in_network: u16,
    pub discv5_enr_auto_update: bool,
    pub log_level: String,
    pub keep_alive: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            tcp_port: 60010,
            key: None,
            cluster_id: 16,
            relay: true,
            relay_topics: vec!["/mesh/2/rs/16/32".into()],
            shards: vec![1, 32, 64, 128, 256],
            max_message_size: "1024KiB".into(),
            dns_discovery: true,
            dns_discovery_url: None,
            discv5_discovery: false,
            num_shards_in_network: 257,
            discv5_enr_auto_update: false,
            log_level: "INFO".into(),
            keep_alive: true,
        }
    }
}
