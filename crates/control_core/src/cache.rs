/// Last-known view of the remote node's data, replaced wholesale on each
/// accepted update. Setters report whether the stored value actually
/// changed so callers can suppress redundant notifications.
#[derive(Debug, Default)]
pub struct DomainCache {
    peers: Vec<String>,
    metrics: String,
    peers_last_updated: String,
    metrics_last_updated: String,
}

impl DomainCache {
    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    pub fn metrics(&self) -> &str {
        &self.metrics
    }

    pub fn peers_last_updated(&self) -> &str {
        &self.peers_last_updated
    }

    pub fn metrics_last_updated(&self) -> &str {
        &self.metrics_last_updated
    }

    pub fn set_peers(&mut self, roster: Vec<String>) -> bool {
        if self.peers == roster {
            return false;
        }
        self.peers = roster;
        true
    }

    pub fn set_metrics(&mut self, rendered: String) -> bool {
        if self.metrics == rendered {
            return false;
        }
        self.metrics = rendered;
        true
    }

    pub fn set_peers_last_updated(&mut self, timestamp: String) -> bool {
        if self.peers_last_updated == timestamp {
            return false;
        }
        self.peers_last_updated = timestamp;
        true
    }

    pub fn set_metrics_last_updated(&mut self, timestamp: String) -> bool {
        if self.metrics_last_updated == timestamp {
            return false;
        }
        self.metrics_last_updated = timestamp;
        true
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
